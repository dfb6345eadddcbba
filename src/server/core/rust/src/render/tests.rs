/* src/server/core/rust/src/render/tests.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use orbit_engine::{ElementSet, HEAD_INJECTED_MARKER, RenderedHtml, SsrElement};
use serde_json::json;
use url::Url;

use super::*;
use crate::component::{
  BoxFuture, Chunk, ComponentModule, DefaultExport, EndpointHandlerFn, PageComponent, Props,
};
use crate::config::{MarkdownRenderOptions, RendererInfo};
use crate::errors::{ConfigurationError, RenderError};
use crate::route::{Params, RouteData, RouteId, RouteKind};
use crate::route_cache::RouteCache;

const ORIGIN: &str = "http://localhost:3000";

struct StaticPage(Vec<Chunk>);

impl PageComponent for StaticPage {
  fn render<'a>(
    &'a self,
    _result: &'a RenderResult,
    _props: &'a Props,
  ) -> BoxFuture<'a, Result<Vec<Chunk>, RenderError>> {
    Box::pin(async move { Ok(self.0.clone()) })
  }
}

/// `<h1>{title}</h1><p>{id}</p>` with the head up front.
struct PostPage;

impl PageComponent for PostPage {
  fn render<'a>(
    &'a self,
    result: &'a RenderResult,
    props: &'a Props,
  ) -> BoxFuture<'a, Result<Vec<Chunk>, RenderError>> {
    Box::pin(async move {
      let title = props.get("title").and_then(serde_json::Value::as_str).unwrap_or_default();
      let id = result.params.get("id").map_or("", String::as_str);
      let script = result.resolve("/src/post.ts").await?;
      Ok(vec![
        Chunk::Html("<html><head>".into()),
        Chunk::Head,
        Chunk::Html(format!("</head><body><h1>{title}</h1><p>{id}</p><i>{script}</i>")),
        Chunk::Html(format!("<a href=\"{}\"></a></body></html>", result.canonical_url)),
      ])
    })
  }
}

#[derive(Debug, thiserror::Error)]
#[error("template error in Post.astro")]
struct TemplateError;

struct FailingPage;

impl PageComponent for FailingPage {
  fn render<'a>(
    &'a self,
    _result: &'a RenderResult,
    _props: &'a Props,
  ) -> BoxFuture<'a, Result<Vec<Chunk>, RenderError>> {
    Box::pin(async { Err(RenderError::upstream(TemplateError)) })
  }
}

/// Renderer that returns fixed marker-style strings, bypassing the chunk stream.
struct LegacyStringRenderer {
  output: String,
  head_calls: AtomicUsize,
}

impl LegacyStringRenderer {
  fn new(output: impl Into<String>) -> Self {
    Self { output: output.into(), head_calls: AtomicUsize::new(0) }
  }
}

impl Renderer for LegacyStringRenderer {
  async fn render_to_string(
    &self,
    _result: &RenderResult,
    _component: &dyn PageComponent,
    _props: &Props,
    _children: Option<&str>,
  ) -> Result<RenderedHtml, RenderError> {
    Ok(RenderedHtml::from_marked(self.output.clone()))
  }

  async fn render_head(&self, _result: &RenderResult) -> Result<String, RenderError> {
    self.head_calls.fetch_add(1, Ordering::SeqCst);
    Ok("<title>synth</title>".into())
  }

  async fn render_endpoint(
    &self,
    handler: &EndpointHandlerFn,
    params: Params,
  ) -> Result<String, RenderError> {
    handler(params).await
  }
}

struct Fixture {
  legacy_build: bool,
  links: ElementSet,
  scripts: ElementSet,
  markdown: Arc<MarkdownRenderOptions>,
  renderers: Arc<[RendererInfo]>,
  resolve: ResolveFn,
  cache: RouteCache,
  site: Option<Url>,
}

impl Fixture {
  fn new() -> Self {
    Self {
      legacy_build: false,
      links: ElementSet::new(),
      scripts: ElementSet::new(),
      markdown: Arc::new(MarkdownRenderOptions::default()),
      renderers: Arc::from(vec![RendererInfo::new("@astrojs/renderer-preact")]),
      resolve: Arc::new(|specifier: String| -> BoxFuture<'static, Result<String, RenderError>> {
        Box::pin(async move { Ok(format!("/_assets{specifier}")) })
      }),
      cache: RouteCache::new(),
      site: None,
    }
  }

  async fn render<R: Renderer>(
    &self,
    renderer: &R,
    module: &ComponentModule,
    route: Option<&Arc<RouteData>>,
    pathname: &str,
  ) -> Result<String, RenderError> {
    render(RenderOptions {
      legacy_build: self.legacy_build,
      links: &self.links,
      scripts: &self.scripts,
      markdown: &self.markdown,
      module,
      origin: ORIGIN,
      pathname,
      renderer,
      renderers: &self.renderers,
      resolve: &self.resolve,
      route,
      route_cache: &self.cache,
      site: self.site.as_ref(),
    })
    .await
  }
}

fn route(pattern: &str, kind: RouteKind, component: &str) -> Arc<RouteData> {
  Arc::new(RouteData::parse(RouteId::new(0), pattern, kind, component).unwrap())
}

fn posts_module() -> ComponentModule {
  ComponentModule::page(Arc::new(PostPage)).with_static_paths(|_ctx| async {
    Ok(json!([
      { "params": { "id": "1" }, "props": { "title": "A" } },
      { "params": { "id": "2" }, "props": { "title": "B" } },
    ]))
  })
}

#[tokio::test]
async fn dynamic_page_renders_with_props_and_head() {
  let mut fx = Fixture::new();
  fx.links.insert(SsrElement::link().attr("rel", "stylesheet").attr("href", "/post.css"));
  fx.scripts.insert(SsrElement::script().attr("type", "module").attr("src", "/post.js"));
  let r = route("/posts/[id]", RouteKind::Page, "src/pages/posts/[id].astro");

  let html = fx.render(&HtmlRenderer, &posts_module(), Some(&r), "/posts/2").await.unwrap();
  assert_eq!(
    html,
    "<!DOCTYPE html>\n<html><head><link href=\"/post.css\" rel=\"stylesheet\">\n\
     <script src=\"/post.js\" type=\"module\"></script></head><body><h1>B</h1><p>2</p>\
     <i>/_assets/src/post.ts</i><a href=\"http://localhost:3000/posts/2/\"></a></body></html>"
  );
}

#[tokio::test]
async fn canonical_url_prefers_site() {
  let mut fx = Fixture::new();
  fx.site = Some(Url::parse("https://example.com/blog/").unwrap());
  let r = route("/posts/[id]", RouteKind::Page, "src/pages/posts/[id].astro");
  let html = fx.render(&HtmlRenderer, &posts_module(), Some(&r), "/posts/1").await.unwrap();
  assert!(html.contains("<a href=\"https://example.com/blog/posts/1/\">"));
}

#[tokio::test]
async fn canonical_url_of_first_page_drops_page_number() {
  let fx = Fixture::new();
  let r = route("/blog/[page]", RouteKind::Page, "src/pages/blog/[page].astro");
  let module = ComponentModule::page(Arc::new(PostPage)).with_static_paths(|_ctx| async {
    Ok(json!([{ "params": { "page": 1 } }, { "params": { "page": 2 } }]))
  });
  let first = fx.render(&HtmlRenderer, &module, Some(&r), "/blog/1").await.unwrap();
  assert!(first.contains("<a href=\"http://localhost:3000/blog/\">"));
  let second = fx.render(&HtmlRenderer, &module, Some(&r), "/blog/2").await.unwrap();
  assert!(second.contains("<a href=\"http://localhost:3000/blog/2/\">"));
}

#[tokio::test]
async fn unmatched_static_path_is_a_routing_error() {
  let fx = Fixture::new();
  let r = route("/posts/[id]", RouteKind::Page, "src/pages/posts/[id].astro");
  let err = fx.render(&HtmlRenderer, &posts_module(), Some(&r), "/posts/3").await.unwrap_err();
  assert!(matches!(err, RenderError::NoMatchingStaticPath { ref pathname } if pathname == "/posts/3"));
  assert!(err.to_string().contains("/posts/3"));
  assert!(err.is_not_found());
}

#[tokio::test]
async fn endpoint_output_is_returned_verbatim() {
  let mut fx = Fixture::new();
  fx.links.insert(SsrElement::link().attr("href", "/never.css"));
  let r = route("/api/[id].json", RouteKind::Endpoint, "src/pages/api/[id].json.ts");
  let body = format!("{{\"id\":\"7\"}}{HEAD_INJECTED_MARKER}");
  let expected = body.clone();
  let module = ComponentModule::endpoint(move |params: Params| {
    let body = body.replace("7", &params["id"]);
    async move { Ok(body) }
  })
  .with_static_paths(|_ctx| async { Ok(json!([{ "params": { "id": 7 } }])) });

  let out = fx.render(&HtmlRenderer, &module, Some(&r), "/api/7.json").await.unwrap();
  assert_eq!(out, expected);
}

#[tokio::test]
async fn endpoint_without_handler_is_a_configuration_error() {
  let fx = Fixture::new();
  let r = route("/api/health", RouteKind::Endpoint, "src/pages/api/health.ts");
  let err = fx.render(&HtmlRenderer, &ComponentModule::new(), Some(&r), "/api/health").await.unwrap_err();
  assert!(matches!(err, RenderError::Config(ConfigurationError::MissingEndpointHandler { .. })));
}

#[tokio::test]
async fn injected_marker_is_stripped_and_head_not_synthesized() {
  let fx = Fixture::new();
  let renderer = LegacyStringRenderer::new(format!(
    "<html><head><title>T</title>{HEAD_INJECTED_MARKER}</head><body></body></html>"
  ));
  let module = ComponentModule::page(Arc::new(StaticPage(Vec::new())));
  let html = fx.render(&renderer, &module, None, "/").await.unwrap();

  assert!(!html.contains(HEAD_INJECTED_MARKER));
  assert_eq!(html, "<!DOCTYPE html>\n<html><head><title>T</title></head><body></body></html>");
  assert_eq!(renderer.head_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_marker_synthesizes_head_before_body() {
  let fx = Fixture::new();
  let renderer = LegacyStringRenderer::new("<h1>Hi</h1>");
  let module = ComponentModule::page(Arc::new(StaticPage(Vec::new())));
  let html = fx.render(&renderer, &module, None, "/").await.unwrap();
  assert!(html.starts_with("<!DOCTYPE html>\n"));
  assert_eq!(html, "<!DOCTYPE html>\n<title>synth</title><h1>Hi</h1>");
  assert_eq!(renderer.head_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn existing_doctype_is_not_duplicated() {
  let fx = Fixture::new();
  let renderer =
    LegacyStringRenderer::new(format!("<!doctype HTML>\n<html>{HEAD_INJECTED_MARKER}</html>"));
  let module = ComponentModule::page(Arc::new(StaticPage(Vec::new())));
  let html = fx.render(&renderer, &module, None, "/").await.unwrap();
  assert_eq!(html, "<!doctype HTML>\n<html></html>");
}

#[tokio::test]
async fn legacy_build_never_prepends_doctype() {
  let mut fx = Fixture::new();
  fx.legacy_build = true;
  let page = StaticPage(vec![Chunk::Html("<p>legacy</p>".into())]);
  let module = ComponentModule::page(Arc::new(page));
  let html = fx.render(&HtmlRenderer, &module, None, "/").await.unwrap();
  assert_eq!(html, "<p>legacy</p>");
}

#[tokio::test]
async fn only_first_head_chunk_injects() {
  let mut fx = Fixture::new();
  fx.scripts.insert(SsrElement::script().attr("src", "/a.js"));
  let page = StaticPage(vec![Chunk::Head, Chunk::Html("<p></p>".into()), Chunk::Head, Chunk::Children]);
  let module = ComponentModule::page(Arc::new(page));
  let html = fx.render(&HtmlRenderer, &module, None, "/").await.unwrap();
  assert_eq!(html, "<!DOCTYPE html>\n<script src=\"/a.js\"></script><p></p>");
}

#[tokio::test]
async fn renderer_errors_propagate_unchanged() {
  let fx = Fixture::new();
  let module = ComponentModule::page(Arc::new(FailingPage));
  let err = fx.render(&HtmlRenderer, &module, None, "/").await.unwrap_err();
  assert_eq!(err.to_string(), "template error in Post.astro");
  assert!(err.as_upstream().is_some_and(|e| e.is::<TemplateError>()));
}

#[tokio::test]
async fn non_page_default_export_is_rejected() {
  let fx = Fixture::new();
  let r = route("/utils", RouteKind::Page, "src/pages/utils.ts");
  let module = ComponentModule::new().with_default_export(DefaultExport::Other { kind: "function".into() });
  let err = fx.render(&HtmlRenderer, &module, Some(&r), "/utils").await.unwrap_err();
  match err {
    RenderError::Config(ConfigurationError::NotAPageComponent { component, kind, .. }) => {
      assert_eq!(component, "src/pages/utils.ts");
      assert_eq!(kind, "function");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn missing_default_export_is_rejected() {
  let fx = Fixture::new();
  let err = fx.render(&HtmlRenderer, &ComponentModule::new(), None, "/").await.unwrap_err();
  assert!(matches!(err, RenderError::Config(ConfigurationError::MissingDefaultExport { .. })));
}

#[tokio::test]
async fn lazy_default_export_is_awaited_per_render() {
  let fx = Fixture::new();
  let loads = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&loads);
  let module = ComponentModule::lazy(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    async {
      let page: Arc<dyn PageComponent> = Arc::new(StaticPage(vec![Chunk::Html("<p>lazy</p>".into())]));
      Some(DefaultExport::Page(page))
    }
  });

  for _ in 0..2 {
    let html = fx.render(&HtmlRenderer, &module, None, "/").await.unwrap();
    assert_eq!(html, "<!DOCTYPE html>\n<p>lazy</p>");
  }
  assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_origin_is_a_validation_error() {
  let fx = Fixture::new();
  let module = ComponentModule::page(Arc::new(StaticPage(Vec::new())));
  let err = render(RenderOptions {
    legacy_build: false,
    links: &fx.links,
    scripts: &fx.scripts,
    markdown: &fx.markdown,
    module: &module,
    origin: "not a url",
    pathname: "/",
    renderer: &HtmlRenderer,
    renderers: &fx.renderers,
    resolve: &fx.resolve,
    route: None,
    route_cache: &fx.cache,
    site: None,
  })
  .await
  .unwrap_err();
  assert!(matches!(err, RenderError::InvalidUrl { .. }));
  assert_eq!(err.status(), 400);
}

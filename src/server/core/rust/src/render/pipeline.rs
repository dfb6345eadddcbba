/* src/server/core/rust/src/render/pipeline.rs */

use std::sync::Arc;

use orbit_engine::{ElementSet, finalize_document};
use tracing::debug;
use url::Url;

use super::renderer::Renderer;
use super::result::{RenderResult, ResolveFn, canonical_url};
use crate::component::{ComponentModule, DefaultExport};
use crate::config::{MarkdownRenderOptions, RendererInfo};
use crate::errors::{ConfigurationError, RenderError};
use crate::params::{ParamsAndProps, get_params_and_props};
use crate::route::{RouteData, RouteKind};
use crate::route_cache::RouteCache;

/// Inputs for a single [`render`] call.
pub struct RenderOptions<'a, R> {
  pub legacy_build: bool,
  pub links: &'a ElementSet,
  pub scripts: &'a ElementSet,
  pub markdown: &'a Arc<MarkdownRenderOptions>,
  pub module: &'a ComponentModule,
  /// Scheme and host of the request, e.g. `http://localhost:3000`.
  pub origin: &'a str,
  pub pathname: &'a str,
  pub renderer: &'a R,
  pub renderers: &'a Arc<[RendererInfo]>,
  pub resolve: &'a ResolveFn,
  pub route: Option<&'a Arc<RouteData>>,
  /// Must be the cache of the table `route` came from.
  pub route_cache: &'a RouteCache,
  pub site: Option<&'a Url>,
}

/// Render one request to its final output.
///
/// Endpoints return the handler's body verbatim. Pages are rendered, given a
/// head if the renderer did not inject one, and prefixed with a doctype
/// outside legacy builds.
pub async fn render<R: Renderer>(opts: RenderOptions<'_, R>) -> Result<String, RenderError> {
  let RenderOptions {
    legacy_build,
    links,
    scripts,
    markdown,
    module,
    origin,
    pathname,
    renderer,
    renderers,
    resolve,
    route,
    route_cache,
    site,
  } = opts;

  let (params, props) = match get_params_and_props(module, route, route_cache, pathname).await? {
    ParamsAndProps::Resolved { params, props } => (params, props),
    ParamsAndProps::NoMatchingStaticPath => {
      return Err(RenderError::NoMatchingStaticPath { pathname: pathname.to_string() });
    }
  };

  if let Some(route) = route.filter(|r| r.kind == RouteKind::Endpoint) {
    let Some(handler) = module.endpoint.as_ref() else {
      return Err(
        ConfigurationError::MissingEndpointHandler {
          route: route.route.clone(),
          component: route.component.clone(),
        }
        .into(),
      );
    };
    debug!(route = %route.route, pathname, "rendering endpoint");
    return renderer.render_endpoint(handler, params).await;
  }

  let (route_name, component_name) =
    route.map_or_else(Default::default, |r| (r.route.clone(), r.component.clone()));
  let component = match module.resolve_default().await {
    Some(DefaultExport::Page(component)) => component,
    Some(DefaultExport::Other { kind }) => {
      return Err(
        ConfigurationError::NotAPageComponent {
          route: route_name,
          component: component_name,
          kind,
        }
        .into(),
      );
    }
    None => {
      return Err(
        ConfigurationError::MissingDefaultExport { route: route_name, component: component_name }
          .into(),
      );
    }
  };

  let invalid_url = |source: url::ParseError| RenderError::InvalidUrl { url: format!("{origin}{pathname}"), source };
  let origin_url = Url::parse(origin).map_err(invalid_url)?;
  let request_url = origin_url.join(pathname).map_err(invalid_url)?;
  let canonical_url = canonical_url(pathname, &params, site.unwrap_or(&origin_url)).map_err(invalid_url)?;

  let result = RenderResult {
    params,
    props,
    scripts: scripts.clone(),
    links: links.clone(),
    pathname: pathname.to_string(),
    origin: origin.to_string(),
    request_url,
    site: site.cloned(),
    canonical_url,
    legacy_build,
    markdown: Arc::clone(markdown),
    renderers: Arc::clone(renderers),
    resolver: Arc::clone(resolve),
  };

  let rendered = renderer.render_to_string(&result, component.as_ref(), &result.props, None).await?;
  let head = if rendered.head_injected {
    None
  } else {
    debug!(pathname, "head not injected by renderer; synthesizing");
    Some(renderer.render_head(&result).await?)
  };

  Ok(finalize_document(rendered, head.as_deref(), legacy_build))
}

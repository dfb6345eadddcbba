/* src/server/core/rust/src/render/result.rs */

use std::fmt;
use std::sync::Arc;

use orbit_engine::ElementSet;
use url::Url;

use crate::component::{BoxFuture, Props};
use crate::config::{MarkdownRenderOptions, RendererInfo};
use crate::errors::RenderError;
use crate::route::Params;
use crate::route_cache::PAGE_PARAM;

/// Asset specifier -> public URL, supplied by the bundler.
pub type ResolveFn =
  Arc<dyn Fn(String) -> BoxFuture<'static, Result<String, RenderError>> + Send + Sync>;

/// Per-request context handed to the renderer. Built once per render call.
pub struct RenderResult {
  pub params: Params,
  pub props: Props,
  pub scripts: ElementSet,
  pub links: ElementSet,
  pub pathname: String,
  pub origin: String,
  pub request_url: Url,
  pub site: Option<Url>,
  pub canonical_url: Url,
  pub legacy_build: bool,
  pub markdown: Arc<MarkdownRenderOptions>,
  pub renderers: Arc<[RendererInfo]>,
  pub(crate) resolver: ResolveFn,
}

impl RenderResult {
  pub async fn resolve(&self, specifier: &str) -> Result<String, RenderError> {
    (self.resolver)(specifier.to_string()).await
  }
}

impl fmt::Debug for RenderResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RenderResult")
      .field("params", &self.params)
      .field("pathname", &self.pathname)
      .field("request_url", &self.request_url.as_str())
      .field("canonical_url", &self.canonical_url.as_str())
      .field("legacy_build", &self.legacy_build)
      .finish_non_exhaustive()
  }
}

/// Resolver that hands specifiers back unchanged.
pub fn identity_resolver() -> ResolveFn {
  Arc::new(|specifier: String| -> BoxFuture<'static, Result<String, RenderError>> {
    Box::pin(async move { Ok(specifier) })
  })
}

/// Canonical URL of a page: `/index.html` is dropped, directory-style paths
/// gain a trailing slash, and the result is resolved against `base`.
///
/// A trailing `/1` is dropped only when it is the matched `page` param, so
/// `/blog/1` of `/blog/[page]` is `/blog/` while `/posts/1` of `/posts/[id]`
/// keeps its segment.
pub fn canonical_url(pathname: &str, params: &Params, base: &Url) -> Result<Url, url::ParseError> {
  let mut path = pathname.strip_suffix("/index.html").unwrap_or(pathname).to_string();

  if params.get(PAGE_PARAM).is_some_and(|page| page == "1") {
    let trimmed = path.strip_suffix('/').unwrap_or(&path);
    if let Some(stripped) = trimmed.strip_suffix("/1") {
      path = stripped.to_string();
    }
  }

  if !has_extension(&path) {
    let len = path.trim_end_matches('/').len();
    path.truncate(len);
    path.push('/');
  }

  let mut collapsed = String::with_capacity(path.len() + 1);
  collapsed.push('.');
  for c in path.chars() {
    if c == '/' && collapsed.ends_with('/') {
      continue;
    }
    collapsed.push(c);
  }
  if !collapsed.starts_with("./") {
    collapsed.insert(1, '/');
  }
  base.join(&collapsed)
}

fn has_extension(path: &str) -> bool {
  let last = path.rsplit('/').next().unwrap_or(path);
  last.rfind('.').is_some_and(|i| i > 0)
}

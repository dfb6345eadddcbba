/* src/server/core/rust/src/session.rs */

use std::sync::Arc;

use orbit_engine::{ElementSet, SsrElement};
use tracing::debug;

use crate::component::{BoxFuture, ComponentModule};
use crate::config::{MarkdownRenderOptions, RenderConfig, RendererInfo};
use crate::errors::{ConfigurationError, RenderError};
use crate::prerender::{PrerenderTarget, prerender};
use crate::render::{RenderOptions, Renderer, ResolveFn, identity_resolver, render};
use crate::route::{RouteData, RouteKind, RouteTable};
use crate::route_cache::RouteCache;

/// One build or dev-server session: a route table, its modules, and the
/// route cache shared by every render. Dropping the session drops the cache.
pub struct RenderSession<R> {
  renderer: R,
  routes: RouteTable,
  /// Indexed by `RouteId`.
  modules: Vec<ComponentModule>,
  scripts: ElementSet,
  links: ElementSet,
  resolve: ResolveFn,
  site: Option<url::Url>,
  legacy_build: bool,
  markdown: Arc<MarkdownRenderOptions>,
  renderers: Arc<[RendererInfo]>,
  route_cache: RouteCache,
}

impl<R: Renderer> RenderSession<R> {
  pub fn new(renderer: R, config: RenderConfig) -> Self {
    let RenderConfig { site, legacy_build, markdown, renderers } = config;
    Self {
      renderer,
      routes: RouteTable::new(),
      modules: Vec::new(),
      scripts: ElementSet::new(),
      links: ElementSet::new(),
      resolve: identity_resolver(),
      site,
      legacy_build,
      markdown: Arc::new(markdown),
      renderers: renderers.into(),
      route_cache: RouteCache::new(),
    }
  }

  pub fn page(
    self,
    route: &str,
    component: impl Into<String>,
    module: ComponentModule,
  ) -> Result<Self, ConfigurationError> {
    self.add_route(route, RouteKind::Page, component.into(), module)
  }

  pub fn endpoint(
    self,
    route: &str,
    component: impl Into<String>,
    module: ComponentModule,
  ) -> Result<Self, ConfigurationError> {
    self.add_route(route, RouteKind::Endpoint, component.into(), module)
  }

  pub fn script(mut self, element: SsrElement) -> Self {
    self.scripts.insert(element);
    self
  }

  pub fn link(mut self, element: SsrElement) -> Self {
    self.links.insert(element);
    self
  }

  pub fn resolver<F, Fut>(mut self, resolve: F) -> Self
  where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<String, RenderError>> + Send + 'static,
  {
    self.resolve = Arc::new(move |specifier: String| -> BoxFuture<'static, Result<String, RenderError>> {
      Box::pin(resolve(specifier))
    });
    self
  }

  pub fn integration(mut self, renderer: RendererInfo) -> Self {
    let mut renderers = self.renderers.to_vec();
    renderers.push(renderer);
    self.renderers = renderers.into();
    self
  }

  pub fn routes(&self) -> &RouteTable {
    &self.routes
  }

  pub fn route_cache(&self) -> &RouteCache {
    &self.route_cache
  }

  /// Match `pathname` against the route table and render it.
  pub async fn render_path(&self, origin: &str, pathname: &str) -> Result<String, RenderError> {
    let route = self
      .routes
      .match_path(pathname)
      .ok_or_else(|| RenderError::RouteNotFound { pathname: pathname.to_string() })?;
    self.render_route(route, origin, pathname).await
  }

  /// Render `pathname` with an already matched route of this session.
  pub async fn render_route(
    &self,
    route: &Arc<RouteData>,
    origin: &str,
    pathname: &str,
  ) -> Result<String, RenderError> {
    let module = self
      .module(route)
      .ok_or_else(|| RenderError::RouteNotFound { pathname: pathname.to_string() })?;
    debug!(route = %route.route, pathname, "render");
    render(RenderOptions {
      legacy_build: self.legacy_build,
      links: &self.links,
      scripts: &self.scripts,
      markdown: &self.markdown,
      module,
      origin,
      pathname,
      renderer: &self.renderer,
      renderers: &self.renderers,
      resolve: &self.resolve,
      route: Some(route),
      route_cache: &self.route_cache,
      site: self.site.as_ref(),
    })
    .await
  }

  /// Every pathname a build of this session renders. Fills the route cache.
  pub async fn prerender(&self) -> Result<Vec<PrerenderTarget>, RenderError> {
    prerender(self.routes.iter().zip(&self.modules), &self.route_cache).await
  }

  fn add_route(
    mut self,
    route: &str,
    kind: RouteKind,
    component: String,
    module: ComponentModule,
  ) -> Result<Self, ConfigurationError> {
    self.routes.insert(route, kind, component)?;
    self.modules.push(module);
    Ok(self)
  }

  fn module(&self, route: &Arc<RouteData>) -> Option<&ComponentModule> {
    let owned = self.routes.get(route.id).is_some_and(|r| Arc::ptr_eq(r, route));
    if !owned {
      return None;
    }
    self.modules.get(route.id.get() as usize)
  }
}

/* src/server/core/rust/src/lib.rs */

pub mod component;
pub mod config;
pub mod errors;
pub mod params;
pub mod prerender;
pub mod render;
pub mod route;
pub mod route_cache;
pub mod session;

// Re-exports for ergonomic use
pub use component::{
  BoxFuture, Chunk, ComponentModule, DefaultExport, EndpointHandlerFn, GetStaticPathsFn,
  PageComponent, Props,
};
pub use config::{ConfigError, MarkdownRenderOptions, RenderConfig, RendererInfo, load_render_config};
pub use errors::{BoxError, ConfigurationError, RenderError};
pub use orbit_engine;
pub use orbit_engine::{ElementSet, RenderedHtml, SsrElement};
pub use params::{ParamsAndProps, extract_params, get_params_and_props};
pub use prerender::{PrerenderTarget, prerender};
pub use render::{
  HtmlRenderer, RenderOptions, RenderResult, Renderer, ResolveFn, canonical_url, identity_resolver,
  render,
};
pub use route::{Params, RouteData, RouteId, RouteKind, RouteTable};
pub use route_cache::{
  Diagnostic, PaginateOptions, RouteCache, RouteCacheEntry, StaticPathEntry, StaticPathsContext,
  call_get_static_paths, paginate,
};
pub use session::RenderSession;

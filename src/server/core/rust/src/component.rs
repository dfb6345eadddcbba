/* src/server/core/rust/src/component.rs */

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::RenderError;
use crate::render::RenderResult;
use crate::route::Params;
use crate::route_cache::StaticPathsContext;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Page props: JSON-like values supplied by `getStaticPaths`.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// One piece of a page component's output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
  Html(String),
  /// Position where the document head belongs.
  Head,
  /// Position of the children passed to the renderer.
  Children,
}

/// A compiled page component. Implementing this trait is what marks a
/// module's default export as renderable.
pub trait PageComponent: Send + Sync {
  fn render<'a>(
    &'a self,
    result: &'a RenderResult,
    props: &'a Props,
  ) -> BoxFuture<'a, Result<Vec<Chunk>, RenderError>>;
}

/// A module's default export.
#[derive(Clone)]
pub enum DefaultExport {
  Page(Arc<dyn PageComponent>),
  /// Any other value; `kind` describes it in error messages.
  Other { kind: String },
}

pub type DefaultExportFn = Arc<dyn Fn() -> BoxFuture<'static, Option<DefaultExport>> + Send + Sync>;

pub type GetStaticPathsFn = Arc<
  dyn Fn(StaticPathsContext) -> BoxFuture<'static, Result<serde_json::Value, RenderError>>
    + Send
    + Sync,
>;

pub type EndpointHandlerFn =
  Arc<dyn Fn(Params) -> BoxFuture<'static, Result<String, RenderError>> + Send + Sync>;

/// What the component compiler hands over for one route.
#[derive(Clone, Default)]
pub struct ComponentModule {
  pub default: Option<DefaultExportFn>,
  pub get_static_paths: Option<GetStaticPathsFn>,
  pub endpoint: Option<EndpointHandlerFn>,
}

impl ComponentModule {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn page(component: Arc<dyn PageComponent>) -> Self {
    Self::new().with_default_export(DefaultExport::Page(component))
  }

  /// Default export evaluated on each render, e.g. a lazily loaded module.
  pub fn lazy<F, Fut>(load: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<DefaultExport>> + Send + 'static,
  {
    let load: DefaultExportFn =
      Arc::new(move || -> BoxFuture<'static, Option<DefaultExport>> { Box::pin(load()) });
    Self { default: Some(load), ..Self::default() }
  }

  pub fn endpoint<F, Fut>(handler: F) -> Self
  where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, RenderError>> + Send + 'static,
  {
    let handler: EndpointHandlerFn =
      Arc::new(move |params: Params| -> BoxFuture<'static, Result<String, RenderError>> {
        Box::pin(handler(params))
      });
    Self { endpoint: Some(handler), ..Self::default() }
  }

  pub fn with_default_export(mut self, export: DefaultExport) -> Self {
    self.default = Some(Arc::new(move || -> BoxFuture<'static, Option<DefaultExport>> {
      let export = export.clone();
      Box::pin(async move { Some(export) })
    }));
    self
  }

  pub fn with_static_paths<F, Fut>(mut self, get_static_paths: F) -> Self
  where
    F: Fn(StaticPathsContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, RenderError>> + Send + 'static,
  {
    self.get_static_paths = Some(Arc::new(
      move |ctx: StaticPathsContext| -> BoxFuture<'static, Result<serde_json::Value, RenderError>> {
        Box::pin(get_static_paths(ctx))
      },
    ));
    self
  }

  pub(crate) async fn resolve_default(&self) -> Option<DefaultExport> {
    match self.default {
      Some(ref load) => load().await,
      None => None,
    }
  }
}

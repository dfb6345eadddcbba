/* src/server/core/rust/src/render/renderer.rs */

use std::future::Future;

use orbit_engine::{RenderedHtml, render_head_elements};

use super::result::RenderResult;
use crate::component::{Chunk, EndpointHandlerFn, PageComponent, Props};
use crate::errors::RenderError;
use crate::route::Params;

/// Template-to-HTML boundary. Errors returned here reach the caller of
/// `render` unchanged.
pub trait Renderer: Send + Sync {
  fn render_to_string(
    &self,
    result: &RenderResult,
    component: &dyn PageComponent,
    props: &Props,
    children: Option<&str>,
  ) -> impl Future<Output = Result<RenderedHtml, RenderError>> + Send;

  /// Head fragment for pages whose output did not inject one.
  fn render_head(
    &self,
    result: &RenderResult,
  ) -> impl Future<Output = Result<String, RenderError>> + Send;

  fn render_endpoint(
    &self,
    handler: &EndpointHandlerFn,
    params: Params,
  ) -> impl Future<Output = Result<String, RenderError>> + Send;
}

/// Renders [`Chunk`] streams. The first [`Chunk::Head`] becomes the page's
/// links and scripts; later ones are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
  async fn render_to_string(
    &self,
    result: &RenderResult,
    component: &dyn PageComponent,
    props: &Props,
    children: Option<&str>,
  ) -> Result<RenderedHtml, RenderError> {
    let chunks = component.render(result, props).await?;

    let mut html = String::new();
    let mut head_injected = false;
    for chunk in chunks {
      match chunk {
        Chunk::Html(fragment) => html.push_str(&fragment),
        Chunk::Head if !head_injected => {
          html.push_str(&render_head_elements(&result.links, &result.scripts));
          head_injected = true;
        }
        Chunk::Head => {}
        Chunk::Children => html.push_str(children.unwrap_or_default()),
      }
    }

    // Fragments from string-based templates may still carry the legacy marker.
    let marked = RenderedHtml::from_marked(html);
    Ok(RenderedHtml::new(marked.html, head_injected || marked.head_injected))
  }

  async fn render_head(&self, result: &RenderResult) -> Result<String, RenderError> {
    Ok(render_head_elements(&result.links, &result.scripts))
  }

  async fn render_endpoint(
    &self,
    handler: &EndpointHandlerFn,
    params: Params,
  ) -> Result<String, RenderError> {
    handler(params).await
  }
}

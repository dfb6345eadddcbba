/* src/server/core/rust/src/render/mod.rs */

mod pipeline;
mod renderer;
mod result;

#[cfg(test)]
mod tests;

pub use pipeline::{RenderOptions, render};
pub use renderer::{HtmlRenderer, Renderer};
pub use result::{RenderResult, ResolveFn, canonical_url, identity_resolver};

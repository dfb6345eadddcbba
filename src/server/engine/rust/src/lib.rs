/* src/server/engine/rust/src/lib.rs */

//! Pure functions over HTML strings: head element sets, escaping, and the
//! final document pass (head prepend, doctype, sentinel cleanup).
//! No filesystem I/O and no async.

pub mod document;
pub mod element;
pub mod escape;

pub use document::{
  DOCTYPE, HEAD_INJECTED_MARKER, RenderedHtml, finalize_document, has_doctype, split_doctype,
};
pub use element::{ElementSet, ElementTag, SsrElement, render_head_elements};
pub use escape::escape_html;

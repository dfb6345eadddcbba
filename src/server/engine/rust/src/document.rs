/* src/server/engine/rust/src/document.rs */

//! Final document pass over renderer output.

/// Prefix synthesized when a non-legacy document lacks a doctype.
pub const DOCTYPE: &str = "<!DOCTYPE html>\n";

/// Inline head-injection sentinel emitted by string-based renderers.
/// Accepted on input, never present in a finalized document.
pub const HEAD_INJECTED_MARKER: &str = "<!--astro:head:injected-->";

const DOCTYPE_PREFIX: &str = "<!doctype html";
const BOM: char = '\u{FEFF}';

/// Renderer output with an explicit head-injection flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedHtml {
  pub html: String,
  /// True when the renderer already emitted the document head inline.
  pub head_injected: bool,
}

impl RenderedHtml {
  pub fn new(html: impl Into<String>, head_injected: bool) -> Self {
    Self { html: html.into(), head_injected }
  }

  /// Convert marker-style output: the presence of [`HEAD_INJECTED_MARKER`]
  /// sets `head_injected`, and every occurrence is removed from the HTML.
  pub fn from_marked(html: impl Into<String>) -> Self {
    let html = html.into();
    if html.contains(HEAD_INJECTED_MARKER) {
      Self { html: html.replace(HEAD_INJECTED_MARKER, ""), head_injected: true }
    } else {
      Self { html, head_injected: false }
    }
  }
}

/// Case-insensitive check for a leading `<!doctype html`. Whitespace, a byte
/// order mark and comments before the declaration are skipped.
pub fn has_doctype(html: &str) -> bool {
  doctype_offset(html).is_some()
}

/// Byte offset of the doctype declaration, if only a prolog precedes it.
fn doctype_offset(html: &str) -> Option<usize> {
  let mut rest = html;
  loop {
    rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == BOM);
    match rest.strip_prefix("<!--") {
      Some(comment) => rest = &comment[comment.find("-->")? + 3..],
      None => break,
    }
  }
  rest
    .get(..DOCTYPE_PREFIX.len())
    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DOCTYPE_PREFIX))
    .then_some(html.len() - rest.len())
}

/// Split a leading doctype declaration from the rest of the document. The
/// declaration part carries any prolog before it and its trailing newline.
/// Leading whitespace is dropped.
pub fn split_doctype(html: &str) -> (Option<&str>, &str) {
  let Some(start) = doctype_offset(html) else {
    return (None, html);
  };
  let Some(close) = html[start..].find('>') else {
    return (None, html);
  };
  let mut end = start + close + 1;
  if html[end..].starts_with("\r\n") {
    end += 2;
  } else if html[end..].starts_with('\n') {
    end += 1;
  }
  let lead = html.len() - html.trim_start().len();
  (Some(&html[lead..end]), &html[end..])
}

/// Assemble the final document.
///
/// - `head` is placed at the start of the body when the renderer did not inject
///   one itself. An existing doctype stays first.
/// - Outside legacy builds a missing doctype is synthesized as [`DOCTYPE`].
/// - The sentinel marker is stripped from both the output and the head fragment.
pub fn finalize_document(rendered: RenderedHtml, head: Option<&str>, legacy_build: bool) -> String {
  let RenderedHtml { html, head_injected } = rendered;
  let html = strip_marker(html);
  let (doctype, body) = split_doctype(&html);

  let head = if head_injected { None } else { head.map(|h| strip_marker(h.to_string())) };

  let mut out = String::with_capacity(
    html.len() + DOCTYPE.len() + head.as_ref().map_or(0, String::len),
  );
  match doctype {
    Some(decl) => out.push_str(decl),
    None if !legacy_build => out.push_str(DOCTYPE),
    None => {}
  }
  if let Some(ref head) = head {
    out.push_str(head);
  }
  out.push_str(body);
  out
}

fn strip_marker(html: String) -> String {
  if html.contains(HEAD_INJECTED_MARKER) { html.replace(HEAD_INJECTED_MARKER, "") } else { html }
}

/* src/server/engine/rust/src/escape.rs */

/// Escape text for use inside HTML text content or a double-quoted attribute.
///
/// Covers the five characters that can break out of either context
/// (`& < > " '`). Everything else, including non-ASCII, passes through.
pub fn escape_html(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for ch in input.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/* src/server/engine/rust/src/element.rs */

use std::collections::BTreeMap;

use crate::escape::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementTag {
  Link,
  Script,
  Style,
}

impl ElementTag {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Link => "link",
      Self::Script => "script",
      Self::Style => "style",
    }
  }

  fn is_void(self) -> bool {
    matches!(self, Self::Link)
  }
}

/// A `<script>`, `<link>` or `<style>` element collected for head injection.
///
/// Attributes are kept sorted so two elements built in a different order
/// compare equal and collapse to one entry inside an [`ElementSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SsrElement {
  tag: ElementTag,
  attrs: BTreeMap<String, String>,
  children: String,
}

impl SsrElement {
  pub fn new(tag: ElementTag) -> Self {
    Self { tag, attrs: BTreeMap::new(), children: String::new() }
  }

  pub fn script() -> Self {
    Self::new(ElementTag::Script)
  }

  pub fn link() -> Self {
    Self::new(ElementTag::Link)
  }

  pub fn style() -> Self {
    Self::new(ElementTag::Style)
  }

  /// Empty values render as bare boolean attributes (`async`, `defer`).
  pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.attrs.insert(name.into(), value.into());
    self
  }

  /// Raw inner content. Not escaped: inline scripts and styles are emitted as authored.
  pub fn children(mut self, children: impl Into<String>) -> Self {
    self.children = children.into();
    self
  }

  pub fn tag(&self) -> ElementTag {
    self.tag
  }

  pub fn attrs(&self) -> &BTreeMap<String, String> {
    &self.attrs
  }

  pub fn inner_html(&self) -> &str {
    &self.children
  }

  pub fn to_html(&self) -> String {
    let tag = self.tag.as_str();
    let mut out = format!("<{tag}");
    for (name, value) in &self.attrs {
      out.push(' ');
      out.push_str(name);
      if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
      }
    }
    out.push('>');
    if !self.tag.is_void() {
      out.push_str(&self.children);
      out.push_str(&format!("</{tag}>"));
    }
    out
  }
}

/// Insertion-ordered set of head elements. Re-inserting an equal element is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSet {
  items: Vec<SsrElement>,
}

impl ElementSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns false when an equal element was already present.
  pub fn insert(&mut self, element: SsrElement) -> bool {
    if self.items.contains(&element) {
      return false;
    }
    self.items.push(element);
    true
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, SsrElement> {
    self.items.iter()
  }

  /// Newline-joined HTML of every element, in insertion order.
  pub fn to_html(&self) -> String {
    self.items.iter().map(SsrElement::to_html).collect::<Vec<_>>().join("\n")
  }
}

impl FromIterator<SsrElement> for ElementSet {
  fn from_iter<I: IntoIterator<Item = SsrElement>>(iter: I) -> Self {
    let mut set = Self::new();
    set.extend(iter);
    set
  }
}

impl Extend<SsrElement> for ElementSet {
  fn extend<I: IntoIterator<Item = SsrElement>>(&mut self, iter: I) {
    for element in iter {
      self.insert(element);
    }
  }
}

impl<'a> IntoIterator for &'a ElementSet {
  type Item = &'a SsrElement;
  type IntoIter = std::slice::Iter<'a, SsrElement>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

/// Head fragment for a page: links first, then scripts, one element per line.
pub fn render_head_elements(links: &ElementSet, scripts: &ElementSet) -> String {
  let mut parts = Vec::with_capacity(2);
  if !links.is_empty() {
    parts.push(links.to_html());
  }
  if !scripts.is_empty() {
    parts.push(scripts.to_html());
  }
  parts.join("\n")
}

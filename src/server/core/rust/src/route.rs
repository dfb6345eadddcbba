/* src/server/core/rust/src/route.rs */

//! Route descriptors compiled from file-style patterns (`/posts/[id]`, `/docs/[...path]`).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// Bound route parameters. URL segments are always strings.
pub type Params = BTreeMap<String, String>;

/// Stable identifier assigned when a route enters a [`RouteTable`]. Used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u32);

impl RouteId {
  pub fn new(raw: u32) -> Self {
    Self(raw)
  }

  pub fn get(self) -> u32 {
    self.0
  }

  /// Id for the route at `index` of a table, if it fits in a `u32`.
  pub fn from_index(index: usize) -> Option<Self> {
    u32::try_from(index).ok().map(Self)
  }
}

impl fmt::Display for RouteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
  Page,
  Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
  Static(String),
  Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Parts(Vec<Part>),
  /// `[...name]`: zero or more path segments.
  Rest(String),
}

#[derive(Debug, Clone)]
pub struct RouteData {
  pub id: RouteId,
  /// Source pattern as authored, e.g. `/posts/[id]`.
  pub route: String,
  /// Present only for fully static routes.
  pub pathname: Option<String>,
  pub pattern: Regex,
  /// Declared param names in capture order.
  pub params: Vec<String>,
  pub kind: RouteKind,
  /// Source module of the page or endpoint, used in diagnostics.
  pub component: String,
  segments: Vec<Segment>,
}

impl RouteData {
  /// Compile a route pattern. `[name]` binds one segment, `[...name]` binds the rest.
  pub fn parse(
    id: RouteId,
    route: &str,
    kind: RouteKind,
    component: impl Into<String>,
  ) -> Result<Self, ConfigurationError> {
    let component = component.into();
    let invalid = |reason: String| ConfigurationError::InvalidRoute {
      route: route.to_string(),
      component: component.clone(),
      reason,
    };

    if !route.starts_with('/') {
      return Err(invalid("route must start with `/`".into()));
    }

    let mut segments = Vec::new();
    let mut params = Vec::new();
    for raw in route.split('/').filter(|s| !s.is_empty()) {
      let segment = parse_segment(raw).map_err(&invalid)?;
      match &segment {
        Segment::Rest(name) => params.push(name.clone()),
        Segment::Parts(parts) => {
          for part in parts {
            if let Part::Param(name) = part {
              params.push(name.clone());
            }
          }
        }
      }
      segments.push(segment);
    }

    let mut seen = HashSet::new();
    for name in &params {
      if !seen.insert(name.as_str()) {
        return Err(invalid(format!("param `{name}` is declared twice")));
      }
    }

    let pattern = Regex::new(&pattern_source(&segments)).map_err(|e| invalid(e.to_string()))?;
    let normalized = normalize_route(route);
    let pathname = params.is_empty().then(|| normalized.clone());

    Ok(Self { id, route: normalized, pathname, pattern, params, kind, component, segments })
  }

  pub fn is_dynamic(&self) -> bool {
    self.pathname.is_none()
  }

  pub fn is_rest_param(&self, name: &str) -> bool {
    self.segments.iter().any(|s| matches!(s, Segment::Rest(n) if n == name))
  }

  /// Substitute params into the pattern. Missing params render empty;
  /// an empty rest param drops its segment entirely.
  pub fn generate(&self, params: &Params) -> String {
    let mut out = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Rest(name) => {
          if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
            out.push('/');
            out.push_str(value.trim_matches('/'));
          }
        }
        Segment::Parts(parts) => {
          out.push('/');
          for part in parts {
            match part {
              Part::Static(s) => out.push_str(s),
              Part::Param(name) => out.push_str(params.get(name).map_or("", String::as_str)),
            }
          }
        }
      }
    }
    if out.is_empty() {
      out.push('/');
    }
    out
  }
}

fn normalize_route(route: &str) -> String {
  let trimmed = route.trim_end_matches('/');
  if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

fn parse_segment(raw: &str) -> Result<Segment, String> {
  if let Some(name) = raw.strip_prefix("[...").and_then(|r| r.strip_suffix(']')) {
    if name.is_empty() || name.contains(['[', ']']) {
      return Err(format!("invalid rest segment `{raw}`"));
    }
    return Ok(Segment::Rest(name.to_string()));
  }

  let mut parts = Vec::new();
  let mut rest = raw;
  while !rest.is_empty() {
    match rest.find(['[', ']']) {
      None => {
        parts.push(Part::Static(rest.to_string()));
        break;
      }
      Some(pos) if rest[pos..].starts_with(']') => {
        return Err(format!("unbalanced `]` in segment `{raw}`"));
      }
      Some(pos) => {
        if pos > 0 {
          parts.push(Part::Static(rest[..pos].to_string()));
        }
        let after = &rest[pos + 1..];
        let close = after.find(']').ok_or_else(|| format!("unclosed `[` in segment `{raw}`"))?;
        let name = &after[..close];
        if name.is_empty() || name.contains('[') {
          return Err(format!("invalid param in segment `{raw}`"));
        }
        if name.starts_with("...") {
          return Err(format!("rest param `{name}` must span a whole segment"));
        }
        parts.push(Part::Param(name.to_string()));
        rest = &after[close + 1..];
      }
    }
  }
  Ok(Segment::Parts(parts))
}

fn pattern_source(segments: &[Segment]) -> String {
  if segments.is_empty() {
    return "^/$".to_string();
  }
  let mut source = String::from("^");
  for segment in segments {
    match segment {
      Segment::Rest(_) => source.push_str("(?:/(.*?))?"),
      Segment::Parts(parts) => {
        source.push('/');
        for part in parts {
          match part {
            Part::Static(s) => source.push_str(&regex::escape(s)),
            Part::Param(_) => source.push_str("([^/]+?)"),
          }
        }
      }
    }
  }
  source.push_str("/?$");
  source
}

/// Ordered routes with ids assigned at insertion. Earlier routes win on overlap.
///
/// Ids are only unique within one table, so a [`RouteCache`] must only ever
/// see routes from a single table.
///
/// [`RouteCache`]: crate::route_cache::RouteCache
#[derive(Debug, Default)]
pub struct RouteTable {
  routes: Vec<Arc<RouteData>>,
}

impl RouteTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(
    &mut self,
    route: &str,
    kind: RouteKind,
    component: impl Into<String>,
  ) -> Result<Arc<RouteData>, ConfigurationError> {
    let component = component.into();
    let Some(id) = RouteId::from_index(self.routes.len()) else {
      return Err(ConfigurationError::InvalidRoute {
        route: route.to_string(),
        component,
        reason: "route table is full".to_string(),
      });
    };
    let data = Arc::new(RouteData::parse(id, route, kind, component)?);
    self.routes.push(Arc::clone(&data));
    Ok(data)
  }

  pub fn get(&self, id: RouteId) -> Option<&Arc<RouteData>> {
    self.routes.get(id.get() as usize)
  }

  pub fn match_path(&self, pathname: &str) -> Option<&Arc<RouteData>> {
    self.routes.iter().find(|r| r.pattern.is_match(pathname))
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Arc<RouteData>> {
    self.routes.iter()
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }
}

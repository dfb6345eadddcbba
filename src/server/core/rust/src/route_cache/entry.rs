/* src/server/core/rust/src/route_cache/entry.rs */

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::component::Props;
use crate::route::Params;

/// One concrete instantiation of a dynamic route.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticPathEntry {
  pub params: Params,
  pub props: Props,
}

/// Non-fatal findings while normalizing `getStaticPaths()` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// A param the route does not declare; dropped from the entry.
  UndeclaredParam { index: usize, param: String },
  /// Same params as an earlier entry; the earlier one is the one matched.
  DuplicateParams { first: usize, duplicate: usize, params: Params },
}

/// Resolved static paths for one route, in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct RouteCacheEntry {
  static_paths: Vec<StaticPathEntry>,
  /// params -> index of the first entry carrying them
  index: HashMap<Params, usize>,
  diagnostics: Vec<Diagnostic>,
}

impl RouteCacheEntry {
  pub fn new(static_paths: Vec<StaticPathEntry>) -> Self {
    Self::with_diagnostics(static_paths, Vec::new())
  }

  pub(crate) fn with_diagnostics(
    static_paths: Vec<StaticPathEntry>,
    mut diagnostics: Vec<Diagnostic>,
  ) -> Self {
    let mut index = HashMap::with_capacity(static_paths.len());
    for (i, path) in static_paths.iter().enumerate() {
      match index.entry(path.params.clone()) {
        Entry::Vacant(slot) => {
          slot.insert(i);
        }
        Entry::Occupied(slot) => diagnostics.push(Diagnostic::DuplicateParams {
          first: *slot.get(),
          duplicate: i,
          params: path.params.clone(),
        }),
      }
    }
    Self { static_paths, index, diagnostics }
  }

  pub fn static_paths(&self) -> &[StaticPathEntry] {
    &self.static_paths
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  /// First entry whose params equal `params` exactly.
  pub fn find(&self, params: &Params) -> Option<&StaticPathEntry> {
    self.index.get(params).and_then(|&i| self.static_paths.get(i))
  }

  pub fn len(&self) -> usize {
    self.static_paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.static_paths.is_empty()
  }
}

/* src/server/core/rust/src/route_cache/cache.rs */

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::entry::RouteCacheEntry;
use crate::errors::RenderError;
use crate::route::{RouteData, RouteId};

type Slot = Arc<OnceCell<Arc<RouteCacheEntry>>>;

/// Route id -> resolved static paths. Entries are written once and never
/// replaced or evicted; the cache lives exactly as long as its session.
///
/// Slots are keyed by [`RouteId`] alone, which is unique only within one
/// [`RouteTable`](crate::route::RouteTable). Use one cache per table.
#[derive(Debug, Default)]
pub struct RouteCache {
  slots: DashMap<RouteId, Slot>,
}

impl RouteCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, route: &RouteData) -> Option<Arc<RouteCacheEntry>> {
    self.slots.get(&route.id).and_then(|slot| slot.value().get().cloned())
  }

  /// Store a pre-computed entry. Returns false, leaving the existing entry
  /// in place, when the slot is already filled or being filled.
  pub fn set(&self, route: &RouteData, entry: RouteCacheEntry) -> bool {
    if self.slot(route.id).set(Arc::new(entry)).is_err() {
      warn!(route = %route.route, component = %route.component, "route cache entry already set; keeping original");
      return false;
    }
    true
  }

  /// Return the cached entry, or run `resolve` to fill it. Concurrent callers
  /// for the same route wait on a single in-flight `resolve`. A failed
  /// resolution leaves the slot empty.
  pub async fn get_or_resolve<F, Fut>(
    &self,
    route: &RouteData,
    resolve: F,
  ) -> Result<Arc<RouteCacheEntry>, RenderError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<RouteCacheEntry, RenderError>>,
  {
    let slot = self.slot(route.id);
    if let Some(entry) = slot.get() {
      debug!(route = %route.route, "route cache hit");
      return Ok(Arc::clone(entry));
    }
    debug!(route = %route.route, "route cache miss");
    let entry = slot.get_or_try_init(|| async move { resolve().await.map(Arc::new) }).await?;
    Ok(Arc::clone(entry))
  }

  /// Number of routes with a resolved entry.
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.value().initialized()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn slot(&self, id: RouteId) -> Slot {
    Arc::clone(self.slots.entry(id).or_default().value())
  }
}

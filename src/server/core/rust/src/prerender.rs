/* src/server/core/rust/src/prerender.rs */

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::component::ComponentModule;
use crate::errors::RenderError;
use crate::route::RouteData;
use crate::route_cache::{RouteCache, call_get_static_paths};

/// A concrete pathname to render at build time.
#[derive(Debug, Clone)]
pub struct PrerenderTarget {
  pub route: Arc<RouteData>,
  pub pathname: String,
}

/// Enumerate every pathname a build must render, in route order.
///
/// Dynamic routes resolve their static paths through `route_cache`, so later
/// renders of the same routes never call `getStaticPaths()` again. A pathname
/// reached twice is kept only at its first occurrence.
pub async fn prerender<'a, I>(
  routes: I,
  route_cache: &RouteCache,
) -> Result<Vec<PrerenderTarget>, RenderError>
where
  I: IntoIterator<Item = (&'a Arc<RouteData>, &'a ComponentModule)>,
{
  let mut targets = Vec::new();
  let mut seen = HashSet::new();
  let mut push = |route: &Arc<RouteData>, pathname: String| {
    if seen.insert(pathname.clone()) {
      targets.push(PrerenderTarget { route: Arc::clone(route), pathname });
    }
  };

  for (route, module) in routes {
    if let Some(pathname) = &route.pathname {
      push(route, pathname.clone());
      continue;
    }
    let entry =
      route_cache.get_or_resolve(route, || call_get_static_paths(module, route, true)).await?;
    debug!(route = %route.route, count = entry.len(), "prerendering dynamic route");
    for path in entry.static_paths() {
      push(route, route.generate(&path.params));
    }
  }

  info!(count = targets.len(), "prerender targets collected");
  Ok(targets)
}

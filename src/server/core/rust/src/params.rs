/* src/server/core/rust/src/params.rs */

use std::sync::Arc;

use tracing::debug;

use crate::component::{ComponentModule, Props};
use crate::errors::{ConfigurationError, RenderError};
use crate::route::{Params, RouteData};
use crate::route_cache::{RouteCache, call_get_static_paths};

/// Outcome of resolving a request against a route's static paths.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsAndProps {
  Resolved { params: Params, props: Props },
  /// The route pattern matched but no enumerated path carries these params.
  NoMatchingStaticPath,
}

/// Resolve params and props for `pathname`.
///
/// Static routes, and requests with no route, resolve to empty params and
/// props. Dynamic routes consult `route_cache`, running `getStaticPaths()`
/// on first use. Returned props are an owned copy of the cached entry.
pub async fn get_params_and_props(
  module: &ComponentModule,
  route: Option<&Arc<RouteData>>,
  route_cache: &RouteCache,
  pathname: &str,
) -> Result<ParamsAndProps, RenderError> {
  let Some(route) = route.filter(|r| r.is_dynamic()) else {
    return Ok(ParamsAndProps::Resolved { params: Params::new(), props: Props::new() });
  };

  let params = extract_params(route, pathname)?;
  let entry = route_cache
    .get_or_resolve(route, || call_get_static_paths(module, route, true))
    .await?;

  match entry.find(&params) {
    Some(matched) => {
      Ok(ParamsAndProps::Resolved { params, props: matched.props.clone() })
    }
    None => {
      debug!(route = %route.route, pathname, "no static path matches request");
      Ok(ParamsAndProps::NoMatchingStaticPath)
    }
  }
}

/// Captured segments keyed by declared param name. A pathname the pattern
/// rejects yields no params; an unmatched rest group binds the empty string.
pub fn extract_params(route: &RouteData, pathname: &str) -> Result<Params, ConfigurationError> {
  let mut params = Params::new();
  if route.params.is_empty() {
    return Ok(params);
  }
  let Some(captures) = route.pattern.captures(pathname) else {
    return Ok(params);
  };

  let found = captures.len() - 1;
  if found != route.params.len() {
    return Err(ConfigurationError::MalformedRoute {
      route: route.route.clone(),
      component: route.component.clone(),
      expected: route.params.len(),
      found,
    });
  }

  for (name, group) in route.params.iter().zip(captures.iter().skip(1)) {
    let value = group.map_or("", |m| m.as_str());
    params.insert(name.clone(), value.to_string());
  }
  Ok(params)
}

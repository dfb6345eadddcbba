/* src/server/core/rust/src/route_cache/static_paths.rs */

use std::sync::Arc;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use super::entry::{Diagnostic, RouteCacheEntry, StaticPathEntry};
use super::paginate::StaticPathsContext;
use crate::component::{ComponentModule, Props};
use crate::errors::{ConfigurationError, RenderError};
use crate::route::{Params, RouteData};

/// Run the module's `getStaticPaths()` and normalize its output against the
/// route's declared params. Does not touch the cache.
///
/// With `validate` set, dropped undeclared params and duplicate param sets
/// are logged as warnings. They are recorded as diagnostics either way.
pub async fn call_get_static_paths(
  module: &ComponentModule,
  route: &Arc<RouteData>,
  validate: bool,
) -> Result<RouteCacheEntry, RenderError> {
  let Some(get_static_paths) = module.get_static_paths.as_ref() else {
    if route.is_dynamic() {
      return Err(
        ConfigurationError::MissingGetStaticPaths {
          route: route.route.clone(),
          component: route.component.clone(),
          params: route.params.clone(),
        }
        .into(),
      );
    }
    return Ok(RouteCacheEntry::default());
  };

  let output = get_static_paths(StaticPathsContext::new(Arc::clone(route))).await?;
  let entry = normalize_static_paths(route, output, validate)?;
  debug!(route = %route.route, count = entry.len(), "resolved static paths");

  if validate {
    for diagnostic in entry.diagnostics() {
      if let Diagnostic::DuplicateParams { first, duplicate, params } = diagnostic {
        warn!(
          route = %route.route,
          component = %route.component,
          first,
          duplicate,
          ?params,
          "[getStaticPaths] duplicate params; only the first entry will ever be matched"
        );
      }
    }
  }

  Ok(entry)
}

pub(super) fn normalize_static_paths(
  route: &RouteData,
  output: Value,
  validate: bool,
) -> Result<RouteCacheEntry, ConfigurationError> {
  let invalid = |reason: String| ConfigurationError::InvalidStaticPaths {
    route: route.route.clone(),
    component: route.component.clone(),
    reason,
  };

  let Value::Array(items) = output else {
    return Err(invalid(format!(
      "expected an array of path objects, got {}",
      value_kind(&output)
    )));
  };

  let mut static_paths = Vec::with_capacity(items.len());
  let mut diagnostics = Vec::new();
  for (index, item) in items.into_iter().enumerate() {
    let Value::Object(mut path) = item else {
      return Err(invalid(format!(
        "path #{index} must be an object with `params`, got {}",
        value_kind(&item)
      )));
    };

    let raw_params = match path.remove("params") {
      None | Some(Value::Null) => Map::new(),
      Some(Value::Object(params)) => params,
      Some(other) => {
        return Err(invalid(format!(
          "`params` of path #{index} must be an object, got {}",
          value_kind(&other)
        )));
      }
    };
    let props: Props = match path.remove("props") {
      None | Some(Value::Null) => Props::new(),
      Some(Value::Object(props)) => props,
      Some(other) => {
        return Err(invalid(format!(
          "`props` of path #{index} must be an object, got {}",
          value_kind(&other)
        )));
      }
    };

    let params = normalize_params(route, index, raw_params, validate, &mut diagnostics)?;
    static_paths.push(StaticPathEntry { params, props });
  }

  Ok(RouteCacheEntry::with_diagnostics(static_paths, diagnostics))
}

fn normalize_params(
  route: &RouteData,
  index: usize,
  mut raw: Map<String, Value>,
  validate: bool,
  diagnostics: &mut Vec<Diagnostic>,
) -> Result<Params, ConfigurationError> {
  let mut params = Params::new();
  for name in &route.params {
    let value = match raw.remove(name) {
      Some(value) => coerce_param(route, index, name, value)?,
      None => None,
    };
    let value = match value {
      Some(value) => value,
      // An absent rest param means "no segments".
      None if route.is_rest_param(name) => String::new(),
      None => {
        return Err(ConfigurationError::MissingParam {
          route: route.route.clone(),
          component: route.component.clone(),
          param: name.clone(),
          index,
        });
      }
    };
    params.insert(name.clone(), value);
  }

  for param in raw.keys() {
    if validate {
      warn!(
        route = %route.route,
        component = %route.component,
        param = %param,
        index,
        "[getStaticPaths] param is not declared by the route and was dropped"
      );
    }
    diagnostics.push(Diagnostic::UndeclaredParam { index, param: param.clone() });
  }

  Ok(params)
}

/// Integral floats print without a fraction, so `2.0` and `2` name the same path.
fn number_param(n: &Number) -> String {
  match n.as_f64() {
    Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
      if f == 0.0 { "0".to_string() } else { format!("{f:.0}") }
    }
    _ => n.to_string(),
  }
}

fn coerce_param(
  route: &RouteData,
  index: usize,
  name: &str,
  value: Value,
) -> Result<Option<String>, ConfigurationError> {
  match value {
    Value::Null => Ok(None),
    Value::String(s) => Ok(Some(s)),
    Value::Number(n) => Ok(Some(number_param(&n))),
    Value::Bool(b) => Ok(Some(b.to_string())),
    Value::Array(_) | Value::Object(_) => Err(ConfigurationError::InvalidParamValue {
      route: route.route.clone(),
      component: route.component.clone(),
      param: name.to_string(),
      index,
      found: value_kind(&value),
    }),
  }
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

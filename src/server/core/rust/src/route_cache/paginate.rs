/* src/server/core/rust/src/route_cache/paginate.rs */

use std::sync::Arc;

use serde_json::{Value, json};

use crate::component::Props;
use crate::errors::{ConfigurationError, RenderError};
use crate::route::{Params, RouteData};

pub(crate) const PAGE_PARAM: &str = "page";
const DEFAULT_PAGE_SIZE: usize = 10;

/// Argument passed to a route's `getStaticPaths()`.
#[derive(Debug, Clone)]
pub struct StaticPathsContext {
  route: Arc<RouteData>,
}

impl StaticPathsContext {
  pub(crate) fn new(route: Arc<RouteData>) -> Self {
    Self { route }
  }

  pub fn route(&self) -> &RouteData {
    &self.route
  }

  pub fn paginate(&self, data: Vec<Value>, options: PaginateOptions) -> Result<Value, RenderError> {
    Ok(paginate(&self.route, data, options)?)
  }
}

#[derive(Debug, Clone, Default)]
pub struct PaginateOptions {
  /// Items per page; 10 when unset.
  pub page_size: Option<usize>,
  /// Extra params merged into every generated entry.
  pub params: Params,
  /// Extra props merged into every generated entry.
  pub props: Props,
}

/// Split `data` into pages keyed by the route's `page` param.
///
/// With `[page]` every page number is in the URL; with `[...page]` the first
/// page lives at the bare route.
pub fn paginate(
  route: &RouteData,
  data: Vec<Value>,
  options: PaginateOptions,
) -> Result<Value, ConfigurationError> {
  let include_first_page = if route.is_rest_param(PAGE_PARAM) {
    false
  } else if route.params.iter().any(|p| p == PAGE_PARAM) {
    true
  } else {
    return Err(ConfigurationError::PaginateParamMissing {
      route: route.route.clone(),
      component: route.component.clone(),
    });
  };

  let PaginateOptions { page_size, params: base_params, props: base_props } = options;
  let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
  let total = data.len();
  let last_page = total.div_ceil(page_size).max(1);
  let page_value =
    |n: usize| if include_first_page || n > 1 { n.to_string() } else { String::new() };
  let url_for = |n: usize| {
    let mut params = base_params.clone();
    params.insert(PAGE_PARAM.to_string(), page_value(n));
    route.generate(&params)
  };

  let mut items = data.into_iter();
  let mut paths = Vec::with_capacity(last_page);
  for current_page in 1..=last_page {
    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total);
    let last_index = end as i64 - 1;
    let page_data: Vec<Value> = items.by_ref().take(end - start).collect();

    let mut params = base_params.clone();
    params.insert(PAGE_PARAM.to_string(), page_value(current_page));

    let mut props = base_props.clone();
    props.insert(
      PAGE_PARAM.to_string(),
      json!({
        "data": page_data,
        "start": start,
        "end": last_index,
        "size": page_size,
        "total": total,
        "currentPage": current_page,
        "lastPage": last_page,
        "url": {
          "current": url_for(current_page),
          "next": (current_page < last_page).then(|| url_for(current_page + 1)),
          "prev": (current_page > 1).then(|| url_for(current_page - 1)),
        },
      }),
    );

    paths.push(json!({ "params": params, "props": props }));
  }

  Ok(Value::Array(paths))
}

/* src/server/core/rust/src/errors.rs */

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Broken site source. Deterministic for a given route, so never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("invalid route `{route}` ({component}): {reason}")]
  InvalidRoute { route: String, component: String, reason: String },

  #[error(
    "[getStaticPaths] route `{route}` declares params {params:?} but {component} does not export getStaticPaths()"
  )]
  MissingGetStaticPaths { route: String, component: String, params: Vec<String> },

  #[error("[getStaticPaths] invalid return value in {component} (route `{route}`): {reason}")]
  InvalidStaticPaths { route: String, component: String, reason: String },

  #[error(
    "[getStaticPaths] path #{index} returned by {component} is missing param `{param}` (route `{route}`)"
  )]
  MissingParam { route: String, component: String, param: String, index: usize },

  #[error(
    "[getStaticPaths] param `{param}` of path #{index} in {component} must be a string, number or boolean, got {found} (route `{route}`)"
  )]
  InvalidParamValue {
    route: String,
    component: String,
    param: String,
    index: usize,
    found: &'static str,
  },

  #[error(
    "route `{route}` ({component}) captured {found} groups but declares {expected} params"
  )]
  MalformedRoute { route: String, component: String, expected: usize, found: usize },

  #[error(
    "[paginate()] page number param `page` not found in route `{route}` ({component}); rename the file to `[page]` or `[...page]`"
  )]
  PaginateParamMissing { route: String, component: String },

  #[error("expected an exported page component in {component} (route `{route}`) but received nothing")]
  MissingDefaultExport { route: String, component: String },

  #[error("unable to render non-page component {component} (route `{route}`): default export is {kind}")]
  NotAPageComponent { route: String, component: String, kind: String },

  #[error("endpoint route `{route}` ({component}) does not export a handler")]
  MissingEndpointHandler { route: String, component: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
  /// The route pattern matched but the enumerated static paths do not include this URL.
  #[error("[getStaticPaths] route pattern matched, but no matching static path found. ({pathname})")]
  NoMatchingStaticPath { pathname: String },

  #[error("no route matches `{pathname}`")]
  RouteNotFound { pathname: String },

  #[error("invalid request url `{url}`: {source}")]
  InvalidUrl { url: String, source: url::ParseError },

  #[error(transparent)]
  Config(#[from] ConfigurationError),

  /// Raised by a renderer, endpoint handler or user callback; returned as produced.
  #[error("{0}")]
  Upstream(BoxError),
}

impl RenderError {
  pub fn upstream(err: impl Into<BoxError>) -> Self {
    Self::Upstream(err.into())
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::NoMatchingStaticPath { .. } | Self::RouteNotFound { .. } => "NOT_FOUND",
      Self::InvalidUrl { .. } => "VALIDATION_ERROR",
      Self::Config(_) => "CONFIG_ERROR",
      Self::Upstream(_) => "INTERNAL_ERROR",
    }
  }

  pub fn status(&self) -> u16 {
    match self {
      Self::NoMatchingStaticPath { .. } | Self::RouteNotFound { .. } => 404,
      Self::InvalidUrl { .. } => 400,
      Self::Config(_) | Self::Upstream(_) => 500,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == 404
  }

  /// The renderer-side error, for callers that want to downcast it.
  pub fn as_upstream(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
    match self {
      Self::Upstream(err) => Some(err.as_ref()),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("template blew up at line {0}")]
  struct TemplateError(u32);

  #[test]
  fn not_found_variants_map_to_404() {
    let err = RenderError::NoMatchingStaticPath { pathname: "/posts/3".into() };
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), "NOT_FOUND");
    assert!(err.is_not_found());
    assert!(RenderError::RouteNotFound { pathname: "/x".into() }.is_not_found());
  }

  #[test]
  fn routing_mismatch_message_names_pathname() {
    let err = RenderError::NoMatchingStaticPath { pathname: "/posts/999".into() };
    assert_eq!(
      err.to_string(),
      "[getStaticPaths] route pattern matched, but no matching static path found. (/posts/999)"
    );
  }

  #[test]
  fn configuration_error_is_transparent() {
    let err: RenderError = ConfigurationError::MissingEndpointHandler {
      route: "/api/[id].json".into(),
      component: "src/pages/api/[id].json.ts".into(),
    }
    .into();
    assert_eq!(err.status(), 500);
    assert_eq!(err.code(), "CONFIG_ERROR");
    assert_eq!(
      err.to_string(),
      "endpoint route `/api/[id].json` (src/pages/api/[id].json.ts) does not export a handler"
    );
  }

  #[test]
  fn upstream_error_keeps_original() {
    let err = RenderError::upstream(TemplateError(7));
    assert_eq!(err.to_string(), "template blew up at line 7");
    let inner = err.as_upstream().and_then(|e| e.downcast_ref::<TemplateError>());
    assert_eq!(inner.map(|e| e.0), Some(7));
  }
}

/* src/server/core/rust/src/config.rs */

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_MARKDOWN_RENDER: &str = "@astrojs/markdown-remark";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io { path: String, source: std::io::Error },

  #[error("failed to parse render config: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("build.site `{value}` is not a valid URL: {source}")]
  InvalidSite { value: String, source: url::ParseError },
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
  #[serde(default)]
  build: BuildSection,
  #[serde(default)]
  markdown: MarkdownRenderOptions,
  #[serde(default)]
  renderers: Vec<RendererInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BuildSection {
  site: Option<String>,
  #[serde(default)]
  legacy_build: bool,
  #[serde(default)]
  experimental_ssr: bool,
}

/// Markdown pipeline settings, carried through to every render untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownRenderOptions {
  #[serde(default = "default_markdown_render")]
  pub render: String,
  #[serde(default)]
  pub options: serde_json::Map<String, serde_json::Value>,
}

impl Default for MarkdownRenderOptions {
  fn default() -> Self {
    Self { render: default_markdown_render(), options: serde_json::Map::new() }
  }
}

fn default_markdown_render() -> String {
  DEFAULT_MARKDOWN_RENDER.to_string()
}

/// A framework renderer integration, e.g. `@astrojs/renderer-preact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererInfo {
  pub name: String,
  #[serde(default)]
  pub client_entrypoint: Option<String>,
  #[serde(default)]
  pub server_entrypoint: Option<String>,
  #[serde(default)]
  pub jsx_import_source: Option<String>,
}

impl RendererInfo {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), client_entrypoint: None, server_entrypoint: None, jsx_import_source: None }
  }
}

/// Resolved settings for a render session.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
  /// Always ends with `/` so relative joins stay under the base path.
  pub site: Option<Url>,
  /// Skip doctype synthesis.
  pub legacy_build: bool,
  pub markdown: MarkdownRenderOptions,
  pub renderers: Vec<RendererInfo>,
}

impl RenderConfig {
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    let raw: RawConfig = toml::from_str(source)?;
    let site = raw.build.site.as_deref().map(parse_site).transpose()?;
    Ok(Self {
      site,
      // SSR output is always a standalone document.
      legacy_build: raw.build.legacy_build && !raw.build.experimental_ssr,
      markdown: raw.markdown,
      renderers: raw.renderers,
    })
  }
}

pub fn load_render_config(path: &Path) -> Result<RenderConfig, ConfigError> {
  let source = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
  RenderConfig::from_toml_str(&source)
}

fn parse_site(value: &str) -> Result<Url, ConfigError> {
  let with_slash =
    if value.ends_with('/') { value.to_string() } else { format!("{value}/") };
  Url::parse(&with_slash)
    .map_err(|source| ConfigError::InvalidSite { value: value.to_string(), source })
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for header (defaults to "phdash")
  pub title: Option<String>,
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the API, without trailing slash
  #[serde(default = "default_api_url", deserialize_with = "deserialize_base_url")]
  pub url: String,
  /// Per-request timeout; requests may hang as long as the transport allows when unset
  pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_secs: None,
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Age after which a cached query is refetched on next access
  #[serde(default = "default_stale_secs")]
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_secs: default_stale_secs(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> chrono::Duration {
    i64::try_from(self.stale_secs)
      .ok()
      .and_then(chrono::Duration::try_seconds)
      .unwrap_or(chrono::Duration::MAX)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Default filter directive, overridden by PHDASH_LOG
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file path (default: <data dir>/phdash/phdash.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_stale_secs() -> u64 {
  300
}

fn default_log_level() -> String {
  "info".to_string()
}

fn deserialize_base_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  normalize_base_url(&raw).map_err(serde::de::Error::custom)
}

/// Validate an API base URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String, String> {
  let trimmed = raw.trim().trim_end_matches('/');
  let parsed = url::Url::parse(trimmed).map_err(|e| format!("invalid API url '{}': {}", raw, e))?;
  match parsed.scheme() {
    "http" | "https" => Ok(trimmed.to_string()),
    other => Err(format!("unsupported API url scheme '{}'", other)),
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./phdash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/phdash/config.yaml
  ///
  /// The API needs no credentials, so a missing file falls back to defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("phdash.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("phdash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null rather than an empty mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Override the API base URL (from the command line).
  pub fn with_api_url(self, raw: &str) -> Result<Self> {
    let url = normalize_base_url(raw).map_err(|e| eyre!(e))?;
    Ok(Self {
      api: ApiConfig { url, ..self.api },
      ..self
    })
  }

  /// Title shown in the header
  pub fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or("phdash")
  }
}

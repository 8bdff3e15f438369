//! Tracing setup.
//!
//! The terminal belongs to the TUI, so events go to a log file through a
//! non-blocking writer. `PHDASH_LOG` takes precedence over the configured
//! level and accepts full `EnvFilter` directives (`phdash=debug,reqwest=warn`).

use crate::config::LogConfig;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PHDASH_LOG";

/// `<data dir>/phdash/phdash.log`
pub fn default_log_path() -> Option<PathBuf> {
  dirs::data_dir().map(|dir| dir.join("phdash").join("phdash.log"))
}

fn build_filter(env_value: Option<&str>, configured: &str) -> Result<EnvFilter> {
  match env_value.filter(|v| !v.trim().is_empty()) {
    Some(directives) => EnvFilter::try_new(directives)
      .map_err(|e| eyre!("Invalid {} filter '{}': {}", LOG_ENV, directives, e)),
    None => EnvFilter::try_new(configured)
      .map_err(|e| eyre!("Invalid log level '{}': {}", configured, e)),
  }
}

fn split_path(path: &Path) -> Result<(PathBuf, &std::ffi::OsStr)> {
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;
  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => PathBuf::from("."),
  };
  Ok((dir, file_name))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let path = config
    .file
    .clone()
    .or_else(default_log_path)
    .ok_or_else(|| eyre!("No data directory for the log file, set log.file in the config"))?;
  let (dir, file_name) = split_path(&path)?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let env_value = std::env::var(LOG_ENV).ok();
  let filter = build_filter(env_value.as_deref(), &config.level)?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}

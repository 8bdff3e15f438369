mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod filter;
mod logging;
mod query;
mod ui;
mod users;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use commands::CommandAction;
use std::path::PathBuf;
use tracing::info;

/// View shown at start-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum StartView {
  #[default]
  Home,
  Users,
  Posts,
}

impl From<StartView> for CommandAction {
  fn from(view: StartView) -> Self {
    match view {
      StartView::Home => CommandAction::Home,
      StartView::Users => CommandAction::Users,
      StartView::Posts => CommandAction::Posts,
    }
  }
}

#[derive(Parser, Debug)]
#[command(name = "phdash")]
#[command(about = "A terminal dashboard for browsing and editing JSONPlaceholder users and posts")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./phdash.yaml, then $XDG_CONFIG_HOME/phdash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the API, overrides api.url
  #[arg(long)]
  api_url: Option<String>,

  /// Log file, overrides log.file
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Initial view
  #[arg(long, value_enum, default_value_t)]
  view: StartView,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.api_url.as_deref() {
    config = config.with_api_url(url)?;
  }
  if let Some(path) = args.log_file {
    config.log.file = Some(path);
  }

  let _log_guard = logging::init(&config.log)?;
  info!(api = %config.api.url, view = ?args.view, "starting phdash");

  let mut app = app::App::new(config, args.view.into())?;
  app.run().await?;

  Ok(())
}

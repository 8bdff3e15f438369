use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::commands::CommandAction;
use crate::config::Config;
use crate::event::{Event, EventHandler, TICK_RATE};
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction, ViewContext};
use crate::ui::views::{DashboardView, PostListView, UserListView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use tracing::{debug, info};

/// Main application state
pub struct App {
  config: Config,
  ctx: ViewContext,
  /// Navigation stack, root at index 0
  view_stack: Vec<Box<dyn View>>,
  command: CommandInput,
  /// One-off footer message, cleared by the next key
  message: Option<String>,
  should_quit: bool,
}

impl App {
  /// Build the app with `root` as the first view.
  ///
  /// Must be called inside the tokio runtime: the root view starts its
  /// fetches immediately.
  pub fn new(config: Config, root: CommandAction) -> Result<Self> {
    let api = ApiClient::new(&config.api)?;
    let cache = QueryCache::new(config.cache.stale_time());
    let ctx = ViewContext { api, cache };

    let mut app = Self {
      config,
      ctx,
      view_stack: Vec::new(),
      command: CommandInput::new(),
      message: None,
      should_quit: false,
    };
    app.run_command(root);
    Ok(app)
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    info!("exiting");
    Ok(())
  }

  pub fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      // Next draw picks up the new size
      Event::Resize => {}
    }
  }

  /// Let every stacked view collect finished requests, not only the
  /// visible one, so a save started on the users list completes while a
  /// profile is open on top of it
  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.message = None;

    let capturing = self.current_view().is_some_and(|v| v.is_capturing_input());
    if !capturing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(action)) => {
          self.run_command(action);
          return;
        }
        KeyResult::Event(CommandEvent::Unknown(raw)) => {
          self.message = Some(format!("unknown command: {}", raw));
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    let action = view.handle_key(key);
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Replace(view) => {
        self.view_stack.pop();
        self.view_stack.push(view);
      }
    }
  }

  /// Palette commands replace the whole stack with a new root
  fn run_command(&mut self, action: CommandAction) {
    let root: Box<dyn View> = match action {
      CommandAction::Home => Box::new(DashboardView::new(self.ctx.clone())),
      CommandAction::Users => Box::new(UserListView::new(self.ctx.clone())),
      CommandAction::Posts => Box::new(PostListView::new(self.ctx.clone())),
      CommandAction::Quit => {
        self.should_quit = true;
        return;
      }
    };
    debug!(view = %root.breadcrumb_label(), "switch root view");
    self.view_stack.clear();
    self.view_stack.push(root);
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }

  pub fn title(&self) -> &str {
    self.config.display_title()
  }

  pub fn api_url(&self) -> &str {
    &self.config.api.url
  }

  pub fn message(&self) -> Option<Line<'static>> {
    self
      .message
      .as_ref()
      .map(|m| Line::styled(m.clone(), Style::default().fg(Color::Yellow)))
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Shared handles every view is built with.
///
/// Views on the same stack read through one cache, so two of them showing
/// the same collection share a single request.
#[derive(Debug, Clone)]
pub struct ViewContext {
  pub api: ApiClient,
  pub cache: QueryCache,
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Swap the current view for another
  Replace(Box<dyn View>),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, edit, etc.) and return
/// actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously hold a `Query<T>` (or a controller
/// built on one) and poll it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to pick up finished requests
  fn tick(&mut self) {}

  /// One-line status for the footer (saves in progress, last error)
  fn status(&self) -> Option<Line<'static>> {
    None
  }

  /// True while the view is capturing text input, so global keys are not
  /// intercepted by the App
  fn is_capturing_input(&self) -> bool {
    false
  }

  /// Keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::draw_input_overlay;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Query changed on a keystroke (empty string when cancelled)
  Changed(String),
  /// Overlay closed with Enter, the query stays applied
  Submitted,
}

/// `/` search overlay that live-filters the owning list
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Open the overlay, keeping the current query for refinement
  pub fn activate(&mut self) {
    self.active = true;
    self.input = TextInput::with_value(self.input.value());
  }

  /// Handle a key event, including the `/` that opens the overlay
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.query().to_string())),
      // Swallow everything else while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if self.active {
      draw_input_overlay(frame, area, " Search ", "/", self.query());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_typing_emits_changes() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());
    search.handle_key(key(KeyCode::Char('g')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('r'))),
      KeyResult::Event(SearchEvent::Changed("gr".to_string()))
    );
  }

  #[test]
  fn test_submit_keeps_query() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('e')));
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "e");

    // Reopening continues from the applied query
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('r')));
    assert_eq!(search.query(), "er");
  }

  #[test]
  fn test_escape_clears_query() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('e')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );
    assert_eq!(search.query(), "");
  }
}

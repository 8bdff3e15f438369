use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command, CommandAction};
use crate::ui::renderfns::draw_input_overlay_with_rows;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState};

const MAX_SUGGESTIONS: usize = 8;

/// Events emitted by command input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  Submitted(CommandAction),
  /// Enter on input that matches no command
  Unknown(String),
  Cancelled,
}

/// `:` command palette with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  fn close(&mut self) {
    self.active = false;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Handle a key event, including the `:` that opens the palette
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    let count = self.suggestions().len();
    match key.code {
      KeyCode::Tab | KeyCode::Down if count > 0 => {
        self.selected_suggestion = (self.selected_suggestion + 1) % count;
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up if count > 0 => {
        self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Consumed => {
        self.selected_suggestion = 0;
        KeyResult::Handled
      }
      InputResult::Submitted(raw) => {
        let picked = self.suggestions().get(self.selected_suggestion).map(|c| c.action);
        self.close();
        match picked {
          Some(action) => KeyResult::Event(CommandEvent::Submitted(action)),
          None => KeyResult::Event(CommandEvent::Unknown(raw.trim().to_string())),
        }
      }
      InputResult::Cancelled => {
        self.close();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS);
    let rows = draw_input_overlay_with_rows(
      frame,
      area,
      " Command ",
      ":",
      self.input.value(),
      shown as u16,
    );
    if shown == 0 || rows.height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<10}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();
    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(Some(self.selected_suggestion));
    frame.render_stateful_widget(list, rows, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(cmd: &mut CommandInput, s: &str) {
    for c in s.chars() {
      cmd.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_colon_activates() {
    let mut cmd = CommandInput::new();
    assert_eq!(cmd.handle_key(key(KeyCode::Char('u'))), KeyResult::NotHandled);
    assert_eq!(cmd.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(cmd.is_active());
  }

  #[test]
  fn test_submit_best_match() {
    let mut cmd = CommandInput::new();
    cmd.activate();
    type_str(&mut cmd, "pos");
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted(CommandAction::Posts))
    );
    assert!(!cmd.is_active());
  }

  #[test]
  fn test_tab_cycles_suggestions() {
    let mut cmd = CommandInput::new();
    cmd.activate();
    // Empty input lists every command in order: home, users, ...
    cmd.handle_key(key(KeyCode::Tab));
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted(CommandAction::Users))
    );
  }

  #[test]
  fn test_unknown_and_cancel() {
    let mut cmd = CommandInput::new();
    cmd.activate();
    type_str(&mut cmd, "zzz");
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Unknown("zzz".to_string()))
    );

    cmd.activate();
    assert_eq!(
      cmd.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(CommandEvent::Cancelled)
    );
  }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Text or cursor changed, keep editing
  Consumed,
  /// Enter with the final text
  Submitted(String),
  /// Escape
  Cancelled,
  /// Not an editing key
  NotHandled,
}

/// Single-line text field with readline-style shortcuts.
///
/// The cursor counts characters, not bytes, so names like "Zoë" edit cleanly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start with `value` and the cursor at its end
  pub fn with_value(value: impl Into<String>) -> Self {
    let buffer = value.into();
    let cursor = buffer.chars().count();
    Self { buffer, cursor }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Cursor position in characters
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  fn len(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Byte offset of character `pos`
  fn offset(&self, pos: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(pos)
      .map_or(self.buffer.len(), |(i, _)| i)
  }

  /// Remove the characters in `start..end` and put the cursor at `start`
  fn delete_range(&mut self, start: usize, end: usize) {
    let (from, to) = (self.offset(start), self.offset(end));
    self.buffer.replace_range(from..to, "");
    self.cursor = start;
  }

  /// Start of the word before the cursor, skipping trailing spaces
  fn word_start(&self) -> usize {
    let before: Vec<char> = self.buffer.chars().take(self.cursor).collect();
    let mut pos = before.len();
    while pos > 0 && before[pos - 1] == ' ' {
      pos -= 1;
    }
    while pos > 0 && before[pos - 1] != ' ' {
      pos -= 1;
    }
    pos
  }

  fn handle_ctrl(&mut self, code: KeyCode) -> InputResult {
    match code {
      KeyCode::Char('a') => self.cursor = 0,
      KeyCode::Char('e') => self.cursor = self.len(),
      KeyCode::Char('u') => self.delete_range(0, self.cursor),
      KeyCode::Char('k') => self.delete_range(self.cursor, self.len()),
      KeyCode::Char('w') => self.delete_range(self.word_start(), self.cursor),
      _ => return InputResult::NotHandled,
    }
    InputResult::Consumed
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      return self.handle_ctrl(key.code);
    }

    match key.code {
      KeyCode::Esc => return InputResult::Cancelled,
      KeyCode::Enter => return InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace if self.cursor > 0 => self.delete_range(self.cursor - 1, self.cursor),
      KeyCode::Delete if self.cursor < self.len() => {
        self.delete_range(self.cursor, self.cursor + 1)
      }
      KeyCode::Backspace | KeyCode::Delete => {}
      KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.len(),
      KeyCode::Char(c) => {
        let at = self.offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
      }
      _ => return InputResult::NotHandled,
    }
    InputResult::Consumed
  }
}

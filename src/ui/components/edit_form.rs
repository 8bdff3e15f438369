use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::centered_rect;
use crate::users::{DraftField, EditDraft};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// A field's text changed
  Changed(DraftField, String),
  Save,
  Cancel,
}

/// Popup with one input per editable user field.
///
/// The form holds only the text being typed; the draft itself lives in the
/// controller and is updated through `FormEvent::Changed`.
#[derive(Debug, Clone)]
pub struct EditForm {
  user_id: u64,
  name: TextInput,
  email: TextInput,
  focus: DraftField,
}

impl EditForm {
  pub fn from_draft(draft: &EditDraft) -> Self {
    Self {
      user_id: draft.user_id(),
      name: TextInput::with_value(draft.get(DraftField::Name)),
      email: TextInput::with_value(draft.get(DraftField::Email)),
      focus: DraftField::Name,
    }
  }

  pub fn user_id(&self) -> u64 {
    self.user_id
  }

  pub fn focus(&self) -> DraftField {
    self.focus
  }

  fn input_mut(&mut self, field: DraftField) -> &mut TextInput {
    match field {
      DraftField::Name => &mut self.name,
      DraftField::Email => &mut self.email,
    }
  }

  fn input(&self, field: DraftField) -> &TextInput {
    match field {
      DraftField::Name => &self.name,
      DraftField::Email => &self.email,
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up) {
      self.focus = self.focus.next();
      return KeyResult::Handled;
    }

    let field = self.focus;
    match self.input_mut(field).handle_key(key) {
      InputResult::Consumed => {
        let value = self.input(field).value().to_string();
        KeyResult::Event(FormEvent::Changed(field, value))
      }
      InputResult::Submitted(_) => KeyResult::Event(FormEvent::Save),
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancel),
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect, saving: bool) {
    let popup = centered_rect(area, 60, 7);
    frame.render_widget(Clear, popup);

    let title = if saving {
      format!(" Edit user #{} (saving...) ", self.user_id)
    } else {
      format!(" Edit user #{} ", self.user_id)
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = [DraftField::Name, DraftField::Email]
      .into_iter()
      .map(|field| {
        let focused = field == self.focus;
        let label_style = if focused {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![
          Span::styled(format!("{:>6}: ", field.label()), label_style),
          Span::raw(self.input(field).value().to_string()),
        ];
        if focused {
          spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
      })
      .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
      "Tab: next field  Enter: save  Esc: discard",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

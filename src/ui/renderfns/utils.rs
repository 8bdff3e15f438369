use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Truncate to `max_len` characters, ending with "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
  format!("{}...", kept)
}

/// Pad or truncate to exactly `width` characters for column layout
pub fn column(s: &str, width: usize) -> String {
  format!("{:<width$}", truncate(s, width), width = width)
}

/// A `percent_x` wide, `height` tall rect centered in `area`
pub fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
  let width = (area.width * percent_x / 100).max(30).min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

/// Draw a bordered single-line input popup at the top-left of `area`
pub fn draw_input_overlay(frame: &mut Frame, area: Rect, title: &str, prefix: &str, value: &str) {
  draw_input_overlay_with_rows(frame, area, title, prefix, value, 0);
}

/// Like [`draw_input_overlay`] with `rows` extra lines below the input.
///
/// Returns the area of those extra lines.
pub fn draw_input_overlay_with_rows(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  prefix: &str,
  value: &str,
  rows: u16,
) -> Rect {
  let width = (area.width * 60 / 100).clamp(30, 60).min(area.width.saturating_sub(2));
  let height = (3 + rows).min(area.height.saturating_sub(1));
  let overlay = Rect::new(area.x + 1, area.y + 1, width, height);
  frame.render_widget(Clear, overlay);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(title.to_string());
  let inner = block.inner(overlay);
  frame.render_widget(block, overlay);
  if inner.height == 0 {
    return Rect::default();
  }

  let line = Line::from(vec![
    Span::styled(prefix.to_string(), Style::default().fg(Color::Yellow)),
    Span::raw(value.to_string()),
    Span::styled("_", Style::default().fg(Color::Yellow)),
  ]);
  frame.render_widget(Paragraph::new(line), Rect { height: 1, ..inner });

  Rect {
    y: inner.y + 1,
    height: inner.height - 1,
    ..inner
  }
}

/// Centered grey message inside a bordered block (loading, empty, errors)
pub fn draw_message(frame: &mut Frame, area: Rect, block: Block, message: &str, color: Color) {
  let paragraph = Paragraph::new(message)
    .block(block)
    .alignment(Alignment::Center)
    .style(Style::default().fg(color));
  frame.render_widget(paragraph, area);
}

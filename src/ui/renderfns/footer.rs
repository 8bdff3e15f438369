use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer: breadcrumb on the left, view status on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: Option<Line<'static>>) {
  let mut spans = vec![Span::raw(" ")];
  let last = breadcrumb.len().saturating_sub(1);

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }

  let style = Style::default().bg(Color::Black);
  let status_width = status.as_ref().map_or(0, |s| s.width() as u16 + 1);
  let [left, right] =
    Layout::horizontal([Constraint::Min(0), Constraint::Length(status_width)]).areas(area);

  frame.render_widget(Paragraph::new(Line::from(spans)).style(style), left);
  if let Some(status) = status {
    frame.render_widget(Paragraph::new(status).style(style), right);
  }
}

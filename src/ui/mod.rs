pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header};

/// Draw the whole screen: header, current view, footer, command palette
pub fn draw(frame: &mut Frame, app: &mut App) {
  let [header, content, footer] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  draw_header(frame, header, app.title(), app.api_url(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, content);
  }

  let status = app.current_view().and_then(|v| v.status()).or_else(|| app.message());
  draw_footer(frame, footer, &app.breadcrumb(), status);

  app.command_input().render_overlay(frame, content);
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// rows appear and nothing when the list is empty
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

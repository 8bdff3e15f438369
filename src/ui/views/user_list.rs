use super::UserDetailView;
use crate::api::User;
use crate::ui::components::{EditForm, FormEvent, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{column, draw_message};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crate::users::{DraftField, ListViewModel, SaveStatus, UserListController, UserRow};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use tracing::debug;

/// Searchable users list with single-row editing
pub struct UserListView {
  ctx: ViewContext,
  controller: UserListController,
  list_state: ListState,
  search: SearchInput,
  form: Option<EditForm>,
}

impl UserListView {
  pub fn new(ctx: ViewContext) -> Self {
    let controller = UserListController::new(ctx.api.clone(), ctx.cache.clone());
    Self {
      ctx,
      controller,
      list_state: ListState::default(),
      search: SearchInput::new(),
      form: None,
    }
  }

  fn selected_user(&self) -> Option<&User> {
    let idx = self.list_state.selected()?;
    self.controller.visible_users().get(idx).copied()
  }

  fn begin_edit(&mut self) {
    let Some(user_id) = self.selected_user().map(|u| u.id) else {
      return;
    };
    match self.controller.begin_edit(user_id) {
      Ok(()) => self.form = self.controller.draft().map(EditForm::from_draft),
      Err(e) => debug!(error = %e, "cannot start editing"),
    }
  }

  fn handle_form(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let form = self.form.as_mut()?;
    let result = match form.handle_key(key) {
      KeyResult::Event(FormEvent::Changed(field, value)) => {
        self.controller.update_draft_field(field, value)
      }
      KeyResult::Event(FormEvent::Save) => self.controller.commit(),
      KeyResult::Event(FormEvent::Cancel) => {
        self.controller.discard();
        self.form = None;
        Ok(())
      }
      KeyResult::Handled | KeyResult::NotHandled => Ok(()),
    };
    if let Err(e) = result {
      debug!(error = %e, "edit key ignored");
    }
    Some(ViewAction::None)
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.controller.set_search(query);
        self.list_state.select(Some(0));
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.list_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.list_state.select_last(),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('e') => self.begin_edit(),
      KeyCode::Char('r') => self.controller.refresh(),
      KeyCode::Enter => {
        let user_id = self.selected_user()?.id;
        return Some(ViewAction::Push(Box::new(UserDetailView::new(
          self.ctx.clone(),
          user_id,
        ))));
      }
      KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Pop),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  fn title(&self) -> String {
    let mut title = format!(" Users ({})", self.controller.visible_users().len());
    if !self.controller.search().is_empty() {
      title.push_str(&format!(" [/{}]", self.controller.search()));
    }
    if self.controller.is_refreshing() {
      title.push_str(" refreshing...");
    }
    title.push(' ');
    title
  }

  fn row_item(row: &UserRow<'_>) -> ListItem<'static> {
    let (name, email, edited) = match row.draft {
      Some(draft) => (
        draft.get(DraftField::Name),
        draft.get(DraftField::Email),
        draft.is_modified(row.user),
      ),
      None => (row.user.name.as_str(), row.user.email.as_str(), false),
    };
    let name_style = if row.draft.is_some() {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::White)
    };

    ListItem::new(Line::from(vec![
      Span::styled(if edited { "* " } else { "  " }, Style::default().fg(Color::Yellow)),
      Span::styled(column(name, 24), name_style),
      Span::raw(" "),
      Span::styled(
        column(&format!("@{}", row.user.username), 18),
        Style::default().fg(Color::Cyan),
      ),
      Span::raw(" "),
      Span::raw(column(email, 28)),
      Span::raw(" "),
      Span::styled(
        column(&row.user.company.name, 24),
        Style::default().fg(Color::DarkGray),
      ),
    ]))
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = match self.controller.view_model() {
      ListViewModel::Loading => {
        draw_message(frame, area, block, "Loading users...", Color::DarkGray);
        return;
      }
      ListViewModel::Error(e) => {
        let message = format!("Failed to load users: {}\n\nPress 'r' to retry.", e);
        draw_message(frame, area, block, &message, Color::Red);
        return;
      }
      ListViewModel::NoResults => {
        draw_message(frame, area, block, "No users found", Color::DarkGray);
        return;
      }
      ListViewModel::Rows(rows) => rows.iter().map(Self::row_item).collect(),
    };

    ensure_valid_selection(&mut self.list_state, items.len());
    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_form(key)
      .or_else(|| self.handle_overlays(key))
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
    if let Some(form) = &self.form {
      form.render(frame, area, self.controller.is_saving());
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn tick(&mut self) {
    self.controller.tick();
    // Saved or orphaned drafts close their form
    let draft_id = self.controller.draft().map(|d| d.user_id());
    if self.form.as_ref().map(EditForm::user_id) != draft_id {
      self.form = None;
    }
  }

  fn status(&self) -> Option<Line<'static>> {
    match self.controller.save_status() {
      SaveStatus::Idle => None,
      SaveStatus::Saving { user_id } => Some(Line::styled(
        format!("saving user #{}...", user_id),
        Style::default().fg(Color::Yellow),
      )),
      SaveStatus::Failed { user_id, error } => Some(Line::styled(
        format!("save failed for user #{}: {}", user_id, error.short()),
        Style::default().fg(Color::Red),
      )),
    }
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active() || self.form.is_some()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.form.is_some() {
      return vec![
        ShortcutInfo::new("tab", "next field").with_priority(10),
        ShortcutInfo::new("enter", "save").with_priority(20),
        ShortcutInfo::new("esc", "discard").with_priority(30),
      ];
    }
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("e", "edit").with_priority(21),
      ShortcutInfo::new("enter", "profile").with_priority(22),
      ShortcutInfo::new("r", "refresh").with_priority(25),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

use super::{collection_query, UserDetailView};
use crate::api::Post;
use crate::filter::filter;
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{draw_message, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// All posts, searchable by title and body
pub struct PostListView {
  ctx: ViewContext,
  query: Query<Vec<Post>>,
  list_state: ListState,
  search: SearchInput,
}

impl PostListView {
  pub fn new(ctx: ViewContext) -> Self {
    let mut query = collection_query::<Post>(&ctx);
    query.fetch();
    Self {
      ctx,
      query,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  fn visible_posts(&self) -> Vec<&Post> {
    let posts = self.query.data().map(Vec::as_slice).unwrap_or(&[]);
    filter(posts, self.search.query())
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
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
      KeyCode::Char('r') => {
        self.query.refetch();
        Some(ViewAction::None)
      }
      KeyCode::Enter => {
        let idx = self.list_state.selected()?;
        let author = self.visible_posts().get(idx)?.user_id;
        Some(ViewAction::Push(Box::new(UserDetailView::new(
          self.ctx.clone(),
          author,
        ))))
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let visible = self.visible_posts();
    let mut title = format!(" Posts ({})", visible.len());
    if !self.search.query().is_empty() {
      title.push_str(&format!(" [/{}]", self.search.query()));
    }
    if self.query.is_fetching() && !self.query.is_loading() {
      title.push_str(" refreshing...");
    }
    title.push(' ');

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    match self.query.state() {
      QueryState::Idle | QueryState::Loading => {
        draw_message(frame, area, block, "Loading posts...", Color::DarkGray);
        return;
      }
      QueryState::Error(e) => {
        let message = format!("Failed to load posts: {}\n\nPress 'r' to retry.", e);
        draw_message(frame, area, block, &message, Color::Red);
        return;
      }
      QueryState::Success(_) if visible.is_empty() => {
        draw_message(frame, area, block, "No posts found", Color::DarkGray);
        return;
      }
      QueryState::Success(_) => {}
    }

    let width = area.width.saturating_sub(12) as usize;
    let items: Vec<ListItem> = visible
      .iter()
      .map(|post| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("#{:<4}", post.id), Style::default().fg(Color::Cyan)),
          Span::raw(" "),
          Span::raw(truncate(&post.title, width)),
        ]))
      })
      .collect();

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

impl View for PostListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Posts".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("enter", "author").with_priority(22),
      ShortcutInfo::new("r", "refresh").with_priority(25),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

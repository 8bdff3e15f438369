use crate::api::{Post, User};
use crate::cache::QueryKey;
use crate::query::{Query, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{draw_message, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// One user's profile and their posts
pub struct UserDetailView {
  ctx: ViewContext,
  user_id: u64,
  user: Query<User>,
  posts: Query<Vec<Post>>,
  list_state: ListState,
}

impl UserDetailView {
  pub fn new(ctx: ViewContext, user_id: u64) -> Self {
    let api = ctx.api.clone();
    let mut user = Query::new(ctx.cache.clone(), QueryKey::User { id: user_id }, move || {
      let api = api.clone();
      async move { api.fetch_one::<User>(user_id).await }
    });

    let api = ctx.api.clone();
    let mut posts = Query::new(ctx.cache.clone(), QueryKey::UserPosts { user_id }, move || {
      let api = api.clone();
      async move {
        api
          .fetch_collection_where::<Post>("userId", &user_id.to_string())
          .await
      }
    });

    user.fetch();
    posts.fetch();

    Self {
      ctx,
      user_id,
      user,
      posts,
      list_state: ListState::default(),
    }
  }

  fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("{:>10}: ", label), Style::default().fg(Color::DarkGray)),
      Span::raw(value),
    ])
  }

  fn profile_lines(user: &User) -> Vec<Line<'static>> {
    let address = &user.address;
    vec![
      Line::from(vec![
        Span::styled(user.name.clone(), Style::default().fg(Color::White).bold()),
        Span::styled(format!("  @{}", user.username), Style::default().fg(Color::Cyan)),
      ]),
      Line::raw(""),
      Self::field("Email", user.email.clone()),
      Self::field("Phone", user.phone.clone()),
      Self::field("Website", user.website.clone()),
      Self::field(
        "Address",
        format!(
          "{}, {}, {} {}",
          address.street, address.suite, address.city, address.zipcode
        ),
      ),
      Self::field("Geo", format!("{}, {}", address.geo.lat, address.geo.lng)),
      Self::field("Company", user.company.name.clone()),
      Self::field("", format!("\"{}\"", user.company.catch_phrase)),
      Self::field("", user.company.bs.clone()),
    ]
  }

  fn render_profile(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" User #{} ", self.user_id))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    match self.user.state() {
      QueryState::Idle | QueryState::Loading => {
        draw_message(frame, area, block, "Loading user...", Color::DarkGray);
      }
      QueryState::Error(e) => {
        let message = format!("Failed to load user: {}\n\nPress 'r' to retry.", e);
        draw_message(frame, area, block, &message, Color::Red);
      }
      QueryState::Success(user) => {
        let paragraph = Paragraph::new(Self::profile_lines(user))
          .block(block)
          .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
      }
    }
  }

  fn render_posts(&mut self, frame: &mut Frame, area: Rect) {
    let count = self.posts.data().map(Vec::len).unwrap_or(0);
    let block = Block::default()
      .title(format!(" Posts ({}) ", count))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let posts = match self.posts.state() {
      QueryState::Idle | QueryState::Loading => {
        draw_message(frame, area, block, "Loading posts...", Color::DarkGray);
        return;
      }
      QueryState::Error(e) => {
        let message = format!("Failed to load posts: {}", e);
        draw_message(frame, area, block, &message, Color::Red);
        return;
      }
      QueryState::Success(posts) if posts.is_empty() => {
        draw_message(frame, area, block, "No posts", Color::DarkGray);
        return;
      }
      QueryState::Success(posts) => posts.clone(),
    };

    let width = area.width.saturating_sub(12) as usize;
    let items: Vec<ListItem> = posts
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
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for UserDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        self.user.refetch();
        self.posts.refetch();
      }
      // Step through profiles without growing the stack
      KeyCode::Char(']') => {
        return ViewAction::Replace(Box::new(Self::new(self.ctx.clone(), self.user_id + 1)));
      }
      KeyCode::Char('[') if self.user_id > 1 => {
        return ViewAction::Replace(Box::new(Self::new(self.ctx.clone(), self.user_id - 1)));
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [profile, posts] =
      Layout::vertical([Constraint::Length(12), Constraint::Min(3)]).areas(area);
    self.render_profile(frame, profile);
    self.render_posts(frame, posts);
  }

  fn breadcrumb_label(&self) -> String {
    match self.user.data() {
      Some(user) => user.name.clone(),
      None => format!("User #{}", self.user_id),
    }
  }

  fn tick(&mut self) {
    self.user.poll();
    self.posts.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("[ ]", "prev/next user").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(25),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

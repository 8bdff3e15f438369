use super::{collection_query, PostListView, UserListView};
use crate::api::{Post, User};
use crate::query::Query;
use crate::ui::renderfns::draw_message;
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::collections::{BTreeSet, HashMap};

/// Figures shown on the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
  pub users: usize,
  pub posts: usize,
  pub companies: usize,
  /// Author with the most posts and their count; lowest id wins a tie
  pub top_author: Option<(String, usize)>,
}

impl DashboardStats {
  pub fn compute(users: &[User], posts: &[Post]) -> Self {
    let companies: BTreeSet<&str> = users.iter().map(|u| u.company.name.as_str()).collect();

    let mut per_author: HashMap<u64, usize> = HashMap::new();
    for post in posts {
      *per_author.entry(post.user_id).or_default() += 1;
    }
    let top_author = per_author
      .into_iter()
      .max_by(|(id_a, n_a), (id_b, n_b)| n_a.cmp(n_b).then(id_b.cmp(id_a)))
      .map(|(id, count)| {
        let name = users
          .iter()
          .find(|u| u.id == id)
          .map(|u| u.name.clone())
          .unwrap_or_else(|| format!("user #{}", id));
        (name, count)
      });

    Self {
      users: users.len(),
      posts: posts.len(),
      companies: companies.len(),
      top_author,
    }
  }
}

/// Home screen summarising both collections
pub struct DashboardView {
  ctx: ViewContext,
  users: Query<Vec<User>>,
  posts: Query<Vec<Post>>,
}

impl DashboardView {
  pub fn new(ctx: ViewContext) -> Self {
    let mut users = collection_query::<User>(&ctx);
    let mut posts = collection_query::<Post>(&ctx);
    users.fetch();
    posts.fetch();
    Self { ctx, users, posts }
  }

  fn stats(&self) -> Option<DashboardStats> {
    let users = self.users.data()?;
    let posts = self.posts.data()?;
    Some(DashboardStats::compute(users, posts))
  }

  fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("{:>14}  ", label), Style::default().fg(Color::DarkGray)),
      Span::styled(value, Style::default().fg(Color::White).bold()),
    ])
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('u') => ViewAction::Push(Box::new(UserListView::new(self.ctx.clone()))),
      KeyCode::Char('p') => ViewAction::Push(Box::new(PostListView::new(self.ctx.clone()))),
      KeyCode::Char('r') => {
        self.users.refetch();
        self.posts.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Dashboard ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(error) = self.users.error().or_else(|| self.posts.error()) {
      let message = format!("Failed to load data: {}\n\nPress 'r' to retry.", error);
      draw_message(frame, area, block, &message, Color::Red);
      return;
    }
    let Some(stats) = self.stats() else {
      draw_message(frame, area, block, "Loading...", Color::DarkGray);
      return;
    };

    let top_author = match stats.top_author {
      Some((name, count)) => format!("{} ({} posts)", name, count),
      None => "-".to_string(),
    };
    let lines = vec![
      Line::raw(""),
      Self::stat_line("Users", stats.users.to_string()),
      Self::stat_line("Posts", stats.posts.to_string()),
      Self::stat_line("Companies", stats.companies.to_string()),
      Self::stat_line("Top author", top_author),
      Line::raw(""),
      Line::styled(
        "u: users  p: posts  r: refresh",
        Style::default().fg(Color::DarkGray),
      ),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn tick(&mut self) {
    self.users.poll();
    self.posts.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("u", "users").with_priority(20),
      ShortcutInfo::new("p", "posts").with_priority(21),
      ShortcutInfo::new("r", "refresh").with_priority(25),
      ShortcutInfo::new("q", "quit").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::fixtures::{ervin, leanne, post, user};

  #[test]
  fn test_stats_counts() {
    let users = vec![leanne(), ervin(), user(3, "Clementine Bauch", "Samantha", "c@x.io")];
    let posts = vec![
      post(1, 2, "a", ""),
      post(2, 2, "b", ""),
      post(3, 1, "c", ""),
    ];

    let stats = DashboardStats::compute(&users, &posts);
    assert_eq!(stats.users, 3);
    assert_eq!(stats.posts, 3);
    assert_eq!(stats.companies, 3);
    assert_eq!(stats.top_author, Some(("Ervin Howell".to_string(), 2)));
  }

  #[test]
  fn test_shared_company_counted_once() {
    let mut twin = ervin();
    twin.company = leanne().company;
    let stats = DashboardStats::compute(&[leanne(), twin], &[]);
    assert_eq!(stats.companies, 1);
    assert_eq!(stats.top_author, None);
  }

  #[test]
  fn test_top_author_tie_prefers_lower_id() {
    let posts = vec![post(1, 2, "a", ""), post(2, 1, "b", "")];
    let stats = DashboardStats::compute(&[leanne(), ervin()], &posts);
    assert_eq!(stats.top_author, Some(("Leanne Graham".to_string(), 1)));
  }

  #[test]
  fn test_unknown_author_falls_back_to_id() {
    let stats = DashboardStats::compute(&[leanne()], &[post(1, 9, "a", "")]);
    assert_eq!(stats.top_author, Some(("user #9".to_string(), 1)));
  }
}

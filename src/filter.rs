//! Client-side search over cached collections.

use crate::api::{Post, User};

/// Entities that can be matched against free-text search.
pub trait Searchable {
  /// Fields the search text is matched against
  fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for User {
  fn search_fields(&self) -> Vec<&str> {
    vec![self.name.as_str(), self.username.as_str(), self.email.as_str()]
  }
}

impl Searchable for Post {
  fn search_fields(&self) -> Vec<&str> {
    vec![self.title.as_str(), self.body.as_str()]
  }
}

/// Items with any search field containing `query`, case-insensitively.
///
/// Input order is preserved and an empty query matches everything.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
  if query.is_empty() {
    return items.iter().collect();
  }
  let query_lower = query.to_lowercase();
  items
    .iter()
    .filter(|item| {
      item
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&query_lower))
    })
    .collect()
}

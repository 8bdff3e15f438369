use crate::api::ResourceKind;
use std::fmt;

/// Identifies one cached query: a resource kind plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// The whole users collection
  Users,
  /// The whole posts collection
  Posts,
  /// A single user by id
  User { id: u64 },
  /// Posts written by one user
  UserPosts { user_id: u64 },
}

impl QueryKey {
  /// Key of a whole collection
  pub fn collection(kind: ResourceKind) -> Self {
    match kind {
      ResourceKind::Users => Self::Users,
      ResourceKind::Posts => Self::Posts,
    }
  }

  /// Resource kind the query reads
  pub fn resource(&self) -> ResourceKind {
    match self {
      Self::Users | Self::User { .. } => ResourceKind::Users,
      Self::Posts | Self::UserPosts { .. } => ResourceKind::Posts,
    }
  }

  /// Human-readable description for logs
  pub fn description(&self) -> String {
    match self {
      Self::Users => "all users".to_string(),
      Self::Posts => "all posts".to_string(),
      Self::User { id } => format!("user {}", id),
      Self::UserPosts { user_id } => format!("posts by user {}", user_id),
    }
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Users => write!(f, "users"),
      Self::Posts => write!(f, "posts"),
      Self::User { id } => write!(f, "users/{}", id),
      Self::UserPosts { user_id } => write!(f, "posts?userId={}", user_id),
    }
  }
}

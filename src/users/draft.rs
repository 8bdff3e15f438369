use crate::api::types::UserPatch;
use crate::api::User;

/// Editable field of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
  Name,
  Email,
}

impl DraftField {
  /// Field focused after this one (wraps around)
  pub fn next(self) -> Self {
    match self {
      Self::Name => Self::Email,
      Self::Email => Self::Name,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Name => "Name",
      Self::Email => "Email",
    }
  }
}

/// In-progress edit of one user's name and email.
///
/// Typing changes only the draft; the cached user stays untouched until a
/// save succeeds and the list is refetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
  user_id: u64,
  name: String,
  email: String,
}

impl EditDraft {
  /// Snapshot the editable fields of `user`
  pub fn from_user(user: &User) -> Self {
    Self {
      user_id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
    }
  }

  pub fn user_id(&self) -> u64 {
    self.user_id
  }

  pub fn get(&self, field: DraftField) -> &str {
    match field {
      DraftField::Name => &self.name,
      DraftField::Email => &self.email,
    }
  }

  pub fn set(&mut self, field: DraftField, value: String) {
    match field {
      DraftField::Name => self.name = value,
      DraftField::Email => self.email = value,
    }
  }

  /// Whether the draft differs from `user`
  pub fn is_modified(&self, user: &User) -> bool {
    self.name != user.name || self.email != user.email
  }

  /// Request body for saving the draft
  pub fn patch(&self) -> UserPatch {
    UserPatch {
      name: self.name.clone(),
      email: self.email.clone(),
    }
  }
}

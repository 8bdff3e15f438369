//! Typed records returned by the API.
//!
//! Deserialization doubles as schema validation: a record missing a required
//! field fails the whole response with `ApiError::Parse` instead of leaking
//! half-filled entities into the cache.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Category of remote entity, mapped to its collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Users,
  Posts,
}

impl ResourceKind {
  /// Collection path relative to the API base URL
  pub fn path(self) -> &'static str {
    match self {
      Self::Users => "users",
      Self::Posts => "posts",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

/// Trait for entities that can be fetched from the API.
///
/// Implementors name their collection and expose their stable identifier.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
  /// Collection this entity lives in
  const KIND: ResourceKind;

  /// Unique, stable identifier
  fn id(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
  pub username: String,
  pub email: String,
  pub address: Address,
  pub phone: String,
  pub website: String,
  pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub street: String,
  pub suite: String,
  pub city: String,
  pub zipcode: String,
  pub geo: Geo,
}

/// Coordinates as the API sends them (decimal strings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
  pub lat: String,
  pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
  pub name: String,
  #[serde(rename = "catchPhrase")]
  pub catch_phrase: String,
  pub bs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub id: u64,
  #[serde(rename = "userId")]
  pub user_id: u64,
  pub title: String,
  pub body: String,
}

impl Resource for User {
  const KIND: ResourceKind = ResourceKind::Users;

  fn id(&self) -> u64 {
    self.id
  }
}

impl Resource for Post {
  const KIND: ResourceKind = ResourceKind::Posts;

  fn id(&self) -> u64 {
    self.id
  }
}

/// Body of `PUT /users/{id}`: the editable fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPatch {
  pub name: String,
  pub email: String,
}

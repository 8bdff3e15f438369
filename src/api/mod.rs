//! Client for the JSONPlaceholder REST API.
//!
//! The API is an external, read-mostly collaborator: collections are fetched
//! with `GET /{kind}`, single users with `GET /users/{id}`, and user edits are
//! sent with `PUT /users/{id}`. The server accepts writes but does not persist
//! them, so a refetch after a save returns whatever the server considers
//! authoritative.

pub mod client;
mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{Post, Resource, ResourceKind, User, UserPatch};

//! Users list: search, single-row editing and saving.

mod controller;
mod draft;

pub use controller::{EditError, ListViewModel, SaveStatus, UserListController, UserRow};
pub use draft::{DraftField, EditDraft};

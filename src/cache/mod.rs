//! Session-scoped query cache.
//!
//! This module provides the store that sits between views and the API client:
//! - Results are memoized per `QueryKey` for the lifetime of the session
//! - At most one fetch is in flight per key; repeated queries share it
//! - `invalidate` refetches with the last registered fetcher while keeping
//!   the previous data visible (stale-while-revalidate)
//! - A fetch superseded by a newer one is aborted and its result discarded

mod key;
mod store;

pub use key::QueryKey;
pub use store::{fetcher, Fetcher, QueryCache, Snapshot};

#[cfg(test)]
pub(crate) use store::tests::settle;

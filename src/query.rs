//! Async query abstraction for data fetching with caching support.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` handle that
//! binds a view to one `QueryKey` in the shared `QueryCache`. The cache owns
//! the data and the in-flight request; the handle tracks which version of
//! the entry the view has seen and exposes loading, success and error states.
//!
//! # Example
//!
//! ```ignore
//! let api = api_client.clone();
//! let mut query = Query::new(cache.clone(), QueryKey::Users, move || {
//!     let api = api.clone();
//!     async move { api.fetch_collection::<User>().await }
//! });
//!
//! // Start fetching (or reuse what the cache already has)
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use crate::api::ApiError;
use crate::cache::{fetcher, Fetcher, QueryCache, QueryKey, Snapshot};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// First fetch in progress, nothing to show yet
  Loading,
  /// Data available (possibly being revalidated in the background)
  Success(Arc<T>),
  /// The most recent fetch failed
  Error(ApiError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data.as_ref()),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&ApiError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  fn from_snapshot(snapshot: Snapshot<T>) -> Self {
    if snapshot.is_loading() {
      QueryState::Loading
    } else if let Some(error) = snapshot.error {
      QueryState::Error(error)
    } else if let Some(data) = snapshot.data {
      QueryState::Success(data)
    } else {
      QueryState::Idle
    }
  }
}

/// View-side handle onto one cached query.
///
/// Query<T> encapsulates:
/// - The fetching logic (registered with the cache on each fetch)
/// - Loading/success/error states as last observed
/// - Change detection via the cache entry's version
pub struct Query<T> {
  key: QueryKey,
  cache: QueryCache,
  fetcher: Fetcher,
  state: QueryState<T>,
  fetching: bool,
  seen_version: Option<u64>,
}

impl<T: Any + Send + Sync> Query<T> {
  /// Create a new query for `key` with the given fetcher function.
  ///
  /// Nothing is requested until `fetch()` or `refetch()` is called.
  pub fn new<F, Fut>(cache: QueryCache, key: QueryKey, fetch: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self {
      key,
      cache,
      fetcher: fetcher(fetch),
      state: QueryState::Idle,
      fetching: false,
      seen_version: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is loading for the first time.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if any request is in flight, including background revalidation.
  pub fn is_fetching(&self) -> bool {
    self.fetching
  }

  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.state.error()
  }

  /// Read through the cache, fetching only if it has nothing usable.
  pub fn fetch(&mut self) {
    let snapshot = self.cache.query::<T>(&self.key, self.fetcher.clone());
    self.apply(snapshot);
  }

  /// Force a new request, superseding any in flight.
  pub fn refetch(&mut self) {
    let snapshot = self.cache.refetch::<T>(&self.key, self.fetcher.clone());
    self.apply(snapshot);
  }

  /// Pick up changes made to the cache entry since the last look.
  ///
  /// Returns `true` if the state changed. Call this in the tick handler.
  pub fn poll(&mut self) -> bool {
    let snapshot = self.cache.snapshot::<T>(&self.key);
    if self.seen_version == Some(snapshot.version) {
      return false;
    }
    self.apply(snapshot);
    true
  }

  fn apply(&mut self, snapshot: Snapshot<T>) {
    self.seen_version = Some(snapshot.version);
    self.fetching = snapshot.is_fetching;
    self.state = QueryState::from_snapshot(snapshot);
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("key", &self.key)
      .field("state", &self.state)
      .field("seen_version", &self.seen_version)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::settle;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;

  fn cache() -> QueryCache {
    QueryCache::new(chrono::Duration::minutes(5))
  }

  #[tokio::test]
  async fn test_query_success() {
    let cache = cache();
    let mut query = Query::new(cache.clone(), QueryKey::Posts, || async {
      Ok::<_, ApiError>(vec![1, 2, 3])
    });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    settle(&cache, &QueryKey::Posts).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
    assert!(!query.poll());
  }

  #[tokio::test]
  async fn test_query_error() {
    let cache = cache();
    let mut query: Query<i32> = Query::new(cache.clone(), QueryKey::Users, || async {
      Err(ApiError::Http { status: 500 })
    });

    query.fetch();
    settle(&cache, &QueryKey::Users).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert_eq!(query.error(), Some(&ApiError::Http { status: 500 }));
  }

  #[tokio::test]
  async fn test_handles_on_same_key_share_request() {
    let cache = cache();
    let counter = Arc::new(AtomicU32::new(0));
    let make = |cache: QueryCache| {
      let counter = counter.clone();
      Query::new(cache, QueryKey::Users, move || {
        let counter = counter.clone();
        async move {
          tokio::time::sleep(Duration::from_millis(10)).await;
          Ok::<_, ApiError>(counter.fetch_add(1, Ordering::SeqCst))
        }
      })
    };

    let mut first = make(cache.clone());
    let mut second = make(cache.clone());
    first.fetch();
    second.fetch();
    settle(&cache, &QueryKey::Users).await;

    first.poll();
    second.poll();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(first.data(), Some(&0));
    assert_eq!(second.data(), Some(&0));
  }

  #[tokio::test]
  async fn test_refetch_keeps_data_while_fetching() {
    let cache = cache();
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(cache.clone(), QueryKey::Users, move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<_, ApiError>(counter.fetch_add(1, Ordering::SeqCst))
      }
    });

    query.fetch();
    settle(&cache, &QueryKey::Users).await;
    query.poll();

    query.refetch();
    assert!(query.is_fetching());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&0));

    settle(&cache, &QueryKey::Users).await;
    query.poll();
    assert!(!query.is_fetching());
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_refetch_cancels_pending() {
    let cache = cache();
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(cache.clone(), QueryKey::Posts, move || {
      let counter = counter_clone.clone();
      async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, ApiError>(n)
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch should cancel the first and start a new one
    query.refetch();
    settle(&cache, &QueryKey::Posts).await;

    query.poll();
    // Only the second fetch should have completed and been received
    assert_eq!(query.data(), Some(&1));
  }
}

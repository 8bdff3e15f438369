//! Keyed store of query results with request deduplication.

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::key::QueryKey;
use crate::api::ApiError;

type AnyData = Arc<dyn Any + Send + Sync>;

/// Type-erased fetch function registered for a key.
///
/// Created with [`fetcher`]; called again on every refetch of that key.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<AnyData, ApiError>> + Send + Sync>;

/// Wrap a typed async fetch closure into a [`Fetcher`].
pub fn fetcher<T, F, Fut>(fetch: F) -> Fetcher
where
  T: Any + Send + Sync,
  F: Fn() -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
  Arc::new(move || {
    fetch()
      .map(|result| result.map(|data| Arc::new(data) as AnyData))
      .boxed()
  })
}

/// Point-in-time view of one cache entry.
#[derive(Debug)]
pub struct Snapshot<T> {
  /// Last successfully fetched data
  pub data: Option<Arc<T>>,
  /// Error from the most recent fetch, cleared by the next success
  pub error: Option<ApiError>,
  /// A fetch is in flight for this key
  pub is_fetching: bool,
  /// Bumped on every observable change of the entry
  pub version: u64,
  /// When the data was fetched
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
  /// First load: fetching with nothing to show yet
  pub fn is_loading(&self) -> bool {
    self.is_fetching && self.data.is_none()
  }

  fn empty() -> Self {
    Self {
      data: None,
      error: None,
      is_fetching: false,
      version: 0,
      fetched_at: None,
    }
  }
}

struct InFlight {
  generation: u64,
  handle: AbortHandle,
}

#[derive(Default)]
struct Entry {
  data: Option<AnyData>,
  error: Option<ApiError>,
  fetched_at: Option<DateTime<Utc>>,
  invalidated: bool,
  in_flight: Option<InFlight>,
  generation: u64,
  version: u64,
  fetcher: Option<Fetcher>,
}

impl Entry {
  fn is_stale(&self, stale_time: Duration) -> bool {
    match self.fetched_at {
      Some(at) => Utc::now() - at > stale_time,
      None => true,
    }
  }

  fn needs_fetch(&self, stale_time: Duration) -> bool {
    if self.in_flight.is_some() {
      return false;
    }
    self.data.is_none() || self.invalidated || self.error.is_some() || self.is_stale(stale_time)
  }

  fn snapshot<T: Any + Send + Sync>(&self, key: &QueryKey) -> Snapshot<T> {
    let data = self.data.clone().and_then(|data| match data.downcast::<T>() {
      Ok(typed) => Some(typed),
      Err(_) => {
        warn!(key = %key, "cached data has a different type than requested");
        None
      }
    });
    Snapshot {
      data,
      error: self.error.clone(),
      is_fetching: self.in_flight.is_some(),
      version: self.version,
      fetched_at: self.fetched_at,
    }
  }
}

struct Inner {
  entries: Mutex<HashMap<QueryKey, Entry>>,
  stale_time: Duration,
}

/// Query cache shared by every view of a session.
///
/// Cloning is cheap and yields a handle to the same store. Fetches run as
/// spawned tokio tasks, so the query methods must be called from within a
/// runtime.
#[derive(Clone)]
pub struct QueryCache {
  inner: Arc<Inner>,
}

impl QueryCache {
  /// Create an empty cache whose entries go stale after `stale_time`.
  pub fn new(stale_time: Duration) -> Self {
    Self {
      inner: Arc::new(Inner {
        entries: Mutex::new(HashMap::new()),
        stale_time,
      }),
    }
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
    self
      .inner
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }

  /// Read a key, starting a background fetch when needed.
  ///
  /// A fetch starts when nothing is in flight for the key and the entry has
  /// no data, was invalidated, holds an error, or is older than the stale
  /// time. Otherwise the cached snapshot is returned as is.
  pub fn query<T: Any + Send + Sync>(&self, key: &QueryKey, fetcher: Fetcher) -> Snapshot<T> {
    let mut entries = self.entries();
    let entry = entries.entry(key.clone()).or_default();
    entry.fetcher = Some(fetcher);

    if entry.needs_fetch(self.inner.stale_time) {
      self.start_fetch(key, entry);
    } else if entry.in_flight.is_some() {
      debug!(key = %key, "joining in-flight fetch");
    } else {
      debug!(key = %key, "cache hit");
    }

    entry.snapshot(key)
  }

  /// Register `fetcher` for a key and fetch it now, superseding any
  /// in-flight request.
  pub fn refetch<T: Any + Send + Sync>(&self, key: &QueryKey, fetcher: Fetcher) -> Snapshot<T> {
    let mut entries = self.entries();
    let entry = entries.entry(key.clone()).or_default();
    entry.fetcher = Some(fetcher);
    entry.invalidated = true;
    self.start_fetch(key, entry);
    entry.snapshot(key)
  }

  /// Mark a key stale and refetch it immediately.
  ///
  /// Data stays readable until the refetch lands. Keys that were never
  /// queried are left alone.
  pub fn invalidate(&self, key: &QueryKey) {
    let mut entries = self.entries();
    let Some(entry) = entries.get_mut(key) else {
      debug!(key = %key, "invalidate on unknown key ignored");
      return;
    };
    info!(key = %key, "invalidated");
    entry.invalidated = true;
    entry.version += 1;
    self.start_fetch(key, entry);
  }

  /// Current state of a key without triggering any fetch.
  pub fn snapshot<T: Any + Send + Sync>(&self, key: &QueryKey) -> Snapshot<T> {
    self
      .entries()
      .get(key)
      .map(|entry| entry.snapshot(key))
      .unwrap_or_else(Snapshot::empty)
  }

  /// Whether a fetch is in flight for a key
  pub fn is_fetching(&self, key: &QueryKey) -> bool {
    self
      .entries()
      .get(key)
      .is_some_and(|entry| entry.in_flight.is_some())
  }

  fn start_fetch(&self, key: &QueryKey, entry: &mut Entry) {
    let Some(fetch) = entry.fetcher.clone() else {
      return;
    };

    if let Some(previous) = entry.in_flight.take() {
      debug!(key = %key, generation = previous.generation, "superseding in-flight fetch");
      previous.handle.abort();
    }

    entry.generation += 1;
    entry.version += 1;
    let generation = entry.generation;
    info!(key = %key, resource = %key.resource(), generation, "fetching {}", key.description());

    let cache = self.clone();
    let task_key = key.clone();
    let handle = tokio::spawn(async move {
      let result = fetch().await;
      cache.complete(&task_key, generation, result);
    })
    .abort_handle();

    entry.in_flight = Some(InFlight { generation, handle });
  }

  fn complete(&self, key: &QueryKey, generation: u64, result: Result<AnyData, ApiError>) {
    let mut entries = self.entries();
    let Some(entry) = entries.get_mut(key) else {
      return;
    };

    let current = entry.in_flight.as_ref().map(|f| f.generation);
    if current != Some(generation) {
      debug!(key = %key, generation, "discarding superseded result");
      return;
    }

    entry.in_flight = None;
    entry.version += 1;
    match result {
      Ok(data) => {
        info!(key = %key, generation, "fetch succeeded");
        entry.data = Some(data);
        entry.error = None;
        entry.fetched_at = Some(Utc::now());
        entry.invalidated = false;
      }
      Err(error) => {
        warn!(key = %key, generation, %error, "fetch failed");
        entry.error = Some(error);
      }
    }
  }
}

impl fmt::Debug for QueryCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let entries = self.entries();
    let mut keys: Vec<String> = entries.keys().map(|k| k.to_string()).collect();
    keys.sort();
    f.debug_struct("QueryCache")
      .field("keys", &keys)
      .field("stale_time", &self.inner.stale_time)
      .finish_non_exhaustive()
  }
}

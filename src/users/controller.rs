use crate::api::{ApiClient, ApiError, User, UserPatch};
use crate::cache::{QueryCache, QueryKey};
use crate::filter::filter;
use crate::query::Query;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::draft::{DraftField, EditDraft};

/// Misuse of the edit flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
  #[error("user {0} is not in the loaded list")]
  UnknownUser(u64),
  #[error("no user is being edited")]
  NoDraft,
  #[error("a save for user {0} is still in progress")]
  SaveInProgress(u64),
}

/// What the users list should render
#[derive(Debug)]
pub enum ListViewModel<'a> {
  /// First fetch in flight
  Loading,
  /// The last fetch failed; no rows are shown
  Error(&'a ApiError),
  /// Loaded, but nothing matches the search
  NoResults,
  /// Matching users in collection order
  Rows(Vec<UserRow<'a>>),
}

/// One rendered user, with the draft if that row is being edited
#[derive(Debug, Clone, Copy)]
pub struct UserRow<'a> {
  pub user: &'a User,
  pub draft: Option<&'a EditDraft>,
}

/// Outcome of the most recent save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
  Idle,
  Saving { user_id: u64 },
  Failed { user_id: u64, error: ApiError },
}

struct PendingSave {
  user_id: u64,
  sent: UserPatch,
  rx: oneshot::Receiver<Result<(), ApiError>>,
}

/// Drives the users list: fetch state, search, and the single edit draft.
///
/// The collection lives in the shared [`QueryCache`] under
/// [`QueryKey::Users`]; the controller never writes to it. Saving sends the
/// draft to the API and, once the server accepts it, invalidates the cached
/// list so the next render reflects the authoritative state.
pub struct UserListController {
  api: ApiClient,
  cache: QueryCache,
  users: Query<Vec<User>>,
  search: String,
  draft: Option<EditDraft>,
  pending_save: Option<PendingSave>,
  save_status: SaveStatus,
}

impl UserListController {
  /// Create the controller and start (or join) the users fetch.
  pub fn new(api: ApiClient, cache: QueryCache) -> Self {
    let api_for_query = api.clone();
    let mut users = Query::new(cache.clone(), QueryKey::Users, move || {
      let api = api_for_query.clone();
      async move { api.fetch_collection::<User>().await }
    });
    users.fetch();

    Self {
      api,
      cache,
      users,
      search: String::new(),
      draft: None,
      pending_save: None,
      save_status: SaveStatus::Idle,
    }
  }

  /// Pick up finished fetches and saves. Returns `true` if anything changed.
  pub fn tick(&mut self) -> bool {
    let fetched = self.users.poll();
    let saved = self.poll_save();
    if fetched {
      self.drop_orphaned_draft();
    }
    fetched || saved
  }

  /// Refetch the users list regardless of freshness
  pub fn refresh(&mut self) {
    self.users.refetch();
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn set_search(&mut self, text: impl Into<String>) {
    self.search = text.into();
  }

  /// Last fetched collection (empty while loading or after an error)
  pub fn users(&self) -> &[User] {
    self.users.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  /// Users matching the current search, in collection order
  pub fn visible_users(&self) -> Vec<&User> {
    filter(self.users(), &self.search)
  }

  pub fn is_loading(&self) -> bool {
    self.users.is_loading()
  }

  /// Background revalidation in progress (data may be stale)
  pub fn is_refreshing(&self) -> bool {
    self.users.is_fetching() && !self.users.is_loading()
  }

  pub fn view_model(&self) -> ListViewModel<'_> {
    if self.users.is_loading() {
      return ListViewModel::Loading;
    }
    if let Some(error) = self.users.error() {
      return ListViewModel::Error(error);
    }

    let rows: Vec<UserRow<'_>> = self
      .visible_users()
      .into_iter()
      .map(|user| UserRow {
        user,
        draft: self.draft.as_ref().filter(|d| d.user_id() == user.id),
      })
      .collect();

    if rows.is_empty() {
      ListViewModel::NoResults
    } else {
      ListViewModel::Rows(rows)
    }
  }

  pub fn draft(&self) -> Option<&EditDraft> {
    self.draft.as_ref()
  }

  /// Start editing a user, discarding any other unsaved draft.
  pub fn begin_edit(&mut self, user_id: u64) -> Result<(), EditError> {
    let user = self
      .users()
      .iter()
      .find(|u| u.id == user_id)
      .ok_or(EditError::UnknownUser(user_id))?;
    let draft = EditDraft::from_user(user);

    if let Some(previous) = self.draft.replace(draft) {
      if previous.user_id() != user_id {
        debug!(
          user_id = previous.user_id(),
          "discarding unsaved draft for another row"
        );
      }
    }
    Ok(())
  }

  /// Change one field of the draft
  pub fn update_draft_field(&mut self, field: DraftField, value: String) -> Result<(), EditError> {
    let draft = self.draft.as_mut().ok_or(EditError::NoDraft)?;
    draft.set(field, value);
    Ok(())
  }

  /// Drop the draft without saving
  pub fn discard(&mut self) -> Option<EditDraft> {
    self.draft.take()
  }

  /// Send the draft to the API without waiting for the response.
  ///
  /// The draft stays in place until the save completes. On success the
  /// users list is invalidated and the draft cleared, unless it was edited
  /// after the commit. On failure the error is logged, kept in
  /// [`save_status`](Self::save_status) and the draft remains open for
  /// another attempt.
  pub fn commit(&mut self) -> Result<(), EditError> {
    if let Some(pending) = &self.pending_save {
      return Err(EditError::SaveInProgress(pending.user_id));
    }
    let draft = self.draft.as_ref().ok_or(EditError::NoDraft)?;
    let user_id = draft.user_id();
    let patch = draft.patch();

    info!(user_id, "saving user");
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    let sent = patch.clone();
    tokio::spawn(async move {
      let result = api.update_user(user_id, &patch).await;
      // Receiver is gone only if the controller was dropped
      let _ = tx.send(result);
    });

    self.pending_save = Some(PendingSave { user_id, sent, rx });
    self.save_status = SaveStatus::Saving { user_id };
    Ok(())
  }

  pub fn save_status(&self) -> &SaveStatus {
    &self.save_status
  }

  pub fn is_saving(&self) -> bool {
    self.pending_save.is_some()
  }

  /// Error from the most recent save, cleared by the next successful one
  pub fn last_save_error(&self) -> Option<&ApiError> {
    match &self.save_status {
      SaveStatus::Failed { error, .. } => Some(error),
      _ => None,
    }
  }

  fn poll_save(&mut self) -> bool {
    let Some(pending) = &mut self.pending_save else {
      return false;
    };

    let result = match pending.rx.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Err(oneshot::error::TryRecvError::Closed) => {
        Err(ApiError::Network("save task ended without a result".to_string()))
      }
    };
    let user_id = pending.user_id;
    let sent = pending.sent.clone();
    self.pending_save = None;

    match result {
      Ok(()) => {
        info!(user_id, "user saved");
        self.cache.invalidate(&QueryKey::Users);
        self.cache.invalidate(&QueryKey::User { id: user_id });
        // Edits made after the commit were never sent and stay open
        let saved = self
          .draft
          .as_ref()
          .is_some_and(|d| d.user_id() == user_id && d.patch() == sent);
        if saved {
          self.draft = None;
        } else if self.draft.is_some() {
          debug!(user_id, "draft changed while saving, keeping it open");
        }
        self.save_status = SaveStatus::Idle;
      }
      Err(e) => {
        error!(user_id, error = %e, "failed to save user");
        self.save_status = SaveStatus::Failed { user_id, error: e };
      }
    }
    true
  }

  /// A draft whose user vanished from a fresh collection has nothing to save into
  fn drop_orphaned_draft(&mut self) {
    if !self.users.is_success() {
      return;
    }
    let Some(draft) = &self.draft else {
      return;
    };
    let user_id = draft.user_id();
    if !self.users().iter().any(|u| u.id == user_id) {
      warn!(user_id, "user disappeared after refetch, dropping draft");
      self.draft = None;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::fixtures::{ervin, leanne};
  use crate::config::ApiConfig;
  use mockito::{Matcher, Mock, ServerGuard};
  use std::time::Duration;

  fn api_for(server: &ServerGuard) -> ApiClient {
    ApiClient::new(&ApiConfig {
      url: server.url(),
      timeout_secs: Some(5),
    })
    .unwrap()
  }

  fn cache() -> QueryCache {
    QueryCache::new(chrono::Duration::minutes(5))
  }

  async fn mock_users(server: &mut ServerGuard, users: &[User]) -> Mock {
    server
      .mock("GET", "/users")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(serde_json::to_string(users).unwrap())
      .create_async()
      .await
  }

  async fn tick_until(
    controller: &mut UserListController,
    cond: impl Fn(&UserListController) -> bool,
  ) {
    for _ in 0..400 {
      controller.tick();
      if cond(controller) {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller never reached the expected state");
  }

  async fn loaded(server: &mut ServerGuard, users: &[User]) -> (UserListController, Mock) {
    let mock = mock_users(server, users).await;
    let mut controller = UserListController::new(api_for(server), cache());
    tick_until(&mut controller, |c| !c.is_loading()).await;
    (controller, mock)
  }

  fn row_ids(vm: ListViewModel<'_>) -> Vec<u64> {
    match vm {
      ListViewModel::Rows(rows) => rows.iter().map(|r| r.user.id).collect(),
      other => panic!("expected rows, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_loading_then_rows() {
    let mut server = mockito::Server::new_async().await;
    mock_users(&mut server, &[leanne(), ervin()]).await;

    let mut controller = UserListController::new(api_for(&server), cache());
    assert!(matches!(controller.view_model(), ListViewModel::Loading));

    tick_until(&mut controller, |c| !c.is_loading()).await;
    assert_eq!(row_ids(controller.view_model()), vec![1, 2]);
  }

  #[tokio::test]
  async fn test_search_is_case_insensitive() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne(), ervin()]).await;

    controller.set_search("graham");
    assert_eq!(row_ids(controller.view_model()), vec![1]);

    controller.set_search("");
    assert_eq!(row_ids(controller.view_model()), vec![1, 2]);
  }

  #[tokio::test]
  async fn test_empty_collection_is_no_results() {
    let mut server = mockito::Server::new_async().await;
    let (controller, _mock) = loaded(&mut server, &[]).await;

    assert!(matches!(controller.view_model(), ListViewModel::NoResults));
  }

  #[tokio::test]
  async fn test_search_without_match_is_no_results() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne(), ervin()]).await;

    controller.set_search("nobody");
    assert!(matches!(controller.view_model(), ListViewModel::NoResults));
  }

  #[tokio::test]
  async fn test_server_error_is_terminal_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/users")
      .with_status(500)
      .create_async()
      .await;

    let mut controller = UserListController::new(api_for(&server), cache());
    tick_until(&mut controller, |c| !c.is_loading()).await;

    assert!(matches!(
      controller.view_model(),
      ListViewModel::Error(ApiError::Http { status: 500 })
    ));
    assert!(controller.users().is_empty());
  }

  #[tokio::test]
  async fn test_controllers_share_cached_list() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_users(&mut server, &[leanne()]).await;
    let cache = cache();

    let mut first = UserListController::new(api_for(&server), cache.clone());
    tick_until(&mut first, |c| !c.is_loading()).await;
    let mut second = UserListController::new(api_for(&server), cache);
    second.tick();

    assert_eq!(row_ids(second.view_model()), vec![1]);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_begin_edit_snapshots_row() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne(), ervin()]).await;

    controller.begin_edit(2).unwrap();

    let draft = controller.draft().unwrap();
    assert_eq!(draft.user_id(), 2);
    assert_eq!(draft.get(DraftField::Name), "Ervin Howell");
    assert_eq!(draft.get(DraftField::Email), "Shanna@melissa.tv");
  }

  #[tokio::test]
  async fn test_begin_edit_unknown_user() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne()]).await;

    assert_eq!(controller.begin_edit(42), Err(EditError::UnknownUser(42)));
    assert!(controller.draft().is_none());
  }

  #[tokio::test]
  async fn test_editing_another_row_discards_draft() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne(), ervin()]).await;

    controller.begin_edit(1).unwrap();
    controller
      .update_draft_field(DraftField::Name, "Leanne G.".to_string())
      .unwrap();
    controller.begin_edit(2).unwrap();

    let draft = controller.draft().unwrap();
    assert_eq!(draft.user_id(), 2);
    assert_eq!(draft.get(DraftField::Name), "Ervin Howell");

    // Back on row 1, the discarded edit is gone
    controller.begin_edit(1).unwrap();
    assert_eq!(
      controller.draft().unwrap().get(DraftField::Name),
      "Leanne Graham"
    );
  }

  #[tokio::test]
  async fn test_typing_does_not_touch_cached_users() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne()]).await;

    controller.begin_edit(1).unwrap();
    controller
      .update_draft_field(DraftField::Email, "new@example.com".to_string())
      .unwrap();

    assert_eq!(controller.users()[0].email, "Sincere@april.biz");
    match controller.view_model() {
      ListViewModel::Rows(rows) => {
        assert_eq!(rows[0].user.email, "Sincere@april.biz");
        assert_eq!(
          rows[0].draft.map(|d| d.get(DraftField::Email)),
          Some("new@example.com")
        );
      }
      other => panic!("expected rows, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_draft_operations_without_draft() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne()]).await;

    assert_eq!(
      controller.update_draft_field(DraftField::Name, "x".to_string()),
      Err(EditError::NoDraft)
    );
    assert_eq!(controller.commit(), Err(EditError::NoDraft));
    assert_eq!(controller.discard(), None);
  }

  #[tokio::test]
  async fn test_save_round_trip_refetches_list() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, first_get) = loaded(&mut server, &[leanne(), ervin()]).await;

    let put = server
      .mock("PUT", "/users/1")
      .match_body(Matcher::Json(serde_json::json!({
        "name": "Leanne G.",
        "email": "Sincere@april.biz"
      })))
      .with_status(200)
      .with_body("{}")
      .create_async()
      .await;
    first_get.remove_async().await;
    let mut updated = leanne();
    updated.name = "Leanne G.".to_string();
    let second_get = mock_users(&mut server, &[updated, ervin()]).await;

    controller.begin_edit(1).unwrap();
    controller
      .update_draft_field(DraftField::Name, "Leanne G.".to_string())
      .unwrap();
    controller.commit().unwrap();
    assert_eq!(controller.save_status(), &SaveStatus::Saving { user_id: 1 });
    assert!(controller.draft().is_some());

    tick_until(&mut controller, |c| {
      !c.is_saving() && c.users().first().map(|u| u.name.as_str()) == Some("Leanne G.")
    })
    .await;

    assert!(controller.draft().is_none());
    assert_eq!(controller.save_status(), &SaveStatus::Idle);
    put.assert_async().await;
    second_get.assert_async().await;
  }

  #[tokio::test]
  async fn test_failed_save_keeps_draft_and_skips_refetch() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, get) = loaded(&mut server, &[leanne()]).await;
    server
      .mock("PUT", "/users/1")
      .with_status(500)
      .create_async()
      .await;

    controller.begin_edit(1).unwrap();
    controller.commit().unwrap();
    tick_until(&mut controller, |c| !c.is_saving()).await;

    assert_eq!(
      controller.save_status(),
      &SaveStatus::Failed {
        user_id: 1,
        error: ApiError::Http { status: 500 },
      }
    );
    assert_eq!(
      controller.last_save_error(),
      Some(&ApiError::Http { status: 500 })
    );
    assert_eq!(controller.draft().map(EditDraft::user_id), Some(1));
    assert!(!controller.is_refreshing());
    // Hit once by the initial load only
    get.assert_async().await;
  }

  async fn mock_put(server: &mut ServerGuard) -> Mock {
    server
      .mock("PUT", "/users/1")
      .with_status(200)
      .with_body("{}")
      .create_async()
      .await
  }

  #[tokio::test]
  async fn test_reopened_draft_survives_earlier_save() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _get) = loaded(&mut server, &[leanne()]).await;
    let put = mock_put(&mut server).await;

    controller.begin_edit(1).unwrap();
    controller
      .update_draft_field(DraftField::Name, "Leanne G.".to_string())
      .unwrap();
    controller.commit().unwrap();
    controller.discard();
    controller.begin_edit(1).unwrap();
    controller
      .update_draft_field(DraftField::Name, "Unsaved new edit".to_string())
      .unwrap();

    tick_until(&mut controller, |c| !c.is_saving()).await;

    put.assert_async().await;
    assert_eq!(controller.save_status(), &SaveStatus::Idle);
    assert_eq!(
      controller.draft().map(|d| d.get(DraftField::Name)),
      Some("Unsaved new edit")
    );
  }

  #[tokio::test]
  async fn test_edits_typed_after_commit_are_kept() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _get) = loaded(&mut server, &[leanne()]).await;
    let put = mock_put(&mut server).await;

    controller.begin_edit(1).unwrap();
    controller.commit().unwrap();
    controller
      .update_draft_field(DraftField::Email, "later@example.com".to_string())
      .unwrap();

    tick_until(&mut controller, |c| !c.is_saving()).await;

    put.assert_async().await;
    assert_eq!(
      controller.draft().map(|d| d.get(DraftField::Email)),
      Some("later@example.com")
    );
  }

  #[tokio::test]
  async fn test_commit_while_saving_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, _mock) = loaded(&mut server, &[leanne()]).await;
    server
      .mock("PUT", "/users/1")
      .with_status(200)
      .create_async()
      .await;

    controller.begin_edit(1).unwrap();
    controller.commit().unwrap();
    assert_eq!(controller.commit(), Err(EditError::SaveInProgress(1)));
  }

  #[tokio::test]
  async fn test_orphaned_draft_is_dropped_after_refetch() {
    let mut server = mockito::Server::new_async().await;
    let (mut controller, first_get) = loaded(&mut server, &[leanne(), ervin()]).await;

    controller.begin_edit(2).unwrap();
    first_get.remove_async().await;
    mock_users(&mut server, &[leanne()]).await;

    controller.refresh();
    tick_until(&mut controller, |c| !c.is_refreshing() && c.users().len() == 1).await;

    assert!(controller.draft().is_none());
  }
}

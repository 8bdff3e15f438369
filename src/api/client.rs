use crate::api::error::ApiError;
use crate::api::types::{Resource, ResourceKind, UserPatch};
use crate::config::ApiConfig;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// JSONPlaceholder API client
#[derive(Clone, Debug)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: Url,
}

impl ApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    // Parse with a trailing slash so joined paths stay under the base path
    let base_url = Url::parse(&format!("{}/", config.url.trim_end_matches('/')))
      .map_err(|e| eyre!("Invalid API url {}: {}", config.url, e))?;

    let mut builder = reqwest::Client::builder().user_agent(concat!(
      env!("CARGO_PKG_NAME"),
      "/",
      env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = config.timeout() {
      builder = builder.timeout(timeout);
    }
    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    self
      .base_url
      .join(path)
      .map_err(|e| ApiError::Network(format!("invalid request path {}: {}", path, e)))
  }

  /// Fetch a whole collection: `GET /{kind}`
  pub async fn fetch_collection<T: Resource>(&self) -> Result<Vec<T>, ApiError> {
    self.get_json(T::KIND.path(), &[]).await
  }

  /// Fetch the part of a collection matching a field: `GET /{kind}?{field}={value}`
  pub async fn fetch_collection_where<T: Resource>(
    &self,
    field: &str,
    value: &str,
  ) -> Result<Vec<T>, ApiError> {
    self.get_json(T::KIND.path(), &[(field, value)]).await
  }

  /// Fetch a single entity: `GET /{kind}/{id}`
  pub async fn fetch_one<T: Resource>(&self, id: u64) -> Result<T, ApiError> {
    self
      .get_json(&format!("{}/{}", T::KIND.path(), id), &[])
      .await
  }

  /// Replace the editable fields of a user: `PUT /users/{id}`
  ///
  /// Only the status is checked; the echoed body is ignored.
  pub async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<(), ApiError> {
    self.update_entity(ResourceKind::Users, id, patch).await
  }

  /// Send a full replacement body for one entity: `PUT /{kind}/{id}`
  pub async fn update_entity<B: serde::Serialize + ?Sized>(
    &self,
    kind: ResourceKind,
    id: u64,
    body: &B,
  ) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("{}/{}", kind.path(), id))?;
    info!(%url, "updating {} {}", kind, id);

    let response = self
      .http
      .put(url)
      .header(CONTENT_TYPE, "application/json")
      .json(body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::from_status(status));
    }
    Ok(())
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T, ApiError> {
    let mut url = self.endpoint(path)?;
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query.iter());
    }
    debug!(%url, "GET");

    let response = self
      .http
      .get(url)
      .header(ACCEPT, "application/json")
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::from_status(status));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::fixtures::{ervin, leanne, post};
  use crate::api::types::{Post, User};
  use mockito::Matcher;

  fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&ApiConfig {
      url: server.url(),
      timeout_secs: Some(5),
    })
    .unwrap()
  }

  #[tokio::test]
  async fn test_fetch_collection() {
    let mut server = mockito::Server::new_async().await;
    let body = serde_json::to_string(&vec![leanne(), ervin()]).unwrap();
    let mock = server
      .mock("GET", "/users")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(body)
      .create_async()
      .await;

    let users: Vec<User> = client_for(&server).fetch_collection().await.unwrap();

    mock.assert_async().await;
    assert_eq!(users, vec![leanne(), ervin()]);
  }

  #[tokio::test]
  async fn test_fetch_collection_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/users")
      .with_status(500)
      .create_async()
      .await;

    let result = client_for(&server).fetch_collection::<User>().await;

    assert_eq!(result, Err(ApiError::Http { status: 500 }));
  }

  #[tokio::test]
  async fn test_fetch_collection_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/users")
      .with_status(200)
      .with_body(r#"[{"id": 1, "name": "Leanne Graham"}]"#)
      .create_async()
      .await;

    let result = client_for(&server).fetch_collection::<User>().await;

    assert!(matches!(result, Err(ApiError::Parse(_))));
  }

  #[tokio::test]
  async fn test_fetch_collection_where_sends_query() {
    let mut server = mockito::Server::new_async().await;
    let body = serde_json::to_string(&vec![post(1, 2, "title", "body")]).unwrap();
    let mock = server
      .mock("GET", "/posts")
      .match_query(Matcher::UrlEncoded("userId".into(), "2".into()))
      .with_status(200)
      .with_body(body)
      .create_async()
      .await;

    let posts: Vec<Post> = client_for(&server)
      .fetch_collection_where("userId", "2")
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].user_id, 2);
  }

  #[tokio::test]
  async fn test_fetch_one() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/users/2")
      .with_status(200)
      .with_body(serde_json::to_string(&ervin()).unwrap())
      .create_async()
      .await;

    let user: User = client_for(&server).fetch_one(2).await.unwrap();

    assert_eq!(user.name, "Ervin Howell");
  }

  #[tokio::test]
  async fn test_update_user_sends_patch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("PUT", "/users/1")
      .match_header("content-type", "application/json")
      .match_body(Matcher::Json(serde_json::json!({
        "name": "Leanne G.",
        "email": "leanne@example.com"
      })))
      .with_status(200)
      .with_body("{}")
      .create_async()
      .await;

    let patch = UserPatch {
      name: "Leanne G.".to_string(),
      email: "leanne@example.com".to_string(),
    };
    client_for(&server).update_user(1, &patch).await.unwrap();

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_update_user_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("PUT", "/users/1")
      .with_status(404)
      .create_async()
      .await;

    let patch = UserPatch {
      name: "x".to_string(),
      email: "y".to_string(),
    };
    let result = client_for(&server).update_user(1, &patch).await;

    assert_eq!(result, Err(ApiError::Http { status: 404 }));
  }

  #[tokio::test]
  async fn test_network_error() {
    // Nothing listens on port 9 (discard) on the loopback in test environments
    let client = ApiClient::new(&ApiConfig {
      url: "http://127.0.0.1:9".to_string(),
      timeout_secs: Some(2),
    })
    .unwrap();

    let result = client.fetch_collection::<User>().await;

    assert!(matches!(result, Err(ApiError::Network(_))));
  }

  #[test]
  fn test_base_url_keeps_path_prefix() {
    let client = ApiClient::new(&ApiConfig {
      url: "https://example.com/api".to_string(),
      timeout_secs: None,
    })
    .unwrap();
    assert_eq!(
      client.endpoint("users/1").unwrap().as_str(),
      "https://example.com/api/users/1"
    );
  }
}

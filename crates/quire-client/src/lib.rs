//! # Quire Client
//!
//! Typed wrapper over the posts API. One request per call: no retries and
//! no timeout beyond what the underlying `reqwest::Client` is configured with.

mod error;

pub use error::ClientError;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use quire_shared::{
    CreatePostRequest, DeletePostResponse, ErrorResponse, PostResponse, UpdatePostRequest,
};

/// Client for `/api/posts` on one server.
#[derive(Debug, Clone)]
pub struct PostsClient {
    base_url: String,
    http: reqwest::Client,
}

impl PostsClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn posts_url(&self) -> String {
        format!("{}/api/posts", self.base_url)
    }

    fn post_url(&self, id: i32) -> String {
        format!("{}/api/posts/{}", self.base_url, id)
    }

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        let response = self.http.get(self.posts_url()).send().await?;
        decode(response, "Failed to fetch posts").await
    }

    /// `Ok(None)` when the server has no post with this id.
    pub async fn get_post(&self, id: i32) -> Result<Option<PostResponse>, ClientError> {
        let response = self.http.get(self.post_url(id)).send().await?;
        match decode(response, "Failed to fetch post").await {
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            other => other.map(Some),
        }
    }

    pub async fn create_post(
        &self,
        request: &CreatePostRequest,
    ) -> Result<PostResponse, ClientError> {
        let response = self.http.post(self.posts_url()).json(request).send().await?;
        decode(response, "Failed to create post").await
    }

    pub async fn update_post(
        &self,
        id: i32,
        request: &UpdatePostRequest,
    ) -> Result<PostResponse, ClientError> {
        let response = self.http.put(self.post_url(id)).json(request).send().await?;
        decode(response, "Failed to update post").await
    }

    pub async fn delete_post(&self, id: i32) -> Result<DeletePostResponse, ClientError> {
        let response = self.http.delete(self.post_url(id)).send().await?;
        decode(response, "Failed to delete post").await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, fallback);
    tracing::debug!(status = status.as_u16(), %message, "Posts API request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// The `error` field of an error body, or `fallback` when there is none.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

//! Post service - validation and sanitization in front of the post store.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::{NewPost, Post, PostChanges};
use crate::error::{DomainError, RepoError};
use crate::ports::{ContentSanitizer, PostRepository};

const ENTITY: &str = "Post";

/// How `PUT /posts/{id}` treats an id with no stored post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PutMode {
    /// Create the post at that id.
    #[default]
    Upsert,
    /// Report the post as not found.
    Strict,
}

impl FromStr for PutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upsert" => Ok(Self::Upsert),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown put mode '{other}'")),
        }
    }
}

/// Post operations shared by the JSON API and the page views.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    sanitizer: Arc<dyn ContentSanitizer>,
    put_mode: PutMode,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, sanitizer: Arc<dyn ContentSanitizer>) -> Self {
        Self {
            posts,
            sanitizer,
            put_mode: PutMode::default(),
        }
    }

    pub fn with_put_mode(mut self, put_mode: PutMode) -> Self {
        self.put_mode = put_mode;
        self
    }

    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list().await?)
    }

    pub async fn get(&self, id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            })
    }

    pub async fn create(
        &self,
        user_id: Option<i32>,
        title: &str,
        body: &str,
    ) -> Result<Post, DomainError> {
        // Validate what will be stored: a body can sanitize down to nothing.
        let post = NewPost::new(user_id, title, self.sanitizer.sanitize(body))?;

        let created = self.posts.create(post).await?;
        tracing::info!(post_id = created.id, "Post created");
        Ok(created)
    }

    /// Update the post at `id`, creating it first when the put mode allows.
    pub async fn put(&self, id: i32, mut changes: PostChanges) -> Result<Post, DomainError> {
        if let Some(body) = changes.body.as_deref() {
            changes.body = Some(self.sanitizer.sanitize(body));
        }
        changes.validate()?;

        let result = match self.put_mode {
            PutMode::Strict => self.posts.update(id, changes).await,
            PutMode::Upsert => self.posts.upsert(id, changes).await,
        };

        match result {
            Ok(post) => {
                tracing::info!(post_id = post.id, mode = ?self.put_mode, "Post written");
                Ok(post)
            }
            // An upsert only misses when the post is absent and the changes are partial.
            Err(RepoError::NotFound) if self.put_mode == PutMode::Upsert => Err(
                DomainError::Validation("Title and body are required to create a post".to_string()),
            ),
            Err(RepoError::NotFound) => Err(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        match self.posts.delete(id).await {
            Ok(()) => {
                tracing::info!(post_id = id, "Post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

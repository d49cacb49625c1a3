use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostChanges};
use crate::error::RepoError;

/// Generic repository trait defining the key-based operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` if absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository - the only owner of persisted posts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// All posts, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// Insert a post, assigning its id and timestamps.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Apply `changes` to the post at `id`, or insert a post at `id` when none exists.
    ///
    /// Inserting requires both title and body; otherwise `RepoError::NotFound`.
    async fn upsert(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;

    /// Apply `changes` to an existing post. Fails with `RepoError::NotFound` if absent.
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;
}

//! In-memory post store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quire_core::domain::{NewPost, Post, PostChanges};
use quire_core::error::RepoError;
use quire_core::ports::{BaseRepository, PostRepository};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Post>,
    last_id: i32,
}

impl Table {
    fn insert(&mut self, id: i32, post: NewPost) -> Post {
        let now = Utc::now();
        let post = Post {
            id,
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            created_at: now,
            updated_at: now,
        };
        self.last_id = self.last_id.max(id);
        self.rows.insert(id, post.clone());
        post
    }
}

/// In-memory post repository backed by a `BTreeMap` under an async `RwLock`.
///
/// This is the fallback when `DATABASE_URL` is not set.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    table: RwLock<Table>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table.rows.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepoError::Constraint("post id space exhausted".to_string()))?;
        Ok(table.insert(id, post))
    }

    async fn upsert(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        // One write guard for the whole read-modify-write.
        let mut table = self.table.write().await;

        if let Some(post) = table.rows.get_mut(&id) {
            post.apply(changes, Utc::now());
            return Ok(post.clone());
        }

        let post = changes.to_new_post().ok_or(RepoError::NotFound)?;
        Ok(table.insert(id, post))
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let post = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(changes, Utc::now());
        Ok(post.clone())
    }
}

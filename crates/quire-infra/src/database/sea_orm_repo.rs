//! SeaORM post store.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use quire_core::domain::{NewPost, Post, PostChanges};
use quire_core::error::RepoError;
use quire_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};
use super::sea_orm_base::{SeaOrmBaseRepository, map_db_err};

/// SeaORM post repository.
pub type SeaOrmPostRepository = SeaOrmBaseRepository<PostEntity>;

/// Re-aligns the `id` sequence after a row was inserted with an explicit id.
const SYNC_ID_SEQUENCE: &str = "SELECT setval(pg_get_serial_sequence('posts', 'id'), \
     GREATEST((SELECT MAX(id) FROM posts), 1))";

impl SeaOrmPostRepository {
    /// Apply `changes` to the locked row at `id`, if there is one.
    async fn update_locked(
        txn: &DatabaseTransaction,
        id: i32,
        changes: &PostChanges,
    ) -> Result<Option<post::Model>, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(map_db_err)?;

        let Some(model) = existing else {
            return Ok(None);
        };

        let mut active: post::ActiveModel = model.into();
        if let Some(title) = &changes.title {
            active.title = Set(title.clone());
        }
        if let Some(body) = &changes.body {
            active.body = Set(body.clone());
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(txn).await.map_err(map_db_err)?;
        Ok(Some(updated))
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::for_insert(new_post, None, Utc::now().into())
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(post_id = model.id, "Inserted post");
        Ok(model.into())
    }

    async fn upsert(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = match Self::update_locked(&txn, id, &changes).await? {
            Some(updated) => updated,
            None => {
                let new_post = changes.to_new_post().ok_or(RepoError::NotFound)?;
                let inserted = post::ActiveModel::for_insert(new_post, Some(id), Utc::now().into())
                    .insert(&txn)
                    .await
                    .map_err(map_db_err)?;
                txn.execute_unprepared(SYNC_ID_SEQUENCE)
                    .await
                    .map_err(map_db_err)?;
                tracing::debug!(post_id = id, "Inserted post at explicit id");
                inserted
            }
        };

        txn.commit().await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = Self::update_locked(&txn, id, &changes)
            .await?
            .ok_or(RepoError::NotFound)?;

        txn.commit().await.map_err(map_db_err)?;
        Ok(model.into())
    }
}

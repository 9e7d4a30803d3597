use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::models::User;
use std::sync::Arc;

#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn BlogStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Idempotent follow; returns true if a new edge was inserted.
    /// Following yourself is a no-op.
    pub async fn follow(&self, follower_id: i64, author_username: &str) -> Result<bool> {
        let author = self.resolve(author_username).await?;

        if author.id == follower_id {
            tracing::debug!(follower_id, "self-follow ignored");
            return Ok(false);
        }

        let inserted = self.store.insert_follow(author.id, follower_id).await?;
        if inserted {
            tracing::info!(follower_id, author_id = author.id, "follow created");
        }
        Ok(inserted)
    }

    /// Idempotent unfollow; returns true if an edge was removed.
    pub async fn unfollow(&self, follower_id: i64, author_username: &str) -> Result<bool> {
        let author = self.resolve(author_username).await?;

        let removed = self.store.delete_follow(author.id, follower_id).await?;
        if removed {
            tracing::info!(follower_id, author_id = author.id, "follow removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        self.store.follow_exists(author_id, follower_id).await
    }

    async fn resolve(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }
}

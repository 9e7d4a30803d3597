use super::{comment_repo, post_repo, BlogStore};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Group, NewComment, NewGroup, NewPost, Post, PostFilter, PostUpdate, User,
};
use sqlx::PgPool;

/// `BlogStore` backed by PostgreSQL. Referential rules live in the schema
/// (`migrations/0001_init.sql`).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BlogStore for PgStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, description, slug)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, slug
            "#,
        )
        .bind(&group.title)
        .bind(&group.description)
        .bind(&group.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, description, slug FROM groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, description, slug FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        Ok(post_repo::insert_post(&self.pool, post).await?)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(post_repo::find_post(&self.pool, post_id).await?)
    }

    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        update: &PostUpdate,
    ) -> Result<Option<Post>> {
        Ok(post_repo::update_post(&self.pool, post_id, author_id, update).await?)
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(post_repo::delete_post(&self.pool, post_id).await?)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        Ok(post_repo::count_posts(&self.pool, filter).await?)
    }

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        Ok(post_repo::list_posts(&self.pool, filter, limit, offset).await?)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Option<Comment>> {
        Ok(comment_repo::insert_comment(&self.pool, comment).await?)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(comment_repo::list_comments(&self.pool, post_id).await?)
    }

    async fn insert_follow(&self, author_id: i64, user_id: i64) -> Result<bool> {
        if author_id == user_id {
            return Err(AppError::BadRequest("users cannot follow themselves".to_string()));
        }

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO follows (author_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (author_id, user_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn delete_follow(&self, author_id: i64, user_id: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM follows WHERE author_id = $1 AND user_id = $2")
            .bind(author_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn follow_exists(&self, author_id: i64, user_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE author_id = $1 AND user_id = $2)",
        )
        .bind(author_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

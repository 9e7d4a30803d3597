use crate::error::Result;
use crate::models::{
    Comment, Group, NewComment, NewGroup, NewPost, Post, PostFilter, PostUpdate, User,
};

/// Storage operations for users, groups, posts, comments and follow edges.
///
/// Each mutating method is atomic. Implementations enforce the referential
/// rules of the schema: deleting a user removes their posts, comments and
/// follow edges; deleting a post removes its comments; deleting a group
/// untags its posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BlogStore: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns false if no such user existed.
    async fn delete_user(&self, user_id: i64) -> Result<bool>;

    /// Fails with `Conflict` on a duplicate slug.
    async fn create_group(&self, group: &NewGroup) -> Result<Group>;

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn delete_group(&self, group_id: i64) -> Result<bool>;

    async fn insert_post(&self, post: &NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Applies `update` only if the post exists and belongs to `author_id`.
    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        update: &PostUpdate,
    ) -> Result<Option<Post>>;

    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    /// Newest first, ties broken by descending id.
    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>>;

    /// Returns `None` if the post does not exist at insert time.
    async fn insert_comment(&self, comment: &NewComment) -> Result<Option<Comment>>;

    /// Oldest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Returns true if a new edge was inserted.
    async fn insert_follow(&self, author_id: i64, user_id: i64) -> Result<bool>;

    /// Returns true if an edge was removed.
    async fn delete_follow(&self, author_id: i64, user_id: i64) -> Result<bool>;

    async fn follow_exists(&self, author_id: i64, user_id: i64) -> Result<bool>;

    async fn count_followers(&self, author_id: i64) -> Result<i64>;

    /// Liveness check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

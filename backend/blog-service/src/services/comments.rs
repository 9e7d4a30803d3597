/// Comment operations of the content service
use super::ContentService;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentForm, NewComment};
use validator::Validate;

impl ContentService {
    /// Comment on a post. Any authenticated user may comment on any post.
    pub async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        form: CommentForm,
    ) -> Result<Comment> {
        form.validate()?;

        let comment = self
            .store
            .insert_comment(&NewComment {
                post_id,
                author_id,
                text: form.text,
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        tracing::info!(comment_id = comment.id, post_id, author_id, "comment added");

        Ok(comment)
    }

    /// Comments of a post, oldest first
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        self.store.list_comments(post_id).await
    }
}

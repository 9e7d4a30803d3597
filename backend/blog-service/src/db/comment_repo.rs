use crate::models::{Comment, NewComment};
use sqlx::PgPool;

/// Create a comment, holding a share lock on the post so a concurrent
/// delete cannot leave the comment dangling. Returns `None` if the post
/// is gone.
pub async fn insert_comment(
    pool: &PgPool,
    comment: &NewComment,
) -> Result<Option<Comment>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let post_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 FOR SHARE")
        .bind(comment.post_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

    if !post_exists {
        tx.rollback().await?;
        return Ok(None);
    }

    let created = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, author_id, text, created_at
        "#,
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.text)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(created))
}

/// Get all comments for a post, oldest first
pub async fn list_comments(pool: &PgPool, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, author_id, text, created_at
        FROM comments
        WHERE post_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

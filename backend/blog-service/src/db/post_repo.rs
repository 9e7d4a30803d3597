use crate::models::{ImageChange, NewPost, Post, PostFilter, PostUpdate};
use sqlx::PgPool;

const POST_COLUMNS: &str = "id, text, created_at, author_id, group_id, image";

/// Insert a post; id and created_at come from the database
pub async fn insert_post(pool: &PgPool, post: &NewPost) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES ($1, $2, $3, $4)
        RETURNING id, text, created_at, author_id, group_id, image
        "#,
    )
    .bind(&post.text)
    .bind(post.author_id)
    .bind(post.group_id)
    .bind(&post.image)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Get a single post by ID
pub async fn find_post(pool: &PgPool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, text, created_at, author_id, group_id, image
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Update the mutable fields of a post owned by `author_id`
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
    update: &PostUpdate,
) -> Result<Option<Post>, sqlx::Error> {
    let (touch_image, new_image) = match &update.image {
        ImageChange::Keep => (false, None),
        ImageChange::Replace(key) => (true, Some(key.as_str())),
        ImageChange::Clear => (true, None),
    };

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET text = $1,
            group_id = $2,
            image = CASE WHEN $3 THEN $4 ELSE image END
        WHERE id = $5 AND author_id = $6
        RETURNING id, text, created_at, author_id, group_id, image
        "#,
    )
    .bind(&update.text)
    .bind(update.group_id)
    .bind(touch_image)
    .bind(new_image)
    .bind(post_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Hard delete; comments go with it through the foreign key
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count posts matching a listing filter
pub async fn count_posts(pool: &PgPool, filter: PostFilter) -> Result<i64, sqlx::Error> {
    let count = match filter {
        PostFilter::All => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
                .fetch_one(pool)
                .await?
        }
        PostFilter::Group(group_id) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE group_id = $1")
                .bind(group_id)
                .fetch_one(pool)
                .await?
        }
        PostFilter::Author(author_id) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(pool)
                .await?
        }
        PostFilter::FollowedBy(user_id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM posts p
                JOIN follows f ON f.author_id = p.author_id
                WHERE f.user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_one(pool)
            .await?
        }
    };

    Ok(count)
}

/// Fetch one window of a listing, newest first
pub async fn list_posts(
    pool: &PgPool,
    filter: PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = match filter {
        PostFilter::All => {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts \
                 ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        PostFilter::Group(group_id) => {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE group_id = $1 \
                 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(group_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        PostFilter::Author(author_id) => {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 \
                 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(author_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        PostFilter::FollowedBy(user_id) => {
            sqlx::query_as::<_, Post>(
                r#"
                SELECT p.id, p.text, p.created_at, p.author_id, p.group_id, p.image
                FROM posts p
                JOIN follows f ON f.author_id = p.author_id
                WHERE f.user_id = $1
                ORDER BY p.created_at DESC, p.id DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(posts)
}

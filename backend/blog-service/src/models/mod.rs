/// Data models for blog-service
///
/// - Row types mirroring the `users`, `groups`, `posts`, `comments` and
///   `follows` tables
/// - Insert/update payloads handed to the store
/// - Read models assembled by the services (`PostDetail`, `Profile`)
/// - Validated input forms and page windows (submodules)
pub mod forms;
pub mod page;

pub use forms::{username_is_valid, CommentForm, NewGroup, PostForm};
pub use page::{Page, PageNumber, PageWindow, Paginator};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity mirrored from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    /// Opaque key of an attachment held by external storage
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Directed edge: `user_id` follows `author_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub author_id: i64,
    pub user_id: i64,
}

/// Post insert payload; id and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// What happens to the attachment on edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Keep,
    Replace(String),
    Clear,
}

/// Mutable post fields; author, id and `created_at` never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: ImageChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

/// Selects which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows
    FollowedBy(i64),
}

/// Post with everything the read-only post view shows
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
    pub author_posts_count: i64,
    pub comments: Vec<Comment>,
}

/// Author profile with a page of their posts
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub author: User,
    pub posts_count: i64,
    pub followers_count: i64,
    /// Whether the viewer follows this author
    pub following: bool,
    pub page: Page<Post>,
}

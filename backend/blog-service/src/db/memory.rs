//! In-process `BlogStore`.
//!
//! Tables live behind one `RwLock`, so every mutation is a single critical
//! section. Cascade and set-null rules are applied by hand to match the
//! PostgreSQL schema.

use super::BlogStore;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Follow, Group, ImageChange, NewComment, NewGroup, NewPost, Post, PostFilter,
    PostUpdate, User,
};
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<i64, Follow>,
}

impl Tables {
    /// One sequence for every table; ids only need to be unique and increasing.
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != post_id);
        }
        removed
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                username
            )));
        }
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        let authored: Vec<i64> = tables
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != user_id);
        tables
            .follows
            .retain(|_, f| f.author_id != user_id && f.user_id != user_id);

        Ok(true)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(AppError::Conflict(format!(
                "group slug '{}' is taken",
                group.slug
            )));
        }
        let group = Group {
            id: tables.next_id(),
            title: group.title.clone(),
            description: group.description.clone(),
            slug: group.slug.clone(),
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&group_id).cloned())
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&group_id).is_none() {
            return Ok(false);
        }
        for post in tables.posts.values_mut() {
            if post.group_id == Some(group_id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(AppError::NotFound(format!("user {}", post.author_id)));
        }
        if let Some(group_id) = post.group_id {
            if !tables.groups.contains_key(&group_id) {
                return Err(AppError::NotFound(format!("group {}", group_id)));
            }
        }
        let post = Post {
            id: tables.next_id(),
            text: post.text.clone(),
            created_at: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image.clone(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&post_id).cloned())
    }

    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        update: &PostUpdate,
    ) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        if let Some(group_id) = update.group_id {
            if !tables.groups.contains_key(&group_id) {
                return Err(AppError::NotFound(format!("group {}", group_id)));
            }
        }
        let post = match tables.posts.get_mut(&post_id) {
            Some(post) if post.author_id == author_id => post,
            _ => return Ok(None),
        };
        post.text = update.text.clone();
        post.group_id = update.group_id;
        match &update.image {
            ImageChange::Keep => {}
            ImageChange::Replace(key) => post.image = Some(key.clone()),
            ImageChange::Clear => post.image = None,
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.tables.write().await.remove_post(post_id))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|p| tables.matches(p, filter))
            .count();
        Ok(count as i64)
    }

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| tables.matches(p, filter))
            .cloned()
            .collect();
        posts.sort_by_key(|p| Reverse((p.created_at, p.id)));

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Option<Comment>> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Ok(None);
        }
        if !tables.users.contains_key(&comment.author_id) {
            return Err(AppError::NotFound(format!("user {}", comment.author_id)));
        }
        let comment = Comment {
            id: tables.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(Some(comment))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn insert_follow(&self, author_id: i64, user_id: i64) -> Result<bool> {
        if author_id == user_id {
            return Err(AppError::BadRequest("users cannot follow themselves".to_string()));
        }
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&author_id) || !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound("follow endpoint user".to_string()));
        }
        let exists = tables
            .follows
            .values()
            .any(|f| f.author_id == author_id && f.user_id == user_id);
        if exists {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.follows.insert(
            id,
            Follow {
                id,
                author_id,
                user_id,
            },
        );
        Ok(true)
    }

    async fn delete_follow(&self, author_id: i64, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.author_id == author_id && f.user_id == user_id));
        Ok(tables.follows.len() < before)
    }

    async fn follow_exists(&self, author_id: i64, user_id: i64) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.author_id == author_id && f.user_id == user_id))
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.author_id == author_id)
            .count() as i64)
    }
}

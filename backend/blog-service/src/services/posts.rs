/// Content service - post creation, editing and the read-only post view
use crate::cache::ListingCache;
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::models::{ImageChange, NewPost, Post, PostDetail, PostFilter, PostForm, PostUpdate};
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct ContentService {
    pub(super) store: Arc<dyn BlogStore>,
    cache: Arc<ListingCache>,
}

impl ContentService {
    pub fn new(store: Arc<dyn BlogStore>, cache: Arc<ListingCache>) -> Self {
        Self { store, cache }
    }

    /// Create a post authored by `author_id`
    pub async fn create_post(&self, author_id: i64, form: PostForm) -> Result<Post> {
        form.validate()?;
        self.ensure_user(author_id).await?;
        self.ensure_group(form.group).await?;

        let post = self
            .store
            .insert_post(&NewPost {
                author_id,
                text: form.text,
                group_id: form.group,
                image: form.image,
            })
            .await?;

        self.cache.invalidate_all();
        tracing::info!(post_id = post.id, author_id, group_id = ?post.group_id, "post created");

        Ok(post)
    }

    /// Edit a post; only its author may do so
    pub async fn edit_post(&self, editor_id: i64, post_id: i64, form: PostForm) -> Result<Post> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.author_id != editor_id {
            tracing::warn!(post_id, editor_id, author_id = post.author_id, "edit rejected");
            return Err(AppError::Forbidden(
                "only the author can edit this post".to_string(),
            ));
        }

        form.validate()?;
        self.ensure_group(form.group).await?;

        let image = match (form.image, form.clear_image) {
            (Some(key), _) => ImageChange::Replace(key),
            (None, true) => ImageChange::Clear,
            (None, false) => ImageChange::Keep,
        };
        let update = PostUpdate {
            text: form.text,
            group_id: form.group,
            image,
        };

        // A concurrent delete between the lookup and the update surfaces here.
        let updated = self
            .store
            .update_post(post_id, editor_id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        self.cache.invalidate_all();
        tracing::info!(post_id, editor_id, "post edited");

        Ok(updated)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Post with author, group, author's post count and comments
    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail> {
        let post = self.get_post(post_id).await?;

        let author = self
            .store
            .find_user(post.author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", post.author_id)))?;
        let group = match post.group_id {
            Some(group_id) => self.store.find_group(group_id).await?,
            None => None,
        };
        let author_posts_count = self
            .store
            .count_posts(PostFilter::Author(author.id))
            .await?;
        let comments = self.store.list_comments(post.id).await?;

        Ok(PostDetail {
            post,
            author,
            group,
            author_posts_count,
            comments,
        })
    }

    async fn ensure_user(&self, user_id: i64) -> Result<()> {
        match self.store.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("user {}", user_id))),
        }
    }

    async fn ensure_group(&self, group_id: Option<i64>) -> Result<()> {
        let Some(group_id) = group_id else {
            return Ok(());
        };
        match self.store.find_group(group_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("group {}", group_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockBlogStore};
    use crate::models::{NewGroup, User};
    use chrono::Utc;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ContentService,
        author: User,
        group_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let author = store.create_user("auth").await.unwrap();
        let group = store
            .create_group(&NewGroup {
                title: "Тестовая группа".to_string(),
                description: "Тестовое описание".to_string(),
                slug: "test-slug".to_string(),
            })
            .await
            .unwrap();
        let service = ContentService::new(store.clone(), Arc::new(ListingCache::disabled()));
        Fixture {
            store,
            service,
            author,
            group_id: group.id,
        }
    }

    fn form(text: &str, group: Option<i64>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_post_assigns_author_and_group() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("Тестовый пост", Some(fx.group_id)))
            .await
            .unwrap();

        assert_eq!(post.author_id, fx.author.id);
        assert_eq!(post.group_id, Some(fx.group_id));
        assert_eq!(post.text, "Тестовый пост");
    }

    #[tokio::test]
    async fn create_post_with_unknown_group_is_not_found() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_post(fx.author.id, form("text", Some(9999)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(fx.store.count_posts(PostFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_post_rejects_blank_text() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_post(fx.author.id, form("  ", None))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.get("text").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_author_edit_is_forbidden_and_leaves_post_unchanged() {
        let fx = fixture().await;
        let intruder = fx.store.create_user("intruder").await.unwrap();
        let post = fx
            .service
            .create_post(fx.author.id, form("original", Some(fx.group_id)))
            .await
            .unwrap();

        let err = fx
            .service
            .edit_post(intruder.id, post.id, form("changed", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(fx.service.get_post(post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn author_edit_keeps_identity_and_timestamp() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("original", Some(fx.group_id)))
            .await
            .unwrap();

        let edited = fx
            .service
            .edit_post(fx.author.id, post.id, form("edited", None))
            .await
            .unwrap();

        assert_eq!(edited.id, post.id);
        assert_eq!(edited.author_id, post.author_id);
        assert_eq!(edited.created_at, post.created_at);
        assert_eq!(edited.text, "edited");
        assert_eq!(edited.group_id, None);
    }

    #[tokio::test]
    async fn edit_image_keep_replace_clear() {
        let fx = fixture().await;
        let mut create = form("with image", None);
        create.image = Some("posts/one.png".to_string());
        let post = fx.service.create_post(fx.author.id, create).await.unwrap();

        let kept = fx
            .service
            .edit_post(fx.author.id, post.id, form("no image field", None))
            .await
            .unwrap();
        assert_eq!(kept.image.as_deref(), Some("posts/one.png"));

        let mut replace = form("replace", None);
        replace.image = Some("posts/two.png".to_string());
        let replaced = fx
            .service
            .edit_post(fx.author.id, post.id, replace)
            .await
            .unwrap();
        assert_eq!(replaced.image.as_deref(), Some("posts/two.png"));

        let mut clear = form("clear", None);
        clear.clear_image = true;
        let cleared = fx
            .service
            .edit_post(fx.author.id, post.id, clear)
            .await
            .unwrap();
        assert_eq!(cleared.image, None);
    }

    #[tokio::test]
    async fn edit_missing_post_is_not_found() {
        let fx = fixture().await;
        let err = fx
            .service
            .edit_post(fx.author.id, 4242, form("text", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn post_detail_collects_author_group_and_comments() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(fx.author.id, form("detail", Some(fx.group_id)))
            .await
            .unwrap();
        fx.service
            .create_post(fx.author.id, form("another", None))
            .await
            .unwrap();
        fx.service
            .add_comment(
                fx.author.id,
                post.id,
                crate::models::CommentForm {
                    text: "first!".to_string(),
                },
            )
            .await
            .unwrap();

        let detail = fx.service.post_detail(post.id).await.unwrap();
        assert_eq!(detail.author, fx.author);
        assert_eq!(detail.group.map(|g| g.slug), Some("test-slug".to_string()));
        assert_eq!(detail.author_posts_count, 2);
        assert_eq!(detail.comments.len(), 1);
    }

    #[tokio::test]
    async fn writes_invalidate_listing_cache() {
        let store = Arc::new(MemoryStore::new());
        let author = store.create_user("auth").await.unwrap();
        let cache = Arc::new(ListingCache::new(Duration::from_secs(60)));
        let service = ContentService::new(store, cache.clone());

        let before = cache.generation();
        service
            .create_post(author.id, form("fresh", None))
            .await
            .unwrap();
        assert!(cache.generation() > before);
    }

    #[tokio::test]
    async fn forbidden_edit_never_reaches_update() {
        let mut store = MockBlogStore::new();
        store.expect_find_post().returning(|post_id| {
            Ok(Some(Post {
                id: post_id,
                text: "owned by 1".to_string(),
                created_at: Utc::now(),
                author_id: 1,
                group_id: None,
                image: None,
            }))
        });
        store.expect_update_post().times(0);

        let service = ContentService::new(Arc::new(store), Arc::new(ListingCache::disabled()));
        let err = service
            .edit_post(2, 10, form("takeover", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

use crate::cache::ListingCache;
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::models::{username_is_valid, Group, NewGroup, User};
use std::sync::Arc;
use validator::Validate;

/// Administrative provisioning of users and groups.
///
/// Users normally arrive from the identity provider; `register_user` mirrors
/// one into the local directory. Deletions cascade in the store and
/// invalidate cached listings.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn BlogStore>,
    cache: Arc<ListingCache>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn BlogStore>, cache: Arc<ListingCache>) -> Self {
        Self { store, cache }
    }

    pub async fn register_user(&self, username: &str) -> Result<User> {
        if !username_is_valid(username) {
            return Err(AppError::invalid_field(
                "username",
                "Enter a valid username: letters, digits and @/./+/-/_ only.",
            ));
        }

        let user = self.store.create_user(username).await?;
        tracing::info!(user_id = user.id, username, "user registered");
        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }

    pub async fn create_group(&self, group: NewGroup) -> Result<Group> {
        group.validate()?;

        let group = self.store.create_group(&group).await?;
        tracing::info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    pub async fn find_group_by_slug(&self, slug: &str) -> Result<Group> {
        self.store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))
    }

    /// Removes the user with their posts, comments and follow edges
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        if !self.store.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }
        self.cache.invalidate_all();
        tracing::info!(user_id, "user deleted");
        Ok(())
    }

    /// Removes the group; its posts stay, untagged
    pub async fn delete_group(&self, group_id: i64) -> Result<()> {
        if !self.store.delete_group(group_id).await? {
            return Err(AppError::NotFound(format!("group {}", group_id)));
        }
        self.cache.invalidate_all();
        tracing::info!(group_id, "group deleted");
        Ok(())
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<()> {
        if !self.store.delete_post(post_id).await? {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        self.cache.invalidate_all();
        tracing::info!(post_id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewComment, NewPost, PostFilter};

    fn group(slug: &str) -> NewGroup {
        NewGroup {
            title: "Тестовая группа".to_string(),
            description: "Тестовое описание".to_string(),
            slug: slug.to_string(),
        }
    }

    fn setup() -> (Arc<MemoryStore>, DirectoryService) {
        let store = Arc::new(MemoryStore::new());
        let service = DirectoryService::new(store.clone(), Arc::new(ListingCache::disabled()));
        (store, service)
    }

    #[tokio::test]
    async fn register_user_validates_username() {
        let (_, service) = setup();

        let user = service.register_user("auth").await.unwrap();
        assert_eq!(user.username, "auth");

        let err = service.register_user("no spaces").await.unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.get("username").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = service.register_user("auth").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_group_validates_slug_and_uniqueness() {
        let (_, service) = setup();

        let created = service.create_group(group("test-slug")).await.unwrap();
        assert_eq!(
            service.find_group_by_slug("test-slug").await.unwrap(),
            created
        );

        let err = service.create_group(group("not a slug")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.create_group(group("test-slug")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_group_keeps_posts_untagged() {
        let (store, service) = setup();
        let author = service.register_user("auth").await.unwrap();
        let created = service.create_group(group("test-slug")).await.unwrap();
        let post = store
            .insert_post(&NewPost {
                author_id: author.id,
                text: "Тестовый пост".to_string(),
                group_id: Some(created.id),
                image: None,
            })
            .await
            .unwrap();

        service.delete_group(created.id).await.unwrap();

        let survivor = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(survivor.group_id, None);
        assert!(matches!(
            service.find_group_by_slug("test-slug").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deleting_user_cascades_posts_and_comments() {
        let (store, service) = setup();
        let author = service.register_user("auth").await.unwrap();
        let reader = service.register_user("reader").await.unwrap();
        let post = store
            .insert_post(&NewPost {
                author_id: author.id,
                text: "Тестовый пост".to_string(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        store
            .insert_comment(&NewComment {
                post_id: post.id,
                author_id: reader.id,
                text: "nice".to_string(),
            })
            .await
            .unwrap();

        service.delete_user(author.id).await.unwrap();

        assert_eq!(store.find_post(post.id).await.unwrap(), None);
        assert!(store.list_comments(post.id).await.unwrap().is_empty());
        assert_eq!(
            store.count_posts(PostFilter::Author(author.id)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn deleting_missing_rows_is_not_found() {
        let (_, service) = setup();
        assert!(matches!(
            service.delete_user(99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_group(99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_post(99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deletions_invalidate_listing_cache() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(ListingCache::new(std::time::Duration::from_secs(60)));
        let service = DirectoryService::new(store, cache.clone());
        let created = service.create_group(group("doomed")).await.unwrap();

        let before = cache.generation();
        service.delete_group(created.id).await.unwrap();
        assert!(cache.generation() > before);
    }
}

//! Paginated post listings.
//!
//! Every listing is newest first (ties broken by descending id) and sliced by
//! the configured `Paginator`. Public listings go through the listing cache;
//! the following feed is personal and always read from the store.

use crate::cache::{ListingCache, ListingKey};
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::models::{Page, PageNumber, PageWindow, Paginator, Post, PostFilter, Profile};
use std::sync::Arc;

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn BlogStore>,
    cache: Arc<ListingCache>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Arc<dyn BlogStore>, cache: Arc<ListingCache>, paginator: Paginator) -> Self {
        Self {
            store,
            cache,
            paginator,
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// All posts
    pub async fn list_all(&self, page: PageNumber) -> Result<Page<Post>> {
        self.cached(PostFilter::All, page, ListingKey::All).await
    }

    /// Posts tagged to the group with `slug`
    pub async fn list_by_group(&self, slug: &str, page: PageNumber) -> Result<Page<Post>> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        self.cached(PostFilter::Group(group.id), page, |page| ListingKey::Group {
            slug: slug.to_string(),
            page,
        })
        .await
    }

    /// Posts written by `username`
    pub async fn list_by_author(&self, username: &str, page: PageNumber) -> Result<Page<Post>> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        self.cached(PostFilter::Author(author.id), page, |page| ListingKey::Author {
            username: username.to_string(),
            page,
        })
        .await
    }

    /// Posts by every author `follower_id` follows. Following nobody gives an
    /// empty page.
    pub async fn list_following(&self, follower_id: i64, page: PageNumber) -> Result<Page<Post>> {
        self.fetch(PostFilter::FollowedBy(follower_id), page).await
    }

    /// Author profile as seen by `viewer_id` (anonymous when `None`)
    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<i64>,
        page: PageNumber,
    ) -> Result<Profile> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let posts = self.list_by_author(username, page).await?;
        let followers_count = self.store.count_followers(author.id).await?;
        let following = match viewer_id {
            Some(viewer_id) if viewer_id != author.id => {
                self.store.follow_exists(author.id, viewer_id).await?
            }
            _ => false,
        };

        Ok(Profile {
            posts_count: posts.total,
            followers_count,
            following,
            page: posts,
            author,
        })
    }

    /// Read-through listing. The page is clamped before the cache lookup so
    /// every out-of-range request shares the last page's entry.
    async fn cached(
        &self,
        filter: PostFilter,
        page: PageNumber,
        key: impl FnOnce(PageNumber) -> ListingKey,
    ) -> Result<Page<Post>> {
        let generation = self.cache.generation();
        let total = self.store.count_posts(filter).await?;
        let window = self.paginator.window(page, total);
        let key = key(PageNumber::new(i64::from(window.number)));

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let result = self.slice(filter, page, total, window).await?;
        self.cache.insert(key, result.clone(), generation);

        Ok(result)
    }

    async fn fetch(&self, filter: PostFilter, page: PageNumber) -> Result<Page<Post>> {
        let total = self.store.count_posts(filter).await?;
        let window = self.paginator.window(page, total);
        self.slice(filter, page, total, window).await
    }

    async fn slice(
        &self,
        filter: PostFilter,
        requested: PageNumber,
        total: i64,
        window: PageWindow,
    ) -> Result<Page<Post>> {
        let items = self
            .store
            .list_posts(filter, window.limit, window.offset)
            .await?;

        tracing::debug!(
            ?filter,
            requested = requested.get(),
            number = window.number,
            total,
            returned = items.len(),
            "listing fetched"
        );

        Ok(self.paginator.page(window, total, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewGroup, NewPost, User};
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        feed: FeedService,
        auth: User,
        auth2: User,
    }

    async fn fixture(page_size: u32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let auth = store.create_user("auth").await.unwrap();
        let auth2 = store.create_user("auth2").await.unwrap();
        let feed = FeedService::new(
            store.clone(),
            Arc::new(ListingCache::disabled()),
            Paginator::new(page_size),
        );
        Fixture {
            store,
            feed,
            auth,
            auth2,
        }
    }

    async fn post(store: &MemoryStore, author_id: i64, group_id: Option<i64>, text: &str) -> Post {
        store
            .insert_post(&NewPost {
                author_id,
                text: text.to_string(),
                group_id,
                image: None,
            })
            .await
            .unwrap()
    }

    async fn group(store: &MemoryStore, slug: &str) -> i64 {
        store
            .create_group(&NewGroup {
                title: format!("Group {slug}"),
                description: String::new(),
                slug: slug.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn newest_post_is_first_on_index() {
        let fx = fixture(10).await;
        let group_id = group(&fx.store, "test-slug").await;
        post(&fx.store, fx.auth.id, None, "older").await;
        let newest = post(&fx.store, fx.auth.id, Some(group_id), "Тестовый пост").await;

        let page = fx.feed.list_all(PageNumber::FIRST).await.unwrap();
        assert_eq!(page.items.first(), Some(&newest));
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn pages_slice_by_page_size() {
        let fx = fixture(10).await;
        for i in 0..13 {
            post(&fx.store, fx.auth.id, None, &format!("post {i}")).await;
        }

        let first = fx.feed.list_all(PageNumber::FIRST).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);

        let second = fx.feed.list_all(PageNumber::new(2)).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_next);

        let clamped = fx.feed.list_all(PageNumber::new(50)).await.unwrap();
        assert_eq!(clamped.number, 2);
        assert_eq!(clamped.items, second.items);
    }

    #[tokio::test]
    async fn group_listing_is_exactly_the_group_posts() {
        let fx = fixture(10).await;
        let cats = group(&fx.store, "cats").await;
        let dogs = group(&fx.store, "dogs").await;
        let a = post(&fx.store, fx.auth.id, Some(cats), "cat 1").await;
        post(&fx.store, fx.auth.id, Some(dogs), "dog").await;
        post(&fx.store, fx.auth2.id, None, "untagged").await;
        let b = post(&fx.store, fx.auth2.id, Some(cats), "cat 2").await;

        let page = fx.feed.list_by_group("cats", PageNumber::FIRST).await.unwrap();
        assert_eq!(page.items, vec![b, a]);
    }

    #[tokio::test]
    async fn unknown_group_or_author_is_not_found() {
        let fx = fixture(10).await;
        let err = fx
            .feed
            .list_by_group("missing", PageNumber::FIRST)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = fx
            .feed
            .list_by_author("missing", PageNumber::FIRST)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn following_feed_has_only_followed_authors() {
        let fx = fixture(10).await;
        let by_auth = post(&fx.store, fx.auth.id, None, "by auth").await;
        post(&fx.store, fx.auth2.id, None, "by auth2").await;
        fx.store.insert_follow(fx.auth.id, fx.auth2.id).await.unwrap();

        let page = fx
            .feed
            .list_following(fx.auth2.id, PageNumber::FIRST)
            .await
            .unwrap();
        assert_eq!(page.items, vec![by_auth]);

        let nobody = fx
            .feed
            .list_following(fx.auth.id, PageNumber::FIRST)
            .await
            .unwrap();
        assert!(nobody.items.is_empty());
        assert_eq!(nobody.number, 1);
    }

    #[tokio::test]
    async fn profile_reports_following_for_viewer() {
        let fx = fixture(10).await;
        post(&fx.store, fx.auth.id, None, "one").await;
        post(&fx.store, fx.auth.id, None, "two").await;
        fx.store.insert_follow(fx.auth.id, fx.auth2.id).await.unwrap();

        let seen_by_follower = fx
            .feed
            .profile("auth", Some(fx.auth2.id), PageNumber::FIRST)
            .await
            .unwrap();
        assert!(seen_by_follower.following);
        assert_eq!(seen_by_follower.posts_count, 2);
        assert_eq!(seen_by_follower.followers_count, 1);

        let anonymous = fx
            .feed
            .profile("auth", None, PageNumber::FIRST)
            .await
            .unwrap();
        assert!(!anonymous.following);

        let own = fx
            .feed
            .profile("auth", Some(fx.auth.id), PageNumber::FIRST)
            .await
            .unwrap();
        assert!(!own.following);
    }

    #[tokio::test]
    async fn cached_listing_is_served_until_invalidated() {
        let store = Arc::new(MemoryStore::new());
        let auth = store.create_user("auth").await.unwrap();
        let cache = Arc::new(ListingCache::new(Duration::from_secs(60)));
        let feed = FeedService::new(store.clone(), cache.clone(), Paginator::new(10));

        post(&store, auth.id, None, "first").await;
        let first = feed.list_all(PageNumber::FIRST).await.unwrap();
        assert_eq!(first.total, 1);

        // Written behind the cache's back: still the cached page.
        post(&store, auth.id, None, "second").await;
        assert_eq!(feed.list_all(PageNumber::FIRST).await.unwrap().total, 1);

        cache.invalidate_all();
        assert_eq!(feed.list_all(PageNumber::FIRST).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn out_of_range_pages_share_one_cache_entry() {
        let store = Arc::new(MemoryStore::new());
        let auth = store.create_user("auth").await.unwrap();
        let cache = Arc::new(ListingCache::new(Duration::from_secs(60)));
        let feed = FeedService::new(store.clone(), cache.clone(), Paginator::new(10));
        post(&store, auth.id, None, "only").await;

        for n in 1..=5000 {
            let page = feed.list_all(PageNumber::new(n)).await.unwrap();
            assert_eq!(page.number, 1);
        }
        assert_eq!(cache.len(), 1);

        for n in 1..=50 {
            feed.list_by_author("auth", PageNumber::new(n)).await.unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}

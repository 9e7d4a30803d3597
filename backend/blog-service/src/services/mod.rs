/// Business logic layer for blog-service
///
/// - Content service: post creation and editing, comments, post detail
/// - Follow service: follow edges between users
/// - Feed service: paginated listings and author profiles
/// - Directory service: administrative user and group provisioning
pub mod comments;
pub mod directory;
pub mod feed;
pub mod follow;
pub mod posts;

pub use directory::DirectoryService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use posts::ContentService;

use crate::cache::ListingCache;
use crate::config::FeedConfig;
use crate::db::BlogStore;
use crate::error::Result;
use crate::models::Paginator;
use std::sync::Arc;
use std::time::Duration;

/// All services wired to one store and one listing cache
#[derive(Clone)]
pub struct BlogServices {
    pub content: ContentService,
    pub follows: FollowService,
    pub feed: FeedService,
    pub directory: DirectoryService,
}

impl BlogServices {
    pub fn new(store: Arc<dyn BlogStore>, feed_config: &FeedConfig) -> Self {
        let cache = Arc::new(ListingCache::with_capacity(
            Duration::from_secs(feed_config.listing_cache_ttl_secs),
            feed_config.listing_cache_max_entries,
        ));
        let paginator = Paginator::new(feed_config.page_size);

        Self {
            content: ContentService::new(store.clone(), cache.clone()),
            follows: FollowService::new(store.clone()),
            feed: FeedService::new(store.clone(), cache.clone(), paginator),
            directory: DirectoryService::new(store, cache),
        }
    }

    /// Store round trip used by the health endpoint
    pub async fn ping(&self) -> Result<()> {
        self.content.store.ping().await
    }
}

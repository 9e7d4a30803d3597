/// Listing caching layer
///
/// Public listings (all posts, group pages, author pages) can be cached for a
/// bounded TTL. Any post write or administrative deletion invalidates the
/// whole cache. The personalized following feed is never cached.
pub mod listing_cache;

pub use listing_cache::{ListingCache, ListingKey};

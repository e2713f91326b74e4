use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

struct CacheEntry {
    body: String,
    expires_at: DateTime<Utc>,
}

/// Rendered-page cache with a fixed time to live.
///
/// Handed to the web app as `web::Data` rather than living in a static, so
/// each test can hold its own instance and drive expiry deterministically
/// through the `*_at` methods.
pub struct FeedCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Utc::now())
    }

    pub fn put(&self, key: String, body: String) {
        self.put_at(key, body, Utc::now())
    }

    /// Administrative hook. Drops every entry regardless of age.
    pub fn invalidate(&self) {
        self.entries.clear()
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.body.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn put_at(&self, key: String, body: String, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                body,
                expires_at: now + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> FeedCache {
        FeedCache::new(Duration::seconds(20))
    }

    #[test]
    fn hit_within_ttl() {
        let cache = cache();
        let t0 = Utc::now();
        cache.put_at("index:page:1".to_owned(), "<html>".to_owned(), t0);
        assert_eq!(
            cache.get_at("index:page:1", t0 + Duration::seconds(19)),
            Some("<html>".to_owned())
        );
    }

    #[test]
    fn miss_after_ttl() {
        let cache = cache();
        let t0 = Utc::now();
        cache.put_at("index:page:1".to_owned(), "<html>".to_owned(), t0);
        assert_eq!(cache.get_at("index:page:1", t0 + Duration::seconds(20)), None);
        // The expired entry is dropped, not revived by a later clock read.
        assert_eq!(cache.get_at("index:page:1", t0), None);
    }

    #[test]
    fn stale_body_served_until_invalidated() {
        let cache = cache();
        let t0 = Utc::now();
        cache.put_at("index:page:1".to_owned(), "before delete".to_owned(), t0);
        // Underlying data changed; the window still serves the old render.
        assert_eq!(
            cache.get_at("index:page:1", t0 + Duration::seconds(5)),
            Some("before delete".to_owned())
        );
        cache.invalidate();
        assert_eq!(cache.get_at("index:page:1", t0 + Duration::seconds(5)), None);
    }

    #[test]
    fn keys_are_independent() {
        let cache = cache();
        let t0 = Utc::now();
        cache.put_at("index:page:1".to_owned(), "one".to_owned(), t0);
        cache.put_at("index:page:2".to_owned(), "two".to_owned(), t0);
        assert_eq!(cache.get_at("index:page:2", t0), Some("two".to_owned()));
        assert_eq!(cache.get_at("index:page:3", t0), None);
    }
}

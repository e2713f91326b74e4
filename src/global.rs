use once_cell::sync::OnceCell;

const DEFAULT_POSTS_PER_PAGE: usize = 10;
const DEFAULT_FEED_CACHE_TTL_SECS: i64 = 20;

static POSTS_PER_PAGE: OnceCell<usize> = OnceCell::new();
static FEED_CACHE_TTL: OnceCell<chrono::Duration> = OnceCell::new();

/// Fixed page size for every feed variant.
#[inline(always)]
pub fn get_posts_per_page() -> usize {
    *POSTS_PER_PAGE.get_or_init(|| DEFAULT_POSTS_PER_PAGE)
}

/// How long a rendered page of the global feed may be served stale.
#[inline(always)]
pub fn get_feed_cache_ttl() -> chrono::Duration {
    *FEED_CACHE_TTL.get_or_init(|| chrono::Duration::seconds(DEFAULT_FEED_CACHE_TTL_SECS))
}

pub fn init() {
    // Init POSTS_PER_PAGE
    if let Ok(limit) = std::env::var("POSTS_PER_PAGE") {
        let limit = limit
            .parse::<usize>()
            .expect("POSTS_PER_PAGE cannot be parsed as an integer");
        if limit == 0 {
            panic!("POSTS_PER_PAGE is zero!");
        }
        POSTS_PER_PAGE
            .set(limit)
            .expect("failed to set POSTS_PER_PAGE");
    }

    // Init FEED_CACHE_TTL
    if let Ok(ttl) = std::env::var("FEED_CACHE_TTL") {
        let ttl = ttl
            .parse::<i64>()
            .expect("FEED_CACHE_TTL cannot be parsed as an integer");
        if ttl < 0 {
            panic!("FEED_CACHE_TTL is a negative number!");
        }
        FEED_CACHE_TTL
            .set(chrono::Duration::seconds(ttl))
            .expect("failed to set FEED_CACHE_TTL");
    }
}

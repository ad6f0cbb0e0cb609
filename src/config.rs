use std::time::Duration;

/// Browser-like User-Agent; the storefront blocks obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36";

/// Crawl settings shared by the listing crawler and the detail fetcher.
///
/// Both components take this at construction; nothing reads global state.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub user_agent: String,
    /// Per-request timeout; exceeding it counts as a transport error.
    pub timeout: Duration,
    /// Pause after each search page.
    pub page_delay: Duration,
    /// Pause between successive detail ids, regardless of outcome.
    pub id_delay: Duration,
    /// Pause after a failed detail attempt before retrying.
    pub retry_delay: Duration,
    /// Total attempts per detail id (not extra retries on top of the first).
    pub max_retries: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            page_delay: Duration::from_secs(1),
            id_delay: Duration::from_millis(500),
            retry_delay: Duration::from_secs(2),
            max_retries: 3,
        }
    }
}

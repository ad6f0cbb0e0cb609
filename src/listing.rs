use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CrawlConfig;
use crate::progress::Progress;

const SEARCH_URL: &str = "https://store.steampowered.com/search/?filter=topsellers";

static RESULT_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.search_result_row").expect("static selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.title").expect("static selector"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.search_price").expect("static selector"));

/// One search result row. `raw_price_text` is whatever the page displays
/// ("Free To Play", "$29.99", a discount pair) and is kept for reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: u32,
    pub display_name: Option<String>,
    pub raw_price_text: String,
}

/// Paginated crawler for the top-sellers search pages.
pub struct ListingCrawler {
    http: reqwest::Client,
    cfg: CrawlConfig,
}

impl ListingCrawler {
    pub fn new(cfg: CrawlConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self { http, cfg })
    }

    /// Crawl pages 1..=page_count and return deduplicated records in
    /// first-seen order. A failed page is skipped, never retried, and never
    /// aborts the crawl.
    pub async fn crawl(&self, page_count: u32, progress: &dyn Progress) -> Vec<ListingRecord> {
        let mut rows = Vec::new();

        for page in 1..=page_count {
            let url = format!("{SEARCH_URL}&page={page}");
            debug!("Fetching: {}", url);

            match self.fetch_page(&url).await {
                Ok(html) => {
                    let found = parse_search_page(&html);
                    progress.on_page_fetched(page, found.len());
                    rows.extend(found);
                }
                Err(e) => progress.on_page_skipped(page, &e.to_string()),
            }

            tokio::time::sleep(self.cfg.page_delay).await;
        }

        dedup_by_id(rows)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self.http.get(url).send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            anyhow::bail!("status code {}", resp.status().as_u16());
        }
        Ok(resp.text().await?)
    }
}

/// Extract every result row carrying an integer `data-ds-appid`. Rows without
/// the attribute (ads, bundles) or with a non-integer value are skipped.
pub fn parse_search_page(html: &str) -> Vec<ListingRecord> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for row in doc.select(&RESULT_ROW) {
        let Some(raw_id) = row.value().attr("data-ds-appid") else {
            continue;
        };
        let Ok(id) = raw_id.parse::<u32>() else {
            continue;
        };

        out.push(ListingRecord {
            id,
            display_name: row.select(&TITLE).next().map(|el| element_text(&el)),
            raw_price_text: row
                .select(&PRICE)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_default(),
        });
    }

    out
}

/// Collapse an element's text nodes into one whitespace-normalized string.
fn element_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first record for each id, preserving first-seen order.
fn dedup_by_id(rows: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|r| seen.insert(r.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/search_page.html").unwrap()
    }

    #[test]
    fn parses_rows_with_appid_only() {
        let rows = parse_search_page(&fixture());
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        // 777 is an ad row without data-ds-appid, "1000,2000" is a bundle
        // with a non-integer id; both must be dropped.
        assert_eq!(ids, vec![10, 620, 730]);
    }

    #[test]
    fn extracts_name_and_price_text() {
        let rows = parse_search_page(&fixture());
        assert_eq!(rows[0].display_name.as_deref(), Some("Counter-Strike"));
        assert_eq!(rows[0].raw_price_text, "$9.99");
        // discount rows keep both prices, joined by a single space
        assert_eq!(rows[1].raw_price_text, "$19.99 $9.99");
    }

    #[test]
    fn missing_title_yields_none_and_missing_price_yields_empty() {
        let html = r#"<a class="search_result_row" data-ds-appid="42"></a>"#;
        let rows = parse_search_page(html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, None);
        assert_eq!(rows[0].raw_price_text, "");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rows = vec![
            ListingRecord { id: 10, display_name: Some("A".into()), raw_price_text: "$1".into() },
            ListingRecord { id: 20, display_name: Some("B".into()), raw_price_text: "$2".into() },
            ListingRecord { id: 10, display_name: Some("A2".into()), raw_price_text: "$3".into() },
        ];
        let deduped = dedup_by_id(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, 10);
        assert_eq!(deduped[0].display_name.as_deref(), Some("A"));
        assert_eq!(deduped[1].id, 20);
    }
}

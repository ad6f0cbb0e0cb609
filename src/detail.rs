use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::CrawlConfig;
use crate::progress::Progress;

const DETAIL_URL: &str = "https://store.steampowered.com/api/appdetails";

/// Normalized storefront fields for one appid. Ids whose detail query fails
/// every attempt produce no record at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: u32,
    pub recommendation_count: Option<u64>,
    pub is_free: bool,
    /// Final price in currency units (the API reports minor units, e.g.
    /// cents); 0.0 for free or unpriced titles.
    pub price_amount: f64,
    pub currency_code: Option<String>,
    pub primary_genre: Option<String>,
}

// Payload shape of the appdetails endpoint, keyed by the stringified appid:
// { "<id>": { "success": bool, "data": { ... } } }
#[derive(Debug, Deserialize)]
struct AppData {
    recommendations: Option<Recommendations>,
    #[serde(default)]
    is_free: bool,
    price_overview: Option<PriceOverview>,
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct Recommendations {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PriceOverview {
    #[serde(rename = "final", default)]
    final_minor: i64,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    description: Option<String>,
}

/// Per-id client for the storefront detail endpoint.
pub struct DetailFetcher {
    http: reqwest::Client,
    cfg: CrawlConfig,
}

impl DetailFetcher {
    pub fn new(cfg: CrawlConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self { http, cfg })
    }

    /// Fetch one id, retrying transport errors up to `max_retries` attempts.
    /// A payload whose success flag is false is a definitive negative and is
    /// never retried.
    pub async fn fetch_one(&self, id: u32) -> Option<DetailRecord> {
        let url = format!("{DETAIL_URL}?appids={id}");
        let http = self.http.clone();
        fetch_with_retry(id, self.cfg.max_retries, self.cfg.retry_delay, move || {
            let http = http.clone();
            let url = url.clone();
            async move { Ok(http.get(&url).send().await?.json::<Value>().await?) }
        })
        .await
    }

    /// Fetch each id in order, pausing `id_delay` between ids regardless of
    /// outcome. Only ids that produced a record appear in the result.
    pub async fn fetch_many(&self, ids: &[u32], progress: &dyn Progress) -> Vec<DetailRecord> {
        let total = ids.len();
        let mut records = Vec::new();

        for (i, &id) in ids.iter().enumerate() {
            let record = self.fetch_one(id).await;
            progress.on_id_fetched(i + 1, total, id, record.is_some());
            records.extend(record);
            // Be polite.
            tokio::time::sleep(self.cfg.id_delay).await;
        }

        records
    }
}

/// Retry loop over an arbitrary request closure. `Err` from the request or
/// from payload interpretation is transient and retried after `retry_delay`;
/// `Ok(None)` (success flag false/absent) is terminal immediately.
pub(crate) async fn fetch_with_retry<F, Fut>(
    id: u32,
    max_retries: u32,
    retry_delay: Duration,
    mut request: F,
) -> Option<DetailRecord>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    for attempt in 1..=max_retries {
        match request().await.and_then(|payload| interpret_payload(id, &payload)) {
            Ok(outcome) => return outcome,
            Err(e) => {
                warn!(
                    "Error fetching {} (attempt {}/{}): {}",
                    id, attempt, max_retries, e
                );
                tokio::time::sleep(retry_delay).await;
            }
        }
    }

    None
}

/// Interpret one appdetails payload. `Ok(None)` means the storefront reported
/// no data for this id; `Err` means the body was malformed and the caller may
/// retry.
fn interpret_payload(id: u32, payload: &Value) -> Result<Option<DetailRecord>> {
    let entry = payload.get(id.to_string()).cloned().unwrap_or(Value::Null);
    let success = entry
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !success {
        return Ok(None);
    }

    let data: AppData =
        serde_json::from_value(entry.get("data").cloned().unwrap_or_else(|| serde_json::json!({})))?;

    // Free titles report 0.0 with no currency even when a price_overview is
    // present (e.g. paid DLC bundles attached to a free base game).
    let (price_amount, currency_code) = match (data.is_free, &data.price_overview) {
        (false, Some(po)) => (po.final_minor as f64 / 100.0, po.currency.clone()),
        _ => (0.0, None),
    };

    Ok(Some(DetailRecord {
        id,
        recommendation_count: data.recommendations.and_then(|r| r.total),
        is_free: data.is_free,
        price_amount,
        currency_code,
        primary_genre: data.genres.first().and_then(|g| g.description.clone()),
    }))
}

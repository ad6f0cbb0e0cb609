use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::detail::DetailRecord;
use crate::listing::ListingRecord;

/// One cleaned, analysis-ready game. `price_efficiency` is recommendations
/// per dollar with a +1 damper so free titles stay finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub id: u32,
    pub name: String,
    pub recommendations: u64,
    pub is_free: bool,
    pub price: f64,
    pub currency: Option<String>,
    pub genre: String,
    pub free_or_paid: String,
    pub price_efficiency: f64,
}

/// Inner-join listing and detail rows on id, then clean:
/// - drop ids with no recommendation count (useless for the analysis),
/// - restrict to USD or missing currency (free titles),
/// - impute missing genre/name,
/// - label free vs paid and derive the efficiency metric.
///
/// Output order follows the listing (first-seen) order.
pub fn merge_and_clean(listings: &[ListingRecord], details: &[DetailRecord]) -> Vec<GameRow> {
    let by_id: HashMap<u32, &DetailRecord> = details.iter().map(|d| (d.id, d)).collect();

    listings
        .iter()
        .filter_map(|l| {
            let d = by_id.get(&l.id)?;
            let recommendations = d.recommendation_count?;

            if let Some(currency) = &d.currency_code {
                if currency != "USD" {
                    return None;
                }
            }

            let price_efficiency = recommendations as f64 / (d.price_amount + 1.0);
            Some(GameRow {
                id: l.id,
                name: l
                    .display_name
                    .clone()
                    .unwrap_or_else(|| "Unknown title".to_string()),
                recommendations,
                is_free: d.is_free,
                price: d.price_amount,
                currency: d.currency_code.clone(),
                genre: d
                    .primary_genre
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                free_or_paid: if d.is_free { "Free" } else { "Paid" }.to_string(),
                price_efficiency,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u32, name: Option<&str>) -> ListingRecord {
        ListingRecord {
            id,
            display_name: name.map(Into::into),
            raw_price_text: String::new(),
        }
    }

    fn detail(id: u32) -> DetailRecord {
        DetailRecord {
            id,
            recommendation_count: Some(100),
            is_free: false,
            price_amount: 9.0,
            currency_code: Some("USD".into()),
            primary_genre: Some("Action".into()),
        }
    }

    #[test]
    fn join_is_inner_on_id_in_listing_order() {
        let listings = vec![listing(1, Some("A")), listing(2, Some("B")), listing(3, Some("C"))];
        let details = vec![detail(3), detail(1)];
        let rows = merge_and_clean(&listings, &details);
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn rows_without_recommendations_are_dropped() {
        let mut d = detail(1);
        d.recommendation_count = None;
        assert!(merge_and_clean(&[listing(1, Some("A"))], &[d]).is_empty());
    }

    #[test]
    fn non_usd_rows_are_dropped_but_currencyless_kept() {
        let mut eur = detail(1);
        eur.currency_code = Some("EUR".into());
        let mut free = detail(2);
        free.currency_code = None;
        free.is_free = true;
        free.price_amount = 0.0;

        let rows = merge_and_clean(
            &[listing(1, Some("A")), listing(2, Some("B"))],
            &[eur, free],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].free_or_paid, "Free");
    }

    #[test]
    fn missing_name_and_genre_are_imputed() {
        let mut d = detail(1);
        d.primary_genre = None;
        let rows = merge_and_clean(&[listing(1, None)], &[d]);
        assert_eq!(rows[0].name, "Unknown title");
        assert_eq!(rows[0].genre, "Unknown");
    }

    #[test]
    fn efficiency_is_recommendations_per_damped_dollar() {
        let rows = merge_and_clean(&[listing(1, Some("A"))], &[detail(1)]);
        // 100 recommendations at $9.00 -> 100 / (9 + 1)
        assert_eq!(rows[0].price_efficiency, 10.0);
    }
}

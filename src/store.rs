use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

// Fixed relative paths; each run overwrites the previous dataset.
pub const LISTING_PATH: &str = "data/raw/steam_topsellers_raw.csv";
pub const DETAIL_PATH: &str = "data/raw/steam_storefront_raw.csv";
pub const PROCESSED_PATH: &str = "data/processed/steam_games_processed.csv";

/// Write rows as headered CSV, creating parent directories as needed.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    if let Some(dir) = Path::new(path).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {path}"))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a headered CSV back into typed rows.
pub fn read_csv<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open {path}"))?;
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use crate::detail::DetailRecord;
    use crate::listing::ListingRecord;

    #[test]
    fn optional_fields_round_trip_through_csv() {
        let rows = vec![
            DetailRecord {
                id: 10,
                recommendation_count: Some(500),
                is_free: false,
                price_amount: 9.99,
                currency_code: Some("USD".into()),
                primary_genre: Some("Action".into()),
            },
            DetailRecord {
                id: 20,
                recommendation_count: None,
                is_free: true,
                price_amount: 0.0,
                currency_code: None,
                primary_genre: None,
            },
        ];

        let mut wtr = csv::Writer::from_writer(Vec::new());
        for r in &rows {
            wtr.serialize(r).unwrap();
        }
        let bytes = wtr.into_inner().unwrap();

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let back: Vec<DetailRecord> = rdr.deserialize().map(Result::unwrap).collect();
        assert_eq!(back, rows);
    }

    #[test]
    fn listing_header_matches_output_contract() {
        let row = ListingRecord {
            id: 10,
            display_name: Some("A".into()),
            raw_price_text: "$9.99".into(),
        };
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(&row).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("id,display_name,raw_price_text\n"));
    }
}

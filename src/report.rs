use std::fmt::Write;

use crate::process::GameRow;

const BANDS: [(f64, f64, &str); 5] = [
    (0.0, 5.0, "$0-5"),
    (5.0, 10.0, "$5-10"),
    (10.0, 20.0, "$10-20"),
    (20.0, 40.0, "$20-40"),
    (40.0, f64::INFINITY, "$40+"),
];

/// Summary statistics for one numeric column, pandas `describe` style
/// (sample standard deviation, linearly interpolated quantiles).
#[derive(Debug, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    Some(Describe {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.50),
        q75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linearly interpolated quantile over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if lo + 1 < sorted.len() {
        sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
    } else {
        sorted[lo]
    }
}

/// Equal-width histogram over [min, max]; the last bin is right-inclusive.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

/// Full report: free/paid counts, describe table, and the price-efficiency
/// distribution for paid titles (clipped at the 99th percentile), overall and
/// within price bands.
pub fn render(rows: &[GameRow]) -> String {
    let mut out = String::new();

    let free = rows.iter().filter(|r| r.free_or_paid == "Free").count();
    let paid = rows.len() - free;
    let _ = writeln!(out, "Games: {} ({} free, {} paid)\n", rows.len(), free, paid);

    let _ = writeln!(
        out,
        "{:<18} | {:>5} | {:>10} | {:>10} | {:>8} | {:>8} | {:>8} | {:>8} | {:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    let _ = writeln!(out, "{}", "-".repeat(104));
    for (label, values) in [
        ("recommendations", rows.iter().map(|r| r.recommendations as f64).collect::<Vec<_>>()),
        ("price", rows.iter().map(|r| r.price).collect()),
        ("price_efficiency", rows.iter().map(|r| r.price_efficiency).collect()),
    ] {
        if let Some(d) = describe(&values) {
            let _ = writeln!(
                out,
                "{:<18} | {:>5} | {:>10.2} | {:>10.2} | {:>8.2} | {:>8.2} | {:>8.2} | {:>8.2} | {:>10.2}",
                label, d.count, d.mean, d.std, d.min, d.q25, d.median, d.q75, d.max
            );
        }
    }

    // Distribution section mirrors the paid-only view: clip extreme outliers
    // at p99 so franchise juggernauts don't flatten every bar.
    let paid_rows: Vec<&GameRow> = rows.iter().filter(|r| r.price > 0.0).collect();
    let mut eff: Vec<f64> = paid_rows.iter().map(|r| r.price_efficiency).collect();
    if eff.is_empty() {
        return out;
    }
    let mut sorted = eff.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let p99 = quantile(&sorted, 0.99);
    for v in &mut eff {
        *v = v.min(p99);
    }

    let _ = writeln!(out, "\nPrice efficiency, paid games (clipped at p99 = {:.2})", p99);
    render_histogram(&mut out, &histogram(&eff, 20));

    for (lo, hi, label) in BANDS {
        let band: Vec<f64> = paid_rows
            .iter()
            .filter(|r| r.price >= lo && r.price < hi)
            .map(|r| r.price_efficiency.min(p99))
            .collect();
        if band.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{} (n={})", label, band.len());
        render_histogram(&mut out, &histogram(&band, 10));
    }

    out
}

fn render_histogram(out: &mut String, bins: &[(f64, f64, usize)]) {
    let peak = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1);
    for (lo, hi, count) in bins {
        let bar = "#".repeat(count * 40 / peak);
        let _ = writeln!(out, "{:>9.2} - {:>9.2} | {:<40} {}", lo, hi, bar, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_pandas_conventions() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(d.count, 4);
        assert_eq!(d.mean, 2.5);
        assert_eq!(d.q25, 1.75);
        assert_eq!(d.median, 2.5);
        assert_eq!(d.q75, 3.25);
        // sample std of 1..4
        assert!((d.std - 1.2909944487).abs() < 1e-9);
    }

    #[test]
    fn describe_of_empty_is_none() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn histogram_counts_cover_all_values() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        let bins = histogram(&values, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), values.len());
        // half-open bins: 0.5 falls in the second bin, and the max value
        // lands in the last (right-inclusive) bin
        assert_eq!(bins[0].2, 2);
        assert_eq!(bins[1].2, 3);
    }

    #[test]
    fn render_handles_all_free_dataset() {
        let rows = vec![crate::process::GameRow {
            id: 1,
            name: "F".into(),
            recommendations: 10,
            is_free: true,
            price: 0.0,
            currency: None,
            genre: "Action".into(),
            free_or_paid: "Free".into(),
            price_efficiency: 10.0,
        }];
        let text = render(&rows);
        assert!(text.contains("1 free, 0 paid"));
        // no paid rows, so no distribution section
        assert!(!text.contains("clipped"));
    }
}

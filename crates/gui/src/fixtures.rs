//! Factory functions for creating test data.
//!
//! Provides helpers to construct `TabularRecord` series, CSV text and data
//! sources used by unit tests, integration tests and the headless harness.

use shared::TabularRecord;

use crate::chart::DataSource;

/// Small well-formed dataset with rises and falls
pub const SAMPLE_CSV: &str = "\
date,open,close,volume
2024-01-02,100.0,104.5,1200
2024-01-03,104.5,101.2,900
2024-01-04,101.2,108.9,1500
2024-01-05,108.9,108.9,700
2024-01-08,108.9,97.3,2100
";

// ── Record factories ────────────────────────────────────────────

/// One record from numeric prices
pub fn record(date: &str, open: f64, close: f64) -> TabularRecord {
    TabularRecord::new(date, open.to_string(), close.to_string())
}

/// Two-row series: `d1` rises 10 -> 12, `d2` falls 12 -> 9
pub fn gain_loss_rows() -> Vec<TabularRecord> {
    vec![record("d1", 10.0, 12.0), record("d2", 12.0, 9.0)]
}

/// Two valid rows around one whose open cell is not a number
pub fn rows_with_malformed() -> Vec<TabularRecord> {
    vec![
        record("d1", 10.0, 12.0),
        TabularRecord::new("bad", "abc", "11"),
        record("d3", 12.0, 9.0),
    ]
}

/// `n` rows that all close at `close`
pub fn flat_rows(n: usize, close: f64) -> Vec<TabularRecord> {
    (0..n)
        .map(|i| record(&format!("d{}", i + 1), close, close))
        .collect()
}

/// `n` rows with closes rising by one per row
pub fn rising_rows(n: usize) -> Vec<TabularRecord> {
    (0..n)
        .map(|i| record(&format!("d{}", i + 1), i as f64, i as f64 + 1.0))
        .collect()
}

// ── Source factories ────────────────────────────────────────────

/// Render records back to CSV with a `date,open,close` header
pub fn to_csv(rows: &[TabularRecord]) -> String {
    let mut out = String::from("date,open,close\n");
    for r in rows {
        out.push_str(&format!("{},{},{}\n", r.date, r.open, r.close));
    }
    out
}

/// In-memory source for `rows`
pub fn inline_source(rows: &[TabularRecord]) -> DataSource {
    DataSource::Inline(to_csv(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_csv_parses() {
        let rows = shared::parse_records(SAMPLE_CSV).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.prices().is_some()));
    }

    #[test]
    fn test_to_csv_keeps_malformed_cells() {
        let rows = shared::parse_records(&to_csv(&rows_with_malformed())).unwrap();
        assert_eq!(rows, rows_with_malformed());
    }

    #[test]
    fn test_factories() {
        assert_eq!(flat_rows(3, 5.0).len(), 3);
        assert_eq!(rising_rows(4)[3].close_value(), Some(4.0));
        assert_eq!(gain_loss_rows()[1].open, "12");
    }
}

//! Raw delimited tables and the data-quality checks run on them before
//! typed parsing.

use crate::domain::error::AnalysisError;
use std::collections::HashSet;

/// Values treated as missing, matching common CSV null spellings.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Canonical names for the sentiment file, keyed by source column.
pub const SENTIMENT_COLUMNS: &[(&str, &str)] =
    &[("classification", "Classification"), ("date", "Date")];

/// Canonical names for the trader file, keyed by source column.
pub const TRADE_COLUMNS: &[(&str, &str)] = &[
    ("Account", "account"),
    ("Coin", "symbol"),
    ("Execution Price", "execution_price"),
    ("Size USD", "size_usd"),
    ("Side", "side"),
    ("Timestamp IST", "time"),
    ("Closed PnL", "closedPnL"),
    ("Direction", "direction"),
];

pub fn is_null(value: &str) -> bool {
    NULL_MARKERS.contains(&value.trim())
}

/// A delimited file held as strings, exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Display name used in error messages (usually the file name).
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`column_index`](Self::column_index) but fails with a
    /// missing-column error naming `display` (the source-side name).
    pub fn require_column(&self, name: &str, display: &str) -> Result<usize, AnalysisError> {
        self.column_index(name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                file: self.source.clone(),
                column: display.to_string(),
            })
    }

    /// Rename headers according to `(from, to)` pairs. Headers already
    /// carrying a target name are left alone, so renaming twice is a no-op.
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Self {
        for header in &mut self.headers {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| header == from) {
                *header = (*to).to_string();
            }
        }
        self
    }

    /// The 1-based file line of a data row (header is line 1).
    pub fn line_of(row_idx: usize) -> usize {
        row_idx + 2
    }

    /// Null count per column, in header order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let count = self
                    .rows
                    .iter()
                    .filter(|row| row.get(col).is_none_or(|v| is_null(v)))
                    .count();
                (name.clone(), count)
            })
            .collect()
    }

    /// Number of rows identical to an earlier row.
    pub fn duplicate_count(&self) -> usize {
        let mut seen: HashSet<&[String]> = HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .filter(|row| !seen.insert(row.as_slice()))
            .count()
    }

    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn quality(&self) -> QualityReport {
        QualityReport {
            source: self.source.clone(),
            shape: self.shape(),
            columns: self.headers.clone(),
            null_counts: self.null_counts(),
            duplicates: self.duplicate_count(),
        }
    }
}

/// Shape, columns, nulls and duplicates of one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub source: String,
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    pub null_counts: Vec<(String, usize)>,
    pub duplicates: usize,
}

impl QualityReport {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            "test.csv",
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn shape_counts_rows_and_columns() {
        let t = table(&["a", "b"], &[&["1", "2"], &["3", "4"], &["5", "6"]]);
        assert_eq!(t.shape(), (3, 2));
    }

    #[test]
    fn headers_are_trimmed() {
        let t = table(&[" date ", "classification"], &[]);
        assert_eq!(t.column_index("date"), Some(0));
    }

    #[test]
    fn rename_maps_source_names() {
        let t = table(&["classification", "date", "value"], &[]).rename(SENTIMENT_COLUMNS);
        assert_eq!(t.headers, vec!["Classification", "Date", "value"]);
    }

    #[test]
    fn rename_is_idempotent() {
        let once = table(&["Account", "Closed PnL", "Coin"], &[]).rename(TRADE_COLUMNS);
        let twice = once.clone().rename(TRADE_COLUMNS);
        assert_eq!(once, twice);
        assert_eq!(once.headers, vec!["account", "closedPnL", "symbol"]);
    }

    #[test]
    fn require_column_reports_missing() {
        let t = table(&["Date"], &[]);
        let err = t.require_column("Classification", "classification").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingColumn { ref column, .. } if column == "classification"
        ));
    }

    #[test]
    fn null_counts_recognise_markers_and_short_rows() {
        let t = table(
            &["a", "b"],
            &[&["", "x"], &["NaN", "y"], &["1", "null"], &["2"]],
        );
        assert_eq!(
            t.null_counts(),
            vec![("a".to_string(), 2), ("b".to_string(), 2)]
        );
        assert_eq!(t.quality().total_nulls(), 4);
    }

    #[test]
    fn duplicate_count_ignores_first_occurrence() {
        let t = table(
            &["a", "b"],
            &[&["1", "2"], &["1", "2"], &["3", "4"], &["1", "2"]],
        );
        assert_eq!(t.duplicate_count(), 2);
    }

    #[test]
    fn head_clamps_to_len() {
        let t = table(&["a"], &[&["1"], &["2"]]);
        assert_eq!(t.head(5).len(), 2);
        assert_eq!(t.head(1).len(), 1);
    }
}

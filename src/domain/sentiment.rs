//! Daily market sentiment records.

use crate::domain::dates::parse_sentiment_date;
use crate::domain::error::AnalysisError;
use crate::domain::table::{is_null, RawTable, SENTIMENT_COLUMNS};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub classification: String,
    /// 1-based line in the source file.
    pub line: usize,
}

/// Rename source columns and parse every row. Any bad row aborts.
pub fn parse_sentiment(table: RawTable) -> Result<Vec<SentimentRecord>, AnalysisError> {
    let table = table.rename(SENTIMENT_COLUMNS);
    let date_col = table.require_column("Date", "date")?;
    let class_col = table.require_column("Classification", "classification")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let line = RawTable::line_of(idx);
            let raw_date = row.get(date_col).map(String::as_str).unwrap_or("");
            let date = parse_sentiment_date(raw_date).ok_or_else(|| AnalysisError::InvalidDate {
                file: table.source.clone(),
                line,
                column: "date".into(),
                value: raw_date.to_string(),
            })?;

            let classification = row.get(class_col).map(|s| s.trim()).unwrap_or("");
            if is_null(classification) {
                return Err(AnalysisError::InvalidValue {
                    file: table.source.clone(),
                    line,
                    column: "classification".into(),
                    value: classification.to_string(),
                    reason: "classification is required".into(),
                });
            }

            Ok(SentimentRecord {
                date,
                classification: classification.to_string(),
                line,
            })
        })
        .collect()
}

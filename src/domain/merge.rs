//! Left join of trades onto daily sentiment.

use crate::domain::error::AnalysisError;
use crate::domain::sentiment::SentimentRecord;
use crate::domain::trade::TradeRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// What to do when the sentiment file has several rows for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Abort with [`AnalysisError::DuplicateSentimentDate`].
    #[default]
    Reject,
    /// Emit each trade once per matching sentiment row.
    FanOut,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "fan_out" | "fanout" => Ok(DuplicatePolicy::FanOut),
            other => Err(format!("unknown duplicate policy '{other}' (expected reject or fan_out)")),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Reject => f.write_str("reject"),
            DuplicatePolicy::FanOut => f.write_str("fan_out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedTrade {
    pub trade: TradeRecord,
    pub date: NaiveDate,
    pub classification: Option<String>,
    /// `closed_pnl > 0`; a flat trade is not a win.
    pub win: bool,
}

impl MergedTrade {
    pub fn new(trade: TradeRecord, classification: Option<String>) -> Self {
        let date = trade.date();
        let win = trade.closed_pnl > 0.0;
        Self {
            trade,
            date,
            classification,
            win,
        }
    }
}

/// Date → labels in file order.
pub fn index_sentiment(
    records: &[SentimentRecord],
    policy: DuplicatePolicy,
) -> Result<HashMap<NaiveDate, Vec<&SentimentRecord>>, AnalysisError> {
    let mut index: HashMap<NaiveDate, Vec<&SentimentRecord>> =
        HashMap::with_capacity(records.len());
    for record in records {
        let entry = index.entry(record.date).or_default();
        if policy == DuplicatePolicy::Reject {
            if let Some(first) = entry.first() {
                return Err(AnalysisError::DuplicateSentimentDate {
                    date: record.date,
                    first_line: first.line,
                    line: record.line,
                });
            }
        }
        entry.push(record);
    }
    Ok(index)
}

pub fn merge(
    trades: Vec<TradeRecord>,
    sentiment: &[SentimentRecord],
    policy: DuplicatePolicy,
) -> Result<Vec<MergedTrade>, AnalysisError> {
    let index = index_sentiment(sentiment, policy)?;
    let mut merged = Vec::with_capacity(trades.len());

    for trade in trades {
        match index.get(&trade.date()).map(Vec::as_slice) {
            None | Some([]) => merged.push(MergedTrade::new(trade, None)),
            Some([only]) => {
                merged.push(MergedTrade::new(trade, Some(only.classification.clone())))
            }
            Some(matches) => {
                for record in matches {
                    merged.push(MergedTrade::new(
                        trade.clone(),
                        Some(record.classification.clone()),
                    ));
                }
            }
        }
    }

    log::debug!(
        "merged {} trade rows against {} sentiment dates",
        merged.len(),
        index.len()
    );
    Ok(merged)
}

/// Row count per classification; `None` counts trades with no sentiment.
pub fn classification_counts(merged: &[MergedTrade]) -> BTreeMap<Option<String>, usize> {
    let mut counts = BTreeMap::new();
    for row in merged {
        *counts.entry(row.classification.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Side;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sentiment(d: u32, label: &str, line: usize) -> SentimentRecord {
        SentimentRecord {
            date: day(d),
            classification: label.into(),
            line,
        }
    }

    fn trade(d: u32, hour: u32, pnl: f64) -> TradeRecord {
        TradeRecord {
            account: "A".into(),
            symbol: "BTC".into(),
            execution_price: 100.0,
            size_usd: 1000.0,
            side: Side::Buy,
            timestamp: day(d).and_hms_opt(hour, 15, 0).unwrap(),
            closed_pnl: pnl,
            direction: "Open Long".into(),
        }
    }

    #[test]
    fn left_join_keeps_every_trade() {
        let merged = merge(
            vec![trade(1, 9, 10.0), trade(2, 23, -5.0), trade(3, 0, 0.0)],
            &[sentiment(1, "Fear", 2), sentiment(3, "Greed", 3)],
            DuplicatePolicy::Reject,
        )
        .unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].classification.as_deref(), Some("Fear"));
        assert_eq!(merged[1].classification, None);
        assert_eq!(merged[2].classification.as_deref(), Some("Greed"));
    }

    #[test]
    fn join_ignores_time_of_day() {
        let merged = merge(
            vec![trade(1, 23, 1.0)],
            &[sentiment(1, "Neutral", 2)],
            DuplicatePolicy::Reject,
        )
        .unwrap();
        assert_eq!(merged[0].date, day(1));
        assert_eq!(merged[0].classification.as_deref(), Some("Neutral"));
    }

    #[test]
    fn win_flag_is_strictly_positive_pnl() {
        let merged = merge(
            vec![trade(1, 0, 0.01), trade(1, 1, 0.0), trade(1, 2, -0.01)],
            &[],
            DuplicatePolicy::Reject,
        )
        .unwrap();
        let wins: Vec<bool> = merged.iter().map(|m| m.win).collect();
        assert_eq!(wins, vec![true, false, false]);
    }

    #[test]
    fn reject_policy_fails_on_duplicate_dates() {
        let err = merge(
            vec![trade(1, 0, 1.0)],
            &[sentiment(1, "Fear", 2), sentiment(1, "Greed", 7)],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DuplicateSentimentDate { first_line: 2, line: 7, .. }
        ));
    }

    #[test]
    fn fan_out_policy_duplicates_rows_in_file_order() {
        let merged = merge(
            vec![trade(1, 0, 1.0), trade(2, 0, 2.0)],
            &[sentiment(1, "Fear", 2), sentiment(1, "Greed", 3)],
            DuplicatePolicy::FanOut,
        )
        .unwrap();
        let labels: Vec<Option<&str>> =
            merged.iter().map(|m| m.classification.as_deref()).collect();
        assert_eq!(labels, vec![Some("Fear"), Some("Greed"), None]);
    }

    #[test]
    fn classification_counts_include_absent() {
        let merged = merge(
            vec![trade(1, 0, 1.0), trade(1, 1, 1.0), trade(4, 0, 1.0)],
            &[sentiment(1, "Fear", 2)],
            DuplicatePolicy::Reject,
        )
        .unwrap();
        let counts = classification_counts(&merged);
        assert_eq!(counts.get(&Some("Fear".to_string())), Some(&2));
        assert_eq!(counts.get(&None), Some(&1));
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!("reject".parse(), Ok(DuplicatePolicy::Reject));
        assert_eq!("fan-out".parse(), Ok(DuplicatePolicy::FanOut));
        assert_eq!("FAN_OUT".parse(), Ok(DuplicatePolicy::FanOut));
        assert!("merge".parse::<DuplicatePolicy>().is_err());
    }
}

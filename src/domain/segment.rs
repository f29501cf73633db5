//! Median and threshold segmentations of trades and accounts.
//!
//! The three splits are independent. Each compares with a strict `>`, so a
//! value sitting exactly on the threshold lands in the lower bucket.

use crate::domain::aggregate::AccountWinRate;
use crate::domain::merge::MergedTrade;
use crate::domain::stats;
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeverageSegment {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencySegment {
    Frequent,
    Infrequent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConsistencySegment {
    Consistent,
    Inconsistent,
}

impl fmt::Display for LeverageSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LeverageSegment::High => "High",
            LeverageSegment::Low => "Low",
        })
    }
}

impl fmt::Display for FrequencySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrequencySegment::Frequent => "Frequent",
            FrequencySegment::Infrequent => "Infrequent",
        })
    }
}

impl fmt::Display for ConsistencySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConsistencySegment::Consistent => "Consistent",
            ConsistencySegment::Inconsistent => "Inconsistent",
        })
    }
}

pub fn leverage_of(size_usd: f64, median_size: f64) -> LeverageSegment {
    if size_usd > median_size {
        LeverageSegment::High
    } else {
        LeverageSegment::Low
    }
}

pub fn frequency_of(trade_count: usize, median_count: f64) -> FrequencySegment {
    if trade_count as f64 > median_count {
        FrequencySegment::Frequent
    } else {
        FrequencySegment::Infrequent
    }
}

pub fn consistency_of(win_rate: f64, threshold: f64) -> ConsistencySegment {
    if win_rate > threshold {
        ConsistencySegment::Consistent
    } else {
        ConsistencySegment::Inconsistent
    }
}

/// Per-bucket roll-up used for tables and charts.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary<S> {
    pub segment: S,
    /// Accounts (or trades, for the leverage split) in the bucket.
    pub members: usize,
    pub trades: usize,
    pub mean_pnl: f64,
}

fn summarise<S: Copy + Ord>(rows: impl Iterator<Item = (S, f64)>) -> Vec<SegmentSummary<S>> {
    let mut buckets: BTreeMap<S, (usize, f64)> = BTreeMap::new();
    for (segment, pnl) in rows {
        let (trades, total) = buckets.entry(segment).or_insert((0, 0.0));
        *trades += 1;
        *total += pnl;
    }
    buckets
        .into_iter()
        .map(|(segment, (trades, total))| SegmentSummary {
            segment,
            members: trades,
            trades,
            mean_pnl: total / trades as f64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeverageSplit {
    pub median_size: f64,
    /// One label per merged row, in row order.
    pub labels: Vec<LeverageSegment>,
    pub summary: Vec<SegmentSummary<LeverageSegment>>,
}

pub fn leverage_split(merged: &[MergedTrade]) -> Option<LeverageSplit> {
    let sizes: Vec<f64> = merged.iter().map(|r| r.trade.size_usd).collect();
    let median_size = stats::median(&sizes)?;
    let labels: Vec<LeverageSegment> = sizes.iter().map(|&s| leverage_of(s, median_size)).collect();
    let summary = summarise(
        labels
            .iter()
            .copied()
            .zip(merged.iter().map(|r| r.trade.closed_pnl)),
    );
    Some(LeverageSplit {
        median_size,
        labels,
        summary,
    })
}

/// Mean PnL for each (classification, leverage bucket) pair; unlabelled
/// rows are dropped.
pub fn leverage_by_sentiment(
    merged: &[MergedTrade],
    split: &LeverageSplit,
) -> BTreeMap<(String, LeverageSegment), SegmentSummary<LeverageSegment>> {
    let mut buckets: BTreeMap<(String, LeverageSegment), (usize, f64)> = BTreeMap::new();
    for (row, &segment) in merged.iter().zip(&split.labels) {
        if let Some(label) = &row.classification {
            let (trades, total) = buckets.entry((label.clone(), segment)).or_insert((0, 0.0));
            *trades += 1;
            *total += row.trade.closed_pnl;
        }
    }
    buckets
        .into_iter()
        .map(|(key, (trades, total))| {
            let summary = SegmentSummary {
                segment: key.1,
                members: trades,
                trades,
                mean_pnl: total / trades as f64,
            };
            (key, summary)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountFrequency {
    pub account: String,
    pub trades: usize,
    pub segment: FrequencySegment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySplit {
    pub median_count: f64,
    pub accounts: Vec<AccountFrequency>,
    /// PnL per trade, grouped by the trading account's bucket.
    pub summary: Vec<SegmentSummary<FrequencySegment>>,
}

pub fn frequency_split(merged: &[MergedTrade]) -> Option<FrequencySplit> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in merged {
        *counts.entry(row.trade.account.as_str()).or_insert(0) += 1;
    }
    let count_values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let median_count = stats::median(&count_values)?;

    let accounts: Vec<AccountFrequency> = counts
        .iter()
        .map(|(&account, &trades)| AccountFrequency {
            account: account.to_string(),
            trades,
            segment: frequency_of(trades, median_count),
        })
        .collect();

    let segment_of: BTreeMap<&str, FrequencySegment> = accounts
        .iter()
        .map(|a| (a.account.as_str(), a.segment))
        .collect();
    let mut summary = summarise(
        merged
            .iter()
            .map(|r| (segment_of[r.trade.account.as_str()], r.trade.closed_pnl)),
    );
    for bucket in &mut summary {
        bucket.members = accounts.iter().filter(|a| a.segment == bucket.segment).count();
    }

    Some(FrequencySplit {
        median_count,
        accounts,
        summary,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountConsistency {
    pub account: String,
    pub win_rate: f64,
    pub segment: ConsistencySegment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencySplit {
    pub threshold: f64,
    pub accounts: Vec<AccountConsistency>,
    pub summary: Vec<SegmentSummary<ConsistencySegment>>,
}

pub fn consistency_split(
    merged: &[MergedTrade],
    win_rates: &[AccountWinRate],
    threshold: f64,
) -> ConsistencySplit {
    let accounts: Vec<AccountConsistency> = win_rates
        .iter()
        .map(|w| AccountConsistency {
            account: w.account.clone(),
            win_rate: w.win_rate,
            segment: consistency_of(w.win_rate, threshold),
        })
        .collect();

    let segment_of: BTreeMap<&str, ConsistencySegment> = accounts
        .iter()
        .map(|a| (a.account.as_str(), a.segment))
        .collect();
    let mut summary = summarise(merged.iter().filter_map(|r| {
        segment_of
            .get(r.trade.account.as_str())
            .map(|&s| (s, r.trade.closed_pnl))
    }));
    for bucket in &mut summary {
        bucket.members = accounts.iter().filter(|a| a.segment == bucket.segment).count();
    }

    ConsistencySplit {
        threshold,
        accounts,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::win_rates;
    use crate::domain::trade::{Side, TradeRecord};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn row(account: &str, size: f64, pnl: f64, label: Option<&str>) -> MergedTrade {
        MergedTrade::new(
            TradeRecord {
                account: account.into(),
                symbol: "SOL".into(),
                execution_price: 150.0,
                size_usd: size,
                side: Side::Buy,
                timestamp: NaiveDate::from_ymd_opt(2024, 2, 1)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
                closed_pnl: pnl,
                direction: "Open Long".into(),
            },
            label.map(str::to_string),
        )
    }

    #[test]
    fn leverage_boundary_is_low() {
        assert_eq!(leverage_of(100.0, 100.0), LeverageSegment::Low);
        assert_eq!(leverage_of(100.01, 100.0), LeverageSegment::High);
    }

    #[test]
    fn frequency_boundary_is_infrequent() {
        assert_eq!(frequency_of(3, 3.0), FrequencySegment::Infrequent);
        assert_eq!(frequency_of(4, 3.0), FrequencySegment::Frequent);
        assert_eq!(frequency_of(2, 2.5), FrequencySegment::Infrequent);
    }

    #[test]
    fn consistency_boundary_is_inconsistent() {
        assert_eq!(consistency_of(0.6, 0.6), ConsistencySegment::Inconsistent);
        assert_eq!(consistency_of(0.61, 0.6), ConsistencySegment::Consistent);
    }

    #[test]
    fn leverage_split_uses_median_size() {
        let rows = vec![
            row("A", 100.0, 1.0, None),
            row("A", 200.0, 2.0, None),
            row("B", 300.0, 3.0, None),
        ];
        let split = leverage_split(&rows).unwrap();
        assert_relative_eq!(split.median_size, 200.0);
        assert_eq!(
            split.labels,
            vec![LeverageSegment::Low, LeverageSegment::Low, LeverageSegment::High]
        );

        let high = &split.summary[0];
        assert_eq!(high.segment, LeverageSegment::High);
        assert_eq!(high.trades, 1);
        assert_relative_eq!(high.mean_pnl, 3.0);
        let low = &split.summary[1];
        assert_relative_eq!(low.mean_pnl, 1.5);
    }

    #[test]
    fn leverage_split_of_empty_is_none() {
        assert!(leverage_split(&[]).is_none());
        assert!(frequency_split(&[]).is_none());
    }

    #[test]
    fn leverage_by_sentiment_groups_labelled_rows() {
        let rows = vec![
            row("A", 100.0, -10.0, Some("Fear")),
            row("A", 500.0, -30.0, Some("Fear")),
            row("B", 600.0, 20.0, Some("Greed")),
            row("B", 50.0, 5.0, None),
        ];
        let split = leverage_split(&rows).unwrap();
        let cross = leverage_by_sentiment(&rows, &split);
        let fear_high = &cross[&("Fear".to_string(), LeverageSegment::High)];
        assert_relative_eq!(fear_high.mean_pnl, -30.0);
        let fear_low = &cross[&("Fear".to_string(), LeverageSegment::Low)];
        assert_relative_eq!(fear_low.mean_pnl, -10.0);
        assert_eq!(cross.len(), 3);
    }

    #[test]
    fn frequency_split_compares_with_account_median() {
        // counts: A=3, B=1, C=2 → median 2
        let rows = vec![
            row("A", 1.0, 1.0, None),
            row("A", 1.0, 1.0, None),
            row("A", 1.0, 1.0, None),
            row("B", 1.0, -4.0, None),
            row("C", 1.0, 0.0, None),
            row("C", 1.0, 0.0, None),
        ];
        let split = frequency_split(&rows).unwrap();
        assert_relative_eq!(split.median_count, 2.0);
        let segments: Vec<(&str, FrequencySegment)> = split
            .accounts
            .iter()
            .map(|a| (a.account.as_str(), a.segment))
            .collect();
        assert_eq!(
            segments,
            vec![
                ("A", FrequencySegment::Frequent),
                ("B", FrequencySegment::Infrequent),
                ("C", FrequencySegment::Infrequent),
            ]
        );

        let infrequent = &split.summary[1];
        assert_eq!(infrequent.segment, FrequencySegment::Infrequent);
        assert_eq!(infrequent.members, 2);
        assert_eq!(infrequent.trades, 3);
        assert_relative_eq!(infrequent.mean_pnl, -4.0 / 3.0);
    }

    #[test]
    fn consistency_split_uses_win_rate_threshold() {
        let rows = vec![
            row("A", 1.0, 1.0, None),
            row("A", 1.0, 1.0, None),
            row("A", 1.0, -1.0, None),
            row("B", 1.0, 1.0, None),
            row("B", 1.0, 1.0, None),
            row("B", 1.0, 1.0, None),
            row("B", 1.0, -1.0, None),
        ];
        let rates = win_rates(&rows);
        let split = consistency_split(&rows, &rates, DEFAULT_CONSISTENCY_THRESHOLD);
        assert_eq!(split.accounts[0].segment, ConsistencySegment::Consistent);
        assert_eq!(split.accounts[1].segment, ConsistencySegment::Consistent);

        let strict = consistency_split(&rows, &rates, 0.7);
        assert_eq!(strict.accounts[0].segment, ConsistencySegment::Inconsistent);
        assert_eq!(strict.accounts[1].segment, ConsistencySegment::Consistent);
    }

    proptest! {
        #[test]
        fn leverage_split_partitions_rows(sizes in proptest::collection::vec(0.0f64..1e6, 1..60)) {
            let rows: Vec<MergedTrade> = sizes.iter().map(|&s| row("A", s, 0.0, None)).collect();
            let split = leverage_split(&rows).unwrap();
            prop_assert_eq!(split.labels.len(), rows.len());

            let total: usize = split.summary.iter().map(|s| s.trades).sum();
            prop_assert_eq!(total, rows.len());

            for (row, label) in rows.iter().zip(&split.labels) {
                let expected = if row.trade.size_usd > split.median_size {
                    LeverageSegment::High
                } else {
                    LeverageSegment::Low
                };
                prop_assert_eq!(*label, expected);
            }
        }
    }
}

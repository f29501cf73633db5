//! Grouped reductions over merged trades.

use crate::domain::merge::MergedTrade;
use crate::domain::stats::{self, Summary};
use crate::domain::trade::Side;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPnl {
    pub account: String,
    pub date: NaiveDate,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountWinRate {
    pub account: String,
    pub trades: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideCounts {
    pub buys: usize,
    pub sells: usize,
}

impl SideCounts {
    fn record(&mut self, side: Side) {
        match side {
            Side::Buy => self.buys += 1,
            Side::Sell => self.sells += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.buys + self.sells
    }

    /// BUY / SELL with a zero SELL count replaced by 1, so a buy-only
    /// group reports its BUY count instead of an undefined ratio.
    pub fn long_short_ratio(&self) -> f64 {
        let denominator = if self.sells == 0 { 1 } else { self.sells };
        self.buys as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub trades: usize,
    pub sides: SideCounts,
}

impl DailyActivity {
    pub fn long_short_ratio(&self) -> f64 {
        self.sides.long_short_ratio()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentStats {
    pub classification: String,
    pub mean_pnl: f64,
    pub win_rate: f64,
    pub trades: usize,
    pub sides: SideCounts,
}

/// Sum of closed PnL per (account, date), ordered by account then date.
pub fn daily_pnl(merged: &[MergedTrade]) -> Vec<DailyPnl> {
    let mut sums: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
    for row in merged {
        *sums
            .entry((row.trade.account.as_str(), row.date))
            .or_insert(0.0) += row.trade.closed_pnl;
    }
    sums.into_iter()
        .map(|((account, date), pnl)| DailyPnl {
            account: account.to_string(),
            date,
            pnl,
        })
        .collect()
}

/// Share of winning trades per account, ordered by account.
pub fn win_rates(merged: &[MergedTrade]) -> Vec<AccountWinRate> {
    let mut tallies: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in merged {
        let (trades, wins) = tallies.entry(row.trade.account.as_str()).or_insert((0, 0));
        *trades += 1;
        if row.win {
            *wins += 1;
        }
    }
    tallies
        .into_iter()
        .map(|(account, (trades, wins))| AccountWinRate {
            account: account.to_string(),
            trades,
            win_rate: wins as f64 / trades as f64,
        })
        .collect()
}

pub fn trade_sizes(merged: &[MergedTrade]) -> Vec<f64> {
    merged.iter().map(|row| row.trade.size_usd).collect()
}

/// Distribution of trade size in USD; `None` for an empty set.
pub fn size_summary(merged: &[MergedTrade]) -> Option<Summary> {
    Summary::describe(&trade_sizes(merged))
}

pub fn average_trade_size(merged: &[MergedTrade]) -> Option<f64> {
    stats::mean(&trade_sizes(merged))
}

/// Trade count and BUY/SELL split per date, ordered by date.
pub fn daily_activity(merged: &[MergedTrade]) -> Vec<DailyActivity> {
    let mut days: BTreeMap<NaiveDate, SideCounts> = BTreeMap::new();
    for row in merged {
        days.entry(row.date).or_default().record(row.trade.side);
    }
    days.into_iter()
        .map(|(date, sides)| DailyActivity {
            date,
            trades: sides.total(),
            sides,
        })
        .collect()
}

/// Per-classification performance. Rows without a classification are
/// dropped; groups are ordered by label.
pub fn by_sentiment(merged: &[MergedTrade]) -> Vec<SentimentStats> {
    #[derive(Default)]
    struct Acc {
        pnl: f64,
        wins: usize,
        sides: SideCounts,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in merged {
        let Some(label) = row.classification.as_deref() else {
            continue;
        };
        let acc = groups.entry(label).or_default();
        acc.pnl += row.trade.closed_pnl;
        if row.win {
            acc.wins += 1;
        }
        acc.sides.record(row.trade.side);
    }

    groups
        .into_iter()
        .map(|(label, acc)| {
            let trades = acc.sides.total();
            SentimentStats {
                classification: label.to_string(),
                mean_pnl: acc.pnl / trades as f64,
                win_rate: acc.wins as f64 / trades as f64,
                trades,
                sides: acc.sides,
            }
        })
        .collect()
}

//! The analysis pipeline: ingest, merge, aggregate, segment, summarise.

use crate::domain::aggregate::{self, AccountWinRate, DailyActivity, DailyPnl, SentimentStats};
use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalysisError;
use crate::domain::insights::{self, Insights};
use crate::domain::merge::{self, MergedTrade};
use crate::domain::segment::{
    self, ConsistencySplit, FrequencySplit, LeverageSegment, LeverageSplit, SegmentSummary,
};
use crate::domain::sentiment::{parse_sentiment, SentimentRecord};
use crate::domain::stats::Summary;
use crate::domain::table::{QualityReport, RawTable};
use crate::domain::trade::{parse_trades, TradeRecord};
use crate::ports::data_port::DataPort;
use std::collections::BTreeMap;

/// Both raw inputs plus their quality reports, before typed parsing.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub sentiment: RawTable,
    pub trades: RawTable,
}

impl Inputs {
    pub fn load(port: &dyn DataPort) -> Result<Self, AnalysisError> {
        let sentiment = port.load_sentiment()?;
        log::info!(
            "loaded {} sentiment rows from {}",
            sentiment.rows.len(),
            sentiment.source
        );
        let trades = port.load_trades()?;
        log::info!("loaded {} trade rows from {}", trades.rows.len(), trades.source);
        Ok(Self { sentiment, trades })
    }

    pub fn quality(&self) -> (QualityReport, QualityReport) {
        (self.sentiment.quality(), self.trades.quality())
    }
}

/// Every derived table, computed once.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub merged: Vec<MergedTrade>,
    pub classification_counts: BTreeMap<Option<String>, usize>,
    pub daily_pnl: Vec<DailyPnl>,
    pub win_rates: Vec<AccountWinRate>,
    pub size_summary: Option<Summary>,
    pub daily_activity: Vec<DailyActivity>,
    pub by_sentiment: Vec<SentimentStats>,
    pub leverage: Option<LeverageSplit>,
    pub leverage_by_sentiment: BTreeMap<(String, LeverageSegment), SegmentSummary<LeverageSegment>>,
    pub frequency: Option<FrequencySplit>,
    pub consistency: ConsistencySplit,
    pub insights: Insights,
}

impl Analysis {
    /// Rename, parse and join the raw inputs, then compute everything.
    pub fn from_inputs(inputs: Inputs, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let sentiment = parse_sentiment(inputs.sentiment)?;
        let trades = parse_trades(inputs.trades)?;
        log::info!(
            "parsed {} sentiment records and {} trades",
            sentiment.len(),
            trades.len()
        );
        Self::compute(trades, &sentiment, config)
    }

    pub fn compute(
        trades: Vec<TradeRecord>,
        sentiment: &[SentimentRecord],
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        let merged = merge::merge(trades, sentiment, config.duplicate_policy)?;
        let classification_counts = merge::classification_counts(&merged);
        log::info!("merged dataset has {} rows", merged.len());

        let win_rates = aggregate::win_rates(&merged);
        let by_sentiment = aggregate::by_sentiment(&merged);

        let leverage = segment::leverage_split(&merged);
        let leverage_by_sentiment = leverage
            .as_ref()
            .map(|split| segment::leverage_by_sentiment(&merged, split))
            .unwrap_or_default();
        let frequency = segment::frequency_split(&merged);
        let consistency =
            segment::consistency_split(&merged, &win_rates, config.consistency_threshold);

        let insights = insights::derive(
            &by_sentiment,
            &leverage_by_sentiment,
            frequency.as_ref(),
            &consistency,
        );
        log::debug!(
            "derived {} findings and {} recommendations",
            insights.findings.len(),
            insights.recommendations.len()
        );

        Ok(Analysis {
            daily_pnl: aggregate::daily_pnl(&merged),
            size_summary: aggregate::size_summary(&merged),
            daily_activity: aggregate::daily_activity(&merged),
            classification_counts,
            win_rates,
            by_sentiment,
            leverage,
            leverage_by_sentiment,
            frequency,
            consistency,
            insights,
            merged,
        })
    }

    pub fn average_trade_size(&self) -> Option<f64> {
        self.size_summary.as_ref().map(|s| s.mean)
    }
}

//! Narrative findings and strategy recommendations derived from the
//! computed tables.

use crate::domain::aggregate::SentimentStats;
use crate::domain::segment::{
    ConsistencySegment, ConsistencySplit, FrequencySegment, FrequencySplit, LeverageSegment,
    SegmentSummary,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insights {
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

fn is_fear(label: &str) -> bool {
    label.to_lowercase().contains("fear")
}

fn is_greed(label: &str) -> bool {
    label.to_lowercase().contains("greed")
}

fn mean_of<S: PartialEq>(summary: &[SegmentSummary<S>], segment: S) -> Option<f64> {
    summary
        .iter()
        .find(|s| s.segment == segment)
        .map(|s| s.mean_pnl)
}

/// Trade-weighted mean PnL of one leverage bucket across fear regimes.
fn fear_leverage_pnl(
    cross: &BTreeMap<(String, LeverageSegment), SegmentSummary<LeverageSegment>>,
    segment: LeverageSegment,
) -> Option<f64> {
    let (trades, total) = cross
        .iter()
        .filter(|((label, seg), _)| *seg == segment && is_fear(label))
        .fold((0usize, 0.0), |(n, sum), (_, s)| {
            (n + s.trades, sum + s.mean_pnl * s.trades as f64)
        });
    (trades > 0).then(|| total / trades as f64)
}

pub fn derive(
    sentiment: &[SentimentStats],
    leverage_cross: &BTreeMap<(String, LeverageSegment), SegmentSummary<LeverageSegment>>,
    frequency: Option<&FrequencySplit>,
    consistency: &ConsistencySplit,
) -> Insights {
    let mut out = Insights::default();

    let best_pnl = sentiment.iter().max_by(|a, b| a.mean_pnl.total_cmp(&b.mean_pnl));
    let worst_pnl = sentiment.iter().min_by(|a, b| a.mean_pnl.total_cmp(&b.mean_pnl));
    if let (Some(best), Some(worst)) = (best_pnl, worst_pnl) {
        if sentiment.len() > 1 {
            out.findings.push(format!(
                "Average PnL per trade is highest during {} ({:.2}) and lowest during {} ({:.2}).",
                best.classification, best.mean_pnl, worst.classification, worst.mean_pnl
            ));
        }
        if is_greed(&best.classification) {
            out.recommendations.push(format!(
                "Increase participation during {} regimes, with disciplined stop-losses.",
                best.classification
            ));
        } else if is_fear(&best.classification) {
            out.recommendations.push(format!(
                "{} regimes have paid best; consider contrarian entries when sentiment turns fearful.",
                best.classification
            ));
        }
    }

    if let Some(best) = sentiment
        .iter()
        .max_by(|a, b| a.win_rate.total_cmp(&b.win_rate))
    {
        if sentiment.len() > 1 {
            out.findings.push(format!(
                "Win rate peaks during {} at {:.1}%.",
                best.classification,
                best.win_rate * 100.0
            ));
        }
    }

    let high_fear = fear_leverage_pnl(leverage_cross, LeverageSegment::High);
    let low_fear = fear_leverage_pnl(leverage_cross, LeverageSegment::Low);
    if let (Some(high), Some(low)) = (high_fear, low_fear) {
        if high < low {
            out.findings.push(format!(
                "High-leverage trades underperform in fear regimes ({high:.2} vs {low:.2} average PnL)."
            ));
            out.recommendations
                .push("Reduce position size during fear markets to control downside.".to_string());
        } else {
            out.findings.push(format!(
                "High-leverage trades hold up in fear regimes ({high:.2} vs {low:.2} average PnL)."
            ));
        }
    }

    let mut frequent_lead = false;
    if let Some(split) = frequency {
        let frequent = mean_of(&split.summary, FrequencySegment::Frequent);
        let infrequent = mean_of(&split.summary, FrequencySegment::Infrequent);
        if let (Some(f), Some(i)) = (frequent, infrequent) {
            frequent_lead = f > i;
            let verb = if f > i { "outperform" } else { "trail" };
            out.findings.push(format!(
                "Frequent traders {verb} infrequent traders ({f:.2} vs {i:.2} average PnL per trade)."
            ));
        }
    }

    let consistent = mean_of(&consistency.summary, ConsistencySegment::Consistent);
    let inconsistent = mean_of(&consistency.summary, ConsistencySegment::Inconsistent);
    if let (Some(c), Some(i)) = (consistent, inconsistent) {
        let members = consistency
            .summary
            .iter()
            .find(|s| s.segment == ConsistencySegment::Consistent)
            .map_or(0, |s| s.members);
        out.findings.push(format!(
            "{members} accounts win more than {:.0}% of trades, averaging {c:.2} per trade against {i:.2} for the rest.",
            consistency.threshold * 100.0
        ));
        if c > i {
            let who = if frequent_lead {
                "consistent, frequent traders"
            } else {
                "consistent traders"
            };
            out.recommendations
                .push(format!("Prefer {who} over sporadic high-risk behaviour."));
        }
    }

    out
}

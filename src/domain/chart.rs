//! Chart descriptions built from an [`Analysis`]. Rendering lives in the
//! adapters.

use crate::domain::analysis::Analysis;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

/// Groups of stacked values; `series[i]` names the i-th value of each group.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<String>,
    pub groups: Vec<(String, Vec<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Bar(BarChart),
    Stacked(StackedBarChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar(c) => &c.title,
            Chart::Stacked(c) => &c.title,
        }
    }

    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.title().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') && !slug.is_empty() {
                slug.push('_');
            }
        }
        slug.trim_end_matches('_').to_string()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Bar(c) => c.bars.is_empty(),
            Chart::Stacked(c) => c.groups.is_empty(),
        }
    }
}

fn bar_chart(title: &str, x_label: &str, y_label: &str, bars: Vec<Bar>) -> Chart {
    Chart::Bar(BarChart {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        bars,
    })
}

/// The chart sequence, in presentation order.
pub fn charts_for(analysis: &Analysis) -> Vec<Chart> {
    let sentiment = &analysis.by_sentiment;
    let mut charts = vec![
        bar_chart(
            "Average PnL by Market Sentiment",
            "Classification",
            "closedPnL",
            sentiment
                .iter()
                .map(|s| Bar {
                    label: s.classification.clone(),
                    value: s.mean_pnl,
                })
                .collect(),
        ),
        bar_chart(
            "Win Rate by Market Sentiment",
            "Classification",
            "win",
            sentiment
                .iter()
                .map(|s| Bar {
                    label: s.classification.clone(),
                    value: s.win_rate,
                })
                .collect(),
        ),
        bar_chart(
            "Trade Frequency by Sentiment",
            "Classification",
            "num_trades",
            sentiment
                .iter()
                .map(|s| Bar {
                    label: s.classification.clone(),
                    value: s.trades as f64,
                })
                .collect(),
        ),
        Chart::Stacked(StackedBarChart {
            title: "Long/Short Count by Sentiment".to_string(),
            x_label: "Classification".to_string(),
            y_label: "Number of Trades".to_string(),
            series: vec!["BUY".to_string(), "SELL".to_string()],
            groups: sentiment
                .iter()
                .map(|s| {
                    (
                        s.classification.clone(),
                        vec![s.sides.buys as f64, s.sides.sells as f64],
                    )
                })
                .collect(),
        }),
    ];

    charts.push(bar_chart(
        "PnL: High vs Low Leverage Traders",
        "leverage_segment",
        "closedPnL",
        analysis
            .leverage
            .iter()
            .flat_map(|split| &split.summary)
            .map(|s| Bar {
                label: s.segment.to_string(),
                value: s.mean_pnl,
            })
            .collect(),
    ));

    charts.push(bar_chart(
        "PnL: Frequent vs Infrequent Traders",
        "frequency_segment",
        "closedPnL",
        analysis
            .frequency
            .iter()
            .flat_map(|split| &split.summary)
            .map(|s| Bar {
                label: s.segment.to_string(),
                value: s.mean_pnl,
            })
            .collect(),
    ));

    charts
}

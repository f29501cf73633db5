//! HTML report adapter implementing ReportPort.
//!
//! Generates a single self-contained page using Askama templates with
//! inline SVG charts.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::adapters::chart_svg;
use crate::adapters::tables::{fmt2, pct};
use crate::domain::analysis::Analysis;
use crate::domain::chart::charts_for;
use crate::domain::error::AnalysisError;
use crate::ports::report_port::ReportPort;

pub const REPORT_FILE: &str = "report.html";

struct Figure {
    title: String,
    svg: String,
}

struct Section {
    title: String,
    note: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Section {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            note: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    merged_rows: usize,
    unmatched_rows: usize,
    average_trade_size: String,
    figures: Vec<Figure>,
    sections: Vec<Section>,
    findings: Vec<String>,
    recommendations: Vec<String>,
}

fn sections(analysis: &Analysis) -> Vec<Section> {
    let mut out = Vec::new();

    let mut sentiment = Section::new(
        "Performance by Sentiment",
        &["Classification", "Avg PnL", "Win Rate", "Trades", "BUY", "SELL"],
    );
    for s in &analysis.by_sentiment {
        sentiment.row(vec![
            s.classification.clone(),
            fmt2(s.mean_pnl),
            pct(s.win_rate),
            s.trades.to_string(),
            s.sides.buys.to_string(),
            s.sides.sells.to_string(),
        ]);
    }
    out.push(sentiment);

    if let Some(summary) = &analysis.size_summary {
        let mut sizes = Section::new("Trade Size (USD)", &["Statistic", "Value"]);
        for (name, value) in [
            ("count", summary.count as f64),
            ("mean", summary.mean),
            ("std", summary.std),
            ("min", summary.min),
            ("25%", summary.q25),
            ("50%", summary.median),
            ("75%", summary.q75),
            ("max", summary.max),
        ] {
            sizes.row(vec![name.to_string(), fmt2(value)]);
        }
        out.push(sizes);
    }

    if let Some(split) = &analysis.leverage {
        let mut leverage = Section::new("Leverage Segments", &["Segment", "Trades", "Avg PnL"])
            .note(format!("Median trade size {}", fmt2(split.median_size)));
        for s in &split.summary {
            leverage.row(vec![s.segment.to_string(), s.trades.to_string(), fmt2(s.mean_pnl)]);
        }
        out.push(leverage);
    }

    if !analysis.leverage_by_sentiment.is_empty() {
        let mut cross = Section::new(
            "Leverage Segments by Sentiment",
            &["Classification", "Segment", "Trades", "Avg PnL"],
        );
        for ((label, segment), s) in &analysis.leverage_by_sentiment {
            cross.row(vec![
                label.clone(),
                segment.to_string(),
                s.trades.to_string(),
                fmt2(s.mean_pnl),
            ]);
        }
        out.push(cross);
    }

    if let Some(split) = &analysis.frequency {
        let mut frequency = Section::new(
            "Frequency Segments",
            &["Segment", "Accounts", "Trades", "Avg PnL"],
        )
        .note(format!("Median trades per account {}", fmt2(split.median_count)));
        for s in &split.summary {
            frequency.row(vec![
                s.segment.to_string(),
                s.members.to_string(),
                s.trades.to_string(),
                fmt2(s.mean_pnl),
            ]);
        }
        out.push(frequency);
    }

    let consistency = &analysis.consistency;
    let mut segments = Section::new(
        "Consistency Segments",
        &["Segment", "Accounts", "Trades", "Avg PnL"],
    )
    .note(format!("Win rate above {}", fmt2(consistency.threshold)));
    for s in &consistency.summary {
        segments.row(vec![
            s.segment.to_string(),
            s.members.to_string(),
            s.trades.to_string(),
            fmt2(s.mean_pnl),
        ]);
    }
    out.push(segments);

    let mut accounts = Section::new("Win Rate per Account", &["Account", "Trades", "Win Rate"]);
    for w in &analysis.win_rates {
        accounts.row(vec![w.account.clone(), w.trades.to_string(), pct(w.win_rate)]);
    }
    out.push(accounts);

    out
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, analysis: &Analysis) -> Result<String, AnalysisError> {
        let figures = charts_for(analysis)
            .iter()
            .map(|chart| Figure {
                title: chart.title().to_string(),
                svg: chart_svg::render(chart),
            })
            .collect();

        let unmatched_rows = analysis
            .merged
            .iter()
            .filter(|m| m.classification.is_none())
            .count();

        let template = ReportTemplate {
            merged_rows: analysis.merged.len(),
            unmatched_rows,
            average_trade_size: analysis
                .average_trade_size()
                .map(fmt2)
                .unwrap_or_else(|| "n/a".to_string()),
            figures,
            sections: sections(analysis),
            findings: analysis.insights.findings.clone(),
            recommendations: analysis.insights.recommendations.clone(),
        };

        template.render().map_err(|e| AnalysisError::Render {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, analysis: &Analysis, output_dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
        let html = self.render(analysis)?;

        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(REPORT_FILE);
        fs::write(&path, html)?;
        log::debug!("wrote HTML report to {}", path.display());

        Ok(vec![path])
    }
}

//! Plain-text table formatting for console output.
//!
//! Provides functions to render:
//! - Data-quality sections (shape, columns, preview, nulls, duplicates)
//! - Merge summary and every aggregate table
//! - Segment tables and the narrative summary

use crate::domain::analysis::Analysis;
use crate::domain::table::{QualityReport, RawTable};

/// Column-aligned text table. Numeric-looking cells are right-aligned.
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn render(&self) -> String {
        let cols = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; cols];
        for line in std::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| -> String {
            let mut out = String::new();
            for (i, &width) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                if i > 0 {
                    out.push_str("  ");
                }
                if is_numeric(cell) {
                    out.push_str(&format!("{cell:>width$}"));
                } else {
                    out.push_str(&format!("{cell:<width$}"));
                }
            }
            out.trim_end().to_string()
        };

        let mut out = format_line(&self.headers);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(row));
            out.push('\n');
        }
        out
    }
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty()
        && cell
            .trim_end_matches('%')
            .replace(',', "")
            .parse::<f64>()
            .is_ok()
}

pub fn heading(title: &str) -> String {
    format!("\n=== {} ===\n", title)
}

pub(crate) fn fmt2(value: f64) -> String {
    format!("{:.2}", value)
}

pub(crate) fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn limited<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) => &items[..n.min(items.len())],
        None => items,
    }
}

pub fn render_quality(report: &QualityReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} shape: ({}, {})\n",
        report.source, report.shape.0, report.shape.1
    ));
    out.push_str(&format!("{} columns: {}\n", report.source, report.columns.join(", ")));
    out.push_str(&format!("{} missing values:\n", report.source));
    let mut table = TextTable::new(["column", "nulls"]);
    for (column, count) in &report.null_counts {
        table.row([column.clone(), count.to_string()]);
    }
    out.push_str(&table.render());
    out.push_str(&format!("{} duplicates: {}\n", report.source, report.duplicates));
    out
}

pub fn render_preview(table: &RawTable, rows: usize) -> String {
    let mut text = TextTable::new(table.headers.iter().cloned());
    for row in table.head(rows) {
        text.row(row.iter().cloned());
    }
    text.render()
}

pub fn render_classification_counts(analysis: &Analysis) -> String {
    let mut out = format!("Merged rows: {}\n", analysis.merged.len());
    let mut table = TextTable::new(["Classification", "count"]);
    let mut counts: Vec<(&Option<String>, &usize)> = analysis.classification_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));
    for (label, count) in counts {
        table.row([
            label.clone().unwrap_or_else(|| "<none>".to_string()),
            count.to_string(),
        ]);
    }
    out.push_str(&table.render());
    out
}

pub fn render_daily_pnl(analysis: &Analysis, limit: Option<usize>) -> String {
    let mut table = TextTable::new(["account", "Date", "daily_pnl"]);
    for row in limited(&analysis.daily_pnl, limit) {
        table.row([row.account.clone(), row.date.to_string(), fmt2(row.pnl)]);
    }
    table.render()
}

pub fn render_win_rates(analysis: &Analysis, limit: Option<usize>) -> String {
    let mut table = TextTable::new(["account", "trades", "win_rate"]);
    for row in limited(&analysis.win_rates, limit) {
        table.row([
            row.account.clone(),
            row.trades.to_string(),
            format!("{:.4}", row.win_rate),
        ]);
    }
    table.render()
}

pub fn render_size_summary(analysis: &Analysis) -> String {
    let Some(summary) = &analysis.size_summary else {
        return "No trades.\n".to_string();
    };
    let mut out = format!("Average trade size: {}\n", fmt2(summary.mean));
    let mut table = TextTable::new(["stat", "size_usd"]);
    table
        .row(["count".to_string(), summary.count.to_string()])
        .row(["mean".to_string(), fmt2(summary.mean)])
        .row(["std".to_string(), fmt2(summary.std)])
        .row(["min".to_string(), fmt2(summary.min)])
        .row(["25%".to_string(), fmt2(summary.q25)])
        .row(["50%".to_string(), fmt2(summary.median)])
        .row(["75%".to_string(), fmt2(summary.q75)])
        .row(["max".to_string(), fmt2(summary.max)]);
    out.push_str(&table.render());
    out
}

pub fn render_daily_activity(analysis: &Analysis, limit: Option<usize>) -> String {
    let mut table = TextTable::new(["Date", "num_trades", "BUY", "SELL", "long_short_ratio"]);
    for day in limited(&analysis.daily_activity, limit) {
        table.row([
            day.date.to_string(),
            day.trades.to_string(),
            day.sides.buys.to_string(),
            day.sides.sells.to_string(),
            format!("{:.4}", day.long_short_ratio()),
        ]);
    }
    table.render()
}

pub fn render_sentiment_stats(analysis: &Analysis) -> String {
    let mut table = TextTable::new([
        "Classification",
        "avg_pnl",
        "win_rate",
        "num_trades",
        "BUY",
        "SELL",
    ]);
    for s in &analysis.by_sentiment {
        table.row([
            s.classification.clone(),
            fmt2(s.mean_pnl),
            pct(s.win_rate),
            s.trades.to_string(),
            s.sides.buys.to_string(),
            s.sides.sells.to_string(),
        ]);
    }
    table.render()
}

pub fn render_segments(analysis: &Analysis, limit: Option<usize>) -> String {
    let mut out = String::new();

    match &analysis.leverage {
        Some(split) => {
            out.push_str(&format!(
                "Leverage segment (median size {}):\n",
                fmt2(split.median_size)
            ));
            let mut table = TextTable::new(["leverage_segment", "trades", "avg_pnl"]);
            for s in &split.summary {
                table.row([s.segment.to_string(), s.trades.to_string(), fmt2(s.mean_pnl)]);
            }
            out.push_str(&table.render());
        }
        None => out.push_str("Leverage segment: no trades.\n"),
    }

    if !analysis.leverage_by_sentiment.is_empty() {
        out.push_str("\nLeverage segment by sentiment:\n");
        let mut table = TextTable::new(["Classification", "leverage_segment", "trades", "avg_pnl"]);
        for ((label, segment), s) in &analysis.leverage_by_sentiment {
            table.row([
                label.clone(),
                segment.to_string(),
                s.trades.to_string(),
                fmt2(s.mean_pnl),
            ]);
        }
        out.push_str(&table.render());
    }

    match &analysis.frequency {
        Some(split) => {
            out.push_str(&format!(
                "\nFrequency segment (median trades per account {}):\n",
                fmt2(split.median_count)
            ));
            let mut table = TextTable::new(["frequency_segment", "accounts", "trades", "avg_pnl"]);
            for s in &split.summary {
                table.row([
                    s.segment.to_string(),
                    s.members.to_string(),
                    s.trades.to_string(),
                    fmt2(s.mean_pnl),
                ]);
            }
            out.push_str(&table.render());
        }
        None => out.push_str("\nFrequency segment: no trades.\n"),
    }

    let consistency = &analysis.consistency;
    out.push_str(&format!(
        "\nConsistency segment (win rate > {}):\n",
        fmt2(consistency.threshold)
    ));
    let mut table = TextTable::new(["account", "win_rate", "segment"]);
    for a in limited(&consistency.accounts, limit) {
        table.row([a.account.clone(), format!("{:.4}", a.win_rate), a.segment.to_string()]);
    }
    out.push_str(&table.render());
    let mut table = TextTable::new(["segment", "accounts", "trades", "avg_pnl"]);
    for s in &consistency.summary {
        table.row([
            s.segment.to_string(),
            s.members.to_string(),
            s.trades.to_string(),
            fmt2(s.mean_pnl),
        ]);
    }
    out.push_str(&table.render());
    out
}

pub fn render_insights(analysis: &Analysis) -> String {
    let insights = &analysis.insights;
    let mut out = String::from("Key insights:\n");
    if insights.findings.is_empty() {
        out.push_str("  (not enough data)\n");
    }
    for (i, finding) in insights.findings.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, finding));
    }
    out.push_str("\nStrategy recommendations:\n");
    if insights.recommendations.is_empty() {
        out.push_str("  (none)\n");
    }
    for rec in &insights.recommendations {
        out.push_str(&format!("  - {}\n", rec));
    }
    out
}

/// The full analysis section of the console output.
pub fn render_analysis(analysis: &Analysis, preview_rows: usize) -> String {
    let limit = Some(preview_rows);
    let mut out = String::new();
    out.push_str(&heading("Merge"));
    out.push_str(&render_classification_counts(analysis));
    out.push_str(&heading("Daily PnL per Account"));
    out.push_str(&render_daily_pnl(analysis, limit));
    out.push_str(&heading("Win Rate per Account"));
    out.push_str(&render_win_rates(analysis, limit));
    out.push_str(&heading("Trade Size"));
    out.push_str(&render_size_summary(analysis));
    out.push_str(&heading("Trades per Day"));
    out.push_str(&render_daily_activity(analysis, limit));
    out.push_str(&heading("Performance by Sentiment"));
    out.push_str(&render_sentiment_stats(analysis));
    out.push_str(&heading("Segments"));
    out.push_str(&render_segments(analysis, limit));
    out.push_str(&heading("Summary"));
    out.push_str(&render_insights(analysis));
    out
}

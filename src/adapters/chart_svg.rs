//! SVG rendering for bar and stacked bar charts.

use crate::domain::chart::{BarChart, Chart, StackedBarChart};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const PADDING_LEFT: f64 = 70.0;
const PADDING_RIGHT: f64 = 20.0;
const PADDING_TOP: f64 = 40.0;
const PADDING_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;

const BAR_COLORS: &[&str] = &["#2563eb", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#06b6d4"];

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render(chart: &Chart) -> String {
    match chart {
        Chart::Bar(c) => render_bar_chart(c),
        Chart::Stacked(c) => render_stacked_chart(c),
    }
}

/// Maps values onto the plot's vertical axis. The range always includes 0.
struct YScale {
    min: f64,
    max: f64,
}

impl YScale {
    fn new(values: impl Iterator<Item = f64>) -> Self {
        let (mut min, mut max) = values
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if (max - min).abs() < f64::EPSILON {
            max = min + 1.0;
        }
        let pad = (max - min) * 0.05;
        if max > 0.0 {
            max += pad;
        }
        if min < 0.0 {
            min -= pad;
        }
        Self { min, max }
    }

    fn plot_height() -> f64 {
        HEIGHT - PADDING_TOP - PADDING_BOTTOM
    }

    fn y(&self, value: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        HEIGHT - PADDING_BOTTOM - frac * Self::plot_height()
    }
}

fn format_tick(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if abs >= 10.0 || abs == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn frame(title: &str, x_label: &str, y_label: &str, scale: &YScale) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{WIDTH:.0}" height="{HEIGHT:.0}" fill="white"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="24" text-anchor="middle" font-size="15" font-weight="bold">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    ));

    for i in 0..=TICKS {
        let value = scale.min + (scale.max - scale.min) * i as f64 / TICKS as f64;
        let y = scale.y(value);
        svg.push_str(&format!(
            r##"<line x1="{PADDING_LEFT:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e5e7eb"/>"##,
            WIDTH - PADDING_RIGHT
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            PADDING_LEFT - 6.0,
            y + 4.0,
            format_tick(value)
        ));
    }

    let zero = scale.y(0.0);
    svg.push_str(&format!(
        r##"<line x1="{PADDING_LEFT:.1}" y1="{zero:.1}" x2="{:.1}" y2="{zero:.1}" stroke="#374151"/>"##,
        WIDTH - PADDING_RIGHT
    ));
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        PADDING_LEFT + (WIDTH - PADDING_LEFT - PADDING_RIGHT) / 2.0,
        HEIGHT - 12.0,
        escape(x_label)
    ));
    svg.push_str(&format!(
        r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">{}</text>"#,
        HEIGHT / 2.0,
        HEIGHT / 2.0,
        escape(y_label)
    ));
    svg
}

/// Horizontal slot (x, width) for the i-th of n bars.
fn slot(i: usize, n: usize) -> (f64, f64) {
    let plot_width = WIDTH - PADDING_LEFT - PADDING_RIGHT;
    let step = plot_width / n as f64;
    let bar_width = step * 0.6;
    (PADDING_LEFT + step * i as f64 + (step - bar_width) / 2.0, bar_width)
}

fn category_label(svg: &mut String, x: f64, width: f64, label: &str) {
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        x + width / 2.0,
        HEIGHT - PADDING_BOTTOM + 16.0,
        escape(label)
    ));
}

pub fn render_bar_chart(chart: &BarChart) -> String {
    let scale = YScale::new(chart.bars.iter().map(|b| b.value));
    let mut svg = frame(&chart.title, &chart.x_label, &chart.y_label, &scale);

    if chart.bars.is_empty() {
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#6b7280">No data available</text>"##,
            WIDTH / 2.0,
            HEIGHT / 2.0
        ));
    }

    let zero = scale.y(0.0);
    for (i, bar) in chart.bars.iter().enumerate() {
        let (x, width) = slot(i, chart.bars.len());
        let value = if bar.value.is_finite() { bar.value } else { 0.0 };
        let top = scale.y(value).min(zero);
        let height = (scale.y(value) - zero).abs();
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{top:.1}" width="{width:.1}" height="{height:.1}" fill="{}"><title>{}: {}</title></rect>"#,
            BAR_COLORS[i % BAR_COLORS.len()],
            escape(&bar.label),
            format_tick(bar.value)
        ));
        category_label(&mut svg, x, width, &bar.label);
    }

    svg.push_str("</svg>");
    svg
}

pub fn render_stacked_chart(chart: &StackedBarChart) -> String {
    let totals = chart
        .groups
        .iter()
        .map(|(_, values)| values.iter().filter(|v| v.is_finite()).sum::<f64>());
    let scale = YScale::new(totals);
    let mut svg = frame(&chart.title, &chart.x_label, &chart.y_label, &scale);

    for (i, (label, values)) in chart.groups.iter().enumerate() {
        let (x, width) = slot(i, chart.groups.len());
        let mut base = 0.0;
        for (s, value) in values.iter().enumerate() {
            if !value.is_finite() || *value <= 0.0 {
                continue;
            }
            let top = scale.y(base + value);
            let height = scale.y(base) - top;
            svg.push_str(&format!(
                r#"<rect x="{x:.1}" y="{top:.1}" width="{width:.1}" height="{height:.1}" fill="{}"><title>{} {}: {}</title></rect>"#,
                BAR_COLORS[s % BAR_COLORS.len()],
                escape(label),
                escape(chart.series.get(s).map(String::as_str).unwrap_or("")),
                format_tick(*value)
            ));
            base += value;
        }
        category_label(&mut svg, x, width, label);
    }

    for (s, name) in chart.series.iter().enumerate() {
        let x = WIDTH - PADDING_RIGHT - 90.0;
        let y = PADDING_TOP + 4.0 + s as f64 * 16.0;
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}">{}</text>"#,
            BAR_COLORS[s % BAR_COLORS.len()],
            x + 14.0,
            y + 9.0,
            escape(name)
        ));
    }

    svg.push_str("</svg>");
    svg
}

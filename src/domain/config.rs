//! Analysis configuration: building and validating it from a [`ConfigPort`].
//!
//! ```ini
//! [input]
//! sentiment = data/sentiment.csv
//! trades = data/traders.csv
//!
//! [merge]
//! duplicate_dates = reject
//!
//! [segments]
//! consistency_threshold = 0.6
//!
//! [report]
//! output_dir = report
//! format = all
//! preview_rows = 5
//! show_previews = true
//! ```

use crate::domain::error::AnalysisError;
use crate::domain::merge::DuplicatePolicy;
use crate::domain::segment::DEFAULT_CONSISTENCY_THRESHOLD;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_OUTPUT_DIR: &str = "report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables on stdout only
    Console,
    /// Tables plus one SVG file per chart
    Svg,
    /// Tables plus a single HTML report
    Html,
    /// Tables, SVG files and the HTML report
    #[default]
    All,
}

impl OutputFormat {
    pub fn writes_svg(self) -> bool {
        matches!(self, OutputFormat::Svg | OutputFormat::All)
    }

    pub fn writes_html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::All)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "svg" => Ok(OutputFormat::Svg),
            "html" => Ok(OutputFormat::Html),
            "all" => Ok(OutputFormat::All),
            other => Err(format!(
                "unknown format '{other}' (expected console, svg, html or all)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Console => "console",
            OutputFormat::Svg => "svg",
            OutputFormat::Html => "html",
            OutputFormat::All => "all",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub sentiment_path: Option<PathBuf>,
    pub trades_path: Option<PathBuf>,
    pub duplicate_policy: DuplicatePolicy,
    pub consistency_threshold: f64,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub preview_rows: usize,
    pub show_previews: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sentiment_path: None,
            trades_path: None,
            duplicate_policy: DuplicatePolicy::default(),
            consistency_threshold: DEFAULT_CONSISTENCY_THRESHOLD,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            show_previews: true,
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_key<T: FromStr<Err = String>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, AnalysisError> {
    config
        .get_string(section, key)
        .map(|raw| raw.parse::<T>().map_err(|reason| invalid(section, key, reason)))
        .transpose()
}

/// Boolean spellings accepted in INI files.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Reject values that would be silently replaced by defaults.
pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    if let Some(raw) = config.get_string("segments", "consistency_threshold") {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid("segments", "consistency_threshold", "must be a number"))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(
                "segments",
                "consistency_threshold",
                "must be between 0 and 1",
            ));
        }
    }

    if let Some(raw) = config.get_string("report", "preview_rows") {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| invalid("report", "preview_rows", "must be a non-negative integer"))?;
    }

    if let Some(raw) = config.get_string("report", "show_previews") {
        parse_flag(&raw).ok_or_else(|| {
            invalid("report", "show_previews", "must be true/false, yes/no, on/off or 1/0")
        })?;
    }

    parse_key::<DuplicatePolicy>(config, "merge", "duplicate_dates")?;
    parse_key::<OutputFormat>(config, "report", "format")?;

    for key in ["sentiment", "trades"] {
        if let Some(path) = config.get_string("input", key) {
            if path.trim().is_empty() {
                return Err(invalid("input", key, "path must not be empty"));
            }
        }
    }
    Ok(())
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, AnalysisError> {
    validate_analysis_config(config)?;
    let defaults = AnalysisConfig::default();

    Ok(AnalysisConfig {
        sentiment_path: config.get_string("input", "sentiment").map(PathBuf::from),
        trades_path: config.get_string("input", "trades").map(PathBuf::from),
        duplicate_policy: parse_key(config, "merge", "duplicate_dates")?
            .unwrap_or(defaults.duplicate_policy),
        consistency_threshold: config.get_double(
            "segments",
            "consistency_threshold",
            defaults.consistency_threshold,
        ),
        output_dir: config
            .get_string("report", "output_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
        format: parse_key(config, "report", "format")?.unwrap_or(defaults.format),
        preview_rows: config.get_int("report", "preview_rows", DEFAULT_PREVIEW_ROWS as i64)
            as usize,
        show_previews: config.get_bool("report", "show_previews", defaults.show_previews),
    })
}

impl AnalysisConfig {
    pub fn sentiment_path(&self) -> Result<&PathBuf, AnalysisError> {
        self.sentiment_path
            .as_ref()
            .ok_or_else(|| AnalysisError::ConfigMissing {
                section: "input".into(),
                key: "sentiment".into(),
            })
    }

    pub fn trades_path(&self) -> Result<&PathBuf, AnalysisError> {
        self.trades_path
            .as_ref()
            .ok_or_else(|| AnalysisError::ConfigMissing {
                section: "input".into(),
                key: "trades".into(),
            })
    }
}

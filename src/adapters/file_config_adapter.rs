//! INI file configuration adapter.

use crate::domain::config::parse_flag;
use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Sections the analysis reads; anything else in the file is ignored.
pub const KNOWN_SECTIONS: &[&str] = &["input", "merge", "segments", "report"];

pub struct FileConfigAdapter {
    source: String,
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let source = path.as_ref().display().to_string();
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| AnalysisError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { source, config })
    }

    pub fn from_string(content: &str) -> Result<Self, AnalysisError> {
        let source = "<inline>".to_string();
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AnalysisError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { source, config })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Section names present in the file but not read by the analysis.
    pub fn unknown_sections(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .config
            .sections()
            .into_iter()
            .filter(|s| !KNOWN_SECTIONS.contains(&s.as_str()))
            .collect();
        unknown.sort();
        unknown
    }

    fn parse<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.get_string(section, key)?.parse().ok()
    }
}

impl ConfigPort for FileConfigAdapter {
    /// Trimmed value; blank entries count as absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parse(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parse(section, key).unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(default)
    }
}

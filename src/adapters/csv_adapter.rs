//! CSV file data adapter.

use crate::domain::error::AnalysisError;
use crate::domain::table::RawTable;
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    sentiment_path: PathBuf,
    trades_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(sentiment_path: PathBuf, trades_path: PathBuf) -> Self {
        Self {
            sentiment_path,
            trades_path,
        }
    }

    /// Read a delimited file with a header row into a [`RawTable`].
    pub fn read_table(path: &Path) -> Result<RawTable, AnalysisError> {
        let source = path.display().to_string();
        let content = fs::read(path).map_err(|e| AnalysisError::ReadInput {
            file: source.clone(),
            source: e,
        })?;
        Self::parse_table(&source, &content)
    }

    pub fn parse_table(source: &str, content: &[u8]) -> Result<RawTable, AnalysisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(content);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AnalysisError::Csv {
                file: source.to_string(),
                reason: format!("CSV header error: {}", e),
            })?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| AnalysisError::Csv {
                file: source.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        log::debug!("{}: {} columns, {} rows", source, headers.len(), rows.len());
        Ok(RawTable::new(source, headers, rows))
    }
}

impl DataPort for CsvAdapter {
    fn load_sentiment(&self) -> Result<RawTable, AnalysisError> {
        Self::read_table(&self.sentiment_path)
    }

    fn load_trades(&self) -> Result<RawTable, AnalysisError> {
        Self::read_table(&self.trades_path)
    }
}

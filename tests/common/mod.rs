#![allow(dead_code)]

use chrono::NaiveDate;
use sentitrade::adapters::csv_adapter::CsvAdapter;
use sentitrade::domain::config::{AnalysisConfig, OutputFormat};
use sentitrade::domain::error::AnalysisError;
use sentitrade::domain::table::RawTable;
use sentitrade::ports::data_port::DataPort;
use std::path::Path;

/// Four days of sentiment; 2024-01-05 is deliberately missing.
pub const SENTIMENT_CSV: &str = "\
timestamp,value,classification,date
1704067200,20,Extreme Fear,2024-01-01
1704153600,40,Fear,2024-01-02
1704240000,55,Neutral,2024-01-03
1704326400,75,Greed,2024-01-04
";

pub const TRADES_CSV: &str = "\
Account,Coin,Execution Price,Size USD,Side,Timestamp IST,Closed PnL,Direction
0xa,BTC,42000,1000,BUY,01-01-2024 09:00,0,Open Long
0xa,BTC,42500,1000,SELL,01-01-2024 15:30,50,Close Long
0xb,ETH,2300,200,BUY,02-01-2024 10:00,-20,Open Long
0xb,ETH,2350,400,SELL,02-01-2024 11:00,30,Close Long
0xa,SOL,100,\"5,000\",BUY,04-01-2024 08:15,-100,Open Long
0xc,BTC,43000,300,SELL,05-01-2024 12:00,10,Close Short
";

/// Serves both tables from in-memory CSV text, optionally failing one load.
pub struct MockDataPort {
    pub sentiment: String,
    pub trades: String,
    pub sentiment_error: Option<String>,
    pub trades_error: Option<String>,
}

impl MockDataPort {
    pub fn new(sentiment: &str, trades: &str) -> Self {
        Self {
            sentiment: sentiment.to_string(),
            trades: trades.to_string(),
            sentiment_error: None,
            trades_error: None,
        }
    }

    pub fn sample() -> Self {
        Self::new(SENTIMENT_CSV, TRADES_CSV)
    }

    pub fn with_trades_error(mut self, reason: &str) -> Self {
        self.trades_error = Some(reason.to_string());
        self
    }

    pub fn with_sentiment_error(mut self, reason: &str) -> Self {
        self.sentiment_error = Some(reason.to_string());
        self
    }
}

fn load(source: &str, content: &str, error: &Option<String>) -> Result<RawTable, AnalysisError> {
    if let Some(reason) = error {
        return Err(AnalysisError::Csv {
            file: source.to_string(),
            reason: reason.clone(),
        });
    }
    CsvAdapter::parse_table(source, content.as_bytes())
}

impl DataPort for MockDataPort {
    fn load_sentiment(&self) -> Result<RawTable, AnalysisError> {
        load("sentiment.csv", &self.sentiment, &self.sentiment_error)
    }

    fn load_trades(&self) -> Result<RawTable, AnalysisError> {
        load("trades.csv", &self.trades, &self.trades_error)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Console-only configuration writing into `dir`.
pub fn console_config(dir: &Path) -> AnalysisConfig {
    AnalysisConfig {
        output_dir: dir.to_path_buf(),
        format: OutputFormat::Console,
        ..AnalysisConfig::default()
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

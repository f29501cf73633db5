//! Executed trade records.

use crate::domain::dates::parse_trade_timestamp;
use crate::domain::error::AnalysisError;
use crate::domain::table::{is_null, RawTable, TRADE_COLUMNS};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "B" => Ok(Side::Buy),
            "SELL" | "S" => Ok(Side::Sell),
            _ => Err("expected BUY or SELL".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub account: String,
    pub symbol: String,
    pub execution_price: f64,
    pub size_usd: f64,
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub closed_pnl: f64,
    pub direction: String,
}

impl TradeRecord {
    /// Join key: the timestamp's calendar date.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

struct TradeColumns {
    account: usize,
    symbol: usize,
    execution_price: usize,
    size_usd: usize,
    side: usize,
    time: usize,
    closed_pnl: usize,
    direction: usize,
}

impl TradeColumns {
    fn resolve(table: &RawTable) -> Result<Self, AnalysisError> {
        Ok(Self {
            account: table.require_column("account", "Account")?,
            symbol: table.require_column("symbol", "Coin")?,
            execution_price: table.require_column("execution_price", "Execution Price")?,
            size_usd: table.require_column("size_usd", "Size USD")?,
            side: table.require_column("side", "Side")?,
            time: table.require_column("time", "Timestamp IST")?,
            closed_pnl: table.require_column("closedPnL", "Closed PnL")?,
            direction: table.require_column("direction", "Direction")?,
        })
    }
}

/// Row-level field access that reports file, line and source column.
struct RowReader<'a> {
    source: &'a str,
    row: &'a [String],
    line: usize,
}

impl RowReader<'_> {
    fn text(&self, idx: usize, column: &str) -> Result<String, AnalysisError> {
        let value = self.row.get(idx).map(|s| s.trim()).unwrap_or("");
        if is_null(value) {
            return Err(self.invalid(column, value, "value is required"));
        }
        Ok(value.to_string())
    }

    fn number(&self, idx: usize, column: &str) -> Result<f64, AnalysisError> {
        let value = self.text(idx, column)?;
        value
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(column, &value, "not a number"))
    }

    fn invalid(&self, column: &str, value: &str, reason: &str) -> AnalysisError {
        AnalysisError::InvalidValue {
            file: self.source.to_string(),
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Rename source columns and parse every row. Any bad row aborts.
pub fn parse_trades(table: RawTable) -> Result<Vec<TradeRecord>, AnalysisError> {
    let table = table.rename(TRADE_COLUMNS);
    let cols = TradeColumns::resolve(&table)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let reader = RowReader {
                source: &table.source,
                row,
                line: RawTable::line_of(idx),
            };

            let raw_side = reader.text(cols.side, "Side")?;
            let side = raw_side
                .parse::<Side>()
                .map_err(|reason| reader.invalid("Side", &raw_side, &reason))?;

            let raw_time = row.get(cols.time).map(|s| s.trim()).unwrap_or("");
            let timestamp =
                parse_trade_timestamp(raw_time).ok_or_else(|| AnalysisError::InvalidDate {
                    file: table.source.clone(),
                    line: reader.line,
                    column: "Timestamp IST".into(),
                    value: raw_time.to_string(),
                })?;

            Ok(TradeRecord {
                account: reader.text(cols.account, "Account")?,
                symbol: reader.text(cols.symbol, "Coin")?,
                execution_price: reader.number(cols.execution_price, "Execution Price")?,
                size_usd: reader.number(cols.size_usd, "Size USD")?,
                side,
                timestamp,
                closed_pnl: reader.number(cols.closed_pnl, "Closed PnL")?,
                direction: reader.text(cols.direction, "Direction")?,
            })
        })
        .collect()
}

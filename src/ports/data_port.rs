//! Input dataset port trait.

use crate::domain::error::AnalysisError;
use crate::domain::table::RawTable;

/// Source of the two raw input tables.
pub trait DataPort {
    fn load_sentiment(&self) -> Result<RawTable, AnalysisError>;

    fn load_trades(&self) -> Result<RawTable, AnalysisError>;
}

//! Report generation port trait.

use crate::domain::analysis::Analysis;
use crate::domain::error::AnalysisError;
use std::path::Path;

/// Port for writing analysis reports.
pub trait ReportPort {
    /// Write the report under `output_dir`, returning the written paths.
    fn write(
        &self,
        analysis: &Analysis,
        output_dir: &Path,
    ) -> Result<Vec<std::path::PathBuf>, AnalysisError>;
}

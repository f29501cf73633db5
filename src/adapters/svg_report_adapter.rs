//! Writes each chart of an analysis as its own SVG file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::chart_svg;
use crate::domain::analysis::Analysis;
use crate::domain::chart::charts_for;
use crate::domain::error::AnalysisError;
use crate::ports::report_port::ReportPort;

#[derive(Default)]
pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(&self, analysis: &Analysis, output_dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
        fs::create_dir_all(output_dir)?;

        let mut written = Vec::new();
        for (i, chart) in charts_for(analysis).iter().enumerate() {
            let path = output_dir.join(format!("{:02}_{}.svg", i + 1, chart.slug()));
            fs::write(&path, chart_svg::render(chart))?;
            log::debug!("wrote chart '{}' to {}", chart.title(), path.display());
            written.push(path);
        }
        Ok(written)
    }
}

//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "html")]
pub mod html_report_adapter;
pub mod svg_report_adapter;
pub mod tables;

//! Core domain types and logic.

pub mod table;
pub mod dates;
pub mod sentiment;
pub mod trade;
pub mod merge;
pub mod stats;
pub mod aggregate;
pub mod segment;
pub mod insights;
pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;

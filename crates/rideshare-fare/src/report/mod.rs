//! HTML training reports.
pub mod plots;
pub mod report;

pub use report::{write_training_report, Report, ReportSection};

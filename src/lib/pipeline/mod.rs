pub mod analyze;
pub mod report;

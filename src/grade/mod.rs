#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Serialized report shape and human-readable overview.
pub mod report;
/// Score, status, and report value types.
pub mod results;

pub use report::{ReportDocument, ReportTest, ReportTestError};
pub use results::{AutobadgerResult, Score, TestError, TestResult, TestStatus};

//! # autobadger
//!
//! A grading orchestrator for course projects. Test suites and lifecycle
//! callbacks are registered per project; a run validates required resources,
//! sets up, executes every suite, tears down, and aggregates the outcome of
//! each graded method into one score report.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Lifecycle hooks and the composite that broadcasts them
pub mod callback;
/// Runtime configuration read from the environment
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Error taxonomy of a grading run
pub mod error;
/// Scores, test results, and reports
pub mod grade;
/// Top-level grading lifecycle
pub mod orchestrator;
/// Course project identifiers
pub mod project;
/// The graders registered for each course project
pub mod projects;
/// Suite and callback catalog, and graded methods
pub mod registry;
/// Executes one test suite
pub mod runner;
/// Utility functions for convenience
pub mod util;

pub use callback::{AutobadgerCallback, Callback};
pub use error::{
    AutobadgerError, ConfigError, Hook, MissingRequiredResource, ReportError, SuiteError,
};
pub use grade::{AutobadgerResult, ReportDocument, Score, TestError, TestResult, TestStatus};
pub use orchestrator::{Autobadger, Phase, grade};
pub use project::ProjectId;
pub use registry::{
    CallbackDescriptor, ExecutionFailure, GradedMethod, GradedOutcome, Outcome, Registry,
    SuiteDescriptor,
};
pub use runner::{SuiteRunner, TestSuite};

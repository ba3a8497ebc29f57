#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use crate::project::ProjectId;

/// Raised by a callback when something the grader depends on (a database, a
/// container, a binary on the path) is not available.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing the following required resource(s): {}", .resources.join(", "))]
pub struct MissingRequiredResource {
    /// Names of the missing resources.
    pub resources: Vec<String>,
}

impl MissingRequiredResource {
    /// Creates a new error listing the given resources.
    pub fn new<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }
}

/// An authoring defect in the grader itself. These are never turned into a
/// score.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No suite was registered for the project.
    #[error("No tests found for {project}!")]
    NoSuites {
        /// The project that was looked up.
        project: ProjectId,
    },
    /// A suite declared no graded methods.
    #[error("{suite} is missing tests. Attach at least one graded method to the suite.")]
    NoGradedMethods {
        /// Name of the offending suite.
        suite: String,
    },
    /// The points of a suite's graded methods do not add up to the total it
    /// was registered with.
    #[error(
        "Double check the scores of your tests and the total score for {suite}. {declared} != \
         {summed}"
    )]
    PointsMismatch {
        /// Name of the offending suite.
        suite:    String,
        /// Total declared at registration.
        declared: u32,
        /// Sum of the graded methods' points.
        summed:   u32,
    },
    /// The suites' declared points add up to more than a score can hold.
    #[error("The declared points of the suites for {project} do not fit in a score.")]
    PointsOverflow {
        /// The project whose suites were summed.
        project: ProjectId,
    },
}

/// Errors raised while producing or delivering a report.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// Two test results share a question number.
    #[error("Multiple tests share the same question number: Q{q}.")]
    DuplicateQuestion {
        /// The repeated question number.
        q: u32,
    },
    /// The report could not be encoded.
    #[error("Could not encode the report as JSON")]
    Json(#[from] serde_json::Error),
    /// The report could not be written.
    #[error("Could not write the report to {}", .path.display())]
    Io {
        /// Destination that failed.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Anything that stops a suite from producing a report.
#[derive(thiserror::Error, Debug)]
pub enum SuiteError {
    /// The suite is misconfigured; must not be downgraded to a score.
    #[error(transparent)]
    Misconfigured(#[from] ConfigError),
    /// Anything else: a suite that could not be created, a failing lifecycle
    /// hook, a panic.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Run-level lifecycle hooks whose failure escapes a grading run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// `on_setup`
    Setup,
    /// `on_teardown`
    Teardown,
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Hook::Setup => "on_setup",
            Hook::Teardown => "on_teardown",
        };
        f.write_str(name)
    }
}

/// Errors that escape a grading run instead of becoming a report.
#[derive(thiserror::Error, Debug)]
pub enum AutobadgerError {
    /// The grader is misconfigured for this project.
    #[error(transparent)]
    Misconfigured(#[from] ConfigError),
    /// A lifecycle hook outside of the suite loop failed.
    #[error("Lifecycle hook `{hook}` failed")]
    Hook {
        /// The hook that failed.
        hook:   Hook,
        /// What it failed with.
        #[source]
        source: anyhow::Error,
    },
    /// The report could not be produced.
    #[error(transparent)]
    Report(#[from] ReportError),
}

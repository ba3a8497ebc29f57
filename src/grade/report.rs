#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The serialized shape of a report, as consumed by downstream tooling.
//!
//! ```json
//! {
//!   "created": "2024-09-01T12:00:00.000000-04:00",
//!   "project": "p1",
//!   "score": { "earned": 20, "total": 20 },
//!   "tests": {
//!     "Q1": { "test_name": "test_os", "status": "PASSED", "score": { "earned": 10, "total": 10 } }
//!   }
//! }
//! ```

use std::{collections::BTreeMap, path::Path};

use chrono::SecondsFormat;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::results::{AutobadgerResult, Score, TestError, TestResult, TestStatus};
use crate::{constants::MISSING_SCORE, error::ReportError, project::ProjectId};

/// Top level of a serialized report.
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    /// RFC 3339 creation timestamp
    pub created: String,
    /// Graded project
    pub project: Option<ProjectId>,
    /// Overall score, or `"MISSING"`
    #[serde(serialize_with = "score_or_missing")]
    pub score:   Option<Score>,
    /// Results keyed by `Q<n>`, in lexicographic key order
    pub tests:   BTreeMap<String, ReportTest>,
}

/// One serialized test result.
#[derive(Debug, Serialize)]
pub struct ReportTest {
    /// Name of the graded method
    pub test_name: String,
    /// Outcome classification
    pub status:    TestStatus,
    /// Points earned out of points possible
    pub score:     Score,
    /// Diagnostics, omitted when the test passed cleanly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:     Option<ReportTestError>,
}

/// Serialized diagnostics of a test result.
#[derive(Debug, Serialize)]
pub struct ReportTestError {
    /// What went wrong
    pub message:    String,
    /// Cleaned trace lines, omitted when there is no trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Vec<String>>,
}

/// Writes the score, or the `MISSING` marker when there is none.
fn score_or_missing<S: Serializer>(score: &Option<Score>, serializer: S) -> Result<S::Ok, S::Error> {
    match score {
        Some(score) => score.serialize(serializer),
        None => serializer.serialize_str(MISSING_SCORE),
    }
}

impl From<&TestError> for ReportTestError {
    fn from(error: &TestError) -> Self {
        Self {
            message:    error.message.clone(),
            stacktrace: error.stacktrace_lines(),
        }
    }
}

impl From<&TestResult> for ReportTest {
    fn from(result: &TestResult) -> Self {
        Self {
            test_name: result.test_name.clone(),
            status:    result.status,
            score:     result.score,
            error:     result.error.as_ref().map(ReportTestError::from),
        }
    }
}

#[derive(Tabled)]
/// A row of the grading overview table
struct SummaryRow {
    #[tabled(rename = "Q")]
    /// * `question`: question label
    question: String,
    #[tabled(rename = "Test")]
    /// * `test`: graded method name
    test:     String,
    #[tabled(rename = "Status")]
    /// * `status`: outcome classification
    status:   String,
    #[tabled(rename = "Score")]
    /// * `score`: earned/total
    score:    String,
    #[tabled(rename = "Message")]
    /// * `message`: error message, if any
    message:  String,
}

impl AutobadgerResult {
    /// Builds the serializable form of this report.
    ///
    /// Fails if two results share a question number.
    pub fn to_report(&self) -> Result<ReportDocument, ReportError> {
        if let Some(q) = self.tests.iter().map(|t| t.q).duplicates().next() {
            return Err(ReportError::DuplicateQuestion { q });
        }

        let tests = self
            .tests
            .iter()
            .map(|t| (t.label(), ReportTest::from(t)))
            .collect();

        Ok(ReportDocument {
            created: self.created.to_rfc3339_opts(SecondsFormat::Micros, false),
            project: self.project,
            score: self.score,
            tests,
        })
    }

    /// Serializes this report as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, ReportError> {
        Ok(serde_json::to_value(self.to_report()?)?)
    }

    /// Serializes this report as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&self.to_report()?)?)
    }

    /// Writes this report as indented JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Renders a human-readable overview of the report.
    pub fn summary_table(&self) -> String {
        let rows = self
            .tests
            .iter()
            .sorted_by_key(|t| t.label())
            .map(|t| SummaryRow {
                question: t.label(),
                test:     t.test_name.clone(),
                status:   t.status.to_string(),
                score:    t.score.to_string(),
                message:  t
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        let project = self
            .project
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown project".to_string());
        let total = self
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISSING_SCORE.to_string());

        Table::new(&rows)
            .with(Panel::header(format!("Grading Overview ({project})")))
            .with(Panel::footer(format!("Total: {total}")))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(24).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(
                Modify::new(Rows::last())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string()
    }
}

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use chrono::{DateTime, Local};
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::{
    constants::{FATAL_MESSAGE, FATAL_QUESTION, FATAL_TEST_NAME},
    project::ProjectId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
/// Points earned out of points possible.
pub struct Score {
    /// Points earned
    pub earned: u32,
    /// Points possible
    pub total:  u32,
}

impl Score {
    /// Creates a new score -
    /// * `earned` - points earned
    /// * `total` - points possible
    pub fn new(earned: u32, total: u32) -> Self {
        Self { earned, total }
    }
}

/// Accumulation saturates at `u32::MAX` rather than wrapping.
impl AddAssign for Score {
    fn add_assign(&mut self, other: Self) {
        self.earned = self.earned.saturating_add(other.earned);
        self.total = self.total.saturating_add(other.total);
    }
}

impl Add for Score {
    type Output = Score;

    fn add(mut self, other: Self) -> Self::Output {
        self += other;
        self
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}/{})", self.earned, self.total)
    }
}

/// Outcome classification of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Full credit
    Passed,
    /// No credit
    Failed,
    /// The run could not proceed; only produced by the orchestrator
    Fatal,
    /// Some credit
    Partial,
}

impl TestStatus {
    /// Derives a status from a score. Never yields [`TestStatus::Fatal`].
    ///
    /// A score that is not less than its total passes, so `(0/0)` is
    /// [`TestStatus::Passed`].
    pub fn from_score(score: &Score) -> Self {
        if score.earned >= score.total {
            TestStatus::Passed
        } else if score.earned == 0 {
            TestStatus::Failed
        } else {
            TestStatus::Partial
        }
    }

    /// Upper-case name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Fatal => "FATAL",
            TestStatus::Partial => "PARTIAL",
        }
    }
}

impl Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-passing outcome with diagnostic context. Graded methods return one
/// to award partial credit.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(doc)]
pub struct TestError {
    /// What went wrong
    #[builder(setter(into))]
    pub message:    String,
    /// Optional trace or extra diagnostics, one entry per line
    #[builder(default, setter(strip_option, into))]
    pub stacktrace: Option<String>,
    /// Points earned despite the error
    #[builder(default)]
    pub earned:     u32,
}

impl TestError {
    /// Shorthand for an error awarding `earned` points.
    pub fn new(message: impl Into<String>, earned: u32) -> Self {
        Self {
            message: message.into(),
            stacktrace: None,
            earned,
        }
    }

    /// Trace lines as reported: trimmed, without blank lines or caret
    /// underlines.
    pub fn stacktrace_lines(&self) -> Option<Vec<String>> {
        self.stacktrace.as_deref().map(crate::util::clean_stacktrace)
    }
}

impl Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Original Error: {}:\nStacktrace: {}",
            self.message,
            self.stacktrace.as_deref().unwrap_or("None")
        )
    }
}

/// The outcome of one graded method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// Name of the graded method
    pub test_name: String,
    /// Question number, unique within a report
    pub q:         u32,
    /// Derived status
    pub status:    TestStatus,
    /// Points earned out of the method's points
    pub score:     Score,
    /// Diagnostics, if the method did not pass cleanly
    pub error:     Option<TestError>,
}

impl TestResult {
    /// Builds a result whose status is derived from `score`.
    pub fn new(test_name: impl Into<String>, q: u32, score: Score, error: Option<TestError>) -> Self {
        Self {
            test_name: test_name.into(),
            q,
            status: TestStatus::from_score(&score),
            score,
            error,
        }
    }

    /// A failed, zero-score result for a method that could not execute.
    pub fn zero(
        test_name: impl Into<String>,
        total: u32,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
        q: u32,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            q,
            status: TestStatus::Failed,
            score: Score::new(0, total),
            error: Some(
                TestError::builder()
                    .message(message)
                    .stacktrace(stack_trace)
                    .build(),
            ),
        }
    }

    /// Label used as the key of this result in a serialized report, eg. `Q3`.
    pub fn label(&self) -> String {
        format!("Q{}", self.q)
    }
}

/// The aggregated report of a grading run.
#[derive(Debug, Clone)]
pub struct AutobadgerResult {
    /// When the report was started
    pub created: DateTime<Local>,
    /// Project graded, once known
    pub project: Option<ProjectId>,
    /// Running total, once at least one score was added
    pub score:   Option<Score>,
    /// Outcomes in the order they were added
    pub tests:   Vec<TestResult>,
}

impl Default for AutobadgerResult {
    fn default() -> Self {
        Self {
            created: Local::now(),
            project: None,
            score:   None,
            tests:   Vec::new(),
        }
    }
}

impl AutobadgerResult {
    /// An empty report for `project`.
    pub fn new(project: ProjectId) -> Self {
        Self {
            project: Some(project),
            ..Self::default()
        }
    }

    /// A report collapsed to a single synthetic `FATAL` entry.
    ///
    /// * `project` - the project that was being graded
    /// * `stack_trace` - what went wrong
    /// * `total` - points the run would have been worth
    pub fn zero(project: ProjectId, stack_trace: impl Into<String>, total: u32) -> Self {
        let score = Score::new(0, total);
        Self {
            project: Some(project),
            score: Some(score),
            tests: vec![TestResult {
                test_name: FATAL_TEST_NAME.to_string(),
                q: FATAL_QUESTION,
                status: TestStatus::Fatal,
                score,
                error: Some(
                    TestError::builder()
                        .message(FATAL_MESSAGE)
                        .stacktrace(stack_trace)
                        .build(),
                ),
            }],
            ..Self::default()
        }
    }

    /// Appends an outcome and accumulates its score.
    pub fn add_test(&mut self, test: TestResult) {
        match self.score.as_mut() {
            Some(score) => *score += test.score,
            None => self.score = Some(test.score),
        }
        self.tests.push(test);
    }

    /// Merges another report into this one.
    ///
    /// The other report's project and score are adopted when this report has
    /// none; otherwise scores accumulate. Tests are appended in order.
    pub fn join(&mut self, other: AutobadgerResult) {
        if self.project.is_none() {
            self.project = other.project;
        }
        match (self.score.as_mut(), other.score) {
            (Some(score), Some(theirs)) => *score += theirs,
            (None, theirs) => self.score = theirs,
            (Some(_), None) => {}
        }
        self.tests.extend(other.tests);
    }

    /// Whether the report was collapsed by a fatal failure.
    pub fn is_fatal(&self) -> bool {
        self.tests.iter().any(|t| t.status == TestStatus::Fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries() {
        assert_eq!(TestStatus::from_score(&Score::new(0, 10)), TestStatus::Failed);
        assert_eq!(TestStatus::from_score(&Score::new(4, 10)), TestStatus::Partial);
        assert_eq!(TestStatus::from_score(&Score::new(10, 10)), TestStatus::Passed);
        assert_eq!(TestStatus::from_score(&Score::new(0, 0)), TestStatus::Passed);
    }

    #[test]
    fn score_accumulation_saturates() {
        let mut score = Score::new(u32::MAX - 1, u32::MAX);
        score += Score::new(5, 5);
        assert_eq!(score, Score::new(u32::MAX, u32::MAX));
        assert_eq!(Score::new(1, 2) + Score::new(3, 4), Score::new(4, 6));
    }

    #[test]
    fn add_test_initializes_then_accumulates() {
        let mut report = AutobadgerResult::new(ProjectId::P1);
        assert!(report.score.is_none());

        report.add_test(TestResult::new("a", 1, Score::new(3, 5), None));
        assert_eq!(report.score, Some(Score::new(3, 5)));

        report.add_test(TestResult::new("b", 2, Score::new(5, 5), None));
        assert_eq!(report.score, Some(Score::new(8, 10)));
        assert_eq!(report.tests.len(), 2);
    }

    #[test]
    fn join_adopts_missing_project_and_score() {
        let mut other = AutobadgerResult::new(ProjectId::P2);
        other.add_test(TestResult::new("a", 1, Score::new(1, 2), None));

        let mut report = AutobadgerResult::default();
        report.join(other);
        assert_eq!(report.project, Some(ProjectId::P2));
        assert_eq!(report.score, Some(Score::new(1, 2)));
        assert_eq!(report.tests[0].test_name, "a");
    }

    #[test]
    fn join_keeps_own_project_and_ignores_missing_score() {
        let mut report = AutobadgerResult::new(ProjectId::P1);
        report.add_test(TestResult::new("a", 1, Score::new(2, 2), None));
        report.join(AutobadgerResult::new(ProjectId::P3));

        assert_eq!(report.project, Some(ProjectId::P1));
        assert_eq!(report.score, Some(Score::new(2, 2)));
    }

    #[test]
    fn zero_report_has_one_fatal_entry() {
        let report = AutobadgerResult::zero(ProjectId::P1, "boom", 40);
        assert!(report.is_fatal());
        assert_eq!(report.score, Some(Score::new(0, 40)));
        assert_eq!(report.tests.len(), 1);

        let fatal = &report.tests[0];
        assert_eq!(fatal.test_name, "FATAL");
        assert_eq!(fatal.status, TestStatus::Fatal);
        assert_eq!(fatal.score, Score::new(0, 40));
        let error = fatal.error.as_ref().unwrap();
        assert_eq!(error.message, "An error occurred while running your code.");
        assert_eq!(error.stacktrace.as_deref(), Some("boom"));
    }

    #[test]
    fn zero_test_result_is_failed() {
        let result = TestResult::zero("test_os", 10, "no such file", "trace", 1);
        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.score, Score::new(0, 10));
        assert_eq!(result.label(), "Q1");
    }

    #[test]
    fn error_builder_defaults() {
        let err = TestError::builder().message("Expected 3 but got 2").build();
        assert_eq!(err.earned, 0);
        assert!(err.stacktrace.is_none());
        assert_eq!(err.to_string(), "Original Error: Expected 3 but got 2:\nStacktrace: None");
    }
}

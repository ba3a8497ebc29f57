#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};

use crate::{
    callback::{AutobadgerCallback, Callback},
    error::{ConfigError, SuiteError},
    grade::AutobadgerResult,
    registry::{GradedMethod, GradedOutcome, SuiteDescriptor},
    util::short_type_name,
};

/// A collection of graded methods sharing one declared point total.
///
/// ```
/// use anyhow::Result;
/// use autobadger::{GradedMethod, Outcome, TestSuite, graded};
///
/// struct Arithmetic;
///
/// impl Arithmetic {
///     fn test_add(&mut self) -> Result<Outcome> {
///         Ok(Outcome::Earned(if 1 + 1 == 2 { 5 } else { 0 }))
///     }
/// }
///
/// impl TestSuite for Arithmetic {
///     fn create() -> Result<Self> {
///         Ok(Arithmetic)
///     }
///
///     fn graded_methods() -> Vec<GradedMethod<Self>> {
///         vec![graded!(Self::test_add, q = 1, points = 5)]
///     }
/// }
///
/// assert_eq!(Arithmetic::name(), "Arithmetic");
/// ```
pub trait TestSuite: Sized + 'static {
    /// Builds a suite instance for one run. An error here is an unexpected
    /// suite-level failure and collapses the run into a fatal report.
    fn create() -> Result<Self>;

    /// Graded methods, in the order they should run.
    fn graded_methods() -> Vec<GradedMethod<Self>>;

    /// Name used in reports and configuration errors.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

/// Executes one suite instance end to end.
pub struct SuiteRunner<'a> {
    /// What the suite was registered as
    descriptor: &'a SuiteDescriptor,
    /// Lifecycle hooks fired around each method
    callback:   &'a mut AutobadgerCallback,
}

impl<'a> SuiteRunner<'a> {
    /// Creates a runner for the suite described by `descriptor`.
    pub fn new(descriptor: &'a SuiteDescriptor, callback: &'a mut AutobadgerCallback) -> Self {
        Self {
            descriptor,
            callback,
        }
    }

    /// Runs every graded method of `suite` and returns the suite's report.
    ///
    /// A method that fails to execute is recorded as a zero-score result and
    /// the remaining methods still run. Fails with a [`ConfigError`] if the
    /// suite has no graded methods, or if their points do not add up to the
    /// total the suite was registered with. Lifecycle hook errors are
    /// returned as [`SuiteError::Unexpected`].
    pub fn run<S: TestSuite>(mut self, suite: &mut S) -> Result<AutobadgerResult, SuiteError> {
        let methods = S::graded_methods();
        if methods.is_empty() {
            return Err(ConfigError::NoGradedMethods {
                suite: self.descriptor.name().to_string(),
            }
            .into());
        }

        let mut grade = AutobadgerResult::new(self.descriptor.project());
        for method in &methods {
            self.callback.on_before_test()?;
            let result = match method.invoke(suite) {
                GradedOutcome::Completed(result) => result,
                GradedOutcome::ExecutionFailed(failure) => {
                    tracing::warn!(
                        suite = self.descriptor.name(),
                        test = %failure.test_name,
                        q = failure.q,
                        "graded method failed to execute: {:#}",
                        failure.source
                    );
                    failure.into_zero()
                }
            };
            self.callback.on_after_test()?;

            tracing::debug!(
                suite = self.descriptor.name(),
                test = %result.test_name,
                q = result.q,
                status = %result.status,
                score = %result.score,
                "graded"
            );
            grade.add_test(result);
        }

        let declared = self.descriptor.points();
        let summed = grade.score.map(|s| s.total).unwrap_or_default();
        if summed != declared {
            return Err(ConfigError::PointsMismatch {
                suite: self.descriptor.name().to_string(),
                declared,
                summed,
            }
            .into());
        }

        Ok(grade)
    }
}

/// Creates suite `S` and runs it. Installed as the entry point of every
/// [`SuiteDescriptor`] built with [`SuiteDescriptor::of`].
pub(crate) fn run_suite<S: TestSuite>(
    descriptor: &SuiteDescriptor,
    callback: &mut AutobadgerCallback,
) -> Result<AutobadgerResult, SuiteError> {
    let mut suite =
        S::create().with_context(|| format!("Could not create test suite {}", descriptor.name()))?;
    SuiteRunner::new(descriptor, callback).run(&mut suite)
}

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The catalog binding test suites and lifecycle callbacks to projects, and
//! the graded-method contract suites are built from.
//!
//! A registry is populated once, before any grading run, and only read
//! afterwards:
//!
//! ```
//! use autobadger::{ProjectId, Registry};
//! use autobadger::projects::p1::{ProjectOneCallback, ProjectOneTest};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_suite::<ProjectOneTest>(ProjectId::P1, 20)
//!     .register_callback::<ProjectOneCallback>(ProjectId::P1);
//!
//! assert_eq!(registry.tests_for(ProjectId::P1).unwrap().len(), 1);
//! assert_eq!(registry.grand_total(ProjectId::P1), Ok(20));
//! ```

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use anyhow::{Result, anyhow};

use crate::{
    callback::{AutobadgerCallback, Callback},
    constants::INCORRECT_ANSWER_PREFIX,
    error::{ConfigError, SuiteError},
    grade::{AutobadgerResult, Score, TestError, TestResult},
    project::ProjectId,
    runner::{self, TestSuite},
    util::panic_message,
};

/// What a graded method hands back when it ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Points earned; no diagnostics
    Earned(u32),
    /// A wrong answer, possibly with partial credit in
    /// [`TestError::earned`]
    Incorrect(TestError),
}

impl From<u32> for Outcome {
    fn from(earned: u32) -> Self {
        Outcome::Earned(earned)
    }
}

impl From<TestError> for Outcome {
    fn from(error: TestError) -> Self {
        Outcome::Incorrect(error)
    }
}

/// Body of a graded method.
pub type GradedFn<S> = fn(&mut S) -> Result<Outcome>;

/// A graded method that could not run to completion: it returned an error or
/// panicked.
#[derive(Debug)]
pub struct ExecutionFailure {
    /// Name of the graded method
    pub test_name: String,
    /// What the method failed with
    pub source:    anyhow::Error,
    /// Points the method was worth
    pub total:     u32,
    /// Question number of the method
    pub q:         u32,
}

impl ExecutionFailure {
    /// The zero-score result recorded in place of the method's own.
    pub fn into_zero(self) -> TestResult {
        let trace = format!(
            "Failed to run Q{} ('{}'):\n{:?}",
            self.q, self.test_name, self.source
        );
        TestResult::zero(
            self.test_name,
            self.total,
            self.source.to_string(),
            trace,
            self.q,
        )
    }
}

/// Result of invoking a [`GradedMethod`].
#[derive(Debug)]
pub enum GradedOutcome {
    /// The method ran; its result is normalised
    Completed(TestResult),
    /// The method could not run
    ExecutionFailed(ExecutionFailure),
}

/// One question's worth of gradable logic on suite `S`.
pub struct GradedMethod<S> {
    /// Name reported for the method
    name:   &'static str,
    /// Question number
    q:      u32,
    /// Points the method is worth
    points: u32,
    /// The body
    func:   GradedFn<S>,
}

impl<S> Clone for GradedMethod<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for GradedMethod<S> {}

impl<S> std::fmt::Debug for GradedMethod<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradedMethod")
            .field("name", &self.name)
            .field("q", &self.q)
            .field("points", &self.points)
            .finish()
    }
}

impl<S> GradedMethod<S> {
    /// Declares a graded method -
    /// * `name` - name reported for the method
    /// * `q` - question number, unique within a report
    /// * `points` - points the method is worth
    /// * `func` - the body
    pub fn new(name: &'static str, q: u32, points: u32, func: GradedFn<S>) -> Self {
        Self {
            name,
            q,
            points,
            func,
        }
    }

    /// Name reported for the method.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Question number.
    pub fn q(&self) -> u32 {
        self.q
    }

    /// Points the method is worth.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Runs the body and normalises what it returns.
    ///
    /// An earned integer becomes a result out of [`Self::points`]; an
    /// [`Outcome::Incorrect`] keeps its partial credit and gets its message
    /// prefixed with `Incorrect answer: `. An error or a panic is returned as
    /// [`GradedOutcome::ExecutionFailed`].
    pub fn invoke(&self, suite: &mut S) -> GradedOutcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.func)(suite)))
            .unwrap_or_else(|payload| {
                Err(anyhow!("{} panicked: {}", self.name, panic_message(payload.as_ref())))
            });

        match outcome {
            Ok(Outcome::Earned(earned)) => {
                self.check_earned(earned);
                GradedOutcome::Completed(TestResult::new(
                    self.name,
                    self.q,
                    Score::new(earned, self.points),
                    None,
                ))
            }
            Ok(Outcome::Incorrect(mut error)) => {
                self.check_earned(error.earned);
                error.message = format!("{INCORRECT_ANSWER_PREFIX}{}", error.message);
                GradedOutcome::Completed(TestResult::new(
                    self.name,
                    self.q,
                    Score::new(error.earned, self.points),
                    Some(error),
                ))
            }
            Err(source) => GradedOutcome::ExecutionFailed(ExecutionFailure {
                test_name: self.name.to_string(),
                source,
                total: self.points,
                q: self.q,
            }),
        }
    }

    /// Warns about methods awarding more than they are worth.
    fn check_earned(&self, earned: u32) {
        if earned > self.points {
            tracing::warn!(
                test = self.name,
                q = self.q,
                earned,
                points = self.points,
                "graded method awarded more points than it is worth"
            );
        }
    }
}

/// Last segment of a stringified path, eg. `test_os` for `Self::test_os`.
#[doc(hidden)]
pub fn method_name(path: &'static str) -> &'static str {
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// Declares a [`GradedMethod`] named after the function it wraps.
///
/// ```ignore
/// graded!(Self::test_os, q = 1, points = 10)
/// ```
#[macro_export]
macro_rules! graded {
    ($func:path, q = $q:expr, points = $points:expr $(,)?) => {
        $crate::registry::GradedMethod::new(
            $crate::registry::method_name(stringify!($func)),
            $q,
            $points,
            $func,
        )
    };
}

/// Type-erased entry point that creates and runs one suite.
pub type SuiteEntry =
    fn(&SuiteDescriptor, &mut AutobadgerCallback) -> Result<AutobadgerResult, SuiteError>;

/// A registered test suite.
#[derive(Clone)]
pub struct SuiteDescriptor {
    /// Owning project
    project: ProjectId,
    /// Display name of the suite type
    name:    String,
    /// Declared total points
    points:  u32,
    /// Creates and runs the suite
    entry:   SuiteEntry,
}

impl std::fmt::Debug for SuiteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteDescriptor")
            .field("project", &self.project)
            .field("name", &self.name)
            .field("points", &self.points)
            .finish()
    }
}

impl SuiteDescriptor {
    /// Describes suite type `S`, worth `points` in total, for `project`.
    pub fn of<S: TestSuite>(project: ProjectId, points: u32) -> Self {
        Self {
            project,
            name: S::name().to_string(),
            points,
            entry: runner::run_suite::<S>,
        }
    }

    /// Owning project.
    pub fn project(&self) -> ProjectId {
        self.project
    }

    /// Display name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared total points.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Creates the suite and runs every graded method in it.
    pub fn run(&self, callback: &mut AutobadgerCallback) -> Result<AutobadgerResult, SuiteError> {
        (self.entry)(self, callback)
    }
}

/// Builds a fresh callback instance for a run.
pub type CallbackFactory = Arc<dyn Fn() -> Box<dyn Callback> + Send + Sync>;

/// A registered lifecycle callback.
#[derive(Clone)]
pub struct CallbackDescriptor {
    /// Owning project
    project: ProjectId,
    /// Display name of the callback
    name:    String,
    /// Builds an instance
    factory: CallbackFactory,
}

impl std::fmt::Debug for CallbackDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDescriptor")
            .field("project", &self.project)
            .field("name", &self.name)
            .finish()
    }
}

impl CallbackDescriptor {
    /// Describes a callback built by `factory`.
    pub fn new<F>(project: ProjectId, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Callback> + Send + Sync + 'static,
    {
        Self {
            project,
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Describes callback type `C`, built with [`Default`].
    pub fn of<C: Callback + Default + 'static>(project: ProjectId) -> Self {
        Self::new(project, crate::util::short_type_name::<C>(), || {
            Box::new(C::default()) as Box<dyn Callback>
        })
    }

    /// Owning project.
    pub fn project(&self) -> ProjectId {
        self.project
    }

    /// Display name of the callback.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a fresh instance.
    pub fn instantiate(&self) -> Box<dyn Callback> {
        (self.factory)()
    }
}

/// Catalog of suites and callbacks, keyed by project.
///
/// Registering the same type twice appends a duplicate entry.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// Suites in registration order
    tests:     Vec<SuiteDescriptor>,
    /// Callbacks in registration order
    callbacks: Vec<CallbackDescriptor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers suite type `S` for `project`, worth `points` in total.
    pub fn register_suite<S: TestSuite>(&mut self, project: ProjectId, points: u32) -> &mut Self {
        self.add_suite(SuiteDescriptor::of::<S>(project, points))
    }

    /// Registers an already built suite descriptor.
    pub fn add_suite(&mut self, descriptor: SuiteDescriptor) -> &mut Self {
        tracing::debug!(
            project = %descriptor.project,
            suite = %descriptor.name,
            points = descriptor.points,
            "registered test suite"
        );
        self.tests.push(descriptor);
        self
    }

    /// Registers callback type `C` for `project`.
    pub fn register_callback<C: Callback + Default + 'static>(
        &mut self,
        project: ProjectId,
    ) -> &mut Self {
        self.add_callback(CallbackDescriptor::of::<C>(project))
    }

    /// Registers a callback built by `factory` for `project`.
    pub fn register_callback_with<F>(
        &mut self,
        project: ProjectId,
        name: impl Into<String>,
        factory: F,
    ) -> &mut Self
    where
        F: Fn() -> Box<dyn Callback> + Send + Sync + 'static,
    {
        self.add_callback(CallbackDescriptor::new(project, name, factory))
    }

    /// Registers an already built callback descriptor.
    pub fn add_callback(&mut self, descriptor: CallbackDescriptor) -> &mut Self {
        tracing::debug!(
            project = %descriptor.project,
            callback = %descriptor.name,
            "registered callback"
        );
        self.callbacks.push(descriptor);
        self
    }

    /// Suites registered for `project`, in registration order. A project
    /// needs at least one.
    pub fn tests_for(&self, project: ProjectId) -> Result<Vec<&SuiteDescriptor>, ConfigError> {
        let tests: Vec<&SuiteDescriptor> = self
            .tests
            .iter()
            .filter(|t| t.project == project)
            .collect();

        if tests.is_empty() {
            return Err(ConfigError::NoSuites { project });
        }
        Ok(tests)
    }

    /// Callbacks registered for `project`, in registration order. None at all
    /// is allowed but logged.
    pub fn callbacks_for(&self, project: ProjectId) -> Vec<&CallbackDescriptor> {
        let callbacks: Vec<&CallbackDescriptor> = self
            .callbacks
            .iter()
            .filter(|c| c.project == project)
            .collect();

        if callbacks.is_empty() {
            tracing::warn!("No callbacks found for {project}!");
        }
        callbacks
    }

    /// Sum of the declared points of every suite registered for `project`.
    pub fn grand_total(&self, project: ProjectId) -> Result<u32, ConfigError> {
        sum_points(project, self.tests.iter().filter(|t| t.project == project))
    }

    /// Projects with at least one suite, in [`ProjectId`] order.
    pub fn projects(&self) -> Vec<ProjectId> {
        ProjectId::ALL
            .into_iter()
            .filter(|p| self.tests.iter().any(|t| t.project == *p))
            .collect()
    }
}

/// Adds up the declared points of `suites`, failing instead of wrapping.
pub(crate) fn sum_points<'a>(
    project: ProjectId,
    suites: impl IntoIterator<Item = &'a SuiteDescriptor>,
) -> Result<u32, ConfigError> {
    suites.into_iter().try_fold(0u32, |total, suite| {
        total
            .checked_add(suite.points)
            .ok_or(ConfigError::PointsOverflow { project })
    })
}

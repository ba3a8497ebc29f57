#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;

use crate::{
    callback::{AutobadgerCallback, Callback},
    error::{AutobadgerError, ConfigError, Hook, SuiteError},
    grade::AutobadgerResult,
    project::ProjectId,
    registry::{Registry, SuiteDescriptor, sum_points},
    util::panic_message,
};

/// Where a run is in its lifecycle.
///
/// A failing setup or teardown hook ends the run in the phase of that hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started
    Init,
    /// Checking required resources
    Validating,
    /// Running the setup hook
    Setup,
    /// Running suites
    Running,
    /// Running the teardown hook
    Teardown,
    /// Finished with a regular report
    Done,
    /// A required resource was missing; nothing else ran
    AbortedMissingResource,
    /// A suite failed unexpectedly; the report was collapsed
    Fatal,
    /// The grader is misconfigured; no report was produced
    Misconfigured,
}

/// Grades one project: validates resources, sets up, runs every registered
/// suite, and tears down.
pub struct Autobadger<'r> {
    /// Project being graded
    project:  ProjectId,
    /// Suites to run, in registration order
    suites:   Vec<&'r SuiteDescriptor>,
    /// Lifecycle hooks
    callback: AutobadgerCallback,
    /// Current phase
    phase:    Phase,
}

impl<'r> Autobadger<'r> {
    /// Looks up the suites and callbacks registered for `project`.
    ///
    /// Fails if the project has no suites.
    pub fn new(project: ProjectId, registry: &'r Registry) -> Result<Self, ConfigError> {
        let suites = registry.tests_for(project)?;
        let callback = AutobadgerCallback::from_descriptors(&registry.callbacks_for(project));
        Ok(Self::with_callback(project, suites, callback))
    }

    /// Builds an orchestrator from already resolved parts.
    pub fn with_callback(
        project: ProjectId,
        suites: Vec<&'r SuiteDescriptor>,
        callback: AutobadgerCallback,
    ) -> Self {
        Self {
            project,
            suites,
            callback,
            phase: Phase::Init,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sum of every suite's declared points.
    pub fn grand_total(&self) -> Result<u32, ConfigError> {
        sum_points(self.project, self.suites.iter().copied())
    }

    /// Moves to `phase`.
    fn enter(&mut self, phase: Phase) {
        tracing::debug!(project = %self.project, ?phase, "entering phase");
        self.phase = phase;
    }

    /// Runs the whole lifecycle and returns the report.
    ///
    /// A missing resource or an unexpected suite failure still yields a
    /// report, collapsed to a single `FATAL` entry. A configuration error is
    /// returned as an error once teardown has run, as is a failing setup or
    /// teardown hook. Declared points that overflow a score are rejected
    /// before anything runs. Teardown runs exactly once whenever setup
    /// succeeded.
    pub fn run(&mut self) -> Result<AutobadgerResult, AutobadgerError> {
        let total = match self.grand_total() {
            Ok(total) => total,
            Err(config) => {
                tracing::error!(project = %self.project, "{config}");
                self.enter(Phase::Misconfigured);
                return Err(config.into());
            }
        };

        self.enter(Phase::Validating);
        if let Err(missing) = self.callback.on_validate_required_resources() {
            tracing::error!(project = %self.project, "{missing}");
            self.enter(Phase::AbortedMissingResource);
            return Ok(AutobadgerResult::zero(self.project, missing.to_string(), total));
        }

        self.enter(Phase::Setup);
        self.callback
            .on_setup()
            .map_err(|source| AutobadgerError::Hook {
                hook: Hook::Setup,
                source,
            })?;

        self.enter(Phase::Running);
        let outcome = match self.run_suites() {
            Ok(grade) => Ok(grade),
            Err(SuiteError::Misconfigured(e)) => {
                tracing::error!(project = %self.project, "{e}");
                Err(e)
            }
            Err(SuiteError::Unexpected(e)) => {
                tracing::error!(project = %self.project, "a test suite failed unexpectedly: {e:#}");
                let trace = format!("{e}:\nFull Stacktrace:\n{e:?}");
                Ok(AutobadgerResult::zero(self.project, trace, total))
            }
        };

        self.enter(Phase::Teardown);
        let teardown = self.callback.on_teardown();

        let grade = match (outcome, teardown) {
            (Err(config), teardown) => {
                if let Err(e) = teardown {
                    tracing::error!(
                        project = %self.project,
                        "teardown failed while reporting a configuration error: {e:#}"
                    );
                }
                self.enter(Phase::Misconfigured);
                return Err(config.into());
            }
            (Ok(_), Err(source)) => {
                return Err(AutobadgerError::Hook {
                    hook: Hook::Teardown,
                    source,
                });
            }
            (Ok(grade), Ok(())) => grade,
        };

        if grade.is_fatal() {
            self.enter(Phase::Fatal);
        } else {
            self.enter(Phase::Done);
        }
        tracing::info!(
            project = %self.project,
            score = %grade.score.unwrap_or_default(),
            tests = grade.tests.len(),
            "grading finished"
        );
        Ok(grade)
    }

    /// Runs every suite in order and joins their reports, stopping at the
    /// first suite that cannot produce one.
    fn run_suites(&mut self) -> Result<AutobadgerResult, SuiteError> {
        let mut grade = AutobadgerResult::new(self.project);
        for suite in &self.suites {
            tracing::info!(suite = suite.name(), points = suite.points(), "running test suite");
            let callback = &mut self.callback;
            let report = panic::catch_unwind(AssertUnwindSafe(|| suite.run(callback)))
                .unwrap_or_else(|payload| {
                    Err(SuiteError::Unexpected(anyhow!(
                        "{} panicked: {}",
                        suite.name(),
                        panic_message(payload.as_ref())
                    )))
                })?;
            grade.join(report);
        }
        Ok(grade)
    }
}

/// Grades `project` with the suites and callbacks in `registry`.
pub fn grade(project: ProjectId, registry: &Registry) -> Result<AutobadgerResult, AutobadgerError> {
    Autobadger::new(project, registry)?.run()
}

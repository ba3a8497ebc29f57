
use autobadger::{
    Autobadger, AutobadgerError, ConfigError, Hook, Phase, ProjectId, Registry, ReportError, Score,
    TestStatus, projects,
};
use grading_support::{
    Empty, FailingBeforeTest, FailingSetup, FailingTeardown, MissingDatabase, Miscounted, Mixed,
    PanicsOnCreate, Recorder, Solid, Unbuildable, count, take_events,
};
use pretty_assertions::assert_eq;

fn fatal_trace(report: &autobadger::AutobadgerResult) -> String {
    assert_eq!(report.tests.len(), 1);
    let fatal = &report.tests[0];
    assert_eq!(fatal.test_name, "FATAL");
    assert_eq!(fatal.status, TestStatus::Fatal);
    fatal
        .error
        .as_ref()
        .and_then(|e| e.stacktrace.clone())
        .expect("fatal entry carries a trace")
}

#[test]
fn project_one_passes_every_question() {
    let report = autobadger::grade(ProjectId::P1, projects::catalog()).expect("grade p1");

    assert_eq!(report.project, Some(ProjectId::P1));
    assert_eq!(report.score, Some(Score::new(20, 20)));
    let statuses: Vec<_> = report
        .tests
        .iter()
        .map(|t| (t.label(), t.test_name.as_str(), t.status))
        .collect();
    assert_eq!(statuses, vec![
        ("Q1".to_string(), "test_os", TestStatus::Passed),
        ("Q2".to_string(), "test_foo", TestStatus::Passed),
    ]);
}

#[test]
fn missing_resource_skips_everything_else() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Mixed>(ProjectId::P2, 20)
        .register_suite::<Solid>(ProjectId::P2, 10)
        .register_callback::<Recorder>(ProjectId::P2)
        .register_callback::<MissingDatabase>(ProjectId::P2);

    let mut grader = Autobadger::new(ProjectId::P2, &registry).expect("p2 has suites");
    let report = grader.run().expect("a missing resource still yields a report");

    assert_eq!(grader.phase(), Phase::AbortedMissingResource);
    assert_eq!(report.score, Some(Score::new(0, 30)));
    assert_eq!(report.tests[0].score, Score::new(0, 30));
    assert_eq!(report.tests[0].q, 0);
    assert!(fatal_trace(&report).contains("database unavailable"));
    assert_eq!(take_events(), vec!["validate"]);
}

#[test]
fn failing_method_scores_zero_and_siblings_still_run() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Mixed>(ProjectId::P3, 20)
        .register_callback::<Recorder>(ProjectId::P3);

    let mut grader = Autobadger::new(ProjectId::P3, &registry).expect("p3 has suites");
    let report = grader.run().expect("grade p3");

    assert_eq!(grader.phase(), Phase::Done);
    assert_eq!(report.score, Some(Score::new(12, 20)));

    let failed = &report.tests[1];
    assert_eq!(failed.test_name, "test_reads_file");
    assert_eq!(failed.status, TestStatus::Failed);
    assert_eq!(failed.score, Score::new(0, 5));
    let error = failed.error.as_ref().expect("failed test has an error");
    assert_eq!(error.message, "file not found: answers.txt");
    assert!(
        error
            .stacktrace
            .as_deref()
            .expect("failed test has a trace")
            .starts_with("Failed to run Q2 ('test_reads_file'):")
    );

    let partial = &report.tests[2];
    assert_eq!(partial.status, TestStatus::Partial);
    assert_eq!(partial.score, Score::new(2, 5));
    assert_eq!(
        partial.error.as_ref().map(|e| e.message.as_str()),
        Some("Incorrect answer: expected 4 but got 5")
    );

    assert_eq!(take_events(), vec![
        "validate",
        "setup",
        "before",
        "run:test_passes",
        "after",
        "before",
        "run:test_reads_file",
        "after",
        "before",
        "run:test_partial",
        "after",
        "teardown",
    ]);
}

#[test]
fn suites_are_joined_in_registration_order() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Solid>(ProjectId::P4, 10)
        .register_suite::<Mixed>(ProjectId::P4, 20);

    let report = autobadger::grade(ProjectId::P4, &registry).expect("grade p4");

    assert_eq!(report.score, Some(Score::new(22, 30)));
    let order: Vec<u32> = report.tests.iter().map(|t| t.q).collect();
    assert_eq!(order, vec![4, 1, 2, 3]);
}

#[test]
fn unbuildable_suite_collapses_the_report_after_teardown() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Mixed>(ProjectId::P5, 20)
        .register_suite::<Unbuildable>(ProjectId::P5, 10)
        .register_callback::<Recorder>(ProjectId::P5);

    let mut grader = Autobadger::new(ProjectId::P5, &registry).expect("p5 has suites");
    let report = grader.run().expect("a broken suite still yields a report");

    assert_eq!(grader.phase(), Phase::Fatal);
    assert_eq!(report.score, Some(Score::new(0, 30)));
    let trace = fatal_trace(&report);
    assert!(trace.contains("Could not create test suite Unbuildable"));
    assert!(trace.contains("Full Stacktrace:"));
    assert!(trace.contains("student submission is missing main.py"));

    let events = take_events();
    assert_eq!(count(&events, "teardown"), 1);
    assert_eq!(events.last().map(String::as_str), Some("teardown"));
}

#[test]
fn panicking_suite_collapses_the_report_after_teardown() {
    let mut registry = Registry::new();
    registry
        .register_suite::<PanicsOnCreate>(ProjectId::P6, 15)
        .register_suite::<Solid>(ProjectId::P6, 10)
        .register_callback::<Recorder>(ProjectId::P6);

    let mut grader = Autobadger::new(ProjectId::P6, &registry).expect("p6 has suites");
    let report = grader.run().expect("a panicking suite still yields a report");

    assert_eq!(grader.phase(), Phase::Fatal);
    assert_eq!(report.score, Some(Score::new(0, 25)));
    assert!(fatal_trace(&report).contains("PanicsOnCreate panicked: fixture directory vanished"));

    let events = take_events();
    assert_eq!(count(&events, "teardown"), 1);
    assert_eq!(count(&events, "run:test_solid"), 0);
}

#[test]
fn failing_test_hook_is_an_unexpected_failure() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Solid>(ProjectId::P7, 10)
        .register_callback::<Recorder>(ProjectId::P7)
        .register_callback::<FailingBeforeTest>(ProjectId::P7);

    let mut grader = Autobadger::new(ProjectId::P7, &registry).expect("p7 has suites");
    let report = grader.run().expect("a failing hook still yields a report");

    assert_eq!(grader.phase(), Phase::Fatal);
    assert!(fatal_trace(&report).contains("sandbox reset failed"));

    let events = take_events();
    assert_eq!(count(&events, "run:test_solid"), 0);
    assert_eq!(count(&events, "teardown"), 1);
}

#[test]
fn points_mismatch_propagates_after_teardown() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Miscounted>(ProjectId::P8, 10)
        .register_callback::<Recorder>(ProjectId::P8);

    let mut grader = Autobadger::new(ProjectId::P8, &registry).expect("p8 has suites");
    let err = grader.run().expect_err("misconfigured suite");
    assert_eq!(grader.phase(), Phase::Misconfigured);

    match &err {
        AutobadgerError::Misconfigured(ConfigError::PointsMismatch {
            suite,
            declared,
            summed,
        }) => {
            assert_eq!(suite, "Miscounted");
            assert_eq!((*declared, *summed), (10, 5));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Double check the scores of your tests and the total score for Miscounted. 10 != 5"
    );
    assert_eq!(count(&take_events(), "teardown"), 1);
}

#[test]
fn suite_without_methods_is_misconfigured() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Empty>(ProjectId::P1, 0)
        .register_callback::<Recorder>(ProjectId::P1);

    let err = autobadger::grade(ProjectId::P1, &registry).expect_err("suite has no methods");

    assert!(matches!(
        err,
        AutobadgerError::Misconfigured(ConfigError::NoGradedMethods { ref suite }) if suite == "Empty"
    ));
    assert!(err.to_string().contains("Empty"));
    assert_eq!(count(&take_events(), "teardown"), 1);
}

#[test]
fn setup_failure_skips_suites_and_teardown() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Solid>(ProjectId::P2, 10)
        .register_callback::<Recorder>(ProjectId::P2)
        .register_callback::<FailingSetup>(ProjectId::P2);

    let mut grader = Autobadger::new(ProjectId::P2, &registry).expect("p2 has suites");
    let err = grader.run().expect_err("setup fails");

    assert!(matches!(err, AutobadgerError::Hook {
        hook: Hook::Setup,
        ..
    }));
    assert_eq!(grader.phase(), Phase::Setup);
    assert_eq!(take_events(), vec!["validate", "setup"]);
}

#[test]
fn teardown_failure_surfaces_as_an_error() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Solid>(ProjectId::P3, 10)
        .register_callback::<FailingTeardown>(ProjectId::P3)
        .register_callback::<Recorder>(ProjectId::P3);

    let err = autobadger::grade(ProjectId::P3, &registry).expect_err("teardown fails");

    assert!(matches!(err, AutobadgerError::Hook {
        hook: Hook::Teardown,
        ..
    }));
    let events = take_events();
    assert_eq!(count(&events, "run:test_solid"), 1);
    // the failing member stops the broadcast
    assert_eq!(count(&events, "teardown"), 0);
}

#[test]
fn project_without_suites_is_rejected() {
    let registry = Registry::new();

    let err = autobadger::grade(ProjectId::P8, &registry).expect_err("no suites");

    assert!(matches!(
        err,
        AutobadgerError::Misconfigured(ConfigError::NoSuites {
            project: ProjectId::P8
        })
    ));
    assert_eq!(err.to_string(), "No tests found for p8!");
}

#[test]
fn duplicate_questions_across_suites_fail_at_serialization() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Mixed>(ProjectId::P4, 20)
        .register_suite::<Mixed>(ProjectId::P4, 20);

    let report = autobadger::grade(ProjectId::P4, &registry).expect("both suites run");
    assert_eq!(report.score, Some(Score::new(24, 40)));
    assert_eq!(report.tests.len(), 6);

    let err = report.to_json().expect_err("Q1 appears twice");
    assert!(matches!(err, ReportError::DuplicateQuestion { q: 1 }));
}

#[test]
fn overflowing_declared_points_are_rejected_up_front() {
    let mut registry = Registry::new();
    registry
        .register_suite::<Solid>(ProjectId::P5, u32::MAX)
        .register_suite::<Solid>(ProjectId::P5, 1)
        .register_callback::<Recorder>(ProjectId::P5);

    assert_eq!(
        registry.grand_total(ProjectId::P5),
        Err(ConfigError::PointsOverflow {
            project: ProjectId::P5
        })
    );

    let mut grader = Autobadger::new(ProjectId::P5, &registry).expect("p5 has suites");
    let err = grader.run().expect_err("points overflow");

    assert!(matches!(
        err,
        AutobadgerError::Misconfigured(ConfigError::PointsOverflow {
            project: ProjectId::P5
        })
    ));
    assert_eq!(grader.phase(), Phase::Misconfigured);
    assert!(take_events().is_empty());
}

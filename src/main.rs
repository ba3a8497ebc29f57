#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # autobadger
//!
//! Grades a course project with the suites registered for it and emits a JSON
//! score report.
//!
//! ```text
//! autobadger grade --project p1 [--stdout print|json] [--table]
//! autobadger info
//! ```

use std::str::FromStr;

use anyhow::{Context, Result};
use autobadger::{ProjectId, config, projects};
use bpaf::*;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::SubscriberInitExt};

/// How the report is delivered.
#[derive(Debug, Clone, Copy)]
enum StdOut {
    /// Print the JSON report to stdout
    Print,
    /// Write the JSON report to the configured score file
    Json,
}

impl FromStr for StdOut {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Ok(StdOut::Print),
            "json" => Ok(StdOut::Json),
            other => Err(format!("Unknown output `{other}`, expected `print` or `json`")),
        }
    }
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a project
    Grade {
        /// Project to grade
        project: ProjectId,
        /// Report delivery
        stdout:  StdOut,
        /// Whether to also print an overview table
        table:   bool,
    },
    /// Print version and usage
    Info,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the project to grade
    fn p() -> impl Parser<ProjectId> {
        long("project")
            .short('p')
            .help("Project to grade (p1-p8)")
            .argument::<ProjectId>("PROJECT")
    }

    /// parses where the report goes
    fn s() -> impl Parser<StdOut> {
        long("stdout")
            .help("Print the report (print) or save it to the score file (json)")
            .argument::<StdOut>("STDOUT")
            .fallback(StdOut::Print)
    }

    /// parses whether to print an overview table
    fn t() -> impl Parser<bool> {
        long("table")
            .help("Also print an overview table to stderr")
            .switch()
    }

    let project = p();
    let stdout = s();
    let table = t();
    let grade = construct!(Cmd::Grade {
        project,
        stdout,
        table
    })
    .to_options()
    .command("grade")
    .help("Grade a project");

    let info = pure(Cmd::Info)
        .to_options()
        .command("info")
        .help("Print version and usage");

    let cmd = construct!([grade, info]);

    cmd.to_options()
        .descr("Grading orchestrator for course projects")
        .run()
}

/// Prints the version and a usage line
fn print_cli_info_and_usage() {
    println!("Welcome to Autobadger!");
    println!("Current Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Usage: autobadger grade --project PROJECT (p1-p8) [--stdout STDOUT (print|json)]");
    let registered = projects::catalog()
        .projects()
        .iter()
        .map(ProjectId::to_string)
        .collect::<Vec<_>>();
    println!("Projects with graders: {}", registered.join(", "));
}

fn main() -> Result<()> {
    dotenv().ok();
    let config = config::ensure_initialized()?;

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_new(config.log_filter())
        .with_context(|| format!("Invalid log filter `{}`", config.log_filter()))?;
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Info => print_cli_info_and_usage(),
        Cmd::Grade {
            project,
            stdout,
            table,
        } => {
            let result = autobadger::grade(project, projects::catalog())
                .with_context(|| format!("Could not grade {project}"))?;

            if table {
                eprintln!("{}", result.summary_table());
            }

            match stdout {
                StdOut::Print => println!("{}", result.to_json_pretty()?),
                StdOut::Json => {
                    let path = config.score_file();
                    result.write_json(path)?;
                    println!("Saved results to {}", path.display());
                }
            }
        }
    }

    Ok(())
}

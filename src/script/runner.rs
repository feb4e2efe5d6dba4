//! Running scripts and checking them against their expectations.

use std::{
    env,
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    config::WorldConfig,
    diagnostics::{Diagnostic, Severity, check_static_errors, render_diagnostics},
    error::Result,
    graph::BranchId,
    reload::CodeUnit,
    runtime::{
        value::TaggedValue,
        vm::{Stack, run_branch},
    },
    storage::{FileSystemStorage, Storage},
    world::World,
};

use super::Script;

pub enum ScriptOutcome {
    /// The static check found errors; nothing was evaluated.
    Rejected(Vec<Diagnostic>),
    /// Evaluation ran. The stack holds the failure, if any.
    Evaluated(Stack),
}

/// Checks `branch` (when the world is configured to) and evaluates it once.
pub fn run_script(world: &mut World, branch: BranchId) -> Result<ScriptOutcome> {
    if world.config.check_before_run {
        let errors: Vec<Diagnostic> = check_static_errors(world, branch)
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        if !errors.is_empty() {
            return Ok(ScriptOutcome::Rejected(errors));
        }
    }
    Ok(ScriptOutcome::Evaluated(run_branch(world, branch)?))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestReport {
    pub path: PathBuf,
    pub elapsed_ms: f64,
    pub outcome: TestOutcome,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, TestOutcome::Pass)
    }
}

/// Runs every file on its own world, in parallel.
pub fn run_test_files(paths: &[PathBuf], config: &WorldConfig) -> Vec<TestReport> {
    paths
        .par_iter()
        .map(|path| run_test_file(&FileSystemStorage::new(), path, config))
        .collect()
}

/// Loads, runs and checks one script file.
pub fn run_test_file(storage: &dyn Storage, path: &Path, config: &WorldConfig) -> TestReport {
    let start = Instant::now();
    let outcome = match check_file(storage, path, config) {
        Ok(problems) if problems.is_empty() => TestOutcome::Pass,
        Ok(problems) => TestOutcome::Fail(problems.join("\n")),
        Err(err) => TestOutcome::Fail(err.to_string()),
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(path = %path.display(), elapsed_ms, "tested script");
    TestReport {
        path: path.to_path_buf(),
        elapsed_ms,
        outcome,
    }
}

fn check_file(storage: &dyn Storage, path: &Path, config: &WorldConfig) -> Result<Vec<String>> {
    let mut world = World::with_config(config.clone())?;
    let unit = CodeUnit::load(&mut world, storage, path)?;
    let outcome = run_script(&mut world, unit.branch)?;
    let problems = check_outcome(&world, unit.branch, &unit.script, &outcome);
    world.shutdown()?;
    Ok(problems)
}

/// Compares one evaluation against the script's `expect` and `expect_error`.
pub fn check_outcome(
    world: &World,
    branch: BranchId,
    script: &Script,
    outcome: &ScriptOutcome,
) -> Vec<String> {
    let expected_code = script.expect_error.as_deref();
    match outcome {
        ScriptOutcome::Rejected(errors) => {
            if expected_code.is_some() && errors.iter().any(|d| d.code.as_deref() == expected_code) {
                return Vec::new();
            }
            vec![render_diagnostics(errors, false)]
        }
        ScriptOutcome::Evaluated(stack) => match (stack.failure(), expected_code) {
            (Some(failure), Some(code)) if failure.code.code == code => Vec::new(),
            (Some(failure), _) => vec![failure.render(false)],
            (None, Some(code)) => vec![format!("expected error {}, but evaluation succeeded", code)],
            (None, None) => check_expectations(world, branch, script),
        },
    }
}

fn check_expectations(world: &World, branch: BranchId, script: &Script) -> Vec<String> {
    let mut problems = Vec::new();
    for (name, json) in &script.expect {
        let Some(term) = world.find_named(branch, name) else {
            problems.push(format!("`{}` is not defined", name));
            continue;
        };
        let expected = TaggedValue::from_json(json);
        let actual = &world.term(term).value;
        let same = actual.type_id() == expected.type_id() && world.types.equals(actual, &expected);
        if !same {
            problems.push(format!(
                "`{}`: expected {}, found {}",
                name,
                world.types.to_string(&expected),
                world.types.to_string(actual)
            ));
        }
    }
    problems
}

/// Prints the report and returns `true` if every file passed.
pub fn print_test_report(reports: &[TestReport]) -> bool {
    let use_color = colors_enabled();
    let mut failed = 0usize;
    for report in reports {
        let name = report.path.display().to_string();
        match &report.outcome {
            TestOutcome::Pass => {
                let pass = if use_color { green("PASS") } else { "PASS".to_string() };
                println!("  {}  {:<34} ({:.0}ms)", pass, name, report.elapsed_ms);
            }
            TestOutcome::Fail(msg) => {
                let fail = if use_color { red("FAIL") } else { "FAIL".to_string() };
                println!("  {}  {}", fail, name);
                for line in msg.lines() {
                    println!("          {}", line);
                }
                failed += 1;
            }
        }
    }
    let total = reports.len();
    println!("\n{} scripts: {} passed, {} failed", total, total - failed, failed);
    failed == 0
}

fn colors_enabled() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(env::var("TERM").ok().as_deref(), Some("dumb"))
}

fn green(s: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", s)
}

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}

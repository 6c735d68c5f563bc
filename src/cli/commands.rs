use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::collections::select;
use crate::engine::run_cases;
use crate::environment::{HarnessConfig, default_history_path};
use crate::error::HarnessError;
use crate::store::sqlite::{list_runs, load_classifications, open_db, save_run};
use crate::testing::report::{RunReport, diff_classifications};

use super::{Cli, Commands, DiffArgs, HistoryArgs, ListArgs, OutputFormat, RunArgs};

/// Process exit status of the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Passed,
    /// At least one case got a response that did not match; also used by
    /// `diff` when classifications drifted.
    AssertionFailures,
    /// At least one case never got a usable response.
    FatalErrors,
    /// Bad configuration or a broken fixture table; nothing was sent.
    ConfigError,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Passed => 0,
            ExitStatus::AssertionFailures => 1,
            ExitStatus::FatalErrors => 2,
            ExitStatus::ConfigError => 3,
        }
    }

    /// Fatal errors outrank assertion failures.
    pub fn from_report(report: &RunReport) -> Self {
        if report.fatal > 0 {
            ExitStatus::FatalErrors
        } else if report.failed > 0 {
            ExitStatus::AssertionFailures
        } else {
            ExitStatus::Passed
        }
    }

    pub fn from_error(err: &HarnessError) -> Self {
        match err {
            HarnessError::Config(_) | HarnessError::Encode { .. } => ExitStatus::ConfigError,
            HarnessError::Dispatch(_)
            | HarnessError::Store(_)
            | HarnessError::Worker(_)
            | HarnessError::Report { .. } => ExitStatus::FatalErrors,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

pub async fn execute(cli: Cli) -> Result<ExitStatus, HarnessError> {
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::List(args) => list(args),
        Commands::History(args) => history(args),
        Commands::Diff(args) => diff(args),
    }
}

async fn run(args: RunArgs) -> Result<ExitStatus, HarnessError> {
    let config = HarnessConfig::new(
        args.base_url.as_deref(),
        args.timeout_ms,
        args.concurrency,
        &args.vars,
    )?;
    let cases = select(&args.filter.to_filter())?;
    if cases.is_empty() {
        warn!("no cases match the given filters");
    }

    let report = run_cases(&config, cases).await?;

    match args.output {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", to_pretty_json(&report, "stdout")?),
    }

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        info!(path = %path.display(), "report written");
    }

    if args.history {
        let path = history_path(args.history_db);
        let mut conn = open_db(&path)?;
        save_run(&mut conn, &report)?;
        info!(run_id = %report.run_id, path = %path.display(), "run recorded");
    }

    Ok(ExitStatus::from_report(&report))
}

fn list(args: ListArgs) -> Result<ExitStatus, HarnessError> {
    let cases = select(&args.filter.to_filter())?;
    match args.output {
        OutputFormat::Text => {
            for case in &cases {
                println!("{}", case.id);
            }
            println!("\n{} cases", cases.len());
        }
        OutputFormat::Json => println!("{}", to_pretty_json(&cases, "stdout")?),
    }
    Ok(ExitStatus::Passed)
}

fn history(args: HistoryArgs) -> Result<ExitStatus, HarnessError> {
    let conn = open_db(&history_path(args.history_db))?;
    let runs = list_runs(&conn, args.limit)?;

    match args.output {
        OutputFormat::Text => {
            if runs.is_empty() {
                println!("no recorded runs");
            }
            for run in &runs {
                println!(
                    "{}  {:>4} total  {:>4} passed  {:>4} failed  {:>4} fatal  {} ms  {}",
                    run.run_id,
                    run.total,
                    run.passed,
                    run.failed,
                    run.fatal,
                    run.finished_at_ms.saturating_sub(run.started_at_ms),
                    run.base_url
                );
            }
        }
        OutputFormat::Json => println!("{}", to_pretty_json(&runs, "stdout")?),
    }
    Ok(ExitStatus::Passed)
}

fn diff(args: DiffArgs) -> Result<ExitStatus, HarnessError> {
    let conn = open_db(&history_path(args.history_db))?;
    let before = load_classifications(&conn, &args.before)?;
    let after = load_classifications(&conn, &args.after)?;
    let drift = diff_classifications(&before, &after);

    match args.output {
        OutputFormat::Text => {
            for entry in &drift {
                println!(
                    "{:<8} -> {:<8} {}",
                    entry.before.map(|outcome| outcome.as_str()).unwrap_or("-"),
                    entry.after.map(|outcome| outcome.as_str()).unwrap_or("-"),
                    entry.case_id
                );
            }
            println!("{} cases changed classification", drift.len());
        }
        OutputFormat::Json => println!("{}", to_pretty_json(&drift, "stdout")?),
    }

    if drift.is_empty() {
        Ok(ExitStatus::Passed)
    } else {
        Ok(ExitStatus::AssertionFailures)
    }
}

fn history_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(default_history_path)
}

fn to_pretty_json<T: Serialize>(value: &T, target: &str) -> Result<String, HarnessError> {
    serde_json::to_string_pretty(value).map_err(|err| HarnessError::Report {
        path: target.to_string(),
        reason: err.to_string(),
    })
}

fn write_report(path: &Path, report: &RunReport) -> Result<(), HarnessError> {
    let json = to_pretty_json(report, &path.display().to_string())?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| HarnessError::Report {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    }
    fs::write(path, json).map_err(|err| HarnessError::Report {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Format;
    use crate::error::{ConfigError, EncodeError, StoreError};

    fn report(failed: usize, fatal: usize) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            base_url: "http://localhost".to_string(),
            started_at_ms: 0,
            finished_at_ms: 1,
            total: 3,
            passed: 3 - failed - fatal,
            failed,
            fatal,
            cases: Vec::new(),
        }
    }

    #[test]
    fn exit_status_prefers_fatal_over_failed() {
        assert_eq!(ExitStatus::from_report(&report(0, 0)), ExitStatus::Passed);
        assert_eq!(ExitStatus::from_report(&report(1, 0)), ExitStatus::AssertionFailures);
        assert_eq!(ExitStatus::from_report(&report(1, 1)), ExitStatus::FatalErrors);
        assert_eq!(ExitStatus::FatalErrors.code(), 2);
    }

    #[test]
    fn configuration_and_fixture_errors_map_to_exit_3() {
        let config = HarnessError::Config(ConfigError::MissingBaseUrl);
        assert_eq!(ExitStatus::from_error(&config).code(), 3);

        let encode = HarnessError::Encode {
            case: "POST /user [xml -> json] success".to_string(),
            source: EncodeError::BatchUnsupported {
                format: Format::Xml,
                count: 2,
            },
        };
        assert_eq!(ExitStatus::from_error(&encode).code(), 3);

        let store = HarnessError::Store(StoreError::UnknownRun("run-x".to_string()));
        assert_eq!(ExitStatus::from_error(&store).code(), 2);
    }

    #[test]
    fn report_file_is_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports").join("run.json");
        write_report(&path, &report(0, 0)).expect("write");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(written["run_id"], "run-1");
        assert_eq!(written["passed"], 3);
    }

    #[test]
    fn list_never_needs_a_server() {
        let args = ListArgs {
            filter: Default::default(),
            output: OutputFormat::Text,
        };
        assert_eq!(list(args).expect("list"), ExitStatus::Passed);
    }
}

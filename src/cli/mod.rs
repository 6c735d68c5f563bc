//! # CLI
//!
//! `petstore-contract run` executes the table against a live server; `list`,
//! `history` and `diff` inspect the table and past runs without touching it.

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::collections::CaseFilter;
use crate::domain::{Accept, EntityKind, Format, Scenario};
use crate::environment::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS};
use crate::http::method::HttpMethod;

pub use commands::{ExitStatus, execute};

/// Content-negotiation contract tests for a Petstore-style HTTP API
#[derive(Parser, Debug)]
#[command(name = "petstore-contract")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    PETSTORE_BASE_URL       Base URL of the target server, e.g. http://localhost:8080/api/v3
    PETSTORE_TIMEOUT_MS     Per-request timeout (default: 10000)
    PETSTORE_CONCURRENCY    Parallel workers (default: 4)
    PETSTORE_HISTORY_DB     Run history database (default: .petstore-contract/history.db)
    RUST_LOG                Log filter, overrides --log-level
"#)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected cases against the target server
    Run(RunArgs),
    /// Print the selected case ids without sending anything
    List(ListArgs),
    /// Show recent runs
    History(HistoryArgs),
    /// Compare the classifications of two runs
    Diff(DiffArgs),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only cases for this entity (pet, order, user)
    #[arg(long)]
    pub entity: Option<EntityKind>,

    /// Only cases using this HTTP method
    #[arg(long)]
    pub method: Option<HttpMethod>,

    /// Only this scenario (success, bad_input, not_found, validation, simulated_error)
    #[arg(long)]
    pub scenario: Option<Scenario>,

    /// Only cases sending this request format (json, xml, form)
    #[arg(long)]
    pub format: Option<Format>,

    /// Only cases asking for this representation (json, xml, any)
    #[arg(long)]
    pub accept: Option<Accept>,

    /// Only cases whose id contains this text
    #[arg(long = "id")]
    pub id_contains: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> CaseFilter {
        CaseFilter {
            entity: self.entity,
            method: self.method,
            scenario: self.scenario,
            format: self.format,
            accept: self.accept,
            id_contains: self.id_contains.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Base URL of the target server
    #[arg(long, env = "PETSTORE_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "PETSTORE_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Number of cases in flight at once
    #[arg(long, env = "PETSTORE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Path variable override, repeatable: --var username=alice
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Also write the full JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Record this run in the history database
    #[arg(long, default_value_t = false)]
    pub history: bool,

    /// Run history database
    #[arg(long, env = "PETSTORE_HISTORY_DB")]
    pub history_db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Number of runs to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, env = "PETSTORE_HISTORY_DB")]
    pub history_db: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Earlier run id
    pub before: String,

    /// Later run id
    pub after: String,

    #[arg(long, env = "PETSTORE_HISTORY_DB")]
    pub history_db: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse_into_a_filter() {
        let cli = Cli::try_parse_from([
            "petstore-contract",
            "run",
            "--base-url",
            "http://localhost:8080/api/v3",
            "--entity",
            "pet",
            "--method",
            "post",
            "--format",
            "form",
            "--scenario",
            "default",
            "--var",
            "username=alice",
            "--output",
            "json",
        ])
        .expect("parse");

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.base_url.as_deref(), Some("http://localhost:8080/api/v3"));
        assert_eq!(args.vars, vec!["username=alice".to_string()]);
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!args.history, "runs are not recorded unless asked");

        let filter = args.filter.to_filter();
        assert_eq!(filter.entity, Some(EntityKind::Pet));
        assert_eq!(filter.method, Some(HttpMethod::Post));
        assert_eq!(filter.format, Some(Format::Form));
        assert_eq!(filter.scenario, Some(Scenario::SimulatedError));
        assert_eq!(filter.accept, None);
    }

    #[test]
    fn history_flag_enables_recording() {
        let cli = Cli::try_parse_from([
            "petstore-contract",
            "run",
            "--history",
            "--history-db",
            "runs.db",
        ])
        .expect("parse");
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.history);
        assert_eq!(args.history_db, Some(PathBuf::from("runs.db")));
    }

    #[test]
    fn unknown_filter_values_are_rejected() {
        assert!(Cli::try_parse_from(["petstore-contract", "list", "--format", "yaml"]).is_err());
        assert!(Cli::try_parse_from(["petstore-contract", "list", "--method", "PATCH"]).is_err());
    }

    #[test]
    fn diff_takes_two_run_ids() {
        let cli =
            Cli::try_parse_from(["petstore-contract", "diff", "run-1", "run-2"]).expect("parse");
        let Commands::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(args.before, "run-1");
        assert_eq!(args.after, "run-2");
        assert!(Cli::try_parse_from(["petstore-contract", "diff", "run-1"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["petstore-contract"]).is_err());
        assert!(Cli::try_parse_from(["petstore-contract", "--log-json"]).is_err());
    }
}

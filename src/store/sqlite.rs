use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::testing::report::{CaseOutcome, RunReport};

use super::RunSummary;

pub fn open_db(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS runs (
         run_id TEXT PRIMARY KEY,
         base_url TEXT NOT NULL,
         started_at_ms INTEGER NOT NULL,
         finished_at_ms INTEGER NOT NULL,
         total INTEGER NOT NULL,
         passed INTEGER NOT NULL,
         failed INTEGER NOT NULL,
         fatal INTEGER NOT NULL,
         report_json TEXT NOT NULL
       );
       CREATE TABLE IF NOT EXISTS case_results (
         run_id TEXT NOT NULL REFERENCES runs(run_id) ON DELETE CASCADE,
         case_id TEXT NOT NULL,
         outcome TEXT NOT NULL,
         status_code INTEGER,
         error_kind TEXT,
         duration_ms INTEGER NOT NULL,
         PRIMARY KEY (run_id, case_id)
       );",
    )?;

    debug!(path = %path.display(), "history database ready");
    Ok(conn)
}

pub fn save_run(conn: &mut Connection, report: &RunReport) -> Result<(), StoreError> {
    let report_json = serde_json::to_string(report)?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO runs (run_id, base_url, started_at_ms, finished_at_ms, total, passed, failed, fatal, report_json)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            report.run_id,
            report.base_url,
            report.started_at_ms as i64,
            report.finished_at_ms as i64,
            report.total as i64,
            report.passed as i64,
            report.failed as i64,
            report.fatal as i64,
            report_json,
        ],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO case_results (run_id, case_id, outcome, status_code, error_kind, duration_ms)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )?;
        for case in &report.cases {
            stmt.execute(params![
                report.run_id,
                case.case_id,
                case.outcome.as_str(),
                case.response.as_ref().map(|response| i64::from(response.status)),
                case.error_kind,
                case.duration_ms as i64,
            ])?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// Most recent runs first.
pub fn list_runs(conn: &Connection, limit: usize) -> Result<Vec<RunSummary>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT run_id, base_url, started_at_ms, finished_at_ms, total, passed, failed, fatal
       FROM runs
       ORDER BY started_at_ms DESC, rowid DESC
       LIMIT ?1;",
    )?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(RunSummary {
            run_id: row.get(0)?,
            base_url: row.get(1)?,
            started_at_ms: row.get::<_, i64>(2)? as u64,
            finished_at_ms: row.get::<_, i64>(3)? as u64,
            total: row.get::<_, i64>(4)? as u64,
            passed: row.get::<_, i64>(5)? as u64,
            failed: row.get::<_, i64>(6)? as u64,
            fatal: row.get::<_, i64>(7)? as u64,
        })
    })?;

    let mut runs = Vec::new();
    for row in rows {
        runs.push(row?);
    }
    Ok(runs)
}

/// Case id → outcome for one stored run.
pub fn load_classifications(
    conn: &Connection,
    run_id: &str,
) -> Result<BTreeMap<String, CaseOutcome>, StoreError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM runs WHERE run_id = ?1 LIMIT 1;",
            params![run_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(StoreError::UnknownRun(run_id.to_string()));
    }

    let mut stmt = conn.prepare("SELECT case_id, outcome FROM case_results WHERE run_id = ?1;")?;
    let rows = stmt.query_map(params![run_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut classifications = BTreeMap::new();
    for row in rows {
        let (case_id, outcome) = row?;
        match CaseOutcome::from_str_lossy(&outcome) {
            Some(outcome) => {
                classifications.insert(case_id, outcome);
            }
            None => {
                warn!(run_id, case_id = %case_id, outcome = %outcome, "skipping unknown outcome")
            }
        }
    }
    Ok(classifications)
}

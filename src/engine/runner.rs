use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::TestCase;
use crate::environment::HarnessConfig;
use crate::error::HarnessError;
use crate::http::client::{Dispatcher, format_headers};
use crate::http::request::RequestInput;
use crate::testing::report::{CaseOutcome, CaseReport, RunReport};
use crate::testing::{all_passed, validate};

use super::{generate_id, now_ms};

/// Run every case once and collect the reports in table order.
///
/// `concurrency` workers pull the next case index from a shared counter;
/// cases share nothing but the dispatcher and the read-only overrides. A
/// fatal case never stops the others.
pub async fn run_cases(
    config: &HarnessConfig,
    cases: Vec<TestCase>,
) -> Result<RunReport, HarnessError> {
    let run_id = generate_id("run");
    let started_at_ms = now_ms();
    let dispatcher = Arc::new(Dispatcher::new(&config.base_url, config.timeout_ms)?);
    let overrides = Arc::new(config.variables.clone());
    let cases = Arc::new(cases);
    let next_case = Arc::new(AtomicUsize::new(0));
    let worker_count = config.concurrency.max(1).min(cases.len().max(1));

    info!(
        run_id = %run_id,
        base_url = %config.base_url,
        cases = cases.len(),
        workers = worker_count,
        "starting run"
    );

    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let dispatcher = dispatcher.clone();
        let overrides = overrides.clone();
        let cases = cases.clone();
        let next_case = next_case.clone();
        let report_tx = report_tx.clone();

        let handle = tokio::spawn(async move {
            loop {
                let idx = next_case.fetch_add(1, Ordering::Relaxed);
                let Some(case) = cases.get(idx) else {
                    break;
                };

                let report = execute_case(&dispatcher, case, &overrides).await;
                let _ = report_tx.send((idx, report));
            }
        });
        handles.push(handle);
    }
    drop(report_tx);

    for handle in handles {
        handle
            .await
            .map_err(|err| HarnessError::Worker(err.to_string()))?;
    }

    let mut indexed = Vec::with_capacity(cases.len());
    while let Some(entry) = report_rx.recv().await {
        indexed.push(entry);
    }
    indexed.sort_by_key(|(idx, _)| *idx);

    let report = RunReport::new(
        run_id,
        config.base_url.to_string(),
        started_at_ms,
        now_ms(),
        indexed.into_iter().map(|(_, report)| report).collect(),
    );

    info!(
        run_id = %report.run_id,
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        fatal = report.fatal,
        duration_ms = report.duration_ms(),
        "run finished"
    );
    Ok(report)
}

/// One round trip plus validation. Never fails: a request that produced no
/// response becomes a [`CaseOutcome::Fatal`] report.
pub async fn execute_case(
    dispatcher: &Dispatcher,
    case: &TestCase,
    overrides: &BTreeMap<String, String>,
) -> CaseReport {
    let started = Instant::now();

    let request = match dispatcher.resolve(case, overrides) {
        Ok(request) => request,
        Err(err) => {
            error!(case = %case.id, kind = err.kind(), error = %err, "case could not be built");
            let request = RequestInput {
                method: case.method,
                url: format!("{}{}", dispatcher.base_url(), case.path),
                headers: Vec::new(),
                body: case.payload.as_ref().map(|payload| payload.body.clone()),
            };
            return fatal_report(case, request, err.kind(), err.to_string(), started);
        }
    };

    debug!(
        case = %case.id,
        method = %request.method,
        url = %request.url,
        payload = request.body.as_deref().unwrap_or(""),
        "request"
    );

    let response = match dispatcher.send(&request).await {
        Ok(response) => response,
        Err(err) => {
            error!(case = %case.id, kind = err.kind(), error = %err, "case aborted");
            return fatal_report(case, request, err.kind(), err.to_string(), started);
        }
    };

    debug!(
        case = %case.id,
        status = response.status,
        headers = %format_headers(&response.headers),
        body = %response.body,
        "response"
    );

    let assertions = validate(&response, &case.expected);
    let outcome = if all_passed(&assertions) {
        info!(case = %case.id, status = response.status, "passed");
        CaseOutcome::Passed
    } else {
        let failures: Vec<&str> = assertions
            .iter()
            .filter(|result| !result.passed)
            .map(|result| result.message.as_str())
            .collect();
        warn!(case = %case.id, status = response.status, failures = ?failures, "failed");
        CaseOutcome::Failed
    };

    CaseReport {
        case_id: case.id.clone(),
        scenario: case.scenario,
        outcome,
        request,
        response: Some(response),
        assertions,
        error_kind: None,
        error: None,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

fn fatal_report(
    case: &TestCase,
    request: RequestInput,
    kind: &str,
    message: String,
    started: Instant,
) -> CaseReport {
    CaseReport {
        case_id: case.id.clone(),
        scenario: case.scenario,
        outcome: CaseOutcome::Fatal,
        request,
        response: None,
        assertions: Vec::new(),
        error_kind: Some(kind.to_string()),
        error: Some(message),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    checks::{CheckOutcome, Checks},
    config::ApiConfig,
    error::{Error, Result},
    scenarios::ScenarioResult,
};

type ScenarioFn = Box<dyn Fn(&ApiConfig, &mut Checks) -> ScenarioResult + Send + Sync>;

pub struct Scenario {
    name: String,
    run: ScenarioFn,
}

impl Scenario {
    pub fn new<T, F>(name: T, run: F) -> Self
    where
        T: Into<String>,
        F: Fn(&ApiConfig, &mut Checks) -> ScenarioResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the scenario to completion. Errors never escape; they end up in
    /// the report next to whatever checks ran before them.
    pub fn run(&self, config: &ApiConfig) -> ScenarioReport {
        let start = Instant::now();
        let mut checks = Checks::new();
        let error = match (self.run)(config, &mut checks) {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
        let report = ScenarioReport {
            name: self.name.clone(),
            checks: checks.into_outcomes(),
            error,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        if report.passed() {
            info!(scenario = %report.name, duration_ms = report.duration_ms, "passed");
        } else {
            warn!(scenario = %report.name, duration_ms = report.duration_ms, "failed");
        }
        report
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub checks: Vec<CheckOutcome>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.checks.iter().all(|check| check.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub reports: Vec<ScenarioReport>,
}

impl SuiteReport {
    fn from_reports(reports: Vec<ScenarioReport>) -> Self {
        let passed = reports.iter().filter(|report| report.passed()).count();
        Self {
            passed,
            failed: reports.len() - passed,
            reports,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Keeps scenarios whose name contains any of `patterns`. No patterns means
/// everything.
pub fn filter_scenarios<T: AsRef<str>>(scenarios: Vec<Scenario>, patterns: &[T]) -> Vec<Scenario> {
    if patterns.is_empty() {
        return scenarios;
    }
    scenarios
        .into_iter()
        .filter(|scenario| {
            patterns
                .iter()
                .any(|pattern| scenario.name.contains(pattern.as_ref()))
        })
        .collect()
}

/// Runs independent scenarios on `jobs` worker threads. Reports come back in
/// the same order as `scenarios`; `on_finished` is called as each one ends.
pub fn run_scenarios<F>(
    config: &ApiConfig,
    scenarios: &[Scenario],
    jobs: usize,
    on_finished: F,
) -> Result<SuiteReport>
where
    F: Fn(&ScenarioReport) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|err| Error::WorkerPool(err.to_string()))?;
    info!("Running {} scenario(s) on {} worker(s).", scenarios.len(), pool.current_num_threads());
    let reports: Vec<ScenarioReport> = pool.install(|| {
        scenarios
            .par_iter()
            .map(|scenario| {
                let report = scenario.run(config);
                on_finished(&report);
                report
            })
            .collect()
    });
    Ok(SuiteReport::from_reports(reports))
}

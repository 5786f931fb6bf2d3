//! Soft and hard assertions for scenarios.
//!
//! Every check is recorded, pass or fail. A failed soft check lets the
//! scenario carry on so later checks still report; a failed hard check
//! returns a [`HardFailure`] that the scenario propagates with `?`.

use std::fmt::{Debug, Display};

use serde::Serialize;
use tracing::warn;

use crate::{client::ApiResponse, error::Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub hard: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardFailure {
    pub check: String,
    pub detail: Option<String>,
}

impl Display for HardFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "check failed: {} ({detail})", self.check),
            None => write!(f, "check failed: {}", self.check),
        }
    }
}

impl std::error::Error for HardFailure {}

/// The status code carried by a response or by the error that replaced it.
pub fn status_of(result: &Result<ApiResponse>) -> Option<u16> {
    match result {
        Ok(response) => Some(response.status),
        Err(err) => err.status(),
    }
}

fn describe_status(result: &Result<ApiResponse>, expected: u16) -> Option<String> {
    match status_of(result) {
        Some(status) if status == expected => None,
        Some(status) => Some(format!("expected HTTP {expected}, got HTTP {status}")),
        None => {
            let reason = match result {
                Err(err) => err.to_string(),
                Ok(_) => "no status".to_owned(),
            };
            Some(format!("expected HTTP {expected}, got error: {reason}"))
        }
    }
}

#[derive(Debug, Default)]
pub struct Checks {
    outcomes: Vec<CheckOutcome>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, name: String, passed: bool, hard: bool, detail: Option<String>) {
        if !passed {
            warn!(check = %name, detail = detail.as_deref().unwrap_or(""), "check failed");
        }
        self.outcomes.push(CheckOutcome {
            name,
            passed,
            hard,
            detail,
        });
    }

    pub fn soft<T: Into<String>>(&mut self, name: T, passed: bool) -> bool {
        self.record(name.into(), passed, false, None);
        passed
    }

    pub fn soft_with<T: Into<String>>(&mut self, name: T, passed: bool, detail: String) -> bool {
        let detail = if passed { None } else { Some(detail) };
        self.record(name.into(), passed, false, detail);
        passed
    }

    pub fn soft_eq<T: Into<String>, V: PartialEq + Debug>(
        &mut self,
        name: T,
        actual: V,
        expected: V,
    ) -> bool {
        let passed = actual == expected;
        self.soft_with(name, passed, format!("expected {expected:?}, got {actual:?}"))
    }

    pub fn hard<T: Into<String>>(
        &mut self,
        name: T,
        passed: bool,
    ) -> std::result::Result<(), HardFailure> {
        self.hard_detailed(name, passed, None)
    }

    pub fn hard_with<T: Into<String>>(
        &mut self,
        name: T,
        passed: bool,
        detail: String,
    ) -> std::result::Result<(), HardFailure> {
        self.hard_detailed(name, passed, Some(detail))
    }

    fn hard_detailed<T: Into<String>>(
        &mut self,
        name: T,
        passed: bool,
        detail: Option<String>,
    ) -> std::result::Result<(), HardFailure> {
        let name = name.into();
        let detail = if passed { None } else { detail };
        self.record(name.clone(), passed, true, detail.clone());
        if passed {
            Ok(())
        } else {
            Err(HardFailure {
                check: name,
                detail,
            })
        }
    }

    pub fn hard_eq<T: Into<String>, V: PartialEq + Debug>(
        &mut self,
        name: T,
        actual: V,
        expected: V,
    ) -> std::result::Result<(), HardFailure> {
        let passed = actual == expected;
        let detail = format!("expected {expected:?}, got {actual:?}");
        self.hard_detailed(name, passed, Some(detail))
    }

    pub fn soft_status<T: Into<String>>(
        &mut self,
        name: T,
        result: &Result<ApiResponse>,
        expected: u16,
    ) -> bool {
        let detail = describe_status(result, expected);
        let passed = detail.is_none();
        self.record(name.into(), passed, false, detail);
        passed
    }

    /// Passes when the call produced `expected`, even if that status came
    /// back as an error.
    pub fn hard_status<T: Into<String>>(
        &mut self,
        name: T,
        result: &Result<ApiResponse>,
        expected: u16,
    ) -> std::result::Result<(), HardFailure> {
        let detail = describe_status(result, expected);
        self.hard_detailed(name, detail.is_none(), detail)
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<CheckOutcome> {
        self.outcomes
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }
}

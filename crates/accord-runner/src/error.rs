use accord_check::CheckErrors;
use accord_domain::{DomainError, LifecycleState, ResourceAddress};
use accord_driver::{HarnessError, RemoteError};
use serde::Serialize;
use thiserror::Error;

use crate::import::ImportDiff;

/// What a step's changes should have done to the target's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityExpectation {
    Preserve,
    Replace,
}

fn violation(
    expected: &IdentityExpectation,
    before: &str,
    after: &str,
    checks: Option<&CheckErrors>,
) -> String {
    let message = match expected {
        IdentityExpectation::Preserve => format!(
            "resource recreated when it was supposed to be updated (id {} became {})",
            before, after
        ),
        IdentityExpectation::Replace => format!(
            "resource updated in place when it was supposed to be recreated (id {} kept)",
            before
        ),
    };
    match checks {
        Some(checks) => format!("{}\n{}", message, checks),
        None => message,
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid case: {0}")]
    InvalidCase(#[from] DomainError),

    #[error("step {step} ({description}): {source}")]
    Harness {
        step: usize,
        description: String,
        #[source]
        source: HarnessError,
    },

    #[error("step {step} ({description}): {source}")]
    Check {
        step: usize,
        description: String,
        #[source]
        source: CheckErrors,
    },

    #[error("step {step}: {}", violation(.expected, .before, .after, .checks.as_ref()))]
    IdentityViolation {
        step: usize,
        expected: IdentityExpectation,
        before: String,
        after: String,
        /// Attribute checks of the same step that also failed.
        checks: Option<CheckErrors>,
    },

    #[error("step {step}: imported state is not equivalent to applied state\n{diff}")]
    ImportMismatch { step: usize, diff: ImportDiff },

    #[error("step {step}: no {address} has been created, nothing to import")]
    NothingToImport {
        step: usize,
        address: ResourceAddress,
    },

    #[error("teardown failed: {0}")]
    Teardown(#[source] HarnessError),

    #[error("destroy check failed: {0}")]
    Destroy(#[from] DestroyError),
}

#[derive(Debug, Error)]
pub enum DestroyError {
    #[error("resource lifecycle state: {state} is not in expected deleted lifecycle states ({id})")]
    StillPresent { id: String, state: LifecycleState },

    #[error("reading {id}: {source}")]
    Remote {
        id: String,
        #[source]
        source: RemoteError,
    },

    #[error("at least one resource was expected from the state file, but could not be found")]
    NoResourceFound { resource_type: String },
}

use accord_domain::ResourceAddress;
use serde::Serialize;
use thiserror::Error;

/// One failed expectation. Every variant carries enough context to find the
/// offending attribute without re-running the step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckFailure {
    #[error("{address}: not found in state")]
    MissingResource { address: ResourceAddress },

    #[error("{address}: attribute '{path}' expected to be set")]
    NotSet { address: ResourceAddress, path: String },

    #[error("{address}: attribute '{path}' not found, expected '{expected}'")]
    MissingAttribute {
        address: ResourceAddress,
        path: String,
        expected: String,
    },

    #[error("{address}: attribute '{path}' expected '{expected}', got '{actual}'")]
    Mismatch {
        address: ResourceAddress,
        path: String,
        expected: String,
        actual: String,
    },

    #[error("{address}: attribute '{path}' found when not expected (value '{actual}')")]
    UnexpectedlySet {
        address: ResourceAddress,
        path: String,
        actual: String,
    },
}

impl CheckFailure {
    pub fn address(&self) -> &ResourceAddress {
        match self {
            CheckFailure::MissingResource { address }
            | CheckFailure::NotSet { address, .. }
            | CheckFailure::MissingAttribute { address, .. }
            | CheckFailure::Mismatch { address, .. }
            | CheckFailure::UnexpectedlySet { address, .. } => address,
        }
    }
}

/// Every failure produced by an aggregate check.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{} check(s) failed:\n{}", .0.len(), render(.0))]
pub struct CheckErrors(pub Vec<CheckFailure>);

impl CheckErrors {
    pub fn failures(&self) -> &[CheckFailure] {
        &self.0
    }
}

fn render(failures: &[CheckFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}

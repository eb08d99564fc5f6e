use accord_domain::{ResourceAddress, StateSnapshot};
use serde::Serialize;
use tracing::debug;

use crate::error::{CheckErrors, CheckFailure};

/// A predicate over a state snapshot.
pub trait Check: Send + Sync {
    /// Every failure this check finds; empty means it passed.
    fn evaluate(&self, state: &StateSnapshot) -> Vec<CheckFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    Equals(String),
    /// Present and non-empty.
    IsSet,
    Absent,
}

/// Expectation on one attribute of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    pub address: ResourceAddress,
    pub path: String,
    pub expectation: Expectation,
}

impl Assertion {
    pub fn equals(
        address: &ResourceAddress,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            address: address.clone(),
            path: path.into(),
            expectation: Expectation::Equals(value.into()),
        }
    }

    pub fn is_set(address: &ResourceAddress, path: impl Into<String>) -> Self {
        Self {
            address: address.clone(),
            path: path.into(),
            expectation: Expectation::IsSet,
        }
    }

    pub fn absent(address: &ResourceAddress, path: impl Into<String>) -> Self {
        Self {
            address: address.clone(),
            path: path.into(),
            expectation: Expectation::Absent,
        }
    }
}

/// `.#` and `.%` entries of an empty collection may be left out of state
/// entirely; a missing count reads as zero.
fn is_count(path: &str) -> bool {
    path.ends_with(".#") || path.ends_with(".%")
}

impl Check for Assertion {
    fn evaluate(&self, state: &StateSnapshot) -> Vec<CheckFailure> {
        let Some(instance) = state.get(&self.address) else {
            return vec![CheckFailure::MissingResource {
                address: self.address.clone(),
            }];
        };
        let actual = instance.attribute(&self.path);

        let failure = match (&self.expectation, actual) {
            (Expectation::Equals(expected), Some(actual)) if actual == expected => None,
            (Expectation::Equals(expected), None) if expected == "0" && is_count(&self.path) => {
                None
            }
            (Expectation::Equals(expected), Some(actual)) => Some(CheckFailure::Mismatch {
                address: self.address.clone(),
                path: self.path.clone(),
                expected: expected.clone(),
                actual: actual.to_string(),
            }),
            (Expectation::Equals(expected), None) => Some(CheckFailure::MissingAttribute {
                address: self.address.clone(),
                path: self.path.clone(),
                expected: expected.clone(),
            }),
            (Expectation::IsSet, Some(actual)) if !actual.is_empty() => None,
            (Expectation::IsSet, _) => Some(CheckFailure::NotSet {
                address: self.address.clone(),
                path: self.path.clone(),
            }),
            (Expectation::Absent, None) => None,
            (Expectation::Absent, Some("0")) if is_count(&self.path) => None,
            (Expectation::Absent, Some(actual)) => Some(CheckFailure::UnexpectedlySet {
                address: self.address.clone(),
                path: self.path.clone(),
                actual: actual.to_string(),
            }),
        };
        failure.into_iter().collect()
    }
}

/// All-must-pass combination of checks. Every member runs; failures are
/// collected rather than stopping at the first.
#[derive(Default)]
pub struct Aggregate {
    checks: Vec<Box<dyn Check>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn with_all<C: Check + 'static>(mut self, checks: impl IntoIterator<Item = C>) -> Self {
        for check in checks {
            self.checks.push(Box::new(check));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn verify(&self, state: &StateSnapshot) -> Result<(), CheckErrors> {
        let failures = self.evaluate(state);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CheckErrors(failures))
        }
    }
}

impl Check for Aggregate {
    fn evaluate(&self, state: &StateSnapshot) -> Vec<CheckFailure> {
        let failures: Vec<CheckFailure> =
            self.checks.iter().flat_map(|c| c.evaluate(state)).collect();
        debug!(checks = self.checks.len(), failures = failures.len(), "evaluated aggregate check");
        failures
    }
}

impl From<Vec<Assertion>> for Aggregate {
    fn from(assertions: Vec<Assertion>) -> Self {
        Aggregate::new().with_all(assertions)
    }
}

impl std::fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregate").field("checks", &self.checks.len()).finish()
    }
}

/// Run every check against `state` and return all failures together.
pub fn aggregate<C: Check>(checks: &[C], state: &StateSnapshot) -> Result<(), CheckErrors> {
    let failures: Vec<CheckFailure> = checks.iter().flat_map(|c| c.evaluate(state)).collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(CheckErrors(failures))
    }
}

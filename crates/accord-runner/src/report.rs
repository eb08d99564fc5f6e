use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::case::{LifecycleCase, Step, StepKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
}

/// What happened to the target's identifier during an apply step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityOutcome {
    /// First sighting; the id is now tracked.
    Captured,
    Preserved,
    Replaced,
    /// The target left the configuration; tracking restarts.
    Cleared,
    /// Not present before or after.
    Absent,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// 1-based position in the case.
    pub index: usize,
    pub description: String,
    pub kind: StepKind,
    pub fingerprint: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub target_id: Option<String>,
    pub identity: Option<IdentityOutcome>,
    pub status: StepStatus,
    pub failure: Option<String>,
}

impl StepRecord {
    pub(crate) fn start(index: usize, step: &Step) -> Self {
        Self {
            index,
            description: step.description.clone(),
            kind: step.kind.clone(),
            fingerprint: step.config.fingerprint(),
            started_at: Utc::now(),
            duration_ms: 0,
            target_id: None,
            identity: None,
            status: StepStatus::Passed,
            failure: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TeardownRecord {
    pub destroyed: bool,
    /// Instances confirmed gone; `None` when verification did not run.
    pub verified: Option<usize>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub case: String,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
    pub teardown: Option<TeardownRecord>,
    pub passed: bool,
}

impl RunReport {
    pub fn new(case: &LifecycleCase) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            case: case.name.clone(),
            target: case.target.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
            teardown: None,
            passed: false,
        }
    }

    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn imports(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::Import { .. }))
    }
}

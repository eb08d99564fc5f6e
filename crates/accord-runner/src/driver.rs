use std::sync::Arc;
use std::time::Instant;

use accord_config::ConfigDocument;
use accord_domain::{AttributeValues, InstanceState, ResourceSchema, StateSnapshot};
use accord_driver::{Harness, RemoteClient};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::case::{LifecycleCase, Step, StepKind};
use crate::destroy::verify_destroyed;
use crate::error::{IdentityExpectation, RunError};
use crate::import::import_diff;
use crate::report::{IdentityOutcome, RunReport, StepRecord, StepStatus, TeardownRecord};

/// Result of running a case: the report is always produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub result: Result<(), RunError>,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Identifier and configured values of the target at the last apply.
#[derive(Debug, Clone)]
struct Captured {
    id: String,
    values: Option<AttributeValues>,
}

/// Mutable state threaded through the steps of one run.
#[derive(Default)]
struct RunState<'c> {
    identity: Option<Captured>,
    /// Last snapshot produced by a successful apply.
    snapshot: Option<StateSnapshot>,
    applied: Option<&'c ConfigDocument>,
    attempted: Option<&'c ConfigDocument>,
}

/// Drives a [`LifecycleCase`] step by step against a harness, then tears
/// everything down and verifies the remote side agrees.
pub struct LifecycleDriver {
    harness: Arc<dyn Harness>,
    remote: Arc<dyn RemoteClient>,
}

impl LifecycleDriver {
    pub fn new(harness: Arc<dyn Harness>, remote: Arc<dyn RemoteClient>) -> Self {
        Self { harness, remote }
    }

    pub async fn run(&self, case: &LifecycleCase) -> RunOutcome {
        let mut report = RunReport::new(case);
        let mut state = RunState::default();
        info!(
            run_id = %report.run_id,
            case = %case.name,
            target = %case.target,
            steps = case.steps.len(),
            harness = self.harness.name(),
            "starting lifecycle run"
        );

        if let Err(e) = case.validate() {
            error!(error = %e, "case rejected before any step ran");
            report.finished_at = Some(Utc::now());
            return RunOutcome {
                report,
                result: Err(RunError::InvalidCase(e)),
            };
        }

        let mut failure: Option<RunError> = None;
        for (i, step) in case.steps.iter().enumerate() {
            let index = i + 1;
            let mut record = StepRecord::start(index, step);
            let clock = Instant::now();
            info!(step = index, kind = step.kind_name(), description = %step.description, "step");

            let result = self.execute(case, index, step, &mut state, &mut record).await;
            record.duration_ms = clock.elapsed().as_millis() as u64;

            if let Err(e) = result {
                error!(step = index, error = %e, "step failed");
                record.status = StepStatus::Failed;
                record.failure = Some(e.to_string());
                report.steps.push(record);
                failure = Some(e);
                break;
            }
            report.steps.push(record);
        }

        let (teardown, teardown_err) = self.teardown(case, &state).await;
        report.teardown = Some(teardown);

        let result = match (failure, teardown_err) {
            (Some(step_err), Some(teardown_err)) => {
                warn!(error = %teardown_err, "teardown also failed after an earlier step failure");
                Err(step_err)
            }
            (Some(e), None) | (None, Some(e)) => Err(e),
            (None, None) => Ok(()),
        };

        report.passed = result.is_ok();
        report.finished_at = Some(Utc::now());
        info!(run_id = %report.run_id, passed = report.passed, "lifecycle run finished");
        RunOutcome { report, result }
    }

    async fn execute<'c>(
        &self,
        case: &LifecycleCase,
        index: usize,
        step: &'c Step,
        state: &mut RunState<'c>,
        record: &mut StepRecord,
    ) -> Result<(), RunError> {
        match &step.kind {
            StepKind::Apply => self.apply_step(case, index, step, state, record).await,
            StepKind::Import { ignore } => {
                self.import_step(case, index, step, ignore, state, record)
                    .await
            }
        }
    }

    async fn apply_step<'c>(
        &self,
        case: &LifecycleCase,
        index: usize,
        step: &'c Step,
        state: &mut RunState<'c>,
        record: &mut StepRecord,
    ) -> Result<(), RunError> {
        state.attempted = Some(&step.config);
        let snapshot = self
            .harness
            .apply(&step.config)
            .await
            .map_err(|source| RunError::Harness {
                step: index,
                description: step.description.clone(),
                source,
            })?;
        state.applied = Some(&step.config);

        let target = snapshot.get(&case.target).cloned();
        record.target_id = target.as_ref().map(|t| t.id.clone());

        let identity = track_identity(
            &case.schema,
            index,
            &mut state.identity,
            target.as_ref(),
            step.target_values.as_ref(),
        );
        let checked = match &step.check {
            Some(check) => check.verify(&snapshot),
            None => Ok(()),
        };
        state.snapshot = Some(snapshot);

        match (identity, checked) {
            (Err(RunError::IdentityViolation { expected, before, after, .. }), Err(checks)) => {
                Err(RunError::IdentityViolation {
                    step: index,
                    expected,
                    before,
                    after,
                    checks: Some(checks),
                })
            }
            (Err(e), _) => Err(e),
            (Ok(outcome), checked) => {
                record.identity = Some(outcome);
                checked.map_err(|source| RunError::Check {
                    step: index,
                    description: step.description.clone(),
                    source,
                })
            }
        }
    }

    async fn import_step(
        &self,
        case: &LifecycleCase,
        index: usize,
        step: &Step,
        ignore: &[String],
        state: &mut RunState<'_>,
        record: &mut StepRecord,
    ) -> Result<(), RunError> {
        let nothing = || RunError::NothingToImport {
            step: index,
            address: case.target.clone(),
        };
        let id = state.identity.as_ref().map(|c| c.id.clone()).ok_or_else(nothing)?;
        let applied = state
            .snapshot
            .as_ref()
            .and_then(|s| s.get(&case.target))
            .cloned()
            .ok_or_else(nothing)?;

        let imported = self
            .harness
            .import(&step.config, &case.target, &id)
            .await
            .map_err(|source| RunError::Harness {
                step: index,
                description: step.description.clone(),
                source,
            })?;

        let imported_instance = imported
            .get(&case.target)
            .cloned()
            .unwrap_or_else(|| InstanceState::new(case.target.clone(), ""));
        record.target_id = Some(imported_instance.id.clone()).filter(|id| !id.is_empty());

        let diff = import_diff(&applied.attributes, &imported_instance.attributes, ignore);
        if !diff.is_empty() {
            return Err(RunError::ImportMismatch { step: index, diff });
        }

        if let Some(check) = &step.check {
            check.verify(&imported).map_err(|source| RunError::Check {
                step: index,
                description: step.description.clone(),
                source,
            })?;
        }
        Ok(())
    }

    async fn teardown(
        &self,
        case: &LifecycleCase,
        state: &RunState<'_>,
    ) -> (TeardownRecord, Option<RunError>) {
        let mut record = TeardownRecord::default();

        let Some(doc) = state.applied.or(state.attempted) else {
            info!("no step ran; nothing to tear down");
            return (record, None);
        };

        info!("tearing down");
        if let Err(e) = self.harness.destroy(doc).await {
            record.failure = Some(e.to_string());
            return (record, Some(RunError::Teardown(e)));
        }
        record.destroyed = true;

        let Some(snapshot) = &state.snapshot else {
            info!("no state was materialized; skipping destroy verification");
            return (record, None);
        };

        match verify_destroyed(
            self.remote.as_ref(),
            snapshot,
            &case.target.resource_type,
            &case.deleted_states,
        )
        .await
        {
            Ok(n) => {
                record.verified = Some(n);
                (record, None)
            }
            Err(e) => {
                record.failure = Some(e.to_string());
                (record, Some(RunError::Destroy(e)))
            }
        }
    }
}

/// Update the captured identity after an apply and check it moved the way
/// the schema says the configured changes should move it.
fn track_identity(
    schema: &ResourceSchema,
    step: usize,
    captured: &mut Option<Captured>,
    target: Option<&InstanceState>,
    values: Option<&AttributeValues>,
) -> Result<IdentityOutcome, RunError> {
    let previous = captured.take();
    let Some(target) = target else {
        return Ok(match previous {
            Some(_) => IdentityOutcome::Cleared,
            None => IdentityOutcome::Absent,
        });
    };

    let Some(previous) = previous else {
        *captured = Some(Captured {
            id: target.id.clone(),
            values: values.cloned(),
        });
        return Ok(IdentityOutcome::Captured);
    };

    let expected = match (previous.values.as_ref(), values) {
        (Some(before), Some(after)) if !schema.classify_change(before, after).preserves_identity() => {
            IdentityExpectation::Replace
        }
        _ => IdentityExpectation::Preserve,
    };
    let same = previous.id == target.id;

    *captured = Some(Captured {
        id: target.id.clone(),
        values: values.cloned().or(previous.values),
    });

    match (expected, same) {
        (IdentityExpectation::Preserve, true) => Ok(IdentityOutcome::Preserved),
        (IdentityExpectation::Replace, false) => Ok(IdentityOutcome::Replaced),
        (expected, _) => Err(RunError::IdentityViolation {
            step,
            expected,
            before: previous.id,
            after: target.id.clone(),
            checks: None,
        }),
    }
}

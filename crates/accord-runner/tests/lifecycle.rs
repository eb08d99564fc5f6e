use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use accord_check::{Aggregate, Assertion};
use accord_config::ConfigDocument;
use accord_domain::{
    AttrValue, AttributeSchema, AttributeType, AttributeValues, InstanceState, LifecycleState,
    ResourceAddress, ResourceSchema, StateSnapshot,
};
use accord_driver::{Harness, HarnessError, RemoteClient, RemoteError};
use accord_runner::{
    IdentityOutcome, LifecycleCase, LifecycleDriver, RunError, Step, StepStatus,
};
use async_trait::async_trait;

// ── Fakes ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedHarness {
    applies: Mutex<VecDeque<Result<StateSnapshot, HarnessError>>>,
    import: Mutex<Option<Result<StateSnapshot, HarnessError>>>,
    destroy_error: Mutex<Option<HarnessError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHarness {
    fn applying(snapshots: Vec<StateSnapshot>) -> Self {
        let h = Self::default();
        *h.applies.lock().unwrap() = snapshots.into_iter().map(Ok).collect();
        h
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Harness for ScriptedHarness {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn apply(&self, doc: &ConfigDocument) -> Result<StateSnapshot, HarnessError> {
        self.calls.lock().unwrap().push(format!("apply {}", doc.render().trim()));
        self.applies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HarnessError::Internal("script exhausted".into())))
    }

    async fn import(
        &self,
        _doc: &ConfigDocument,
        address: &ResourceAddress,
        id: &str,
    ) -> Result<StateSnapshot, HarnessError> {
        self.calls.lock().unwrap().push(format!("import {} {}", address, id));
        self.import
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(HarnessError::Internal("no import scripted".into())))
    }

    async fn destroy(&self, doc: &ConfigDocument) -> Result<(), HarnessError> {
        self.calls.lock().unwrap().push(format!("destroy {}", doc.render().trim()));
        match self.destroy_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Every id is already gone.
struct GoneRemote;

#[async_trait]
impl RemoteClient for GoneRemote {
    fn name(&self) -> &'static str {
        "gone"
    }

    async fn get_lifecycle_state(&self, _id: &str) -> Result<LifecycleState, RemoteError> {
        Err(RemoteError::Service {
            status: 404,
            code: "NotAuthorizedOrNotFound".into(),
            message: "not found".into(),
        })
    }
}

/// Every id is still live.
struct LiveRemote;

#[async_trait]
impl RemoteClient for LiveRemote {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn get_lifecycle_state(&self, _id: &str) -> Result<LifecycleState, RemoteError> {
        Ok(LifecycleState::Available)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn target() -> ResourceAddress {
    ResourceAddress::managed("oci_core_subnet", "test_subnet")
}

fn schema() -> ResourceSchema {
    ResourceSchema::new("oci_core_subnet")
        .attribute(AttributeSchema::new("cidr_block", AttributeType::String).required().forces_replacement())
        .attribute(AttributeSchema::new("display_name", AttributeType::String).optional_computed())
}

fn doc(label: &str) -> ConfigDocument {
    ConfigDocument::builder().raw(format!("# {}", label)).build().unwrap()
}

fn values(name: &str) -> AttributeValues {
    [
        ("cidr_block".to_string(), AttrValue::from("10.0.0.0/16")),
        ("display_name".to_string(), AttrValue::from(name)),
    ]
    .into_iter()
    .collect()
}

fn subnet(id: &str, name: &str) -> StateSnapshot {
    StateSnapshot::new(vec![
        InstanceState::new(target(), id)
            .with_attribute("id", id)
            .with_attribute("cidr_block", "10.0.0.0/16")
            .with_attribute("display_name", name),
        InstanceState::new(ResourceAddress::managed("oci_core_vcn", "test_vcn"), "vcn"),
    ])
}

fn name_check(name: &str) -> Aggregate {
    Aggregate::new().with(Assertion::equals(&target(), "display_name", name))
}

fn case() -> LifecycleCase {
    LifecycleCase::new("subnet", target(), schema())
        .step(Step::apply("create", doc("create")).with_values(values("MySubnet")).with_check(name_check("MySubnet")))
        .step(Step::apply("update", doc("update")).with_values(values("displayName2")).with_check(name_check("displayName2")))
        .step(Step::import("import", doc("update"), &[]))
}

fn driver(harness: Arc<ScriptedHarness>, remote: Arc<dyn RemoteClient>) -> LifecycleDriver {
    LifecycleDriver::new(harness, remote)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_lifecycle_passes_and_tears_down() {
    let harness = Arc::new(ScriptedHarness::applying(vec![
        subnet("ocid1.a", "MySubnet"),
        subnet("ocid1.a", "displayName2"),
    ]));
    *harness.import.lock().unwrap() = Some(Ok(subnet("ocid1.a", "displayName2")));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case()).await;
    assert!(outcome.passed(), "{:?}", outcome.result);

    let report = &outcome.report;
    assert!(report.passed);
    assert_eq!(report.steps.len(), 3);
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Passed));
    assert_eq!(report.steps[0].identity, Some(IdentityOutcome::Captured));
    assert_eq!(report.steps[1].identity, Some(IdentityOutcome::Preserved));
    assert_eq!(report.steps[2].target_id.as_deref(), Some("ocid1.a"));
    assert_eq!(report.imports().count(), 1);

    let teardown = report.teardown.as_ref().unwrap();
    assert!(teardown.destroyed);
    assert_eq!(teardown.verified, Some(1));

    assert_eq!(
        harness.calls(),
        vec![
            "apply # create",
            "apply # update",
            "import oci_core_subnet.test_subnet ocid1.a",
            "destroy # update",
        ]
    );
}

#[tokio::test]
async fn recreated_resource_fails_update_step_but_still_tears_down() {
    let harness = Arc::new(ScriptedHarness::applying(vec![
        subnet("ocid1.a", "MySubnet"),
        subnet("ocid1.b", "displayName2"),
    ]));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case()).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, RunError::IdentityViolation { step: 2, .. }));
    assert!(err.to_string().contains("resource recreated when it was supposed to be updated"));

    assert_eq!(outcome.report.steps.len(), 2);
    assert_eq!(outcome.report.failed_step().unwrap().index, 2);
    assert_eq!(harness.calls().last().unwrap(), "destroy # update");
    assert_eq!(outcome.report.teardown.as_ref().unwrap().verified, Some(1));
}

#[tokio::test]
async fn recreation_and_check_failures_are_reported_together() {
    let harness = Arc::new(ScriptedHarness::applying(vec![
        subnet("ocid1.a", "MySubnet"),
        subnet("ocid1.b", "Wrong"),
    ]));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case()).await;

    match &outcome.result {
        Err(RunError::IdentityViolation { step, checks: Some(checks), .. }) => {
            assert_eq!(*step, 2);
            assert_eq!(checks.failures().len(), 1);
            assert_eq!(checks.failures()[0].address(), &target());
        }
        other => panic!("unexpected result {other:?}"),
    }

    let failure = outcome.report.steps[1].failure.as_deref().unwrap();
    assert!(failure.contains("resource recreated when it was supposed to be updated"));
    assert!(failure.contains("attribute 'display_name' expected 'displayName2', got 'Wrong'"));
}

#[tokio::test]
async fn undeclared_attribute_rejects_case_before_any_apply() {
    let mut misspelled = values("MySubnet");
    misspelled.insert("dispaly_name".to_string(), AttrValue::from("MySubnet"));
    let case = LifecycleCase::new("subnet", target(), schema())
        .step(Step::apply("create", doc("create")).with_values(misspelled));
    let harness = Arc::new(ScriptedHarness::default());

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, RunError::InvalidCase(_)));
    assert!(err.to_string().contains("unknown attribute 'dispaly_name'"));
    assert!(harness.calls().is_empty());
    assert!(outcome.report.steps.is_empty());
    assert!(outcome.report.teardown.is_none());
    assert!(!outcome.report.passed);
}

#[tokio::test]
async fn check_failures_stop_the_run() {
    let harness = Arc::new(ScriptedHarness::applying(vec![subnet("ocid1.a", "Wrong")]));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case()).await;

    match outcome.result {
        Err(RunError::Check { step, source, .. }) => {
            assert_eq!(step, 1);
            assert_eq!(source.failures().len(), 1);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(harness.calls(), vec!["apply # create", "destroy # create"]);
}

#[tokio::test]
async fn import_mismatch_lists_every_difference() {
    let harness = Arc::new(ScriptedHarness::applying(vec![
        subnet("ocid1.a", "MySubnet"),
        subnet("ocid1.a", "displayName2"),
    ]));
    *harness.import.lock().unwrap() = Some(Ok(subnet("ocid1.a", "MySubnet")));

    let outcome = driver(harness, Arc::new(GoneRemote)).run(&case()).await;

    match outcome.result {
        Err(RunError::ImportMismatch { step, diff }) => {
            assert_eq!(step, 3);
            assert_eq!(diff.differing.len(), 1);
            assert_eq!(diff.differing[0].0, "display_name");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn live_resource_after_destroy_fails_the_run() {
    let harness = Arc::new(ScriptedHarness::applying(vec![
        subnet("ocid1.a", "MySubnet"),
        subnet("ocid1.a", "displayName2"),
    ]));
    *harness.import.lock().unwrap() = Some(Ok(subnet("ocid1.a", "displayName2")));

    let outcome = driver(harness, Arc::new(LiveRemote)).run(&case()).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, RunError::Destroy(_)));
    assert!(err
        .to_string()
        .contains("resource lifecycle state: AVAILABLE is not in expected deleted lifecycle states"));
    assert!(outcome.report.steps.iter().all(|s| s.status == StepStatus::Passed));
    assert!(!outcome.report.passed);
}

#[tokio::test]
async fn step_failure_wins_over_teardown_failure() {
    let harness = Arc::new(ScriptedHarness::default());
    harness
        .applies
        .lock()
        .unwrap()
        .push_back(Err(HarnessError::Internal("apply blew up".into())));
    *harness.destroy_error.lock().unwrap() = Some(HarnessError::Internal("destroy blew up".into()));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case()).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, RunError::Harness { step: 1, .. }));
    let teardown = outcome.report.teardown.as_ref().unwrap();
    assert!(!teardown.destroyed);
    assert!(teardown.failure.as_deref().unwrap().contains("destroy blew up"));
    assert_eq!(teardown.verified, None);
    // the failed config is still used for teardown
    assert_eq!(harness.calls(), vec!["apply # create", "destroy # create"]);
}

#[tokio::test]
async fn import_without_prior_resource_is_an_error() {
    let harness = Arc::new(ScriptedHarness::applying(vec![StateSnapshot::default()]));
    let case = LifecycleCase::new("subnet", target(), schema())
        .step(Step::apply("dependencies only", doc("deps")))
        .step(Step::import("import", doc("deps"), &[]));

    let outcome = driver(harness.clone(), Arc::new(GoneRemote)).run(&case).await;

    assert!(matches!(outcome.result, Err(RunError::NothingToImport { step: 2, .. })));
    assert_eq!(outcome.report.steps[0].identity, Some(IdentityOutcome::Absent));
    // destroy ran, but verification found no subnet: the step error is what is reported
    assert!(outcome
        .report
        .teardown
        .as_ref()
        .unwrap()
        .failure
        .as_deref()
        .unwrap()
        .contains("at least one resource was expected"));
}

#[tokio::test]
async fn report_serializes_to_json() {
    let harness = Arc::new(ScriptedHarness::applying(vec![subnet("ocid1.a", "Wrong")]));
    let outcome = driver(harness, Arc::new(GoneRemote)).run(&case()).await;

    let json = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(json["case"], "subnet");
    assert_eq!(json["target"], "oci_core_subnet.test_subnet");
    assert_eq!(json["passed"], false);
    assert_eq!(json["steps"][0]["status"], "failed");
    assert_eq!(json["steps"][0]["kind"]["kind"], "apply");
    assert_eq!(json["steps"][0]["fingerprint"].as_str().unwrap().len(), 64);
}

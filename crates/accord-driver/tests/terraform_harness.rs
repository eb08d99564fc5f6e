#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use accord_config::ConfigDocument;
use accord_domain::ResourceAddress;
use accord_driver::{Harness, HarnessError, TerraformHarness, TerraformOptions};

const FAKE_TF: &str = r#"#!/bin/sh
echo "$(basename "$(pwd)") $*" >> "$FAKE_TF_LOG"
case "$1" in
  show) cat "$FAKE_TF_STATE" ;;
  apply) echo "Apply complete! Resources: 1 added, 0 changed, 0 destroyed." ;;
  import)
    if [ "$5" = "ocid1.subnet.missing" ]; then
      echo "Error: Cannot import non-existent remote object" 1>&2
      exit 1
    fi
    ;;
esac
exit 0
"#;

const STATE: &str = r#"{
  "format_version": "1.0",
  "values": { "root_module": { "resources": [
    { "mode": "managed", "type": "oci_core_subnet", "name": "test_subnet",
      "values": { "id": "ocid1.subnet.oc1..a", "cidr_block": "10.0.0.0/16" } }
  ] } }
}"#;

struct Fixture {
    _tmp: tempfile::TempDir,
    log: PathBuf,
    harness: TerraformHarness,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("terraform");
    std::fs::write(&bin, FAKE_TF).unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

    let state = tmp.path().join("state.json");
    std::fs::write(&state, STATE).unwrap();
    let log = tmp.path().join("calls.log");

    let opts = TerraformOptions::new(bin.display().to_string(), tmp.path().join("run"))
        .with_timeout(Duration::from_secs(30))
        .with_env("FAKE_TF_LOG", log.display().to_string())
        .with_env("FAKE_TF_STATE", state.display().to_string());
    let harness = TerraformHarness::new(opts).unwrap();

    Fixture { _tmp: tmp, log, harness }
}

fn calls(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn doc(text: &str) -> ConfigDocument {
    ConfigDocument::builder().raw(text).build().unwrap()
}

#[tokio::test]
async fn apply_inits_once_and_reads_state() {
    let f = fixture();

    let snapshot = f.harness.apply(&doc("# step one")).await.unwrap();
    let subnet = snapshot
        .get(&ResourceAddress::managed("oci_core_subnet", "test_subnet"))
        .unwrap();
    assert_eq!(subnet.id, "ocid1.subnet.oc1..a");

    f.harness.apply(&doc("# step two")).await.unwrap();
    let main_tf = std::fs::read_to_string(f.harness.work_dir().join("main.tf")).unwrap();
    assert_eq!(main_tf, "# step two\n");

    assert_eq!(
        calls(&f.log),
        vec![
            "run init -input=false -no-color",
            "run apply -auto-approve -input=false -no-color",
            "run show -json -no-color",
            "run apply -auto-approve -input=false -no-color",
            "run show -json -no-color",
        ]
    );
}

#[tokio::test]
async fn import_uses_a_scratch_directory() {
    let f = fixture();
    let addr = ResourceAddress::managed("oci_core_subnet", "test_subnet");

    let snapshot = f
        .harness
        .import(&doc("# import"), &addr, "ocid1.subnet.oc1..a")
        .await
        .unwrap();
    assert_eq!(snapshot.get(&addr).unwrap().id, "ocid1.subnet.oc1..a");

    let log = calls(&f.log);
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|l| l.starts_with("import-")));
    assert!(log[1].ends_with("import -input=false -no-color oci_core_subnet.test_subnet ocid1.subnet.oc1..a"));

    // scratch directory is cleaned up and the run directory was never written
    let leftovers: Vec<_> = std::fs::read_dir(f.harness.work_dir()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn failed_import_carries_the_tool_output() {
    let f = fixture();
    let addr = ResourceAddress::managed("oci_core_subnet", "test_subnet");

    let err = f
        .harness
        .import(&doc("# import"), &addr, "ocid1.subnet.missing")
        .await
        .unwrap_err();
    match err {
        HarnessError::CommandFailed { code, output, .. } => {
            assert_eq!(code, 1);
            assert!(output.contains("Cannot import non-existent remote object"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn destroy_writes_config_and_runs_destroy() {
    let f = fixture();
    f.harness.destroy(&doc("# last")).await.unwrap();

    assert_eq!(
        calls(&f.log),
        vec![
            "run init -input=false -no-color",
            "run destroy -auto-approve -input=false -no-color",
        ]
    );
}

use accord_config::{ConfigDocument, Fragment, HarnessSettings, Variables};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn fixture() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/accord.yml")
}

#[test]
fn load_settings_fixture() {
    let s = HarnessSettings::from_file(&fixture()).expect("fixture should parse");
    assert_eq!(s.compartment_id, "ocid1.compartment.oc1..aaaafixture");
    assert_eq!(s.provider.region, "us-phoenix-1");
    assert_eq!(s.provider.config_file_profile.as_deref(), Some("ACCEPTANCE"));
    assert_eq!(s.terraform_bin, "/usr/local/bin/terraform");
    assert_eq!(s.command_timeout, Duration::from_secs(900));
    assert_eq!(s.oci_bin, "oci");
    assert_eq!(s.oci_profile.as_deref(), Some("ACCEPTANCE"));
    assert_eq!(s.rest_endpoint.as_deref(), Some("https://iaas.us-phoenix-1.oraclecloud.com"));
    assert_eq!(s.rest_token_env, "ACCORD_REST_TOKEN");
    assert_eq!(s.work_dir.as_deref(), Some(Path::new("/var/tmp/accord")));
}

#[test]
fn empty_file_yields_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{}}").unwrap();

    let s = HarnessSettings::from_file(file.path()).unwrap();
    assert_eq!(s, HarnessSettings::default());
}

#[test]
fn missing_file_returns_error() {
    assert!(HarnessSettings::from_file(Path::new("/nonexistent/accord.yml")).is_err());
}

#[test]
fn provider_and_compartment_compose_into_a_document() {
    let s = HarnessSettings::from_file(&fixture()).unwrap();
    let vars = Variables::new().set("subnet_cidr_block", "10.0.0.0/16");
    let target = Fragment::new("subnet", "resource \"oci_core_subnet\" \"test_subnet\" {}\n")
        .depends_on(&[s.compartment_variable(), vars.fragment("subnet_variables")]);

    let doc = ConfigDocument::builder()
        .with(s.provider_fragment())
        .with(target)
        .build()
        .unwrap();

    let text = doc.render();
    assert!(text.starts_with("terraform {"));
    assert!(text.contains("variable \"compartment_id\" { default = \"ocid1.compartment.oc1..aaaafixture\" }"));
    assert!(text.trim_end().ends_with("resource \"oci_core_subnet\" \"test_subnet\" {}"));
}

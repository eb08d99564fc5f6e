use accord_config::{ConfigError, HarnessSettings};
use accord_runner::LifecycleCase;

use crate::cli_client::CliResource;
use crate::subnet;

/// A runnable case and how to read its resource back from the remote side.
pub struct CaseEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// CLI command for destroy verification.
    pub cli: CliResource,
    /// REST path, `{id}` is replaced with the resource id.
    pub rest_path: &'static str,
    pub build: fn(&HarnessSettings) -> Result<LifecycleCase, ConfigError>,
}

pub static CASES: &[CaseEntry] = &[CaseEntry {
    name: subnet::CASE_NAME,
    description: "oci_core_subnet: create, recreate with optionals, update, reads, import, destroy",
    cli: CliResource::SUBNET,
    rest_path: "/20160918/subnets/{id}",
    build: subnet::subnet_case,
}];

pub fn find(name: &str) -> Option<&'static CaseEntry> {
    CASES.iter().find(|c| c.name == name)
}

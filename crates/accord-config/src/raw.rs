use serde::{Deserialize, Serialize};

/// Raw YAML representation of a settings file (`accord.yml`).
/// Every field is optional; the environment fills in the rest.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub provider: RawProvider,
    pub terraform: Option<RawTerraform>,
    pub oci_cli: Option<RawOciCli>,
    pub rest: Option<RawRest>,
    pub work_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawProvider {
    pub tenancy_ocid: Option<String>,
    pub user_ocid: Option<String>,
    pub fingerprint: Option<String>,
    pub private_key_path: Option<String>,
    pub region: Option<String>,
    pub config_file_profile: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawTerraform {
    /// Binary name or path. Absent = `terraform` from PATH.
    pub binary: Option<String>,
    /// Per-command timeout in seconds.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawOciCli {
    pub binary: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawRest {
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the bearer token.
    pub token_env: Option<String>,
}

use std::path::PathBuf;
use std::time::Duration;

use accord_domain::LifecycleState;
use accord_driver::{ProcessRunner, RemoteClient, RemoteError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// The `oci` CLI command that reads one resource by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliResource {
    pub service: &'static str,
    pub resource: &'static str,
    pub id_flag: &'static str,
}

impl CliResource {
    pub const SUBNET: CliResource = CliResource {
        service: "network",
        resource: "subnet",
        id_flag: "--subnet-id",
    };
}

/// [`RemoteClient`] backed by the `oci` command line tool, which already
/// knows how to sign requests with the user's API key.
pub struct OciCliClient {
    binary: String,
    resource: CliResource,
    profile: Option<String>,
    runner: ProcessRunner,
    dir: PathBuf,
}

impl OciCliClient {
    pub fn new(binary: impl Into<String>, resource: CliResource, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            resource,
            profile: None,
            runner: ProcessRunner::new(timeout)
                .env("OCI_CLI_SUPPRESS_FILE_PERMISSIONS_WARNING", "True"),
            dir: std::env::temp_dir(),
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile.filter(|p| !p.is_empty());
        self
    }

    fn args<'a>(&'a self, id: &'a str) -> Vec<&'a str> {
        let mut args = vec![
            self.resource.service,
            self.resource.resource,
            "get",
            self.resource.id_flag,
            id,
        ];
        if let Some(profile) = &self.profile {
            args.extend(["--profile", profile.as_str()]);
        }
        args
    }
}

#[async_trait]
impl RemoteClient for OciCliClient {
    fn name(&self) -> &'static str {
        "oci-cli"
    }

    async fn get_lifecycle_state(&self, id: &str) -> Result<LifecycleState, RemoteError> {
        let args = self.args(id);
        let output = self
            .runner
            .run(&self.binary, &self.dir, &args)
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !output.success() {
            return Err(parse_service_error(&output.stderr).unwrap_or_else(|| {
                RemoteError::Transport(format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.code,
                    output.stderr.trim()
                ))
            }));
        }

        let body: Value =
            serde_json::from_str(&output.stdout).map_err(|e| RemoteError::Decode(e.to_string()))?;
        let state = body
            .pointer("/data/lifecycle-state")
            .and_then(Value::as_str)
            .ok_or_else(|| RemoteError::Decode("no data.lifecycle-state in oci output".into()))?;
        debug!(id, state, "read lifecycle state");
        Ok(LifecycleState::parse(state))
    }
}

/// The CLI prints `ServiceError:` followed by a JSON object on stderr.
fn parse_service_error(stderr: &str) -> Option<RemoteError> {
    let start = stderr.find('{')?;
    let end = stderr.rfind('}')?;
    if end < start {
        return None;
    }
    let body: Value = serde_json::from_str(&stderr[start..=end]).ok()?;
    let status = u16::try_from(body.get("status")?.as_u64()?).ok()?;
    Some(RemoteError::Service {
        status,
        code: body
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        message: body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    })
}

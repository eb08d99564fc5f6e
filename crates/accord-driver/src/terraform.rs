use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use accord_config::ConfigDocument;
use accord_domain::{ResourceAddress, StateSnapshot};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::HarnessError;
use crate::harness::Harness;
use crate::process::ProcessRunner;
use crate::state::parse_show_json;

const MAIN_TF: &str = "main.tf";

#[derive(Debug, Clone)]
pub struct TerraformOptions {
    /// Binary name or path (`terraform`, `tofu`, ...).
    pub binary: String,
    /// Directory holding the configuration and local state of one run.
    pub work_dir: PathBuf,
    pub timeout: Duration,
    /// Extra environment for every command (provider credentials and the like).
    pub env: Vec<(String, String)>,
}

impl TerraformOptions {
    pub fn new(binary: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            work_dir: work_dir.into(),
            timeout: Duration::from_secs(1800),
            env: Vec::new(),
        }
    }

    /// Options for a fresh `accord-<uuid>` directory under `root`.
    pub fn fresh_run(binary: impl Into<String>, root: &Path) -> Self {
        Self::new(binary, root.join(format!("accord-{}", Uuid::new_v4())))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// [`Harness`] backed by the Terraform CLI.
///
/// Layout of a run:
/// ```text
/// <work_dir>/
///   main.tf              <- current configuration document
///   terraform.tfstate    <- local state, shared by every step
///   import-<uuid>/       <- scratch directory for one import, removed afterwards
/// ```
pub struct TerraformHarness {
    opts: TerraformOptions,
    runner: ProcessRunner,
    initialized: AtomicBool,
}

impl TerraformHarness {
    pub fn new(opts: TerraformOptions) -> Result<Self, HarnessError> {
        std::fs::create_dir_all(&opts.work_dir).map_err(|e| HarnessError::Workspace {
            path: opts.work_dir.display().to_string(),
            source: e,
        })?;

        let mut runner = ProcessRunner::new(opts.timeout)
            .env("TF_IN_AUTOMATION", "1")
            .env("TF_INPUT", "0");
        for (k, v) in &opts.env {
            runner = runner.env(k.as_str(), v.as_str());
        }

        Ok(Self {
            opts,
            runner,
            initialized: AtomicBool::new(false),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.opts.work_dir
    }

    fn write_config(&self, dir: &Path, doc: &ConfigDocument) -> Result<(), HarnessError> {
        let path = dir.join(MAIN_TF);
        std::fs::write(&path, doc.render()).map_err(|e| HarnessError::Workspace {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(path = %path.display(), fingerprint = %doc.fingerprint(), "wrote configuration");
        Ok(())
    }

    async fn tf(&self, dir: &Path, args: &[&str]) -> Result<String, HarnessError> {
        let output = self.runner.run_checked(&self.opts.binary, dir, args).await?;
        Ok(output.stdout)
    }

    async fn init(&self, dir: &Path) -> Result<(), HarnessError> {
        self.tf(dir, &["init", "-input=false", "-no-color"]).await?;
        Ok(())
    }

    async fn ensure_init(&self) -> Result<(), HarnessError> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.init(&self.opts.work_dir).await?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn show(&self, dir: &Path) -> Result<StateSnapshot, HarnessError> {
        let json = self.tf(dir, &["show", "-json", "-no-color"]).await?;
        parse_show_json(&json)
    }
}

#[async_trait]
impl Harness for TerraformHarness {
    fn name(&self) -> &'static str {
        "terraform"
    }

    async fn apply(&self, doc: &ConfigDocument) -> Result<StateSnapshot, HarnessError> {
        let dir = self.opts.work_dir.as_path();
        self.write_config(dir, doc)?;
        self.ensure_init().await?;

        info!(fingerprint = %doc.fingerprint(), "terraform apply");
        self.tf(dir, &["apply", "-auto-approve", "-input=false", "-no-color"])
            .await?;

        let snapshot = self.show(dir).await?;
        debug!(instances = snapshot.len(), "state after apply");
        Ok(snapshot)
    }

    async fn import(
        &self,
        doc: &ConfigDocument,
        address: &ResourceAddress,
        id: &str,
    ) -> Result<StateSnapshot, HarnessError> {
        let scratch = self.opts.work_dir.join(format!("import-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&scratch).map_err(|e| HarnessError::Workspace {
            path: scratch.display().to_string(),
            source: e,
        })?;

        info!(%address, id, dir = %scratch.display(), "terraform import");
        let result = async {
            self.write_config(&scratch, doc)?;
            self.init(&scratch).await?;
            let addr = address.to_string();
            self.tf(&scratch, &["import", "-input=false", "-no-color", &addr, id])
                .await?;
            self.show(&scratch).await
        }
        .await;

        if let Err(e) = std::fs::remove_dir_all(&scratch) {
            warn!(error = %e, dir = %scratch.display(), "failed to remove import scratch directory");
        }
        result
    }

    async fn destroy(&self, doc: &ConfigDocument) -> Result<(), HarnessError> {
        let dir = self.opts.work_dir.as_path();
        self.write_config(dir, doc)?;
        self.ensure_init().await?;

        info!("terraform destroy");
        self.tf(dir, &["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await?;
        Ok(())
    }
}

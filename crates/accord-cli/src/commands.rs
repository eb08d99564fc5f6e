use std::path::PathBuf;
use std::sync::Arc;

use accord_config::HarnessSettings;
use accord_driver::{
    Harness, RemoteClient, RestClient, RestClientConfig, StaticToken, TerraformHarness, TerraformOptions,
};
use accord_oci::{CaseEntry, OciCliClient};
use accord_runner::LifecycleDriver;
use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{OutputFormat, RemoteArg};
use crate::output;

fn lookup(name: &str) -> Result<&'static CaseEntry> {
    accord_oci::find(name).with_context(|| {
        format!("unknown case '{}'; `accord cases` lists the known ones", name)
    })
}

fn load_settings(path: Option<PathBuf>) -> Result<HarnessSettings> {
    let display = path.as_ref().map(|p| p.display().to_string());
    HarnessSettings::load(path.as_deref()).with_context(|| match display {
        Some(p) => format!("Failed to load settings from {p}"),
        None => "Failed to load settings from the environment".to_string(),
    })
}

// ── Cases ─────────────────────────────────────────────────────────────────────

pub fn cases() -> Result<()> {
    print!("{}", output::render_cases(accord_oci::CASES));
    Ok(())
}

// ── Render ────────────────────────────────────────────────────────────────────

pub fn render(name: &str, step: Option<usize>, settings: Option<PathBuf>) -> Result<()> {
    let entry = lookup(name)?;
    let settings = load_settings(settings)?;
    let case = (entry.build)(&settings).context("Failed to build case configuration")?;

    if let Some(n) = step {
        if n == 0 || n > case.steps.len() {
            anyhow::bail!("case '{}' has steps 1..={}, not {}", name, case.steps.len(), n);
        }
    }

    for (i, s) in case.steps.iter().enumerate() {
        let index = i + 1;
        if step.is_some_and(|n| n != index) {
            continue;
        }
        println!("# ── step {} ({}): {}", index, s.kind_name(), s.description);
        println!("# fingerprint {}", s.config.fingerprint());
        print!("{}", s.config.render());
        println!();
    }
    Ok(())
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub async fn run(
    name: &str,
    settings: Option<PathBuf>,
    workdir: Option<PathBuf>,
    terraform: Option<String>,
    remote: RemoteArg,
    format: OutputFormat,
) -> Result<bool> {
    let entry = lookup(name)?;
    let mut settings = load_settings(settings)?;
    if let Some(bin) = terraform {
        settings.terraform_bin = bin;
    }
    let case = (entry.build)(&settings).context("Failed to build case configuration")?;

    let root = workdir
        .or_else(|| settings.work_dir.clone())
        .unwrap_or_else(std::env::temp_dir);
    let opts = TerraformOptions::fresh_run(settings.terraform_bin.clone(), &root)
        .with_timeout(settings.command_timeout);
    let harness: Arc<dyn Harness> = Arc::new(
        TerraformHarness::new(opts).context("Failed to prepare Terraform work directory")?,
    );

    let remote: Arc<dyn RemoteClient> = match remote {
        RemoteArg::OciCli => Arc::new(
            OciCliClient::new(settings.oci_bin.clone(), entry.cli, settings.command_timeout)
                .with_profile(settings.oci_profile.clone()),
        ),
        RemoteArg::Rest => {
            let endpoint = settings
                .rest_endpoint
                .clone()
                .context("rest.endpoint must be set in the settings file for --remote rest")?;
            let token = std::env::var(&settings.rest_token_env).with_context(|| {
                format!("{} must hold a bearer token for --remote rest", settings.rest_token_env)
            })?;
            Arc::new(RestClient::new(
                RestClientConfig::new(endpoint, entry.rest_path),
                Box::new(StaticToken(token)),
            ))
        }
    };

    info!(case = name, harness = harness.name(), remote = remote.name(), "running case");
    let outcome = LifecycleDriver::new(harness, remote).run(&case).await;

    match format {
        OutputFormat::Text => print!("{}", output::render_report(&outcome.report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&outcome.report).context("Failed to serialize report")?
        ),
    }
    if let Err(e) = &outcome.result {
        eprintln!("error: {}", e);
    }
    Ok(outcome.passed())
}

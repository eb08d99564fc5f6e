use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::document::Fragment;
use crate::error::ConfigError;
use crate::hcl::{Block, HclValue};
use crate::raw::RawSettings;
use crate::variables::Variables;

pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";
pub const DEFAULT_OCI_BIN: &str = "oci";
pub const DEFAULT_TOKEN_ENV: &str = "ACCORD_REST_TOKEN";
/// Per-command timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Key of the provider fragment in a configuration document.
pub const PROVIDER_FRAGMENT: &str = "provider";
/// Key of the compartment variable fragment.
pub const COMPARTMENT_FRAGMENT: &str = "compartment_id";

/// Look a setting up the way the acceptance environment exports it:
/// `TF_VAR_<name>`, then `OCI_<NAME>`, then blank.
pub fn env_setting(name: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(&format!("TF_VAR_{}", name))
        .filter(|v| !v.is_empty())
        .or_else(|| lookup(&format!("OCI_{}", name.to_ascii_uppercase())))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderSettings {
    pub tenancy_ocid: String,
    pub user_ocid: String,
    pub fingerprint: String,
    pub private_key_path: String,
    pub region: String,
    pub config_file_profile: Option<String>,
}

impl ProviderSettings {
    fn credentials(&self) -> [(&'static str, &str); 5] {
        [
            ("tenancy_ocid", self.tenancy_ocid.as_str()),
            ("user_ocid", self.user_ocid.as_str()),
            ("fingerprint", self.fingerprint.as_str()),
            ("private_key_path", self.private_key_path.as_str()),
            ("region", self.region.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessSettings {
    /// Compartment every test resource is created in.
    pub compartment_id: String,
    pub provider: ProviderSettings,
    pub terraform_bin: String,
    pub oci_bin: String,
    pub oci_profile: Option<String>,
    pub rest_endpoint: Option<String>,
    pub rest_token_env: String,
    /// Root under which per-run work directories are created. `None` = system temp dir.
    pub work_dir: Option<PathBuf>,
    #[serde(with = "duration_secs")]
    pub command_timeout: Duration,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            compartment_id: String::new(),
            provider: ProviderSettings::default(),
            terraform_bin: DEFAULT_TERRAFORM_BIN.to_string(),
            oci_bin: DEFAULT_OCI_BIN.to_string(),
            oci_profile: None,
            rest_endpoint: None,
            rest_token_env: DEFAULT_TOKEN_ENV.to_string(),
            work_dir: None,
            command_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HarnessSettings {
    /// Load from an optional YAML file, then let the process environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_env(|name| std::env::var(name).ok());
        if settings.compartment_id.is_empty() {
            info!("compartment_ocid is not set; resources will be created with a blank compartment");
        }
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse settings YAML; `origin` names the source in errors.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse {
                path: origin.to_string(),
                source: e,
            })?;
        debug!(origin, "loaded harness settings");
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(c) = raw.compartment_id {
            settings.compartment_id = c;
        }
        let p = raw.provider;
        settings.provider = ProviderSettings {
            tenancy_ocid: p.tenancy_ocid.unwrap_or_default(),
            user_ocid: p.user_ocid.unwrap_or_default(),
            fingerprint: p.fingerprint.unwrap_or_default(),
            private_key_path: p.private_key_path.unwrap_or_default(),
            region: p.region.unwrap_or_default(),
            config_file_profile: p.config_file_profile.filter(|s| !s.is_empty()),
        };

        if let Some(tf) = raw.terraform {
            if let Some(bin) = tf.binary {
                settings.terraform_bin = non_empty("terraform.binary", bin)?;
            }
            if let Some(secs) = tf.timeout_secs {
                if secs == 0 {
                    return Err(ConfigError::InvalidSetting {
                        name: "terraform.timeout_secs".into(),
                        message: "must be greater than zero".into(),
                    });
                }
                settings.command_timeout = Duration::from_secs(secs);
            }
        }
        if let Some(cli) = raw.oci_cli {
            if let Some(bin) = cli.binary {
                settings.oci_bin = non_empty("oci_cli.binary", bin)?;
            }
            settings.oci_profile = cli.profile.filter(|s| !s.is_empty());
        }
        if let Some(rest) = raw.rest {
            settings.rest_endpoint = rest.endpoint.filter(|s| !s.is_empty());
            if let Some(env) = rest.token_env {
                settings.rest_token_env = non_empty("rest.token_env", env)?;
            }
        }
        settings.work_dir = raw.work_dir.map(PathBuf::from);

        Ok(settings)
    }

    /// Override with whatever the environment provides. Blank values never
    /// replace configured ones.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let take = |name: &str, slot: &mut String| {
            let value = env_setting(name, &lookup);
            if !value.is_empty() {
                *slot = value;
            }
        };
        take("compartment_ocid", &mut self.compartment_id);
        take("tenancy_ocid", &mut self.provider.tenancy_ocid);
        take("user_ocid", &mut self.provider.user_ocid);
        take("fingerprint", &mut self.provider.fingerprint);
        take("private_key_path", &mut self.provider.private_key_path);
        take("region", &mut self.provider.region);

        let profile = env_setting("config_file_profile", &lookup);
        if !profile.is_empty() {
            self.provider.config_file_profile = Some(profile);
        }
    }

    /// `terraform` / `provider "oci"` blocks plus the credential variables
    /// they reference. Blank credentials are left out so the provider falls
    /// back to its own config file.
    pub fn provider_fragment(&self) -> Fragment {
        let required = Block::new("terraform", &[]).block(
            Block::new("required_providers", &[])
                .attr("oci", HclValue::map([("source", HclValue::from("oracle/oci"))])),
        );

        let mut vars = Variables::new();
        let mut provider = Block::provider("oci");
        for (name, value) in self.provider.credentials() {
            if value.is_empty() {
                continue;
            }
            vars = vars.set(name, value);
            provider = provider.expr(name, format!("var.{}", name));
        }
        if let Some(profile) = &self.provider.config_file_profile {
            provider = provider.attr("config_file_profile", profile.as_str());
        }

        let text = format!("{}\n{}{}", required.render(), vars.render(), provider.render());
        Fragment::new(PROVIDER_FRAGMENT, text)
    }

    /// `variable "compartment_id" { default = "<compartment>" }`
    pub fn compartment_variable(&self) -> Fragment {
        Variables::new()
            .set("compartment_id", self.compartment_id.as_str())
            .fragment(COMPARTMENT_FRAGMENT)
    }
}

fn non_empty(name: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidSetting {
            name: name.to_string(),
            message: "must not be empty".into(),
        });
    }
    Ok(value)
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

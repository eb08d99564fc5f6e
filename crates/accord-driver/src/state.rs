//! Decoding of `terraform show -json` into a [`StateSnapshot`].

use accord_domain::{flatten, InstanceState, ResourceAddress, ResourceMode, StateSnapshot};
use serde::Deserialize;
use serde_json::Value;

use crate::error::HarnessError;

#[derive(Debug, Deserialize)]
struct ShowOutput {
    /// Absent when the state is empty.
    values: Option<ShowValues>,
}

#[derive(Debug, Deserialize)]
struct ShowValues {
    root_module: ShowModule,
}

#[derive(Debug, Deserialize)]
struct ShowModule {
    address: Option<String>,
    #[serde(default)]
    resources: Vec<ShowResource>,
    #[serde(default)]
    child_modules: Vec<ShowModule>,
}

#[derive(Debug, Deserialize)]
struct ShowResource {
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    values: Value,
}

pub fn parse_show_json(text: &str) -> Result<StateSnapshot, HarnessError> {
    let show: ShowOutput = serde_json::from_str(text.trim())
        .map_err(|e| HarnessError::StateDecode(format!("terraform show -json: {}", e)))?;

    let mut instances = Vec::new();
    if let Some(values) = show.values {
        collect_module(values.root_module, true, &mut instances)?;
    }
    Ok(StateSnapshot::new(instances))
}

fn collect_module(
    module: ShowModule,
    is_root: bool,
    out: &mut Vec<InstanceState>,
) -> Result<(), HarnessError> {
    let module_path = if is_root { None } else { module.address.clone() };

    for res in module.resources {
        let mode = match res.mode.as_str() {
            "managed" => ResourceMode::Managed,
            "data" => ResourceMode::Data,
            other => {
                return Err(HarnessError::StateDecode(format!(
                    "unknown resource mode '{}' for {}.{}",
                    other, res.resource_type, res.name
                )))
            }
        };
        let address = ResourceAddress {
            mode,
            resource_type: res.resource_type,
            name: res.name,
        };
        let id = res
            .values
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut instance = InstanceState::new(address, id);
        instance.module = module_path.clone();
        instance.attributes = flatten(&res.values);
        out.push(instance);
    }

    for child in module.child_modules {
        collect_module(child, false, out)?;
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::DomainError;

// ── Addresses ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    Managed,
    Data,
}

/// `<type>.<name>` for managed resources, `data.<type>.<name>` for data sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceAddress {
    pub mode: ResourceMode,
    pub resource_type: String,
    pub name: String,
}

impl ResourceAddress {
    pub fn managed(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Managed,
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn data(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Data,
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn is_data(&self) -> bool {
        self.mode == ResourceMode::Data
    }
}

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            ResourceMode::Managed => write!(f, "{}.{}", self.resource_type, self.name),
            ResourceMode::Data => write!(f, "data.{}.{}", self.resource_type, self.name),
        }
    }
}

impl FromStr for ResourceAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = match s.strip_prefix("data.") {
            Some(rest) => (ResourceMode::Data, rest),
            None => (ResourceMode::Managed, s),
        };
        let mut parts = rest.splitn(2, '.');
        let resource_type = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if resource_type.is_empty() || name.is_empty() || name.contains('.') {
            return Err(DomainError::InvalidAddress(s.to_string()));
        }
        Ok(Self {
            mode,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
        })
    }
}

// ── State ────────────────────────────────────────────────────────────────────

/// One resource instance as materialized by the orchestration tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    pub address: ResourceAddress,
    /// Child module path (`module.network`), `None` for the root module.
    #[serde(default)]
    pub module: Option<String>,
    /// Primary identifier. Data sources carry whatever id the provider assigned.
    pub id: String,
    /// Flattened attributes (see [`crate::flatmap`]).
    pub attributes: BTreeMap<String, String>,
}

impl InstanceState {
    pub fn new(address: ResourceAddress, id: impl Into<String>) -> Self {
        Self {
            address,
            module: None,
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(path.into(), value.into());
        self
    }

    pub fn attribute(&self, path: &str) -> Option<&str> {
        self.attributes.get(path).map(String::as_str)
    }
}

/// Snapshot of everything the orchestration tool tracks after a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub instances: Vec<InstanceState>,
}

impl StateSnapshot {
    pub fn new(instances: Vec<InstanceState>) -> Self {
        Self { instances }
    }

    /// Root-module instance at `address`.
    pub fn get(&self, address: &ResourceAddress) -> Option<&InstanceState> {
        self.instances
            .iter()
            .find(|i| i.module.is_none() && &i.address == address)
    }

    /// Managed instances of `resource_type` in any module.
    pub fn of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a InstanceState> {
        self.instances.iter().filter(move |i| {
            i.address.mode == ResourceMode::Managed && i.address.resource_type == resource_type
        })
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Provisioning phase reported by the remote control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Provisioning,
    Available,
    Updating,
    Terminating,
    Terminated,
    Other(String),
}

impl LifecycleState {
    /// Default destroy-complete set.
    pub const DELETED: &'static [LifecycleState] = &[LifecycleState::Terminated];

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROVISIONING" => LifecycleState::Provisioning,
            "AVAILABLE" => LifecycleState::Available,
            "UPDATING" => LifecycleState::Updating,
            "TERMINATING" => LifecycleState::Terminating,
            "TERMINATED" => LifecycleState::Terminated,
            _ => LifecycleState::Other(s.trim().to_string()),
        }
    }

    pub fn is_in(&self, set: &[LifecycleState]) -> bool {
        set.contains(self)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Provisioning => write!(f, "PROVISIONING"),
            LifecycleState::Available => write!(f, "AVAILABLE"),
            LifecycleState::Updating => write!(f, "UPDATING"),
            LifecycleState::Terminating => write!(f, "TERMINATING"),
            LifecycleState::Terminated => write!(f, "TERMINATED"),
            LifecycleState::Other(s) => write!(f, "{}", s),
        }
    }
}

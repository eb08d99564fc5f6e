use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DomainError;

// ── Attribute types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
}

impl AttributeType {
    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    pub fn map_of(inner: AttributeType) -> Self {
        AttributeType::Map(Box::new(inner))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Optional in configuration; the provider fills it in when omitted.
    OptionalComputed,
    /// Never set in configuration.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// Changing the value updates the existing remote resource.
    InPlace,
    /// Changing the value destroys the resource and creates a new one.
    ForcesReplacement,
    /// Computed by the remote system.
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub presence: Presence,
    pub mutability: Mutability,
    pub description: Option<String>,
}

impl AttributeSchema {
    /// Optional, updatable in place.
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            presence: Presence::Optional,
            mutability: Mutability::InPlace,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self.mutability = Mutability::ReadOnly;
        self
    }

    pub fn forces_replacement(mut self) -> Self {
        self.mutability = Mutability::ForcesReplacement;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Whether the attribute is always populated once the resource exists.
    pub fn always_set(&self) -> bool {
        matches!(
            self.presence,
            Presence::Required | Presence::Computed | Presence::OptionalComputed
        )
    }
}

// ── Attribute values ─────────────────────────────────────────────────────────

/// A value the test author expects an attribute to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    /// Set, but to a value only known once applied (references, generated names).
    Unknown,
}

impl AttrValue {
    pub fn string(s: impl Into<String>) -> Self {
        AttrValue::String(s.into())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, AttrValue)>) -> Self {
        AttrValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Flatmap rendering of a scalar. `None` for collections and unknowns.
    pub fn flat(&self) -> Option<String> {
        match self {
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Int(i) => Some(i.to_string()),
            AttrValue::String(s) => Some(s.clone()),
            AttrValue::List(_) | AttrValue::Map(_) | AttrValue::Unknown => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Expected values keyed by attribute name.
pub type AttributeValues = BTreeMap<String, AttrValue>;

// ── Resource schema ──────────────────────────────────────────────────────────

/// What applying a new set of values does to an existing remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attributes", rename_all = "snake_case")]
pub enum ChangeKind {
    NoChange,
    InPlace(Vec<String>),
    Replace(Vec<String>),
}

impl ChangeKind {
    pub fn preserves_identity(&self) -> bool {
        !matches!(self, ChangeKind::Replace(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub resource_type: String,
    /// Declaration order is kept so derived assertions read predictably.
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.retain(|a| a.name != schema.name);
        self.attributes.push(schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.attributes
            .iter()
            .filter(|a| a.presence == Presence::Required)
    }

    /// Reject values for attributes the schema does not declare.
    pub fn check_known(&self, values: &AttributeValues) -> Result<(), DomainError> {
        for name in values.keys() {
            if self.get(name).is_none() {
                return Err(DomainError::UnknownAttribute {
                    resource_type: self.resource_type.clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Classify moving a resource from `before` to `after`.
    ///
    /// An attribute present on one side only counts as changed. Attributes
    /// the schema does not know are treated as forcing replacement.
    pub fn classify_change(&self, before: &AttributeValues, after: &AttributeValues) -> ChangeKind {
        let mut in_place = Vec::new();
        let mut replace = Vec::new();

        let mut names: Vec<&String> = before.keys().chain(after.keys()).collect();
        names.sort();
        names.dedup();

        for name in names {
            if before.get(name) == after.get(name) {
                continue;
            }
            match self.get(name).map(|a| a.mutability) {
                Some(Mutability::InPlace) => in_place.push(name.clone()),
                Some(Mutability::ReadOnly) => {}
                Some(Mutability::ForcesReplacement) | None => replace.push(name.clone()),
            }
        }

        if !replace.is_empty() {
            ChangeKind::Replace(replace)
        } else if !in_place.is_empty() {
            ChangeKind::InPlace(in_place)
        } else {
            ChangeKind::NoChange
        }
    }
}

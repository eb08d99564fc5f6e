//! Assertions derived from a resource schema and the values a step configures.

use accord_domain::{AttrValue, AttributeSchema, AttributeType, AttributeValues, ResourceAddress, ResourceSchema};

use crate::assertion::Assertion;

/// Derive the assertions implied by `values` under `schema`.
///
/// For each declared attribute, in declaration order:
/// - a known scalar must equal its value;
/// - a known map or list must have the same number of entries (`.%` / `.#`);
/// - an unknown value must be set;
/// - an attribute with no configured value must be set when the schema says
///   it is always populated (required, computed, optional+computed).
///
/// `prefix` is prepended to every path, e.g. `subnets.0.` for the first entry
/// of a collection read.
pub fn from_schema(
    schema: &ResourceSchema,
    address: &ResourceAddress,
    prefix: &str,
    values: &AttributeValues,
) -> Vec<Assertion> {
    let mut out = Vec::new();
    for attr in &schema.attributes {
        let path = format!("{}{}", prefix, attr.name);
        match values.get(&attr.name) {
            Some(value) => out.push(for_value(address, path, value)),
            None if attr.always_set() => out.push(Assertion::is_set(address, set_path(attr, path))),
            None => {}
        }
    }
    out
}

fn for_value(address: &ResourceAddress, path: String, value: &AttrValue) -> Assertion {
    match value {
        AttrValue::Map(entries) => {
            Assertion::equals(address, format!("{}.%", path), entries.len().to_string())
        }
        AttrValue::List(items) => {
            Assertion::equals(address, format!("{}.#", path), items.len().to_string())
        }
        AttrValue::Unknown => Assertion::is_set(address, path),
        scalar => match scalar.flat() {
            Some(flat) => Assertion::equals(address, path, flat),
            None => Assertion::is_set(address, path),
        },
    }
}

/// Collections are stored as counts plus entries; "set" means the count exists.
fn set_path(attr: &AttributeSchema, path: String) -> String {
    match attr.attr_type {
        AttributeType::List(_) => format!("{}.#", path),
        AttributeType::Map(_) => format!("{}.%", path),
        _ => path,
    }
}

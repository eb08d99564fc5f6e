use accord_check::{expect, Aggregate, Assertion, Check, CheckFailure};
use accord_domain::{
    flatten, AttrValue, AttributeSchema, AttributeType, AttributeValues, InstanceState,
    ResourceAddress, ResourceSchema, StateSnapshot,
};
use serde_json::json;

fn schema() -> ResourceSchema {
    ResourceSchema::new("oci_core_subnet")
        .attribute(AttributeSchema::new("cidr_block", AttributeType::String).required().forces_replacement())
        .attribute(AttributeSchema::new("display_name", AttributeType::String).optional_computed())
        .attribute(AttributeSchema::new("freeform_tags", AttributeType::map_of(AttributeType::String)))
        .attribute(AttributeSchema::new("state", AttributeType::String).computed())
}

fn collection_state(entries: serde_json::Value) -> (ResourceAddress, StateSnapshot) {
    let addr = ResourceAddress::data("oci_core_subnets", "test_subnets");
    let mut instance = InstanceState::new(addr.clone(), "subnets-query");
    instance.attributes = flatten(&json!({ "compartment_id": "ocid1.compartment", "subnets": entries }));
    (addr, StateSnapshot::new(vec![instance]))
}

fn expected() -> AttributeValues {
    [
        ("cidr_block".to_string(), AttrValue::from("10.0.0.0/16")),
        ("display_name".to_string(), AttrValue::from("displayName2")),
        ("freeform_tags".to_string(), AttrValue::map([("Department", AttrValue::from("Accounting"))])),
    ]
    .into_iter()
    .collect()
}

#[test]
fn collection_entry_matches_schema_expectations() {
    let (addr, state) = collection_state(json!([{
        "cidr_block": "10.0.0.0/16",
        "display_name": "displayName2",
        "freeform_tags": { "Department": "Accounting" },
        "state": "AVAILABLE"
    }]));

    let check = Aggregate::new()
        .with(Assertion::equals(&addr, "subnets.#", "1"))
        .with(Assertion::equals(&addr, "compartment_id", "ocid1.compartment"))
        .with_all(expect::from_schema(&schema(), &addr, "subnets.0.", &expected()));

    assert_eq!(check.len(), 6);
    assert!(check.verify(&state).is_ok());
}

#[test]
fn every_drifted_field_is_reported() {
    let (addr, state) = collection_state(json!([{
        "cidr_block": "10.0.0.0/16",
        "display_name": "MySubnet",
        "freeform_tags": {},
        "state": null
    }]));

    let failures = Aggregate::from(expect::from_schema(&schema(), &addr, "subnets.0.", &expected()))
        .evaluate(&state);

    let paths: Vec<&str> = failures
        .iter()
        .map(|f| match f {
            CheckFailure::Mismatch { path, .. } | CheckFailure::NotSet { path, .. } => path.as_str(),
            other => panic!("unexpected failure {other}"),
        })
        .collect();
    assert_eq!(
        paths,
        vec!["subnets.0.display_name", "subnets.0.freeform_tags.%", "subnets.0.state"]
    );
}

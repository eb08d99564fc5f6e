//! The `oci_core_subnet` lifecycle: create, recreate with optionals, update,
//! collection and singular reads, import, destroy.

use accord_check::expect::from_schema;
use accord_check::{Aggregate, Assertion};
use accord_config::{Block, ConfigDocument, ConfigError, Fragment, HarnessSettings, HclValue, Variables};
use accord_domain::{AttrValue, AttributeValues, ResourceAddress};
use accord_runner::{LifecycleCase, Step};
use tracing::debug;

use crate::fragments::{self, DEFINED_TAG_KEY, FIRST_AD_NAME};
use crate::schema::{self, SUBNETS_TYPE, SUBNET_TYPE};

pub const CASE_NAME: &str = "core-subnet";

const RESOURCE: &str = "subnet";
const VARIABLES: &str = "subnet_variables";
const COLLECTION: &str = "subnet_collection_read";
const SINGULAR: &str = "subnet_singular_read";

pub fn target() -> ResourceAddress {
    ResourceAddress::managed(SUBNET_TYPE, "test_subnet")
}

pub fn collection_address() -> ResourceAddress {
    ResourceAddress::data(SUBNETS_TYPE, "test_subnets")
}

pub fn singular_address() -> ResourceAddress {
    ResourceAddress::data(SUBNET_TYPE, "test_subnet")
}

/// Variable defaults configured for the subnet.
#[derive(Debug, Clone)]
pub struct SubnetProperties {
    pub cidr_block: String,
    pub defined_tags_value: String,
    pub display_name: String,
    pub dns_label: String,
    pub department: String,
    pub prohibit_public_ip_on_vnic: bool,
    pub state: String,
}

impl Default for SubnetProperties {
    fn default() -> Self {
        Self {
            cidr_block: "10.0.0.0/16".into(),
            defined_tags_value: "value".into(),
            display_name: "MySubnet".into(),
            dns_label: "dnslabel".into(),
            department: "Finance".into(),
            prohibit_public_ip_on_vnic: false,
            state: "AVAILABLE".into(),
        }
    }
}

impl SubnetProperties {
    /// Every in-place updatable value changed.
    pub fn updated() -> Self {
        Self {
            defined_tags_value: "updatedValue".into(),
            display_name: "displayName2".into(),
            department: "Accounting".into(),
            ..Self::default()
        }
    }

    pub fn variables(&self) -> Variables {
        Variables::new()
            .set("subnet_cidr_block", self.cidr_block.as_str())
            .set("subnet_defined_tags_value", self.defined_tags_value.as_str())
            .set("subnet_display_name", self.display_name.as_str())
            .set("subnet_dns_label", self.dns_label.as_str())
            .set(
                "subnet_freeform_tags",
                HclValue::map([("Department", HclValue::from(self.department.as_str()))]),
            )
            .set("subnet_prohibit_public_ip_on_vnic", self.prohibit_public_ip_on_vnic)
            .set("subnet_security_list_ids", HclValue::List(Vec::new()))
            .set("subnet_state", self.state.as_str())
    }

    /// Values the required-only resource block gives the subnet.
    pub fn required_values(&self, compartment_id: &str) -> AttributeValues {
        [
            ("availability_domain", AttrValue::Unknown),
            ("cidr_block", AttrValue::string(&self.cidr_block)),
            ("compartment_id", AttrValue::string(compartment_id)),
            ("vcn_id", AttrValue::Unknown),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Values the full resource block gives the subnet.
    pub fn full_values(&self, compartment_id: &str) -> AttributeValues {
        let mut values = self.required_values(compartment_id);
        values.extend(
            [
                (
                    "defined_tags",
                    AttrValue::map([(DEFINED_TAG_KEY, AttrValue::string(&self.defined_tags_value))]),
                ),
                ("dhcp_options_id", AttrValue::Unknown),
                ("display_name", AttrValue::string(&self.display_name)),
                ("dns_label", AttrValue::string(&self.dns_label)),
                (
                    "freeform_tags",
                    AttrValue::map([("Department", AttrValue::string(&self.department))]),
                ),
                ("prohibit_public_ip_on_vnic", AttrValue::Bool(self.prohibit_public_ip_on_vnic)),
                ("route_table_id", AttrValue::Unknown),
                ("security_list_ids", AttrValue::List(vec![AttrValue::Unknown])),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v)),
        );
        values
    }
}

fn required_block() -> Block {
    Block::resource(SUBNET_TYPE, "test_subnet")
        .comment("Required")
        .expr("availability_domain", FIRST_AD_NAME)
        .expr("cidr_block", "var.subnet_cidr_block")
        .expr("compartment_id", "var.compartment_id")
        .expr("vcn_id", fragments::VCN_ID)
}

/// Dependencies of the fully configured subnet.
pub fn dependencies() -> Vec<Fragment> {
    vec![
        fragments::availability_domains(),
        fragments::dhcp_options(),
        fragments::route_table(),
        fragments::defined_tags(),
    ]
}

pub fn required_only_resource() -> Fragment {
    Fragment::from_blocks(RESOURCE, &[required_block()])
        .depends_on(&[fragments::availability_domains(), fragments::vcn()])
        .requires(VARIABLES)
}

pub fn full_resource() -> Fragment {
    let block = required_block()
        .blank()
        .comment("Optional")
        .attr(
            "defined_tags",
            HclValue::map([(DEFINED_TAG_KEY, HclValue::expr("var.subnet_defined_tags_value"))]),
        )
        .expr("dhcp_options_id", fragments::DHCP_OPTIONS_ID)
        .expr("display_name", "var.subnet_display_name")
        .expr("dns_label", "var.subnet_dns_label")
        .expr("freeform_tags", "var.subnet_freeform_tags")
        .expr("prohibit_public_ip_on_vnic", "var.subnet_prohibit_public_ip_on_vnic")
        .expr("route_table_id", fragments::ROUTE_TABLE_ID)
        .attr(
            "security_list_ids",
            HclValue::List(vec![HclValue::expr(fragments::VCN_DEFAULT_SECURITY_LIST)]),
        );
    Fragment::from_blocks(RESOURCE, &[block])
        .depends_on(&dependencies())
        .requires(VARIABLES)
}

/// `data "oci_core_subnets"` filtered down to the test subnet's id.
pub fn collection_read() -> Fragment {
    let block = Block::data(SUBNETS_TYPE, "test_subnets")
        .comment("Required")
        .expr("compartment_id", "var.compartment_id")
        .expr("vcn_id", fragments::VCN_ID)
        .blank()
        .comment("Optional")
        .expr("display_name", "var.subnet_display_name")
        .expr("state", "var.subnet_state")
        .blank()
        .block(
            Block::new("filter", &[])
                .attr("name", "id")
                .attr("values", HclValue::List(vec![HclValue::expr("oci_core_subnet.test_subnet.id")])),
        );
    Fragment::from_blocks(COLLECTION, &[block]).requires(RESOURCE)
}

pub fn singular_read() -> Fragment {
    let block = Block::data(SUBNET_TYPE, "test_subnet")
        .comment("Required")
        .expr("subnet_id", "oci_core_subnet.test_subnet.id");
    Fragment::from_blocks(SINGULAR, &[block]).requires(RESOURCE)
}

struct Documents {
    provider: Fragment,
    compartment: Fragment,
}

impl Documents {
    fn build(&self, variables: Option<&Variables>, parts: Vec<Fragment>) -> Result<ConfigDocument, ConfigError> {
        let mut builder = ConfigDocument::builder().with(self.provider.clone());
        if let Some(vars) = variables {
            builder = builder.with(vars.fragment(VARIABLES));
        }
        builder.with(self.compartment.clone()).with_all(parts).build()
    }
}

fn required_only_check(compartment_id: &str, props: &SubnetProperties) -> Aggregate {
    let t = target();
    Aggregate::new().with_all(vec![
        Assertion::is_set(&t, "availability_domain"),
        Assertion::equals(&t, "cidr_block", props.cidr_block.as_str()),
        Assertion::equals(&t, "compartment_id", compartment_id),
        Assertion::is_set(&t, "dhcp_options_id"),
        Assertion::is_set(&t, "route_table_id"),
        Assertion::is_set(&t, "vcn_id"),
    ])
}

fn collection_check(compartment_id: &str, props: &SubnetProperties, values: &AttributeValues) -> Aggregate {
    let ds = collection_address();
    Aggregate::new()
        .with_all(vec![
            Assertion::equals(&ds, "compartment_id", compartment_id),
            Assertion::equals(&ds, "display_name", props.display_name.as_str()),
            Assertion::equals(&ds, "state", props.state.as_str()),
            Assertion::is_set(&ds, "vcn_id"),
            Assertion::equals(&ds, "subnets.#", "1"),
        ])
        .with_all(from_schema(&schema::subnet(), &ds, "subnets.0.", values))
}

fn singular_check(values: &AttributeValues) -> Aggregate {
    let mut values = values.clone();
    values.insert("subnet_id".into(), AttrValue::Unknown);
    Aggregate::new().with_all(from_schema(&schema::singular_subnet(), &singular_address(), "", &values))
}

/// Build the subnet lifecycle case for the given settings.
pub fn subnet_case(settings: &HarnessSettings) -> Result<LifecycleCase, ConfigError> {
    let compartment_id = settings.compartment_id.as_str();
    let docs = Documents {
        provider: settings.provider_fragment(),
        compartment: settings.compartment_variable(),
    };

    let initial = SubnetProperties::default();
    let updated = SubnetProperties::updated();
    let initial_vars = initial.variables();
    let updated_vars = updated.variables();
    let read_vars = updated_vars.clone().set("subnet_availability_domain", "crmS:PHX-AD-1");

    let initial_values = initial.full_values(compartment_id);
    let updated_values = updated.full_values(compartment_id);
    let target = target();
    let schema = schema::subnet();

    let case = LifecycleCase::new(CASE_NAME, target.clone(), schema.clone())
        .step(
            Step::apply(
                "create with required attributes",
                docs.build(Some(&initial_vars), vec![required_only_resource()])?,
            )
            .with_values(initial.required_values(compartment_id))
            .with_check(required_only_check(compartment_id, &initial)),
        )
        .step(Step::apply(
            "delete before next create",
            docs.build(None, dependencies())?,
        ))
        .step(
            Step::apply(
                "create with optionals",
                docs.build(Some(&initial_vars), vec![full_resource()])?,
            )
            .with_check(Aggregate::new().with_all(from_schema(&schema, &target, "", &initial_values)))
            .with_values(initial_values),
        )
        .step(
            Step::apply(
                "update updatable attributes",
                docs.build(Some(&updated_vars), vec![full_resource()])?,
            )
            .with_check(Aggregate::new().with_all(from_schema(&schema, &target, "", &updated_values)))
            .with_values(updated_values.clone()),
        )
        .step(
            Step::apply(
                "read collection filtered by id",
                docs.build(Some(&updated_vars), vec![full_resource(), collection_read()])?,
            )
            .with_check(collection_check(compartment_id, &updated, &updated_values))
            .with_values(updated_values.clone()),
        )
        .step(
            Step::apply(
                "read single subnet by id",
                docs.build(Some(&read_vars), vec![full_resource(), singular_read()])?,
            )
            .with_check(singular_check(&updated_values))
            .with_values(updated_values.clone()),
        )
        .step(
            Step::apply(
                "remove singular read before import",
                docs.build(Some(&read_vars), vec![full_resource()])?,
            )
            .with_values(updated_values),
        )
        .step(Step::import(
            "import by id",
            docs.build(Some(&read_vars), vec![full_resource()])?,
            &[],
        ));

    debug!(case = CASE_NAME, steps = case.steps.len(), "built lifecycle case");
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_domain::ChangeKind;

    fn settings() -> HarnessSettings {
        HarnessSettings {
            compartment_id: "ocid1.compartment.oc1..test".into(),
            ..HarnessSettings::default()
        }
    }

    #[test]
    fn update_only_touches_in_place_attributes() {
        let c = "ocid1.compartment.oc1..test";
        let change = schema::subnet().classify_change(
            &SubnetProperties::default().full_values(c),
            &SubnetProperties::updated().full_values(c),
        );
        assert_eq!(
            change,
            ChangeKind::InPlace(vec![
                "defined_tags".into(),
                "display_name".into(),
                "freeform_tags".into()
            ])
        );
    }

    #[test]
    fn variables_render_like_hand_written_defaults() {
        let text = SubnetProperties::default().variables().render();
        assert!(text.contains("variable \"subnet_freeform_tags\" { default = { \"Department\" = \"Finance\" } }\n"));
        assert!(text.contains("variable \"subnet_prohibit_public_ip_on_vnic\" { default = false }\n"));
        assert!(text.contains("variable \"subnet_security_list_ids\" { default = [] }\n"));
    }

    #[test]
    fn full_resource_uses_templated_tag_key() {
        let text = full_resource().text().to_string();
        assert!(text.contains(
            "defined_tags = { \"${oci_identity_tag_namespace.tag-namespace1.name}.${oci_identity_tag.tag1.name}\" = var.subnet_defined_tags_value }"
        ));
        assert!(text.contains("security_list_ids = [oci_core_vcn.test_vcn.default_security_list_id]"));
    }

    #[test]
    fn case_has_eight_steps_ending_in_import() {
        let case = subnet_case(&settings()).unwrap();
        assert_eq!(case.steps.len(), 8);
        assert_eq!(case.steps[7].kind_name(), "import");
        assert!(case.steps[..7].iter().all(|s| s.kind_name() == "apply"));
        assert!(case.steps[1].target_values.is_none());
    }

    #[test]
    fn declared_values_only_name_schema_attributes() {
        let case = subnet_case(&settings()).unwrap();
        assert!(case.validate().is_ok());
    }

    #[test]
    fn dependency_only_step_has_no_subnet() {
        let case = subnet_case(&settings()).unwrap();
        let doc = &case.steps[1].config;
        assert!(!doc.contains(RESOURCE));
        assert!(!doc.contains(VARIABLES));
        assert!(doc.contains(fragments::ROUTE_TABLE));
        assert!(doc.contains(fragments::DHCP_OPTIONS));
    }
}

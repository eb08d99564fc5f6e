//! Attribute schemas for `oci_core_subnet` and its data sources.

use accord_domain::{AttributeSchema, AttributeType, ResourceSchema};

pub const SUBNET_TYPE: &str = "oci_core_subnet";
pub const SUBNETS_TYPE: &str = "oci_core_subnets";

fn string(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String)
}

fn string_map(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::map_of(AttributeType::String))
}

/// `oci_core_subnet` managed resource.
pub fn subnet() -> ResourceSchema {
    ResourceSchema::new(SUBNET_TYPE)
        .attribute(string("availability_domain").required().forces_replacement())
        .attribute(string("cidr_block").required().forces_replacement())
        .attribute(string("compartment_id").required().forces_replacement())
        .attribute(string_map("defined_tags"))
        .attribute(string("dhcp_options_id").optional_computed())
        .attribute(string("display_name").optional_computed())
        .attribute(
            string("dns_label")
                .forces_replacement()
                .with_description("Only set when the VCN also has a DNS label"),
        )
        .attribute(string_map("freeform_tags"))
        .attribute(string("id").computed())
        .attribute(
            AttributeSchema::new("prohibit_public_ip_on_vnic", AttributeType::Bool)
                .optional_computed()
                .forces_replacement(),
        )
        .attribute(string("route_table_id").optional_computed())
        .attribute(
            AttributeSchema::new("security_list_ids", AttributeType::list_of(AttributeType::String))
                .optional_computed(),
        )
        .attribute(string("state").computed())
        .attribute(string("subnet_domain_name").computed())
        .attribute(string("time_created").computed())
        .attribute(string("vcn_id").required().forces_replacement())
        .attribute(string("virtual_router_ip").computed())
        .attribute(string("virtual_router_mac").computed())
}

/// `data "oci_core_subnet"`: the resource's attributes plus the lookup key.
pub fn singular_subnet() -> ResourceSchema {
    subnet().attribute(string("subnet_id").required())
}

/// Filter arguments of `data "oci_core_subnets"`; entries use [`subnet`].
pub fn subnets() -> ResourceSchema {
    ResourceSchema::new(SUBNETS_TYPE)
        .attribute(string("compartment_id").required())
        .attribute(string("vcn_id").required())
        .attribute(string("display_name"))
        .attribute(string("state"))
}

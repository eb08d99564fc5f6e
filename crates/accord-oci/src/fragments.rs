//! Shared dependency fragments for networking resources.
//!
//! Each function returns a self-contained [`Fragment`] carrying the fragments
//! it references, so a document only has to name what it uses directly.
//! Every fragment expects a `compartment_id` variable from the document.

use accord_config::settings::COMPARTMENT_FRAGMENT;
use accord_config::{Block, Fragment, HclValue, Variables};

pub const AVAILABILITY_DOMAINS: &str = "availability_domains";
pub const VCN: &str = "vcn";
pub const DHCP_OPTIONS: &str = "dhcp_options";
pub const INTERNET_GATEWAY: &str = "internet_gateway";
pub const ROUTE_TABLE: &str = "route_table";
pub const DEFINED_TAGS: &str = "defined_tags";

/// Expression for the first availability domain's name.
pub const FIRST_AD_NAME: &str =
    "lookup(data.oci_identity_availability_domains.test_availability_domains.availability_domains[0], \"name\")";
pub const VCN_ID: &str = "oci_core_vcn.test_vcn.id";
pub const VCN_DEFAULT_SECURITY_LIST: &str = "oci_core_vcn.test_vcn.default_security_list_id";
pub const DHCP_OPTIONS_ID: &str = "oci_core_dhcp_options.test_dhcp_options.id";
pub const ROUTE_TABLE_ID: &str = "oci_core_route_table.test_route_table.id";
/// Template naming the test tag as `<namespace>.<tag>`.
pub const DEFINED_TAG_KEY: &str =
    "${oci_identity_tag_namespace.tag-namespace1.name}.${oci_identity_tag.tag1.name}";

fn compartment(block: Block) -> Block {
    block.expr("compartment_id", "var.compartment_id")
}

pub fn availability_domains() -> Fragment {
    let block = compartment(Block::data("oci_identity_availability_domains", "test_availability_domains"));
    Fragment::from_blocks(AVAILABILITY_DOMAINS, &[block]).requires(COMPARTMENT_FRAGMENT)
}

/// Required-only VCN with a DNS label, so subnets can carry one too.
pub fn vcn() -> Fragment {
    let vars = Variables::new()
        .set("vcn_cidr_block", "10.0.0.0/16")
        .set("vcn_display_name", "displayName")
        .set("vcn_dns_label", "dnslabel");
    let block = compartment(Block::resource("oci_core_vcn", "test_vcn").comment("Required"))
        .expr("cidr_block", "var.vcn_cidr_block")
        .blank()
        .comment("Optional")
        .expr("display_name", "var.vcn_display_name")
        .expr("dns_label", "var.vcn_dns_label");

    let mut blocks = vars.blocks();
    blocks.push(block);
    Fragment::from_blocks(VCN, &blocks).requires(COMPARTMENT_FRAGMENT)
}

pub fn dhcp_options() -> Fragment {
    let block = compartment(Block::resource("oci_core_dhcp_options", "test_dhcp_options").comment("Required"))
        .expr("vcn_id", VCN_ID)
        .block(
            Block::new("options", &[])
                .attr("type", "DomainNameServer")
                .attr("server_type", "VcnLocalPlusInternet"),
        )
        .block(
            Block::new("options", &[])
                .attr("type", "SearchDomain")
                .attr("search_domain_names", HclValue::List(vec!["test.com".into()])),
        )
        .blank()
        .comment("Optional")
        .attr("display_name", "MyDhcpOptions");
    Fragment::from_blocks(DHCP_OPTIONS, &[block]).depends_on(&[vcn()])
}

pub fn internet_gateway() -> Fragment {
    let block = compartment(Block::resource("oci_core_internet_gateway", "test_internet_gateway"))
        .expr("vcn_id", VCN_ID)
        .attr("display_name", "-tf-internet-gateway");
    Fragment::from_blocks(INTERNET_GATEWAY, &[block]).depends_on(&[vcn()])
}

/// Route table sending everything through the internet gateway.
pub fn route_table() -> Fragment {
    let vars = Variables::new().set("route_table_display_name", "MyRouteTable");
    let block = compartment(Block::resource("oci_core_route_table", "test_route_table").comment("Required"))
        .expr("vcn_id", VCN_ID)
        .block(
            Block::new("route_rules", &[])
                .attr("cidr_block", "0.0.0.0/0")
                .expr("network_entity_id", "oci_core_internet_gateway.test_internet_gateway.id"),
        )
        .blank()
        .comment("Optional")
        .expr("display_name", "var.route_table_display_name");

    let mut blocks = vars.blocks();
    blocks.push(block);
    Fragment::from_blocks(ROUTE_TABLE, &blocks).depends_on(&[internet_gateway()])
}

/// Tag namespace and tag used for `defined_tags`.
pub fn defined_tags() -> Fragment {
    let namespace = compartment(Block::resource("oci_identity_tag_namespace", "tag-namespace1"))
        .attr("description", "Just a test")
        .attr("name", "testexamples-tag-namespace");
    let tag = Block::resource("oci_identity_tag", "tag1")
        .attr("description", "tf example tag")
        .attr("name", "tf-example-tag")
        .expr("tag_namespace_id", "oci_identity_tag_namespace.tag-namespace1.id");
    Fragment::from_blocks(DEFINED_TAGS, &[namespace, tag]).requires(COMPARTMENT_FRAGMENT)
}

//! Oracle Cloud Infrastructure cases for the accord harness.

pub mod cli_client;
pub mod fragments;
pub mod registry;
pub mod schema;
pub mod subnet;

pub use cli_client::{CliResource, OciCliClient};
pub use registry::{find, CaseEntry, CASES};
pub use subnet::subnet_case;

pub mod error;
pub mod harness;
pub mod process;
pub mod remote;
pub mod rest;
pub mod state;
pub mod terraform;

pub use error::{HarnessError, RemoteError};
pub use harness::Harness;
pub use process::{ProcessOutput, ProcessRunner};
pub use remote::{RemoteClient, StaticToken, TokenProvider};
pub use rest::{RestClient, RestClientConfig};
pub use state::parse_show_json;
pub use terraform::{TerraformHarness, TerraformOptions};

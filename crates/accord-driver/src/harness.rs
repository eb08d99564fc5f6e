use accord_config::ConfigDocument;
use accord_domain::{ResourceAddress, StateSnapshot};
use async_trait::async_trait;

use crate::error::HarnessError;

/// The orchestration tool under test, seen as a black box that converges
/// real infrastructure to a configuration document.
#[async_trait]
pub trait Harness: Send + Sync {
    fn name(&self) -> &'static str;

    /// Converge to `doc` and return everything the tool now tracks.
    async fn apply(&self, doc: &ConfigDocument) -> Result<StateSnapshot, HarnessError>;

    /// Bring the existing remote object `id` under management at `address`
    /// without creating anything. `doc` must declare `address`. The run's own
    /// state is left untouched; the returned snapshot holds the imported view.
    async fn import(
        &self,
        doc: &ConfigDocument,
        address: &ResourceAddress,
        id: &str,
    ) -> Result<StateSnapshot, HarnessError>;

    /// Destroy everything declared by `doc`.
    async fn destroy(&self, doc: &ConfigDocument) -> Result<(), HarnessError>;
}

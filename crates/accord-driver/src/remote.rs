use accord_domain::LifecycleState;
use async_trait::async_trait;

use crate::error::RemoteError;

/// Read-only access to the remote control plane, used to confirm that
/// destroyed resources are really gone.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_lifecycle_state(&self, id: &str) -> Result<LifecycleState, RemoteError>;
}

/// Source of bearer tokens for HTTP clients.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, RemoteError>;
}

/// Fixed token, typically read once from the environment.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, RemoteError> {
        Ok(self.0.clone())
    }
}

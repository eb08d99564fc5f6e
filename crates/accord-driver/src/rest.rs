use accord_domain::LifecycleState;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::RemoteError;
use crate::remote::{RemoteClient, TokenProvider};

#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Scheme and host, no trailing slash (`https://iaas.us-phoenix-1.oraclecloud.com`).
    pub base_url: String,
    /// Path with an `{id}` placeholder (`/20160918/subnets/{id}`).
    pub path_template: String,
    /// JSON pointer to the lifecycle field in a success body.
    pub state_pointer: String,
}

impl RestClientConfig {
    pub fn new(base_url: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path_template: path_template.into(),
            state_pointer: "/lifecycleState".into(),
        }
    }

    pub fn with_state_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.state_pointer = pointer.into();
        self
    }

    fn url(&self, id: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.path_template.replace("{id}", id)
        )
    }
}

/// [`RemoteClient`] over a plain JSON GET endpoint with bearer auth.
pub struct RestClient {
    config: RestClientConfig,
    client: reqwest::Client,
    token: Box<dyn TokenProvider>,
}

impl RestClient {
    pub fn new(config: RestClientConfig, token: Box<dyn TokenProvider>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            token,
        }
    }

    /// `code` and `message` from an error body; OCI style (`{"code","message"}`)
    /// and envelope style (`{"error":{"code","message"}}`) are both accepted.
    fn extract_error(body: &Value) -> (String, String) {
        let inner = body.get("error").filter(|e| e.is_object()).unwrap_or(body);
        let code = match inner.get("code") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "Unknown".to_string(),
        };
        let message = inner
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        (code, message)
    }
}

#[async_trait]
impl RemoteClient for RestClient {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn get_lifecycle_state(&self, id: &str) -> Result<LifecycleState, RemoteError> {
        let token = self.token.token().await?;
        let url = self.config.url(id);
        debug!(%url, "fetching lifecycle state");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or_default();
            let (code, message) = Self::extract_error(&body);
            return Err(RemoteError::Service {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let state = body
            .pointer(&self.config.state_pointer)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RemoteError::Decode(format!(
                    "no string at '{}' in response from {}",
                    self.config.state_pointer, url
                ))
            })?;
        Ok(LifecycleState::parse(state))
    }
}

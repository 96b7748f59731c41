use mocking_api::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::client::ApiClient;
use crate::session::Session;
use crate::token_store::TokenStore;
use crate::transport::{ReqwestTransport, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Connection settings for the MockingCode API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Open the session over `store` and build a client over HTTP.
    pub async fn connect(&self, store: Arc<dyn TokenStore>) -> Result<ApiClient> {
        let transport = ReqwestTransport::new(&self.api_url, self.timeout)?;
        let session = Session::open(store).await?;
        Ok(ApiClient::new(Arc::new(transport), Arc::new(session)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;

    #[tokio::test]
    async fn test_connect_uses_configured_url() {
        let config = ClientConfig::new("http://api.example.test/");
        let client = config
            .connect(Arc::new(MemoryTokenStore::with_token("t")))
            .await
            .unwrap();
        assert_eq!(client.base_url(), "http://api.example.test");
        assert!(client.session().is_authenticated().await);
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ConnectionState;
use crate::config::ConnectionConfig;
use crate::Result;

/// Decides whether the machine is currently online
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> ConnectionState;
}

/// Probe that GETs a URL; any successful response means connected
pub struct HttpProbe {
    client: Client,
    url: Url,
}

impl HttpProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("morph/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let url = Url::parse(&config.probe_url)?;
        Self::new(url, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> ConnectionState {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) if response.status().is_success() => ConnectionState::Connected,
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %self.url, "probe returned non-success status");
                ConnectionState::Disconnected
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %self.url, "probe request failed");
                ConnectionState::Disconnected
            }
        }
    }
}

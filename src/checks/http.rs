// src/checks/http.rs
use crate::check::Check;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// HTTP reachability probe: any 2xx response counts as up. The runner's
/// deadline is the effective bound; the client timeout is just a backstop
/// for when the check is registered without one.
pub struct HttpCheck {
    client: Client,
    url: Url,
}

impl HttpCheck {
    pub fn new(url: Url) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create HTTP client");
        Self { client, url }
    }

    /// Use a preconfigured client, e.g. to share connection pools or set
    /// custom TLS options.
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Check for HttpCheck {
    async fn check(&self) -> Result<()> {
        let response = self.client.get(self.url.as_str()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow!("HTTP {}", status))
        }
    }
}

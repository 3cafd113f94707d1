//! Gotify channel

use super::{check_response, transport_error};
use async_trait::async_trait;
use ddns_core::Result;
use ddns_core::traits::Notifier;
use reqwest::Client;
use tracing::instrument;

/// Sends each message to a Gotify server as an application
pub struct Gotify {
    client: Client,
    /// `<base>/message`
    url: String,
    api_token: String,
}

impl std::fmt::Debug for Gotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gotify")
            .field("url", &self.url)
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl Gotify {
    /// `server` is "host[:port]" (plain HTTP) or a full base URL
    pub fn new(client: Client, server: &str, api_token: impl Into<String>) -> Self {
        let server = server.trim_end_matches('/');
        let base = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };

        Self {
            client,
            url: format!("{}/message", base),
            api_token: api_token.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for Gotify {
    #[instrument(skip(self, text))]
    async fn deliver(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("token", self.api_token.as_str())])
            .form(&[("message", text)])
            .send()
            .await
            .map_err(|e| transport_error("gotify", e))?;

        check_response("gotify", response, "error").await
    }

    fn name(&self) -> &'static str {
        "gotify"
    }
}

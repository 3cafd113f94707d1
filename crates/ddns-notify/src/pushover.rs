//! Pushover channel

use super::{check_response, transport_error};
use async_trait::async_trait;
use ddns_core::Result;
use ddns_core::traits::Notifier;
use reqwest::Client;
use tracing::instrument;

/// Pushover messages API
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Sends each message to one Pushover user
pub struct Pushover {
    client: Client,
    url: String,
    api_token: String,
    user_key: String,
}

impl std::fmt::Debug for Pushover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pushover")
            .field("url", &self.url)
            .field("api_token", &"<REDACTED>")
            .field("user_key", &"<REDACTED>")
            .finish()
    }
}

impl Pushover {
    pub fn new(client: Client, api_token: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            client,
            url: PUSHOVER_API_URL.to_string(),
            api_token: api_token.into(),
            user_key: user_key.into(),
        }
    }

    /// Post to a different messages URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Notifier for Pushover {
    #[instrument(skip(self, text))]
    async fn deliver(&self, text: &str) -> Result<()> {
        let form = [
            ("token", self.api_token.as_str()),
            ("user", self.user_key.as_str()),
            ("message", text),
        ];
        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error("pushover", e))?;

        check_response("pushover", response, "errors").await
    }

    fn name(&self) -> &'static str {
        "pushover"
    }
}

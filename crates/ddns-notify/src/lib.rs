// # Notification Channels
//
// Concrete `Notifier` implementations for change notifications.
//
// - **Pushover**: form POST to the Pushover messages API
// - **Gotify**: form POST to a self-hosted Gotify server
//
// Both channels share one HTTP client. A delivery that fails in transport,
// answers with an error status, or carries an error marker in its body is
// returned as `Error::Notification`; `NotificationDispatcher` logs it and
// moves on to the next channel.

mod gotify;
mod pushover;

pub use gotify::Gotify;
pub use pushover::Pushover;

use ddns_core::config::NotifiersConfig;
use ddns_core::traits::Notifier;
use ddns_core::{Error, NotificationDispatcher, Result};
use std::time::Duration;
use tracing::info;

/// Build the configured channels, in a fixed order: Pushover, then Gotify
pub fn from_config(config: &NotifiersConfig) -> Result<Vec<Box<dyn Notifier>>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    if config.is_empty() {
        return Ok(notifiers);
    }

    let client = client(Duration::from_secs(config.timeout_secs))?;

    if let Some(pushover) = &config.pushover {
        notifiers.push(Box::new(Pushover::new(
            client.clone(),
            &pushover.api_token,
            &pushover.user_key,
        )));
    }
    if let Some(gotify) = &config.gotify {
        notifiers.push(Box::new(Gotify::new(
            client.clone(),
            &gotify.url,
            &gotify.api_token,
        )));
    }

    Ok(notifiers)
}

/// A dispatcher over every configured channel
pub fn dispatcher_from_config(config: &NotifiersConfig) -> Result<NotificationDispatcher> {
    let dispatcher = NotificationDispatcher::new(from_config(config)?);
    if dispatcher.is_empty() {
        info!("No notification channels configured");
    } else {
        info!("Notifications enabled: {}", dispatcher.channel_names().join(", "));
    }
    Ok(dispatcher)
}

fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a response into a delivery outcome
///
/// `marker` is the substring the service puts into error bodies.
async fn check_response(channel: &str, response: reqwest::Response, marker: &str) -> Result<()> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::notification(format!("{}: failed to read response: {}", channel, e)))?;
    tracing::debug!("{} notification response: {}", channel, body);

    if !status.is_success() || body.contains(marker) {
        return Err(Error::notification(format!(
            "{} answered {}: {}",
            channel, status, body
        )));
    }
    Ok(())
}

fn transport_error(channel: &str, error: reqwest::Error) -> Error {
    // reqwest includes the URL in its messages, which carries the Gotify token
    let error = error.without_url();
    if error.is_timeout() {
        Error::notification(format!("{}: request timed out", channel))
    } else {
        Error::notification(format!("{}: request failed: {}", channel, error))
    }
}

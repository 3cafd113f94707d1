// # Notifier Trait
//
// Defines a notification channel: something that can deliver a text message.
//
// ## Implementations
//
// - Pushover, Gotify: `ddns-notify` crate

use async_trait::async_trait;

/// A notification channel
///
/// Delivery is best-effort. An `Err` is logged by the
/// [`NotificationDispatcher`](crate::NotificationDispatcher) and never reaches
/// the engine.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a text message
    async fn deliver(&self, text: &str) -> Result<(), crate::Error>;

    /// Channel name (for logging)
    fn name(&self) -> &'static str;
}

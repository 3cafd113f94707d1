//! Fan-out of change notifications to every configured channel

use crate::traits::Notifier;
use std::error::Error as StdError;
use tracing::{debug, error};

/// Broadcasts messages to a list of notifiers
///
/// Delivery is attempted on every channel in configured order. A failing
/// channel is logged and skipped; `notify` itself cannot fail.
#[derive(Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Dispatcher without channels
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Names of the configured channels, in order
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Send a message to every channel and return how many accepted it
    pub async fn notify(&self, message: &str) -> usize {
        let mut delivered = 0;
        for notifier in &self.notifiers {
            match notifier.deliver(message).await {
                Ok(()) => {
                    delivered += 1;
                    debug!(channel = %notifier.name(), "successfully dispatched notification");
                }
                Err(e) => match e.source() {
                    Some(s) => {
                        error!(channel = %notifier.name(), error = %e, source = %s, "failed to dispatch notification")
                    }
                    None => {
                        error!(channel = %notifier.name(), error = %e, "failed to dispatch notification")
                    }
                },
            }
        }
        delivered
    }
}

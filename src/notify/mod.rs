//! Outbound notifications.
//!
//! Delivery is best-effort: [`send_message`] logs the outcome and never
//! hands an error back to the caller.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::PollError;

pub mod telegram;

/// A channel that accepts plain text messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn channel_name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), PollError>;
}

/// Try to deliver `text` once. Returns whether it went through.
pub async fn send_message(notifier: &dyn Notifier, text: &str) -> bool {
    debug!(channel = notifier.channel_name(), "Sending message");
    match notifier.send(text).await {
        Ok(()) => {
            debug!(channel = notifier.channel_name(), "Message delivered: {}", text);
            true
        }
        Err(e) => {
            error!(channel = notifier.channel_name(), "Message delivery failed: {}", e);
            false
        }
    }
}

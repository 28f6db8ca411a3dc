//! Error types for the notification service.

use thiserror::Error;

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The webhook request could not be sent.
    #[error("Webhook request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The webhook endpoint rejected the notification.
    #[error("Webhook request failed with status: {0}")]
    NotifyFailed(String),
}

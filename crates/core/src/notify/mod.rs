//! Account notifications.
//!
//! Delivery is a side effect of registration, never part of it: callers log
//! a [`NotifyError`] and carry on.

use async_trait::async_trait;
use tally_shared::types::UserId;
use thiserror::Error;
use tracing::info;

/// A welcome message for a newly registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    /// Recipient user ID.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Recipient address.
    pub email: String,
}

impl Welcome {
    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &'static str {
        "Welcome to Tally!"
    }

    /// Plain-text body.
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Hi {}, thank you for registering. Start tracking your expenses today!",
            self.username
        )
    }
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The message could not be delivered.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Delivers account notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends the welcome message.
    async fn welcome(&self, message: &Welcome) -> Result<(), NotifyError>;
}

/// Notifier that writes messages to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn welcome(&self, message: &Welcome) -> Result<(), NotifyError> {
        info!(
            user_id = %message.user_id,
            email = %message.email,
            subject = message.subject(),
            "Welcome notification"
        );
        Ok(())
    }
}

//! User-visible notifications (toasts).
//!
//! DESIGN
//! ======
//! The store never talks to a sink directly. `LeadSession` observes the
//! event produced by a state transition and publishes the matching
//! `Notification` afterwards. Sinks are fire-and-forget: nothing they do
//! can fail the operation that triggered them.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Machine-readable error classification carried into destructive notifications.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: Variant,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), variant: Variant::Default }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), variant: Variant::Destructive }
    }

    /// Destructive notification describing `err`, suffixed with its code.
    pub fn error_from(title: impl Into<String>, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::destructive(title, format!("{err} ({})", err.error_code()))
    }
}

// =============================================================================
// SINKS
// =============================================================================

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes every notification to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            Variant::Default => info!(title = %notification.title, description = %notification.description, "notification"),
            Variant::Destructive => {
                warn!(title = %notification.title, description = %notification.description, "notification");
            }
        }
    }
}

/// Forwards notifications to a presentation task over a bounded channel.
///
/// Uses `try_send` so state mutators never wait on the UI.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Notification>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }

    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(n)) => {
                warn!(title = %n.title, "notification queue full; dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                warn!(title = %n.title, "notification queue closed; dropping notification");
            }
        }
    }
}

/// Keeps every notification in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    items: Mutex<Vec<Notification>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|n| n.title).collect()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;

//! Transient notifications shown to the shopper.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

/// Kind of notification, which decides how it is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sink for shopper notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::new(NotificationKind::Success, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::new(NotificationKind::Error, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notification::new(NotificationKind::Warning, message));
    }

    fn info(&self, message: &str) {
        self.notify(Notification::new(NotificationKind::Info, message));
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error | NotificationKind::Warning => {
                warn!(kind = %notification.kind, "{}", notification.message);
            }
            NotificationKind::Success | NotificationKind::Info => {
                info!(kind = %notification.kind, "{}", notification.message);
            }
        }
    }
}

/// Keeps every notification in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.notifications
            .lock()
            .ok()
            .and_then(|n| n.last().cloned())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("Product added to cart!");
        notifier.error("Failed to place order. Please try again.");

        let kinds: Vec<NotificationKind> =
            notifier.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
        assert_eq!(
            notifier.last().unwrap().message,
            "Failed to place order. Please try again."
        );
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&Notification::new(NotificationKind::Warning, "x")).unwrap();
        assert_eq!(json, r#"{"kind":"warning","message":"x"}"#);
    }
}

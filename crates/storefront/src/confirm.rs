//! Confirmation dialogs.
//!
//! A destructive action asks the shopper first and waits for the answer.
//! [`ConfirmationChannel`] carries each request, with a one-shot reply handle,
//! to whatever front end owns the dialog; the caller awaits the decision.
//! A request whose reply handle is dropped unanswered counts as cancelled.

use std::future::Future;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Visual style of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// What to ask the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub kind: Option<DialogKind>,
    pub confirm_text: String,
    pub cancel_text: String,
}

impl ConfirmRequest {
    /// A neutral dialog with "Confirm" / "Cancel" buttons.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Confirmation".to_string(),
            message: message.into(),
            kind: None,
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: DialogKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    #[must_use]
    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }
}

/// Asks the shopper to confirm an action.
pub trait Confirm: Send + Sync {
    /// `true` if the shopper confirmed, `false` if they cancelled.
    fn confirm(&self, request: ConfirmRequest) -> impl Future<Output = bool> + Send;
}

/// Answers every request the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        debug!(title = %request.title, answer = self.0, "Auto-answered confirmation");
        self.0
    }
}

/// A dialog waiting for an answer.
#[derive(Debug)]
pub struct PendingConfirmation {
    request: ConfirmRequest,
    reply: oneshot::Sender<bool>,
}

impl PendingConfirmation {
    #[must_use]
    pub const fn request(&self) -> &ConfirmRequest {
        &self.request
    }

    /// Send the shopper's decision.
    pub fn respond(self, confirmed: bool) {
        // The asker may have given up; nothing to do then
        let _ = self.reply.send(confirmed);
    }

    pub fn accept(self) {
        self.respond(true);
    }

    pub fn decline(self) {
        self.respond(false);
    }
}

/// Sending half: implements [`Confirm`] by forwarding to the front end.
#[derive(Debug, Clone)]
pub struct ConfirmationChannel {
    tx: mpsc::Sender<PendingConfirmation>,
}

/// Receiving half, owned by the front end.
#[derive(Debug)]
pub struct ConfirmationReceiver {
    rx: mpsc::Receiver<PendingConfirmation>,
}

impl ConfirmationChannel {
    /// Create a channel holding up to `buffer` unanswered dialogs.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, ConfirmationReceiver) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, ConfirmationReceiver { rx })
    }
}

impl Confirm for ConfirmationChannel {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let (reply, answer) = oneshot::channel();
        if self
            .tx
            .send(PendingConfirmation { request, reply })
            .await
            .is_err()
        {
            warn!("No confirmation handler, treating as cancelled");
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

impl ConfirmationReceiver {
    /// Wait for the next dialog. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<PendingConfirmation> {
        self.rx.recv().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = ConfirmRequest::new("Proceed?");
        assert_eq!(request.title, "Confirmation");
        assert_eq!(request.confirm_text, "Confirm");
        assert_eq!(request.cancel_text, "Cancel");
        assert!(request.kind.is_none());
    }

    #[tokio::test]
    async fn test_channel_roundtrip() {
        let (channel, mut receiver) = ConfirmationChannel::new(1);

        let responder = tokio::spawn(async move {
            let first = receiver.recv().await.unwrap();
            assert_eq!(first.request().title, "Clear Cart");
            first.accept();

            let second = receiver.recv().await.unwrap();
            second.decline();
        });

        let request = ConfirmRequest::new("Sure?")
            .title("Clear Cart")
            .kind(DialogKind::Danger);
        assert!(channel.confirm(request).await);
        assert!(!channel.confirm(ConfirmRequest::new("Again?")).await);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_cancel() {
        let (channel, mut receiver) = ConfirmationChannel::new(1);
        let responder = tokio::spawn(async move {
            drop(receiver.recv().await.unwrap());
        });

        assert!(!channel.confirm(ConfirmRequest::new("Sure?")).await);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_receiver_is_cancel() {
        let (channel, receiver) = ConfirmationChannel::new(1);
        drop(receiver);
        assert!(!channel.confirm(ConfirmRequest::new("Sure?")).await);
    }
}

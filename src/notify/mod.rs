//! Notification channel and confirmation protocol between the controllers
//! and whatever renders them.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification { level: Level::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification { level: Level::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

pub fn notification_channel() -> (ChannelNotifier, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelNotifier { tx }, rx)
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        debug!("Notification: {:?}", notification);
        if self.tx.send(notification).is_err() {
            warn!("Notification dropped: receiver closed");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub message: String,
}

/// Asks the user to approve a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, request: ConfirmRequest) -> bool;
}

/// A confirmation waiting for the user's answer.
#[derive(Debug)]
pub struct PendingConfirmation {
    pub request: ConfirmRequest,
    reply: oneshot::Sender<bool>,
}

impl PendingConfirmation {
    pub fn respond(self, accepted: bool) {
        // Requester may have given up.
        let _ = self.reply.send(accepted);
    }
}

#[derive(Debug, Clone)]
pub struct ChannelConfirmer {
    tx: mpsc::UnboundedSender<PendingConfirmation>,
}

pub fn confirmation_channel() -> (ChannelConfirmer, mpsc::UnboundedReceiver<PendingConfirmation>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelConfirmer { tx }, rx)
}

#[async_trait]
impl Confirm for ChannelConfirmer {
    /// Declined when the responder goes away without answering.
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let (reply, answer) = oneshot::channel();
        if self.tx.send(PendingConfirmation { request, reply }).is_err() {
            warn!("Confirmation declined: no responder");
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

/// Answers every request the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _request: ConfirmRequest) -> bool {
        self.0
    }
}

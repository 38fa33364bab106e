use tokio::sync::watch;

use crate::models::notification::Notification;
use crate::models::profile::Role;

/// Single-slot notification banner. A new notification replaces whatever is
/// still showing; nothing is queued.
pub struct Notifier {
    tx: watch::Sender<Option<Notification>>,
}

impl Notifier {
    pub fn new() -> (Self, watch::Receiver<Option<Notification>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Shows `notification` if the session's role is part of its audience.
    /// Returns whether it was shown.
    pub fn emit(&self, viewer: Option<Role>, notification: Notification) -> bool {
        if !notification.audience.includes(viewer) {
            return false;
        }
        self.tx.send_replace(Some(notification));
        true
    }

    pub fn dismiss(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<Notification> {
        self.tx.borrow().clone()
    }
}

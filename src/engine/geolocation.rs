use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::queue::Command;
use crate::models::location::Location;

/// One reading from the device's location provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoFix {
    Position { location: Location },
    Unavailable,
}

impl GeoFix {
    /// The position this fix carries, if it is usable. Non-finite coordinates
    /// are treated the same as a denied or failed lookup.
    pub fn usable(&self) -> Option<Location> {
        match self {
            GeoFix::Position { location } if location.is_finite() => Some(*location),
            _ => None,
        }
    }
}

/// Forwards the latest device fix into the session queue for as long as the
/// subscription is held. Dropping it releases the feed.
pub struct FeedSubscription {
    task: JoinHandle<()>,
}

impl FeedSubscription {
    pub fn subscribe(
        mut fixes: watch::Receiver<GeoFix>,
        commands_tx: mpsc::Sender<Command>,
    ) -> Self {
        let task = tokio::spawn(async move {
            while fixes.changed().await.is_ok() {
                let fix = *fixes.borrow_and_update();
                if commands_tx.send(Command::LocationFix(fix)).await.is_err() {
                    break;
                }
            }
            debug!("geolocation feed closed");
        });

        Self { task }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

use tokio::sync::{broadcast, mpsc, watch};

use crate::engine::geolocation::GeoFix;
use crate::engine::notifier::Notifier;
use crate::engine::queue::Command;
use crate::error::AppError;
use crate::models::event::SessionEvent;
use crate::models::notification::Notification;
use crate::observability::metrics::Metrics;

/// Handles shared with the HTTP layer. The session itself lives inside the
/// engine task and is reached only through `commands_tx`.
pub struct AppState {
    pub commands_tx: mpsc::Sender<Command>,
    pub events_tx: broadcast::Sender<SessionEvent>,
    pub location_tx: watch::Sender<GeoFix>,
    pub notifications: watch::Receiver<Option<Notification>>,
    pub metrics: Metrics,
}

/// The engine's ends of the channels created alongside `AppState`.
pub struct EngineChannels {
    pub commands_rx: mpsc::Receiver<Command>,
    pub location_rx: watch::Receiver<GeoFix>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(
        command_queue_size: usize,
        event_buffer_size: usize,
    ) -> Result<(Self, EngineChannels), AppError> {
        let (commands_tx, commands_rx) = mpsc::channel(command_queue_size);
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let (location_tx, location_rx) = watch::channel(GeoFix::Unavailable);
        let (notifier, notifications) = Notifier::new();
        let metrics = Metrics::new()
            .map_err(|err| AppError::Internal(format!("failed to register metrics: {err}")))?;

        Ok((
            Self {
                commands_tx,
                events_tx,
                location_tx,
                notifications,
                metrics,
            },
            EngineChannels {
                commands_rx,
                location_rx,
                notifier,
            },
        ))
    }
}

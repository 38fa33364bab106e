use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::engine::geolocation::{FeedSubscription, GeoFix};
use crate::engine::notifier::Notifier;
use crate::engine::queue::{Action, Command};
use crate::engine::session::{Session, SessionSnapshot};
use crate::engine::simulator::SimulationHandle;
use crate::error::AppError;
use crate::models::event::SessionEvent;
use crate::models::notification::Notification;
use crate::observability::metrics::Metrics;
use crate::state::{AppState, EngineChannels};
use crate::storage::{self, KeyValueStore};

/// Owns the session and everything with a lifetime tied to it: the store,
/// the simulator timer and the geolocation subscription.
pub struct SessionEngine {
    session: Session,
    store: Box<dyn KeyValueStore>,
    notifier: Notifier,
    commands_tx: mpsc::WeakSender<Command>,
    events_tx: broadcast::Sender<SessionEvent>,
    location_rx: watch::Receiver<GeoFix>,
    metrics: Metrics,
    tick_interval: Duration,
    simulation: Option<SimulationHandle>,
    feed: Option<FeedSubscription>,
}

impl SessionEngine {
    /// Boots a session from whatever the store holds.
    pub fn boot(
        state: &AppState,
        notifier: Notifier,
        location_rx: watch::Receiver<GeoFix>,
        store: Box<dyn KeyValueStore>,
        tick_interval: Duration,
    ) -> Self {
        let role = storage::load_role(&*store);
        let roster = storage::load_roster(&*store);
        info!(role = ?role, profiles = roster.len(), "session booted");

        state.metrics.roster_size.set(roster.len() as i64);

        Self {
            session: Session::boot(role, roster),
            store,
            notifier,
            commands_tx: state.commands_tx.downgrade(),
            events_tx: state.events_tx.clone(),
            location_rx,
            metrics: state.metrics.clone(),
            tick_interval,
            simulation: None,
            feed: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Action { action, reply } => {
                let name = action.name();
                let start = Instant::now();
                let result = self.apply(action);
                let outcome = if result.is_ok() { "ok" } else { "rejected" };

                self.metrics
                    .actions_total
                    .with_label_values(&[name, outcome])
                    .inc();
                self.metrics
                    .action_latency_seconds
                    .with_label_values(&[outcome])
                    .observe(start.elapsed().as_secs_f64());

                if let Err(err) = &result {
                    warn!(action = name, error = %err, "action rejected");
                }
                let _ = reply.send(result);
            }
            Command::Couriers { reply } => {
                let _ = reply.send(Ok(self.session.available_couriers()));
            }
            Command::LocationFix(fix) => {
                if self.session.apply_fix(fix) {
                    self.publish_order();
                }
            }
            Command::SimulatorTick => {
                if self.session.simulation_armed() {
                    self.metrics.simulator_ticks_total.inc();
                    match self.session.simulator_tick() {
                        Some(notification) => self.after_transition(notification),
                        None => self.publish_order(),
                    }
                } else {
                    debug!("stale simulator tick ignored");
                }
            }
        }

        self.sync_simulation();
    }

    fn apply(&mut self, action: Action) -> Result<SessionSnapshot, AppError> {
        match action {
            Action::InstallRole(role) => {
                self.session.install_role(role);
                if let Err(err) = storage::save_role(&mut *self.store, role) {
                    error!(error = %err, "failed to persist installed role");
                }
                info!(role = %role, "role installed");
                self.resubscribe_feed();
            }
            Action::Register(form) => {
                let profile = self.session.register(form)?;
                info!(profile_id = %profile.id, role = %profile.role, "profile registered");
                self.save_roster();
            }
            Action::StartOrder(request) => {
                self.session.start_order(request)?;
                self.after_open();
            }
            Action::SimulateIncomingOrder => {
                self.session.simulate_incoming_order()?;
                self.after_open();
            }
            Action::SelectCourier { courier_id } => {
                let notification = self.session.select_courier(&courier_id)?;
                self.after_transition(notification);
            }
            Action::SubmitQuote(quote) => {
                let notification = self.session.submit_quote(quote)?;
                self.after_transition(notification);
            }
            Action::ConfirmOrder => {
                let notification = self.session.confirm_order()?;
                self.after_transition(notification);
            }
            Action::ConfirmPurchase => {
                let notification = self.session.confirm_purchase()?;
                self.after_transition(notification);
            }
            Action::SendMessage { sender, text } => {
                let message = self.session.send_message(sender, &text)?;
                debug!(message_id = %message.id, sender = %message.sender, "message appended");
                self.publish_order();
            }
            Action::CloseOrder => {
                let order = self.session.close_order().ok_or(AppError::NoActiveOrder)?;
                info!(order_id = %order.id, status = %order.status, "order closed");
                self.metrics.active_orders.set(0);
                self.resubscribe_feed();
                let _ = self.events_tx.send(SessionEvent::OrderClosed { order_id: order.id });
            }
            Action::DismissNotification => self.notifier.dismiss(),
            Action::Snapshot => {}
            Action::Reset => self.reset(),
        }

        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot(self.notifier.current())
    }

    fn reset(&mut self) {
        if let Err(err) = self.store.clear() {
            error!(error = %err, "failed to clear persisted state");
        }
        self.simulation = None;
        self.feed = None;
        self.session.reset();
        self.notifier.dismiss();

        self.metrics.active_orders.set(0);
        self.metrics.roster_size.set(self.session.roster().len() as i64);
        info!("session reset to first boot");
        let _ = self.events_tx.send(SessionEvent::Reset);
    }

    fn after_open(&mut self) {
        if let Some(order) = self.session.order() {
            info!(
                order_id = %order.id,
                status = %order.status,
                category = order.category.display_name(),
                customer_location = %order.customer_location,
                "order opened"
            );
            self.metrics
                .transitions_total
                .with_label_values(&[order.status.as_str()])
                .inc();
        }
        self.metrics.active_orders.set(1);
        self.resubscribe_feed();
        self.publish_order();
    }

    fn after_transition(&self, notification: Notification) {
        if let Some(order) = self.session.order() {
            info!(order_id = %order.id, status = %order.status, "order transitioned");
            self.metrics
                .transitions_total
                .with_label_values(&[order.status.as_str()])
                .inc();
        }
        self.notify(notification);
        self.publish_order();
    }

    fn notify(&self, notification: Notification) {
        if self.notifier.emit(self.session.role(), notification.clone()) {
            self.metrics.notifications_total.inc();
            let _ = self.events_tx.send(SessionEvent::Notification { notification });
        }
    }

    fn publish_order(&self) {
        if let Some(order) = self.session.order() {
            let _ = self.events_tx.send(SessionEvent::OrderUpdated {
                order: order.clone(),
            });
        }
    }

    fn save_roster(&mut self) {
        let roster = self.session.roster();
        self.metrics.roster_size.set(roster.len() as i64);
        if let Err(err) = storage::save_roster(&mut *self.store, roster) {
            error!(error = %err, "failed to persist roster");
        }
    }

    /// Starts or stops the repeating simulator tick to match the session.
    fn sync_simulation(&mut self) {
        let armed = self.session.simulation_armed();
        match (self.simulation.is_some(), armed) {
            (false, true) => {
                if let Some(commands_tx) = self.commands_tx.upgrade() {
                    self.simulation = Some(SimulationHandle::arm(commands_tx, self.tick_interval));
                    debug!(interval_ms = self.tick_interval.as_millis() as u64, "simulation armed");
                }
            }
            (true, false) => {
                self.simulation = None;
                debug!("simulation disarmed");
            }
            _ => {}
        }
    }

    /// Replaces the geolocation subscription; the old one is released first.
    fn resubscribe_feed(&mut self) {
        self.feed = None;
        if self.session.role().is_none() {
            return;
        }
        if let Some(commands_tx) = self.commands_tx.upgrade() {
            self.feed = Some(FeedSubscription::subscribe(
                self.location_rx.clone(),
                commands_tx,
            ));
        }
    }
}

pub fn spawn_engine(
    state: &AppState,
    channels: EngineChannels,
    store: Box<dyn KeyValueStore>,
    tick_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let engine = SessionEngine::boot(
        state,
        channels.notifier,
        channels.location_rx,
        store,
        tick_interval,
    );
    tokio::spawn(run_session_engine(engine, channels.commands_rx))
}

pub async fn run_session_engine(mut engine: SessionEngine, mut commands_rx: mpsc::Receiver<Command>) {
    info!("session engine started");
    engine.resubscribe_feed();

    while let Some(command) = commands_rx.recv().await {
        engine.handle(command);
    }

    engine.simulation = None;
    engine.feed = None;
    warn!("session engine stopped: queue channel closed");
}

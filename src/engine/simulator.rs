//! Simulated courier motion.
//!
//! `tick` is a pure step function; `SimulationHandle` is the timer that feeds
//! ticks into the session queue while a delivery is in motion.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::queue::Command;
use crate::geo::planar_distance;
use crate::models::order::{Order, OrderStatus};

/// Fraction of the remaining gap the courier closes per tick.
pub const STEP_FRACTION: f64 = 0.1;
pub const NEAR_UPPER_BOUND: f64 = 0.005;
pub const NEAR_LOWER_BOUND: f64 = 0.0005;
pub const ARRIVAL_THRESHOLD: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Near,
    Delivered,
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub order: Order,
    pub event: Option<TickEvent>,
}

/// Advances the courier one step toward the customer.
///
/// Distance is measured before the move. Orders outside `ON_THE_WAY`/`NEAR`
/// come back untouched, which is what freezes the courier once delivered.
pub fn tick(order: &Order) -> Tick {
    if !order.status.is_in_motion() {
        return Tick {
            order: order.clone(),
            event: None,
        };
    }

    let courier = order.delivery_location;
    let customer = order.customer_location;
    let delta_lat = customer.lat - courier.lat;
    let delta_lng = customer.lng - courier.lng;
    let dist = planar_distance(&courier, &customer);

    let mut next = order.clone();
    next.delivery_location = courier.offset(delta_lat * STEP_FRACTION, delta_lng * STEP_FRACTION);

    let event = if dist > NEAR_LOWER_BOUND
        && dist < NEAR_UPPER_BOUND
        && order.status != OrderStatus::Near
    {
        next.status = OrderStatus::Near;
        Some(TickEvent::Near)
    } else if dist < ARRIVAL_THRESHOLD {
        next.status = OrderStatus::Delivered;
        Some(TickEvent::Delivered)
    } else {
        None
    };

    Tick { order: next, event }
}

/// Owns the repeating tick task. Dropping the handle cancels the timer, so
/// every path that disarms the simulation also releases it.
pub struct SimulationHandle {
    task: JoinHandle<()>,
}

impl SimulationHandle {
    pub fn arm(commands_tx: mpsc::Sender<Command>, cadence: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick of a tokio interval completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if commands_tx.send(Command::SimulatorTick).await.is_err() {
                    debug!("session queue closed; simulator timer exiting");
                    break;
                }
            }
        });

        Self { task }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! The application context: everything one running session knows.
//!
//! `Session` is synchronous and storage-agnostic. The engine in
//! `engine::runner` owns the only instance and feeds it commands one at a
//! time; persistence and timers live there, not here.

use serde::Serialize;
use tracing::debug;

use crate::engine::geolocation::GeoFix;
use crate::engine::lifecycle;
use crate::engine::messaging;
use crate::engine::roster::{finalize_registration, Roster};
use crate::engine::simulator::{tick, TickEvent};
use crate::error::AppError;
use crate::geo::{haversine_km, DEFAULT_LOCATION};
use crate::models::location::Location;
use crate::models::message::Message;
use crate::models::notification::Notification;
use crate::models::order::{Order, OrderRequest, Quote};
use crate::models::profile::{RegistrationForm, Role, UserProfile};

pub const NEAR_MESSAGE: &str = "Your RAPIDINGO is only 5 minutes away!";
pub const ARRIVED_MESSAGE: &str = "Your RAPIDINGO has arrived at your location!";

#[derive(Debug, Clone)]
pub struct Session {
    role: Option<Role>,
    profile: Option<UserProfile>,
    roster: Roster,
    order: Option<Order>,
    position: Location,
    simulation_running: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub role: Option<Role>,
    pub profile: Option<UserProfile>,
    pub order: Option<Order>,
    pub order_total: Option<f64>,
    pub courier_distance_km: Option<f64>,
    pub position: Location,
    pub simulation_running: bool,
    pub notification: Option<Notification>,
}

impl Session {
    pub fn boot(role: Option<Role>, roster: Roster) -> Self {
        Self {
            role,
            profile: None,
            roster,
            order: None,
            position: DEFAULT_LOCATION,
            simulation_running: false,
        }
    }

    /// Back to first boot: no role, no profile, demo roster.
    pub fn reset(&mut self) {
        *self = Self::boot(None, Roster::seeded());
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn position(&self) -> Location {
        self.position
    }

    pub fn install_role(&mut self, role: Role) {
        if self.profile.as_ref().is_some_and(|profile| profile.role != role) {
            self.profile = None;
        }
        self.role = Some(role);
    }

    pub fn register(&mut self, form: RegistrationForm) -> Result<&UserProfile, AppError> {
        let role = self
            .role
            .ok_or_else(|| AppError::Conflict("install a role before registering".to_string()))?;

        let profile = finalize_registration(role, form)?;
        self.roster.append(profile.clone())?;
        Ok(&*self.profile.insert(profile))
    }

    pub fn available_couriers(&self) -> Vec<UserProfile> {
        self.roster
            .available_couriers(self.requester_id())
            .cloned()
            .collect()
    }

    pub fn start_order(&mut self, request: OrderRequest) -> Result<&Order, AppError> {
        if let Some(active) = &self.order {
            return Err(AppError::Conflict(format!(
                "order {} is still active",
                active.id
            )));
        }

        let order = lifecycle::open_order(request, self.position)?;
        self.simulation_running = false;
        Ok(&*self.order.insert(order))
    }

    /// Hands a courier a canned, already-assigned order to practise the
    /// quote and delivery flow on.
    pub fn simulate_incoming_order(&mut self) -> Result<&Order, AppError> {
        if self.role != Some(Role::Courier) {
            return Err(AppError::Conflict(
                "only a courier session can receive orders".to_string(),
            ));
        }
        if let Some(active) = &self.order {
            return Err(AppError::Conflict(format!(
                "order {} is still active",
                active.id
            )));
        }
        let courier = self
            .profile
            .as_ref()
            .ok_or_else(|| AppError::Conflict("register before taking orders".to_string()))?;

        let order = lifecycle::demo_incoming_order(courier, self.position)?;
        self.simulation_running = false;
        Ok(&*self.order.insert(order))
    }

    pub fn select_courier(&mut self, courier_id: &str) -> Result<Notification, AppError> {
        let order = self.order.as_mut().ok_or(AppError::NoActiveOrder)?;
        let requester_id = self.profile.as_ref().map(|profile| profile.id.as_str());
        let courier = self
            .roster
            .selectable_courier(courier_id, requester_id)
            .ok_or_else(|| AppError::NotFound(format!("courier {courier_id} not found")))?;

        lifecycle::assign_courier(order, courier)
    }

    pub fn submit_quote(&mut self, quote: Quote) -> Result<Notification, AppError> {
        lifecycle::submit_quote(self.active_order_mut()?, quote)
    }

    pub fn confirm_order(&mut self) -> Result<Notification, AppError> {
        lifecycle::confirm_by_customer(self.active_order_mut()?)
    }

    pub fn confirm_purchase(&mut self) -> Result<Notification, AppError> {
        let notification = lifecycle::confirm_purchase(self.active_order_mut()?)?;
        self.simulation_running = true;
        Ok(notification)
    }

    /// Appends a chat message. Without an explicit sender the installed role
    /// speaks.
    pub fn send_message(&mut self, sender: Option<Role>, text: &str) -> Result<&Message, AppError> {
        let sender = sender
            .or(self.role)
            .ok_or_else(|| AppError::BadRequest("message sender is unknown".to_string()))?;
        let order = self.order.as_mut().ok_or(AppError::NoActiveOrder)?;
        messaging::append(order, sender, text)
    }

    /// Discards the active order from whatever state it is in.
    pub fn close_order(&mut self) -> Option<Order> {
        self.simulation_running = false;
        self.order.take()
    }

    /// Applies a device fix. The fix moves this session's own endpoint of the
    /// order, except that a courier's real position never overrides the
    /// simulated one while the delivery is in motion.
    ///
    /// A fix equal to the current position carries nothing new and is
    /// skipped; a resubscribed feed replays the last fix, and applying it
    /// again would collapse a freshly opened order's courier offset.
    pub fn apply_fix(&mut self, fix: GeoFix) -> bool {
        let Some(location) = fix.usable() else {
            debug!(position = %self.position, "no usable location fix; keeping last position");
            return false;
        };
        if location == self.position {
            return false;
        }

        self.position = location;
        if let Some(order) = self.order.as_mut() {
            match self.role {
                Some(Role::Customer) => order.customer_location = location,
                Some(Role::Courier) if !order.status.is_in_motion() => {
                    order.delivery_location = location;
                }
                _ => {}
            }
        }
        true
    }

    pub fn simulation_running(&self) -> bool {
        self.simulation_running
    }

    /// Whether the repeating simulator tick should exist right now.
    pub fn simulation_armed(&self) -> bool {
        self.simulation_running
            && self
                .order
                .as_ref()
                .is_some_and(|order| order.status.is_in_motion())
    }

    pub fn simulator_tick(&mut self) -> Option<Notification> {
        if !self.simulation_armed() {
            return None;
        }
        let order = self.order.as_mut()?;

        let step = tick(order);
        *order = step.order;

        match step.event? {
            TickEvent::Near => Some(Notification::customer_only(NEAR_MESSAGE)),
            TickEvent::Delivered => {
                self.simulation_running = false;
                Some(Notification::customer_only(ARRIVED_MESSAGE))
            }
        }
    }

    pub fn snapshot(&self, notification: Option<Notification>) -> SessionSnapshot {
        SessionSnapshot {
            role: self.role,
            profile: self.profile.clone(),
            order: self.order.clone(),
            order_total: self.order.as_ref().map(Order::total),
            courier_distance_km: self
                .order
                .as_ref()
                .map(|order| haversine_km(&order.delivery_location, &order.customer_location)),
            position: self.position,
            simulation_running: self.simulation_running,
            notification,
        }
    }

    fn requester_id(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.id.as_str())
    }

    fn active_order_mut(&mut self) -> Result<&mut Order, AppError> {
        self.order.as_mut().ok_or(AppError::NoActiveOrder)
    }
}

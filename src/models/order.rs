use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::Location;
use crate::models::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Pharmacy,
    Market,
    Other,
    /// Free-form request typed straight into the order form.
    #[serde(alias = "personalizado")]
    Custom,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Food => "Restaurants",
            Category::Pharmacy => "Pharmacies",
            Category::Market => "Supermarket",
            Category::Other => "Parcels",
            Category::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    SelectingDelivery,
    Assigned,
    WaitingConfirmation,
    ClientConfirmed,
    OnTheWay,
    Near,
    Delivered,
}

impl OrderStatus {
    /// Statuses during which the simulator owns the courier coordinate.
    pub fn is_in_motion(&self) -> bool {
        matches!(self, OrderStatus::OnTheWay | OrderStatus::Near)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::SelectingDelivery => "SELECTING_DELIVERY",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::WaitingConfirmation => "WAITING_CONFIRMATION",
            OrderStatus::ClientConfirmed => "CLIENT_CONFIRMED",
            OrderStatus::OnTheWay => "ON_THE_WAY",
            OrderStatus::Near => "NEAR",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Courier stamped onto an order at assignment; never replaced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedCourier {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub category: Category,
    pub details: String,
    pub store: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Quote {
    pub purchase_cost: f64,
    pub delivery_fee: f64,
}

impl Quote {
    pub fn is_valid(&self) -> bool {
        is_positive(self.purchase_cost) && is_positive(self.delivery_fee)
    }
}

fn is_positive(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub category: Category,
    pub details: String,
    pub store: String,
    pub status: OrderStatus,
    pub customer_location: Location,
    pub delivery_location: Location,
    pub purchase_cost: f64,
    pub delivery_fee: f64,
    pub messages: Vec<Message>,
    pub customer_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier: Option<AssignedCourier>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> f64 {
        self.purchase_cost + self.delivery_fee
    }
}

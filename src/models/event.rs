use serde::Serialize;

use crate::models::notification::Notification;
use crate::models::order::Order;

/// Pushed to `/ws` subscribers after every state change of the session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    OrderUpdated { order: Order },
    OrderClosed { order_id: String },
    Notification { notification: Notification },
    Reset,
}

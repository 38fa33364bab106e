use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::Message;
use crate::models::order::Order;
use crate::models::profile::Role;

/// Appends a chat message to the order's log.
///
/// Timestamps never run backwards within one log, even if the wall clock
/// does, so insertion order and timestamp order always agree.
pub fn append<'a>(order: &'a mut Order, sender: Role, text: &str) -> Result<&'a Message, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("message text cannot be empty".to_string()));
    }

    let now = Utc::now();
    let timestamp = match order.messages.last() {
        Some(previous) if previous.timestamp > now => previous.timestamp,
        _ => now,
    };

    order.messages.push(Message {
        id: Uuid::new_v4().to_string(),
        sender,
        text: text.to_string(),
        timestamp,
    });

    order
        .messages
        .last()
        .ok_or_else(|| AppError::Internal("message log empty after append".to_string()))
}

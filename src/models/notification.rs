use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::profile::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Everyone,
    Only(Role),
}

impl Audience {
    pub fn includes(&self, viewer: Option<Role>) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Only(role) => viewer == Some(*role),
        }
    }
}

/// One-line banner raised by a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub text: String,
    pub audience: Audience,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn everyone(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audience: Audience::Everyone,
            raised_at: Utc::now(),
        }
    }

    pub fn customer_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audience: Audience::Only(Role::Customer),
            raised_at: Utc::now(),
        }
    }
}

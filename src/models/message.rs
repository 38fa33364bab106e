use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

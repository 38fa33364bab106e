use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the delivery a session (or a registered user) plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    #[serde(alias = "delivery")]
    Courier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => f.write_str("customer"),
            Role::Courier => f.write_str("courier"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_photo_front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_photo_back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selfie: Option<String>,
    pub is_verified: bool,
}

/// Fields collected by the onboarding screens before a profile exists.
///
/// Images are opaque references (data URLs or file paths) produced by the
/// camera widget; the core never inspects them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub id_photo_front: Option<String>,
    #[serde(default)]
    pub id_photo_back: Option<String>,
    #[serde(default)]
    pub selfie: Option<String>,
}

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::profile::{RegistrationForm, Role, UserProfile};

pub const EMAIL_DOMAIN: &str = "rapidingo.com";
const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Every registered profile, customers and couriers alike, in registration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    profiles: Vec<UserProfile>,
}

impl Roster {
    pub fn from_profiles(profiles: Vec<UserProfile>) -> Self {
        Self { profiles }
    }

    /// First-boot roster: two verified demo couriers in Trinidad.
    pub fn seeded() -> Self {
        Self::from_profiles(vec![
            demo_courier("dev-1", "Carlos Beni", "carlos@benimail.com", "Carlos"),
            demo_courier("dev-2", "Maria Rapidin", "maria@rapidin.com", "Maria"),
        ])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&UserProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn append(&mut self, profile: UserProfile) -> Result<(), AppError> {
        if self.find(&profile.id).is_some() {
            return Err(AppError::Conflict(format!(
                "profile {} is already registered",
                profile.id
            )));
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Couriers a customer may pick. Availability is not modelled, so this is
    /// every courier except the requester's own profile.
    pub fn available_couriers<'a>(
        &'a self,
        requester_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a UserProfile> + 'a {
        self.profiles.iter().filter(move |profile| {
            profile.role == Role::Courier && Some(profile.id.as_str()) != requester_id
        })
    }

    pub fn selectable_courier(
        &self,
        courier_id: &str,
        requester_id: Option<&str>,
    ) -> Option<&UserProfile> {
        if Some(courier_id) == requester_id {
            return None;
        }
        self.find(courier_id)
            .filter(|profile| profile.role == Role::Courier)
    }
}

fn demo_courier(id: &str, name: &str, email: &str, seed: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        role: Role::Courier,
        name: name.to_string(),
        email: email.to_string(),
        photo_url: Some(avatar_url(seed)),
        phone: None,
        id_photo_front: None,
        id_photo_back: None,
        selfie: None,
        is_verified: true,
    }
}

pub fn avatar_url(seed: &str) -> String {
    format!("{AVATAR_BASE_URL}{seed}")
}

pub fn derived_email(name: &str) -> String {
    let local: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let local = if local.is_empty() { "user".to_string() } else { local };
    format!("{local}@{EMAIL_DOMAIN}")
}

/// Builds the profile for a completed onboarding form.
///
/// Couriers must supply the front of their identity document; everyone needs
/// a name.
pub fn finalize_registration(role: Role, form: RegistrationForm) -> Result<UserProfile, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let has_front_photo = form
        .id_photo_front
        .as_deref()
        .is_some_and(|photo| !photo.trim().is_empty());
    if role == Role::Courier && !has_front_photo {
        return Err(AppError::BadRequest(
            "couriers must provide the front of their identity document".to_string(),
        ));
    }

    let phone = form
        .phone
        .map(|phone| phone.trim().to_string())
        .filter(|phone| phone.chars().any(|c| c.is_ascii_digit()));

    let profile = UserProfile {
        id: Uuid::new_v4().simple().to_string()[..8].to_string(),
        role,
        name: name.to_string(),
        email: derived_email(name),
        photo_url: Some(avatar_url(name)),
        phone,
        id_photo_front: form.id_photo_front,
        id_photo_back: form.id_photo_back,
        selfie: form.selfie,
        is_verified: true,
    };

    if let Some(phone) = profile.phone.as_deref() {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        info!(
            phone = %digits,
            text = %welcome_message(role),
            "welcome message queued"
        );
    }

    Ok(profile)
}

pub fn welcome_message(role: Role) -> String {
    let as_role = match role {
        Role::Customer => "Customer",
        Role::Courier => "Courier",
    };
    format!("Welcome to RAPIDINGO! Your Trinidad account as {as_role} is ready.")
}

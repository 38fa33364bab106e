use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::debug;

use crate::engine::geolocation::GeoFix;
use crate::engine::queue::{submit, Action};
use crate::engine::session::SessionSnapshot;
use crate::error::AppError;
use crate::models::location::Location;
use crate::models::profile::{RegistrationForm, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/role", post(install_role))
        .route("/session/register", post(register))
        .route("/session/location", post(report_location))
        .route("/session/reset", post(reset))
}

#[derive(Deserialize)]
pub struct InstallRoleRequest {
    pub role: Role,
}

/// A device reading; `location: null` reports a failed or denied lookup.
#[derive(Deserialize)]
pub struct LocationReport {
    pub location: Option<Location>,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::Snapshot).await?))
}

async fn install_role(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InstallRoleRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::InstallRole(payload.role)).await?))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistrationForm>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::Register(payload)).await?))
}

/// Publishes the fix to the geolocation feed. The session picks it up through
/// its subscription, so the reply does not wait for it to be applied.
async fn report_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LocationReport>,
) -> axum::http::StatusCode {
    let fix = match payload.location {
        Some(location) => GeoFix::Position { location },
        None => GeoFix::Unavailable,
    };
    debug!(fix = ?fix, "location reported");
    state.location_tx.send_replace(fix);
    axum::http::StatusCode::ACCEPTED
}

async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::Reset).await?))
}

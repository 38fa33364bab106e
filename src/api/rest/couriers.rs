use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::engine::queue::available_couriers;
use crate::error::AppError;
use crate::models::profile::UserProfile;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/couriers", get(list_couriers))
}

/// Couriers the current session may pick, never including its own profile.
async fn list_couriers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let couriers = available_couriers(&state).await?;
    Ok(Json(couriers))
}

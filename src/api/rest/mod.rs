pub mod couriers;
pub mod orders;
pub mod session;
pub mod ws;

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::engine::queue::{submit, Action};
use crate::error::AppError;
use crate::models::notification::Notification;
use crate::state::AppState;

pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .merge(session::router())
        .merge(couriers::router())
        .merge(orders::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route(
            "/notification",
            get(current_notification).delete(dismiss_notification),
        )
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .fallback_service(ServeDir::new(static_dir))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    roster_size: i64,
    active_orders: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        roster_size: state.metrics.roster_size.get(),
        active_orders: state.metrics.active_orders.get(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

async fn current_notification(State(state): State<Arc<AppState>>) -> Json<Option<Notification>> {
    Json(state.notifications.borrow().clone())
}

async fn dismiss_notification(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    submit(&state, Action::DismissNotification).await?;
    Ok(StatusCode::NO_CONTENT)
}

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::queue::{submit, Action};
use crate::engine::session::SessionSnapshot;
use crate::error::AppError;
use crate::models::order::{OrderRequest, Quote};
use crate::models::profile::Role;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order", post(start_order).delete(close_order))
        .route("/order/demo", post(simulate_incoming_order))
        .route("/order/courier", post(select_courier))
        .route("/order/quote", post(submit_quote))
        .route("/order/confirm", post(confirm_order))
        .route("/order/purchase", post(confirm_purchase))
        .route("/order/messages", post(send_message))
}

#[derive(Deserialize)]
pub struct SelectCourierRequest {
    pub courier_id: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub sender: Option<Role>,
    pub text: String,
}

async fn start_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::StartOrder(payload)).await?))
}

async fn simulate_incoming_order(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::SimulateIncomingOrder).await?))
}

async fn select_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectCourierRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let action = Action::SelectCourier {
        courier_id: payload.courier_id,
    };
    Ok(Json(submit(&state, action).await?))
}

async fn submit_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Quote>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::SubmitQuote(payload)).await?))
}

async fn confirm_order(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::ConfirmOrder).await?))
}

async fn confirm_purchase(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::ConfirmPurchase).await?))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let action = Action::SendMessage {
        sender: payload.sender,
        text: payload.text,
    };
    Ok(Json(submit(&state, action).await?))
}

async fn close_order(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(submit(&state, Action::CloseOrder).await?))
}

use tokio::sync::oneshot;

use crate::engine::geolocation::GeoFix;
use crate::engine::session::SessionSnapshot;
use crate::error::AppError;
use crate::models::order::{OrderRequest, Quote};
use crate::models::profile::{RegistrationForm, Role, UserProfile};
use crate::state::AppState;

/// User-triggered operations on the session.
#[derive(Debug, Clone)]
pub enum Action {
    InstallRole(Role),
    Register(RegistrationForm),
    StartOrder(OrderRequest),
    SimulateIncomingOrder,
    SelectCourier { courier_id: String },
    SubmitQuote(Quote),
    ConfirmOrder,
    ConfirmPurchase,
    SendMessage { sender: Option<Role>, text: String },
    CloseOrder,
    DismissNotification,
    Snapshot,
    Reset,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::InstallRole(_) => "install_role",
            Action::Register(_) => "register",
            Action::StartOrder(_) => "start_order",
            Action::SimulateIncomingOrder => "simulate_incoming_order",
            Action::SelectCourier { .. } => "select_courier",
            Action::SubmitQuote(_) => "submit_quote",
            Action::ConfirmOrder => "confirm_order",
            Action::ConfirmPurchase => "confirm_purchase",
            Action::SendMessage { .. } => "send_message",
            Action::CloseOrder => "close_order",
            Action::DismissNotification => "dismiss_notification",
            Action::Snapshot => "snapshot",
            Action::Reset => "reset",
        }
    }
}

pub type Reply<T> = oneshot::Sender<Result<T, AppError>>;

/// Everything that can change the session, from any producer. The engine
/// applies commands one at a time in arrival order.
#[derive(Debug)]
pub enum Command {
    Action {
        action: Action,
        reply: Reply<SessionSnapshot>,
    },
    Couriers {
        reply: Reply<Vec<UserProfile>>,
    },
    LocationFix(GeoFix),
    SimulatorTick,
}

pub async fn submit(state: &AppState, action: Action) -> Result<SessionSnapshot, AppError> {
    let (reply, rx) = oneshot::channel();
    send(state, Command::Action { action, reply }).await?;
    await_reply(rx).await
}

pub async fn available_couriers(state: &AppState) -> Result<Vec<UserProfile>, AppError> {
    let (reply, rx) = oneshot::channel();
    send(state, Command::Couriers { reply }).await?;
    await_reply(rx).await
}

async fn send(state: &AppState, command: Command) -> Result<(), AppError> {
    state
        .commands_tx
        .send(command)
        .await
        .map_err(|err| AppError::Internal(format!("session queue send failed: {err}")))
}

async fn await_reply<T>(rx: oneshot::Receiver<Result<T, AppError>>) -> Result<T, AppError> {
    rx.await
        .map_err(|_| AppError::Internal("session engine dropped the reply".to_string()))?
}

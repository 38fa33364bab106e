//! Order lifecycle transitions.
//!
//! Every trigger checks its preconditions before touching the order, so a
//! rejected trigger always leaves the order exactly as it was.

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{courier_start, DEFAULT_LOCATION};
use crate::models::location::Location;
use crate::models::notification::Notification;
use crate::models::order::{
    AssignedCourier, Category, Order, OrderRequest, OrderStatus, Quote,
};
use crate::models::profile::{Role, UserProfile};

const ORDER_ID_PREFIX: &str = "RD-";
const ORDER_ID_SUFFIX_LEN: usize = 5;

pub const DEMO_ORDER_ID: &str = "RD-DEMO";
/// Where the demo customer waits, relative to the default coordinate.
const DEMO_CUSTOMER_OFFSET: (f64, f64) = (0.005, 0.005);

pub fn new_order_id() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_ID_SUFFIX_LEN)
        .collect();
    format!("{ORDER_ID_PREFIX}{}", suffix.to_uppercase())
}

/// Materializes a submitted request. The order starts in `SELECTING_DELIVERY`
/// with the courier parked at a fixed offset from the customer.
pub fn open_order(request: OrderRequest, customer_location: Location) -> Result<Order, AppError> {
    if request.details.trim().is_empty() {
        return Err(AppError::BadRequest("order details cannot be empty".to_string()));
    }
    if request.store.trim().is_empty() {
        return Err(AppError::BadRequest("store cannot be empty".to_string()));
    }

    Ok(Order {
        id: new_order_id(),
        category: request.category,
        details: request.details,
        store: request.store,
        status: OrderStatus::SelectingDelivery,
        customer_location,
        delivery_location: courier_start(&customer_location),
        purchase_cost: 0.0,
        delivery_fee: 0.0,
        messages: Vec::new(),
        customer_confirmed: false,
        courier: None,
        created_at: Utc::now(),
    })
}

/// Drops a canned market run onto a courier's dashboard, already assigned to
/// them and waiting for their quote.
pub fn demo_incoming_order(courier: &UserProfile, courier_location: Location) -> Result<Order, AppError> {
    if courier.role != Role::Courier {
        return Err(AppError::BadRequest(format!(
            "user {} is not registered as a courier",
            courier.id
        )));
    }

    let (lat, lng) = DEMO_CUSTOMER_OFFSET;
    Ok(Order {
        id: DEMO_ORDER_ID.to_string(),
        category: Category::Market,
        details: "2 kg of flour, 1 bottle of oil".to_string(),
        store: "Mercado Fátima".to_string(),
        status: OrderStatus::Assigned,
        customer_location: DEFAULT_LOCATION.offset(lat, lng),
        delivery_location: courier_location,
        purchase_cost: 0.0,
        delivery_fee: 0.0,
        messages: Vec::new(),
        customer_confirmed: false,
        courier: Some(AssignedCourier {
            id: courier.id.clone(),
            name: courier.name.clone(),
            photo_url: courier.photo_url.clone(),
        }),
        created_at: Utc::now(),
    })
}

pub fn assign_courier(order: &mut Order, courier: &UserProfile) -> Result<Notification, AppError> {
    expect_status(order, OrderStatus::SelectingDelivery, "pick a courier")?;

    if courier.role != Role::Courier {
        return Err(AppError::BadRequest(format!(
            "user {} is not registered as a courier",
            courier.id
        )));
    }

    order.courier = Some(AssignedCourier {
        id: courier.id.clone(),
        name: courier.name.clone(),
        photo_url: courier.photo_url.clone(),
    });
    order.status = OrderStatus::Assigned;

    Ok(Notification::everyone(format!(
        "Order sent to {}. Waiting for a quote.",
        courier.name
    )))
}

pub fn submit_quote(order: &mut Order, quote: Quote) -> Result<Notification, AppError> {
    expect_status(order, OrderStatus::Assigned, "submit a quote")?;

    if !quote.is_valid() {
        return Err(AppError::BadRequest(
            "purchase cost and delivery fee must both be positive".to_string(),
        ));
    }

    order.purchase_cost = quote.purchase_cost;
    order.delivery_fee = quote.delivery_fee;
    order.status = OrderStatus::WaitingConfirmation;

    Ok(Notification::everyone(
        "Costs sent to the customer. Waiting for confirmation.",
    ))
}

pub fn confirm_by_customer(order: &mut Order) -> Result<Notification, AppError> {
    expect_status(order, OrderStatus::WaitingConfirmation, "confirm the order")?;

    order.customer_confirmed = true;
    order.status = OrderStatus::ClientConfirmed;

    Ok(Notification::everyone("Purchase confirmed. Notifying the courier."))
}

/// Courier reports the purchase is made; from here on the simulator drives
/// the courier position.
pub fn confirm_purchase(order: &mut Order) -> Result<Notification, AppError> {
    expect_status(order, OrderStatus::ClientConfirmed, "start the delivery")?;

    order.status = OrderStatus::OnTheWay;

    Ok(Notification::everyone("OK, on my way"))
}

fn expect_status(order: &Order, expected: OrderStatus, action: &'static str) -> Result<(), AppError> {
    if order.status == expected {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            action,
            status: order.status,
        })
    }
}

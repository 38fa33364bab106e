use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rapidingo::api::rest::router;
use rapidingo::engine::runner::spawn_engine;
use rapidingo::engine::session::ARRIVED_MESSAGE;
use rapidingo::state::AppState;
use rapidingo::storage::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    setup_with_tick(Duration::from_secs(3))
}

fn setup_with_tick(tick: Duration) -> axum::Router {
    let (state, channels) = AppState::new(1024, 1024).unwrap();
    let shared = Arc::new(state);
    spawn_engine(&shared, channels, Box::new(MemoryStore::new()), tick);
    router(shared, "static")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    empty_request("GET", uri)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn registered_customer(app: &axum::Router) -> Value {
    let (status, _) = call(app, json_request("POST", "/session/role", json!({ "role": "customer" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/session/register",
            json!({ "name": "Ana Vaca", "phone": "+591 71234567" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["profile"].clone()
}

async fn open_assigned_order(app: &axum::Router) {
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/order",
            json!({ "category": "food", "details": "two empanadas", "store": "Doña Rosa" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "SELECTING_DELIVERY");

    let (status, body) = call(
        app,
        json_request("POST", "/order/courier", json!({ "courier_id": "dev-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "ASSIGNED");
}

async fn wait_for_status(app: &axum::Router, wanted: &str) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let (_, body) = call(app, get_request("/session")).await;
        if body["order"]["status"] == wanted {
            return body;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "order never reached {wanted}: {body}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["roster_size"], 2);
    assert_eq!(body["active_orders"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("simulator_ticks_total"));
}

#[tokio::test]
async fn fresh_session_has_no_role_and_default_position() {
    let app = setup();
    let (status, body) = call(&app, get_request("/session")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["role"].is_null());
    assert!(body["order"].is_null());
    assert_eq!(body["position"]["lat"], -14.8333);
    assert_eq!(body["position"]["lng"], -64.9);
}

#[tokio::test]
async fn couriers_list_seeded_demo_couriers() {
    let app = setup();
    let (status, body) = call(&app, get_request("/couriers")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carlos Beni", "Maria Rapidin"]);
}

#[tokio::test]
async fn register_without_name_returns_400() {
    let app = setup();
    call(&app, json_request("POST", "/session/role", json!({ "role": "customer" }))).await;

    let (status, body) = call(
        &app,
        json_request("POST", "/session/register", json!({ "name": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn courier_registration_needs_identity_photo() {
    let app = setup();
    call(&app, json_request("POST", "/session/role", json!({ "role": "delivery" }))).await;

    let (status, _) = call(
        &app,
        json_request("POST", "/session/register", json!({ "name": "Pedro" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/session/register",
            json!({ "name": "Pedro", "id_photo_front": "data:image/jpeg;base64,AAAA" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["role"], "courier");

    let my_id = body["profile"]["id"].as_str().unwrap().to_string();
    let (_, couriers) = call(&app, get_request("/couriers")).await;
    assert!(couriers
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"] != my_id.as_str()));
}

#[tokio::test]
async fn registered_customer_gets_derived_email() {
    let app = setup();
    let profile = registered_customer(&app).await;

    assert_eq!(profile["email"], "anavaca@rapidingo.com");
    assert_eq!(profile["is_verified"], true);

    let (_, health) = call(&app, get_request("/health")).await;
    assert_eq!(health["roster_size"], 3);
}

#[tokio::test]
async fn actions_without_an_order_return_404() {
    let app = setup();
    let (status, body) = call(&app, empty_request("POST", "/order/confirm")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no active order");
}

#[tokio::test]
async fn quote_before_assignment_returns_409() {
    let app = setup();
    registered_customer(&app).await;
    call(
        &app,
        json_request(
            "POST",
            "/order",
            json!({ "category": "market", "details": "bread", "store": "Panadería" }),
        ),
    )
    .await;

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/order/quote",
            json!({ "purchase_cost": 10.0, "delivery_fee": 5.0 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn zero_quote_is_rejected_and_order_unchanged() {
    let app = setup();
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/order/quote",
            json!({ "purchase_cost": 0.0, "delivery_fee": 5.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, session) = call(&app, get_request("/session")).await;
    assert_eq!(session["order"]["status"], "ASSIGNED");
    assert_eq!(session["order"]["purchase_cost"], 0.0);
    assert_eq!(session["order"]["delivery_fee"], 0.0);
}

#[tokio::test]
async fn second_order_while_one_is_active_returns_409() {
    let app = setup();
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/order",
            json!({ "category": "other", "details": "documents", "store": "Notaría" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn blank_store_returns_400() {
    let app = setup();
    registered_customer(&app).await;

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/order",
            json!({ "category": "personalizado", "details": "two cuñapés", "store": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("store"));

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/order",
            json!({ "category": "custom", "details": "two cuñapés", "store": "Panadería" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["category"], "custom");
}

#[tokio::test]
async fn courier_can_simulate_an_incoming_order() {
    let app = setup();
    let (status, _) = call(&app, empty_request("POST", "/order/demo")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    call(&app, json_request("POST", "/session/role", json!({ "role": "courier" }))).await;
    let (_, registered) = call(
        &app,
        json_request(
            "POST",
            "/session/register",
            json!({ "name": "Pedro", "id_photo_front": "front.jpg" }),
        ),
    )
    .await;
    let my_id = registered["profile"]["id"].clone();

    let (status, body) = call(&app, empty_request("POST", "/order/demo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], "RD-DEMO");
    assert_eq!(body["order"]["status"], "ASSIGNED");
    assert_eq!(body["order"]["courier"]["id"], my_id);
    assert_eq!(body["order"]["category"], "market");

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/order/quote",
            json!({ "purchase_cost": 22.0, "delivery_fee": 6.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_total"], 28.0);
}

#[tokio::test]
async fn chat_messages_keep_order() {
    let app = setup();
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    call(
        &app,
        json_request("POST", "/order/messages", json!({ "text": "Extra llajua please" })),
    )
    .await;
    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/order/messages",
            json!({ "sender": "courier", "text": "Sure" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let messages = body["order"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "customer");
    assert_eq!(messages[1]["sender"], "courier");
    assert_eq!(messages[1]["text"], "Sure");
}

#[tokio::test]
async fn reported_location_moves_customer_endpoint() {
    let app = setup();
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/session/location",
            json!({ "location": { "lat": -14.82, "lng": -64.89 } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let (_, body) = call(&app, get_request("/session")).await;
        if body["order"]["customer_location"]["lat"] == -14.82 {
            assert_eq!(body["position"]["lng"], -64.89);
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "fix never applied");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn full_delivery_flow() {
    let app = setup_with_tick(Duration::from_millis(2));
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/order/quote",
            json!({ "purchase_cost": 40.0, "delivery_fee": 10.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "WAITING_CONFIRMATION");
    assert_eq!(body["order_total"], 50.0);

    let (status, body) = call(&app, empty_request("POST", "/order/confirm")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "CLIENT_CONFIRMED");
    assert_eq!(body["order"]["customer_confirmed"], true);

    let (status, body) = call(&app, empty_request("POST", "/order/purchase")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["simulation_running"], true);

    let delivered = wait_for_status(&app, "DELIVERED").await;
    assert_eq!(delivered["simulation_running"], false);
    assert_eq!(delivered["order"]["courier"]["id"], "dev-1");
    assert_eq!(delivered["order"]["purchase_cost"], 40.0);

    let (_, notification) = call(&app, get_request("/notification")).await;
    assert_eq!(notification["text"], ARRIVED_MESSAGE);

    let frozen = delivered["order"]["delivery_location"].clone();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let (_, later) = call(&app, get_request("/session")).await;
    assert_eq!(later["order"]["delivery_location"], frozen);

    let (status, _) = call(&app, empty_request("DELETE", "/notification")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, notification) = call(&app, get_request("/notification")).await;
    assert!(notification.is_null());

    let (status, body) = call(&app, empty_request("DELETE", "/order")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["order"].is_null());
}

#[tokio::test]
async fn reset_returns_to_first_boot() {
    let app = setup();
    registered_customer(&app).await;
    open_assigned_order(&app).await;

    let (status, body) = call(&app, empty_request("POST", "/session/reset")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["role"].is_null());
    assert!(body["profile"].is_null());
    assert!(body["order"].is_null());

    let (_, health) = call(&app, get_request("/health")).await;
    assert_eq!(health["roster_size"], 2);
}

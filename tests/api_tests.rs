//! API integration tests
//!
//! Each test builds a fresh seeded application and drives the router in-process.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use building_portal_server::{api, config::AppConfig, services::Services, AppState};

// Far enough ahead that the seeded bookings (today and tomorrow) never interfere
const DAY: &str = "2030-06-03";

fn app() -> Router {
    let config = AppConfig::default();
    let services = Services::bootstrap(&config).expect("Failed to create services");
    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

/// Helper to get a bearer token for a seeded account
async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
    body["token"].as_str().expect("No token in response").to_string()
}

fn booking_body(room_id: &str, start: &str, end: &str) -> Value {
    json!({
        "room_id": room_id,
        "title": "Weekly sync",
        "start_time": format!("{}T{}", DAY, start),
        "end_time": format!("{}T{}", DAY, end),
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "TENANT@example.com", "password": "password" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "TENANT");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "tenant@example.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/rooms", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permissions_endpoint_lists_role_grants() {
    let app = app();
    let token = login(&app, "broker@example.com").await;

    let (status, body) = send(&app, Method::GET, "/auth/permissions", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "BROKER");
    let permissions: Vec<&str> = body["permissions"]
        .as_array()
        .expect("permissions array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(permissions.contains(&"vacancy.view"));
    assert!(!permissions.contains(&"bookings.create"));
}

#[tokio::test]
async fn test_booking_overlap_is_rejected() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "10:00:00", "11:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["room_name"], "Conference Room A");

    let (status, body) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "10:30:00", "11:30:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6);

    // Back-to-back is fine
    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "11:00:00", "12:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_outside_business_hours_is_bad_request() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "08:00:00", "10:00:00")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_approval_notifies_booker() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;

    let (_, booking) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-2", "14:00:00", "15:00:00")),
    )
    .await;
    let id = booking["id"].as_str().expect("booking id").to_string();

    // Tenants cannot approve
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/bookings/{}/approve", id),
        Some(&tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/bookings/{}/approve", id),
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approved_by"], "mgmt-1");

    // A second approval is an invalid transition
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/bookings/{}/approve", id),
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7);

    let (status, body) = send(&app, Method::GET, "/notifications", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = body.as_array().expect("notification list");
    let notification = inbox
        .iter()
        .find(|n| n["related_booking_id"] == id.as_str())
        .expect("approval notification");
    assert_eq!(notification["level"], "success");
    assert_eq!(notification["read"], false);

    let (_, body) = send(&app, Method::GET, "/notifications/unread-count", Some(&tenant), None).await;
    assert_eq!(body["unread"], 1);

    let (status, _) = send(&app, Method::POST, "/notifications/read-all", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/notifications/unread-count", Some(&tenant), None).await;
    assert_eq!(body["unread"], 0);
}

#[tokio::test]
async fn test_reject_booking_requires_reason() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;

    let (_, booking) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-3", "09:00:00", "12:00:00")),
    )
    .await;
    let id = booking["id"].as_str().expect("booking id").to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/bookings/{}/reject", id),
        Some(&mgmt),
        Some(json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/bookings/{}/reject", id),
        Some(&mgmt),
        Some(json!({ "reason": "Hall reserved for inspection" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejection_reason"], "Hall reserved for inspection");

    // A rejected booking frees the slot
    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-3", "10:00:00", "11:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_broker_cannot_see_bookings() {
    let app = app();
    let broker = login(&app, "broker@example.com").await;

    let (status, body) = send(&app, Method::GET, "/bookings", Some(&broker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2);

    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&broker),
        Some(booking_body("room-1", "10:00:00", "11:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Vacancy data is still open to brokers
    let (status, body) = send(
        &app,
        Method::GET,
        "/buildings/building-1/available-units",
        Some(&broker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_room_schedule_requires_booking_visibility() {
    let app = app();
    let broker = login(&app, "broker@example.com").await;
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "10:00:00", "11:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/rooms/room-1/bookings?date={}", DAY);

    // building.view alone does not expose who booked what
    let (status, body) = send(&app, Method::GET, &uri, Some(&broker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2);

    let (status, body) = send(&app, Method::GET, &uri, Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().expect("booking list");
    assert_eq!(bookings.len(), 1);
    assert!(bookings.iter().all(|b| b["user_id"] == "tenant-1"));

    let (status, body) = send(&app, Method::GET, &uri, Some(&mgmt), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Free slots carry no booker details and stay open to brokers
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/rooms/room-1/availability?date={}", DAY),
        Some(&broker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tenant_only_sees_own_bookings() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let owner = login(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&owner),
        Some(booking_body("room-2", "16:00:00", "17:00:00")),
    )
    .await;
    // Owners approve bookings but do not request them
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = send(
        &app,
        Method::GET,
        "/bookings?user_id=someone-else",
        Some(&tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().expect("booking list");
    assert!(!bookings.is_empty());
    assert!(bookings.iter().all(|b| b["user_id"] == "tenant-1"));

    let (status, body) = send(&app, Method::GET, "/bookings", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().map_or(false, |b| b.len() >= 3));
}

#[tokio::test]
async fn test_room_availability() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;

    let uri = format!("/rooms/room-1/availability?date={}", DAY);
    let (status, body) = send(&app, Method::GET, &uri, Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "start": format!("{}T09:00:00", DAY), "end": format!("{}T21:00:00", DAY) }])
    );

    send(
        &app,
        Method::POST,
        "/bookings",
        Some(&tenant),
        Some(booking_body("room-1", "10:00:00", "11:00:00")),
    )
    .await;

    let (_, body) = send(&app, Method::GET, &uri, Some(&tenant), None).await;
    assert_eq!(
        body,
        json!([
            { "start": format!("{}T09:00:00", DAY), "end": format!("{}T10:00:00", DAY) },
            { "start": format!("{}T11:00:00", DAY), "end": format!("{}T21:00:00", DAY) },
        ])
    );

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/rooms/no-such-room/availability?date={}", DAY),
        Some(&tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_workflow() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;

    let (status, request) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&tenant),
        Some(json!({
            "type": "maintenance",
            "title": "Leaking tap",
            "description": "Kitchen tap on floor 2 is leaking",
            "priority": "high",
            "draft": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "draft");
    let id = request["id"].as_str().expect("request id").to_string();

    // Drafts cannot be reviewed
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/requests/{}/review", id),
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/requests/{}/submit", id),
        Some(&tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submitted");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/requests/{}/review", id),
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "under_review");
    assert_eq!(body["reviewed_by"], "mgmt-1");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/requests/{}/approve", id),
        Some(&mgmt),
        Some(json!({ "comment": "Plumber booked for Monday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["comments"][0]["content"], "Plumber booked for Monday");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/requests/{}/complete", id),
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["completed_at"].is_string());

    let (_, body) = send(&app, Method::GET, "/notifications", Some(&tenant), None).await;
    let related: Vec<&Value> = body
        .as_array()
        .expect("notification list")
        .iter()
        .filter(|n| n["related_request_id"] == id.as_str())
        .collect();
    assert_eq!(related.len(), 2);
}

#[tokio::test]
async fn test_tenant_cannot_approve_requests() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/requests/req-1/approve",
        Some(&tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/requests/req-1/reject",
        Some(&tenant),
        Some(json!({ "reason": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_document_extension_is_checked() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/requests/req-1/documents",
        Some(&tenant),
        Some(json!({
            "name": "script.exe",
            "url": "https://files.example.com/script.exe",
            "content_type": "application/octet-stream",
            "size": 1024,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/requests/req-1/documents",
        Some(&tenant),
        Some(json!({
            "name": "Photo.JPG",
            "url": "https://files.example.com/photo.jpg",
            "content_type": "image/jpeg",
            "size": 2048,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Photo.JPG");
}

#[tokio::test]
async fn test_building_occupancy() {
    let app = app();
    let owner = login(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/buildings/building-1/occupancy",
        Some(&owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_units"], 2);
    assert_eq!(body["occupied_units"], 1);
    assert_eq!(body["occupancy_rate"], 50.0);
}

async fn unread(app: &Router, token: &str) -> u64 {
    let (status, body) = send(
        app,
        Method::GET,
        "/notifications/unread-count",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["unread"].as_u64().expect("unread count")
}

fn amount(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("decimal string")
}

#[tokio::test]
async fn test_incident_workflow() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;
    let broker = login(&app, "broker@example.com").await;
    let mgmt_unread = unread(&app, &mgmt).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/incidents",
        Some(&tenant),
        Some(json!({
            "title": "Elevator stuck",
            "description": "Car 2 stopped between 4F and 5F",
            "category": "elevator",
            "severity": "high",
            "location": "Elevator hall",
            "building_id": "building-1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "reported");
    assert_eq!(body["notified_contacts"], json!(["contact-1", "contact-2"]));
    let id = body["id"].as_str().expect("incident id").to_string();

    // contact-2 is the management account
    assert_eq!(unread(&app, &mgmt).await, mgmt_unread + 1);

    let uri = |action: &str| format!("/incidents/{}/{}", id, action);
    let (status, _) = send(&app, Method::POST, &uri("acknowledge"), Some(&tenant), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, &uri("close"), Some(&mgmt), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7);

    for (action, expected) in [
        ("acknowledge", "acknowledged"),
        ("respond", "responding"),
        ("resolve", "resolved"),
        ("close", "closed"),
    ] {
        let (status, body) = send(&app, Method::POST, &uri(action), Some(&mgmt), None).await;
        assert_eq!(status, StatusCode::OK, "{}: {}", action, body);
        assert_eq!(body["status"], expected);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        &uri("updates"),
        Some(&tenant),
        Some(json!({ "content": "Thanks" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        Method::GET,
        "/incidents?active_only=true",
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let active = body.as_array().expect("incident list");
    assert!(active.iter().all(|i| i["id"] != id.as_str()));
    assert!(active.iter().any(|i| i["id"] == "incident-1"));

    let (status, _) = send(&app, Method::GET, "/incidents", Some(&broker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, "/incidents/critical", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_emergency_contacts_are_ordered_by_priority() {
    let app = app();
    let tenant = login(&app, "tenant@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;

    let contact = json!({
        "name": "Night guard",
        "role": "Security",
        "phone": "03-9999-0000",
        "email": "night@example.com",
        "availability": "24h",
        "priority": 1,
    });
    let (status, _) = send(
        &app,
        Method::POST,
        "/emergency-contacts",
        Some(&tenant),
        Some(contact.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/emergency-contacts",
        Some(&mgmt),
        Some(contact),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = send(&app, Method::GET, "/emergency-contacts", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    let priorities: Vec<u64> = body
        .as_array()
        .expect("contact list")
        .iter()
        .filter_map(|c| c["priority"].as_u64())
        .collect();
    assert_eq!(priorities, vec![1, 1, 2, 3]);
}

#[tokio::test]
async fn test_invoice_lifecycle() {
    let app = app();
    let owner = login(&app, "owner@example.com").await;
    let mgmt = login(&app, "mgmt@example.com").await;
    let tenant = login(&app, "tenant@example.com").await;
    let tenant_unread = unread(&app, &tenant).await;

    let (status, _) = send(&app, Method::GET, "/invoices", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/invoices",
        Some(&mgmt),
        Some(json!({
            "tenant_id": "tenant-1",
            "period_start": "2024-03-01",
            "period_end": "2024-03-31",
            "items": [
                { "description": "Rent (unit 201)", "unit_price": "320000", "type": "rent" },
                { "description": "Parking", "quantity": 2, "unit_price": "15000", "type": "parking" },
            ],
            "issue_date": "2024-03-25",
            "due_date": "2024-04-25",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["invoice_number"], "2024-003");
    assert_eq!(body["status"], "draft");
    assert_eq!(amount(&body["subtotal"]), 350_000.0);
    assert_eq!(amount(&body["total"]), 385_000.0);
    let id = body["id"].as_str().expect("invoice id").to_string();

    let status_uri = format!("/invoices/{}/status", id);
    let (status, body) = send(
        &app,
        Method::POST,
        &status_uri,
        Some(&mgmt),
        Some(json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7);

    for next in ["issued", "sent"] {
        let (status, _) = send(
            &app,
            Method::POST,
            &status_uri,
            Some(&mgmt),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(unread(&app, &tenant).await, tenant_unread + 1);

    // Sent invoices can no longer be edited or deleted
    let invoice_uri = format!("/invoices/{}", id);
    let (status, _) = send(
        &app,
        Method::PUT,
        &invoice_uri,
        Some(&owner),
        Some(json!({ "notes": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, Method::DELETE, &invoice_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let payments_uri = format!("/invoices/{}/payments", id);
    let (status, body) = send(
        &app,
        Method::POST,
        &payments_uri,
        Some(&mgmt),
        Some(json!({
            "amount": "385000",
            "payment_date": "2024-04-10",
            "method": "bank_transfer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["invoice"]["status"], "paid");
    assert_eq!(body["invoice"]["paid_date"], "2024-04-10");

    let (_, body) = send(&app, Method::GET, &payments_uri, Some(&mgmt), None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        Method::GET,
        "/invoices/revenue?from=2024-01-01&to=2024-04-30",
        Some(&mgmt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice_count"], 2);
    assert_eq!(amount(&body["total"]), 772_200.0);
}

#[tokio::test]
async fn test_overdue_invoices() {
    let app = app();
    let mgmt = login(&app, "mgmt@example.com").await;

    let (status, body) = send(&app, Method::GET, "/invoices/overdue", Some(&mgmt), None).await;
    assert_eq!(status, StatusCode::OK);
    let overdue = body.as_array().expect("invoice list");
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["id"], "invoice-1");

    // Only billing.edit may delete invoices
    let (status, _) = send(&app, Method::DELETE, "/invoices/invoice-1", Some(&mgmt), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//! API handlers for the building portal REST endpoints

pub mod auth;
pub mod billing;
pub mod bookings;
pub mod buildings;
pub mod emergency;
pub mod health;
pub mod notifications;
pub mod openapi;
pub mod requests;
pub mod rooms;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/permissions", get(auth::permissions))
        // Users
        .route("/users", get(users::list_users))
        // Rooms
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/:id",
            get(rooms::get_room).put(rooms::update_room).delete(rooms::delete_room),
        )
        .route("/rooms/:id/bookings", get(rooms::room_bookings))
        .route("/rooms/:id/availability", get(rooms::availability))
        // Bookings
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route(
            "/bookings/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .route("/bookings/:id/approve", post(bookings::approve_booking))
        .route("/bookings/:id/reject", post(bookings::reject_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:id/complete", post(bookings::complete_booking))
        // Requests
        .route("/requests", get(requests::list_requests).post(requests::create_request))
        .route(
            "/requests/:id",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/requests/:id/submit", post(requests::submit_request))
        .route("/requests/:id/withdraw", post(requests::withdraw_request))
        .route("/requests/:id/review", post(requests::review_request))
        .route("/requests/:id/approve", post(requests::approve_request))
        .route("/requests/:id/reject", post(requests::reject_request))
        .route("/requests/:id/complete", post(requests::complete_request))
        .route("/requests/:id/comments", post(requests::add_comment))
        .route("/requests/:id/documents", post(requests::attach_document))
        .route("/requests/:id/documents/:doc_id", delete(requests::remove_document))
        // Buildings
        .route("/buildings", get(buildings::list_buildings).post(buildings::create_building))
        .route(
            "/buildings/:id",
            get(buildings::get_building)
                .put(buildings::update_building)
                .delete(buildings::delete_building),
        )
        .route("/buildings/:id/floors", get(buildings::building_floors))
        .route("/buildings/:id/tenants", get(buildings::building_tenants))
        .route("/buildings/:id/available-units", get(buildings::available_units))
        .route("/buildings/:id/occupancy", get(buildings::occupancy))
        // Floors
        .route("/floors", post(buildings::create_floor))
        .route(
            "/floors/:id",
            get(buildings::get_floor)
                .put(buildings::update_floor)
                .delete(buildings::delete_floor),
        )
        .route("/floors/:id/units", get(buildings::floor_units))
        // Units
        .route("/units", post(buildings::create_unit))
        .route(
            "/units/:id",
            get(buildings::get_unit)
                .put(buildings::update_unit)
                .delete(buildings::delete_unit),
        )
        // Tenants
        .route("/tenants", get(buildings::list_tenants).post(buildings::create_tenant))
        .route(
            "/tenants/:id",
            get(buildings::get_tenant)
                .put(buildings::update_tenant)
                .delete(buildings::delete_tenant),
        )
        // Emergency incidents
        .route(
            "/incidents",
            get(emergency::list_incidents).post(emergency::report_incident),
        )
        .route("/incidents/critical", get(emergency::critical_incidents))
        .route("/incidents/:id", get(emergency::get_incident))
        .route("/incidents/:id/acknowledge", post(emergency::acknowledge_incident))
        .route("/incidents/:id/respond", post(emergency::respond_incident))
        .route("/incidents/:id/resolve", post(emergency::resolve_incident))
        .route("/incidents/:id/close", post(emergency::close_incident))
        .route("/incidents/:id/updates", post(emergency::add_incident_update))
        .route(
            "/emergency-contacts",
            get(emergency::list_contacts).post(emergency::create_contact),
        )
        .route(
            "/emergency-contacts/:id",
            put(emergency::update_contact).delete(emergency::delete_contact),
        )
        // Billing
        .route("/invoices", get(billing::list_invoices).post(billing::create_invoice))
        .route("/invoices/overdue", get(billing::overdue_invoices))
        .route("/invoices/revenue", get(billing::revenue))
        .route(
            "/invoices/:id",
            get(billing::get_invoice)
                .put(billing::update_invoice)
                .delete(billing::delete_invoice),
        )
        .route("/invoices/:id/status", post(billing::set_invoice_status))
        .route(
            "/invoices/:id/payments",
            get(billing::list_payments).post(billing::add_payment),
        )
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/notifications/:id", delete(notifications::delete_notification))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}


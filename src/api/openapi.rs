//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, billing, bookings, buildings, emergency, health, notifications, requests, rooms, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Building Portal API",
        version = "1.0.0",
        description = "Building management portal REST API: meeting-room bookings, tenant requests, the building registry, emergency incidents and billing"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::permissions,
        // Users
        users::list_users,
        // Rooms
        rooms::list_rooms,
        rooms::get_room,
        rooms::create_room,
        rooms::update_room,
        rooms::delete_room,
        rooms::room_bookings,
        rooms::availability,
        // Bookings
        bookings::list_bookings,
        bookings::get_booking,
        bookings::create_booking,
        bookings::approve_booking,
        bookings::reject_booking,
        bookings::cancel_booking,
        bookings::complete_booking,
        bookings::delete_booking,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::delete_request,
        requests::submit_request,
        requests::withdraw_request,
        requests::review_request,
        requests::approve_request,
        requests::reject_request,
        requests::complete_request,
        requests::add_comment,
        requests::attach_document,
        requests::remove_document,
        // Buildings
        buildings::list_buildings,
        buildings::get_building,
        buildings::create_building,
        buildings::update_building,
        buildings::delete_building,
        buildings::building_floors,
        buildings::building_tenants,
        buildings::available_units,
        buildings::occupancy,
        buildings::get_floor,
        buildings::create_floor,
        buildings::update_floor,
        buildings::delete_floor,
        buildings::floor_units,
        buildings::get_unit,
        buildings::create_unit,
        buildings::update_unit,
        buildings::delete_unit,
        buildings::list_tenants,
        buildings::get_tenant,
        buildings::create_tenant,
        buildings::update_tenant,
        buildings::delete_tenant,
        // Emergency
        emergency::list_incidents,
        emergency::critical_incidents,
        emergency::get_incident,
        emergency::report_incident,
        emergency::acknowledge_incident,
        emergency::respond_incident,
        emergency::resolve_incident,
        emergency::close_incident,
        emergency::add_incident_update,
        emergency::list_contacts,
        emergency::create_contact,
        emergency::update_contact,
        emergency::delete_contact,
        // Billing
        billing::list_invoices,
        billing::overdue_invoices,
        billing::revenue,
        billing::get_invoice,
        billing::create_invoice,
        billing::update_invoice,
        billing::delete_invoice,
        billing::set_invoice_status,
        billing::list_payments,
        billing::add_payment,
        // Notifications
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::PermissionsResponse,
            crate::models::permission::Permission,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserShort,
            // Rooms and bookings
            crate::models::booking::Room,
            crate::models::booking::CreateRoom,
            crate::models::booking::UpdateRoom,
            crate::models::booking::TimeSlot,
            crate::models::booking::BookingStatus,
            crate::models::booking::Booking,
            crate::models::booking::BookingDetails,
            crate::models::booking::CreateBooking,
            crate::models::booking::RejectBooking,
            // Requests
            crate::models::request::RequestType,
            crate::models::request::RequestPriority,
            crate::models::request::RequestStatus,
            crate::models::request::Request,
            crate::models::request::RequestComment,
            crate::models::request::RequestDocument,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            crate::models::request::ApproveRequest,
            crate::models::request::RejectRequest,
            crate::models::request::CompleteRequest,
            crate::models::request::AddComment,
            crate::models::request::AttachDocument,
            // Buildings
            crate::models::building::Building,
            crate::models::building::CreateBuilding,
            crate::models::building::UpdateBuilding,
            crate::models::building::Floor,
            crate::models::building::CreateFloor,
            crate::models::building::UpdateFloor,
            crate::models::building::UnitType,
            crate::models::building::Unit,
            crate::models::building::CreateUnit,
            crate::models::building::UpdateUnit,
            crate::models::building::TenantStatus,
            crate::models::building::Tenant,
            crate::models::building::CreateTenant,
            crate::models::building::UpdateTenant,
            crate::models::building::Occupancy,
            // Emergency
            crate::models::incident::IncidentCategory,
            crate::models::incident::IncidentSeverity,
            crate::models::incident::IncidentStatus,
            crate::models::incident::Incident,
            crate::models::incident::IncidentUpdate,
            crate::models::incident::ReportIncident,
            crate::models::incident::StartResponse,
            crate::models::incident::AddIncidentUpdate,
            crate::models::incident::ContactAvailability,
            crate::models::incident::EmergencyContact,
            crate::models::incident::CreateContact,
            crate::models::incident::UpdateContact,
            // Billing
            crate::models::billing::InvoiceStatus,
            crate::models::billing::InvoiceItemType,
            crate::models::billing::InvoiceItem,
            crate::models::billing::InvoiceItemInput,
            crate::models::billing::Invoice,
            crate::models::billing::CreateInvoice,
            crate::models::billing::UpdateInvoice,
            crate::models::billing::SetInvoiceStatus,
            crate::models::billing::PaymentMethod,
            crate::models::billing::Payment,
            crate::models::billing::RecordPayment,
            crate::models::billing::PaymentReceipt,
            crate::models::billing::Revenue,
            // Notifications
            crate::models::notification::NotificationLevel,
            crate::models::notification::Notification,
            crate::models::notification::UnreadCount,
            notifications::MarkAllReadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Portal users"),
        (name = "rooms", description = "Meeting rooms and availability"),
        (name = "bookings", description = "Meeting-room booking workflow"),
        (name = "requests", description = "Tenant service request workflow"),
        (name = "buildings", description = "Buildings, floors and units"),
        (name = "tenants", description = "Tenant management"),
        (name = "emergency", description = "Emergency incidents and contacts"),
        (name = "billing", description = "Tenant invoices and payments"),
        (name = "notifications", description = "Per-user notification inbox")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

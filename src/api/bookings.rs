//! Meeting-room booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        booking::{BookingDetails, BookingQuery, CreateBooking, RejectBooking},
        permission::Permission,
    },
};

use super::AuthenticatedUser;

/// List bookings (own bookings only without bookings.view.all)
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "List of bookings", body = Vec<BookingDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Cannot view bookings")
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    claims.require_any(&[Permission::BookingsViewAll, Permission::BookingsViewOwn])?;

    let bookings = state.services.bookings.list(&claims.actor(), query)?;
    Ok(Json(bookings))
}

/// Get booking details by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 403, description = "Not your booking"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookingDetails>> {
    claims.require_any(&[Permission::BookingsViewAll, Permission::BookingsViewOwn])?;

    let booking = state.services.bookings.get(&claims.actor(), &id)?;
    Ok(Json(booking))
}

/// Request a meeting room (the booking starts out pending)
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking requested", body = BookingDetails),
        (status = 400, description = "Invalid time range"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Overlaps an existing booking")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    claims.require(Permission::BookingsCreate)?;

    let booking = state.services.bookings.request(&claims.actor(), data)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve a pending booking
#[utoipa::path(
    post,
    path = "/bookings/{id}/approve",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking approved", body = BookingDetails),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Not pending, or clashes with an approved booking")
    )
)]
pub async fn approve_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookingDetails>> {
    claims.require(Permission::BookingsApprove)?;

    let booking = state.services.bookings.approve(&claims.actor(), &id)?;
    Ok(Json(booking))
}

/// Reject a pending booking with a reason
#[utoipa::path(
    post,
    path = "/bookings/{id}/reject",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    request_body = RejectBooking,
    responses(
        (status = 200, description = "Booking rejected", body = BookingDetails),
        (status = 400, description = "Missing reason"),
        (status = 409, description = "Booking is not pending")
    )
)]
pub async fn reject_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<RejectBooking>,
) -> AppResult<Json<BookingDetails>> {
    claims.require(Permission::BookingsApprove)?;

    let booking = state
        .services
        .bookings
        .reject(&claims.actor(), &id, &data.reason)?;
    Ok(Json(booking))
}

/// Cancel a pending or approved booking
#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingDetails),
        (status = 403, description = "Not your booking"),
        (status = 409, description = "Booking already closed")
    )
)]
pub async fn cancel_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.cancel(&claims.actor(), &id)?;
    Ok(Json(booking))
}

/// Mark an approved booking as completed
#[utoipa::path(
    post,
    path = "/bookings/{id}/complete",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking completed", body = BookingDetails),
        (status = 409, description = "Booking is not approved")
    )
)]
pub async fn complete_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookingDetails>> {
    claims.require(Permission::BookingsApprove)?;

    let booking = state.services.bookings.complete(&claims.actor(), &id)?;
    Ok(Json(booking))
}

/// Delete a booking record
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn delete_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BookingsEdit)?;

    state.services.bookings.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

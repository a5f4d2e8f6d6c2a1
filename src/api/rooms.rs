//! Meeting room endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        booking::{BookingDetails, CreateRoom, DateQuery, Room, TimeSlot, UpdateRoom},
        permission::Permission,
    },
};

use super::AuthenticatedUser;

/// List meeting rooms
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of rooms", body = Vec<Room>),
        (status = 403, description = "Missing building.view")
    )
)]
pub async fn list_rooms(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Room>>> {
    claims.require(Permission::BuildingView)?;

    let rooms = state.services.bookings.list_rooms()?;
    Ok(Json(rooms))
}

/// Get room details by ID
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room details", body = Room),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Room>> {
    claims.require(Permission::BuildingView)?;

    let room = state.services.bookings.get_room(&id)?;
    Ok(Json(room))
}

/// Create a meeting room
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    request_body = CreateRoom,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing building.rooms.manage")
    )
)]
pub async fn create_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<Room>)> {
    claims.require(Permission::BuildingRoomsManage)?;

    let room = state.services.bookings.create_room(data)?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// Update a meeting room
#[utoipa::path(
    put,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Room ID")
    ),
    request_body = UpdateRoom,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found")
    )
)]
pub async fn update_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateRoom>,
) -> AppResult<Json<Room>> {
    claims.require(Permission::BuildingRoomsManage)?;

    let room = state.services.bookings.update_room(&id, &data)?;
    Ok(Json(room))
}

/// Delete a meeting room
#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Room ID")
    ),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room still has active bookings")
    )
)]
pub async fn delete_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BuildingRoomsManage)?;

    state.services.bookings.delete_room(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bookings of a room on a day (rejected and cancelled excluded; own only without bookings.view.all)
#[utoipa::path(
    get,
    path = "/rooms/{id}/bookings",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Room ID"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Bookings of the day", body = Vec<BookingDetails>),
        (status = 403, description = "Missing bookings.view.all or bookings.view.own"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn room_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    claims.require_any(&[Permission::BookingsViewAll, Permission::BookingsViewOwn])?;

    let bookings = state
        .services
        .bookings
        .by_room(&claims.actor(), &id, query.date)?;
    Ok(Json(bookings))
}

/// Free time slots of a room within business hours
#[utoipa::path(
    get,
    path = "/rooms/{id}/availability",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Room ID"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Free intervals, sorted", body = Vec<TimeSlot>),
        (status = 404, description = "Room not found")
    )
)]
pub async fn availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    claims.require(Permission::BuildingView)?;

    let slots = state.services.bookings.available_slots(&id, query.date)?;
    Ok(Json(slots))
}

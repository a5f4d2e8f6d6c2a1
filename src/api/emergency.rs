//! Emergency incident and contact endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        incident::{
            AddIncidentUpdate, CreateContact, EmergencyContact, Incident, IncidentQuery,
            IncidentUpdate, ReportIncident, StartResponse, UpdateContact,
        },
        permission::Permission,
    },
};

use super::AuthenticatedUser;

const VIEW: [Permission; 2] = [Permission::EmergencyView, Permission::EmergencyCreate];
const UPDATE: [Permission; 2] = [Permission::EmergencyRespond, Permission::EmergencyCreate];

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

/// List incidents (own reports only without emergency.view)
#[utoipa::path(
    get,
    path = "/incidents",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(IncidentQuery),
    responses(
        (status = 200, description = "Incidents, newest first", body = Vec<Incident>),
        (status = 403, description = "Cannot view incidents")
    )
)]
pub async fn list_incidents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<IncidentQuery>,
) -> AppResult<Json<Vec<Incident>>> {
    claims.require_any(&VIEW)?;

    let incidents = state.services.emergency.list(&claims.actor(), query)?;
    Ok(Json(incidents))
}

/// Unresolved critical incidents
#[utoipa::path(
    get,
    path = "/incidents/critical",
    tag = "emergency",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Critical incidents still open", body = Vec<Incident>),
        (status = 403, description = "Missing emergency.view")
    )
)]
pub async fn critical_incidents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Incident>>> {
    claims.require(Permission::EmergencyView)?;

    let incidents = state.services.emergency.critical()?;
    Ok(Json(incidents))
}

#[utoipa::path(
    get,
    path = "/incidents/{id}",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident details", body = Incident),
        (status = 403, description = "Not your report"),
        (status = 404, description = "Incident not found")
    )
)]
pub async fn get_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Incident>> {
    claims.require_any(&VIEW)?;

    let incident = state.services.emergency.get(&claims.actor(), &id)?;
    Ok(Json(incident))
}

/// Report an incident; the top emergency contacts are alerted
#[utoipa::path(
    post,
    path = "/incidents",
    tag = "emergency",
    security(("bearer_auth" = [])),
    request_body = ReportIncident,
    responses(
        (status = 201, description = "Incident reported", body = Incident),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Building not found")
    )
)]
pub async fn report_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<ReportIncident>,
) -> AppResult<(StatusCode, Json<Incident>)> {
    claims.require(Permission::EmergencyCreate)?;

    let incident = state.services.emergency.report(&claims.actor(), data)?;
    Ok((StatusCode::CREATED, Json(incident)))
}

#[utoipa::path(
    post,
    path = "/incidents/{id}/acknowledge",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident acknowledged", body = Incident),
        (status = 409, description = "Incident is not newly reported")
    )
)]
pub async fn acknowledge_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Incident>> {
    claims.require(Permission::EmergencyRespond)?;

    let incident = state.services.emergency.acknowledge(&claims.actor(), &id)?;
    Ok(Json(incident))
}

/// Start responding, optionally assigning someone
#[utoipa::path(
    post,
    path = "/incidents/{id}/respond",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    request_body = StartResponse,
    responses(
        (status = 200, description = "Response under way", body = Incident),
        (status = 409, description = "Incident is not acknowledged")
    )
)]
pub async fn respond_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    body: Option<Json<StartResponse>>,
) -> AppResult<Json<Incident>> {
    claims.require(Permission::EmergencyRespond)?;

    let data = body.map(|Json(data)| data).unwrap_or_default();
    let incident = state.services.emergency.start_response(
        &claims.actor(),
        &id,
        data.assigned_to.as_deref(),
    )?;
    Ok(Json(incident))
}

#[utoipa::path(
    post,
    path = "/incidents/{id}/resolve",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident resolved", body = Incident),
        (status = 409, description = "Incident already resolved or closed")
    )
)]
pub async fn resolve_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Incident>> {
    claims.require(Permission::EmergencyRespond)?;

    let incident = state.services.emergency.resolve(&claims.actor(), &id)?;
    Ok(Json(incident))
}

#[utoipa::path(
    post,
    path = "/incidents/{id}/close",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident closed", body = Incident),
        (status = 409, description = "Incident is not resolved")
    )
)]
pub async fn close_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Incident>> {
    claims.require(Permission::EmergencyRespond)?;

    let incident = state.services.emergency.close(&claims.actor(), &id)?;
    Ok(Json(incident))
}

/// Add to the incident timeline (responders and the reporter)
#[utoipa::path(
    post,
    path = "/incidents/{id}/updates",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Incident ID")
    ),
    request_body = AddIncidentUpdate,
    responses(
        (status = 201, description = "Update added", body = IncidentUpdate),
        (status = 403, description = "Neither responder nor reporter"),
        (status = 422, description = "Incident is closed")
    )
)]
pub async fn add_incident_update(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<AddIncidentUpdate>,
) -> AppResult<(StatusCode, Json<IncidentUpdate>)> {
    claims.require_any(&UPDATE)?;

    let update = state
        .services
        .emergency
        .add_update(&claims.actor(), &id, &data.content)?;
    Ok((StatusCode::CREATED, Json(update)))
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Emergency contacts by priority
#[utoipa::path(
    get,
    path = "/emergency-contacts",
    tag = "emergency",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Contacts, priority 1 first", body = Vec<EmergencyContact>)
    )
)]
pub async fn list_contacts(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<EmergencyContact>>> {
    claims.require_any(&VIEW)?;

    let contacts = state.services.emergency.contacts()?;
    Ok(Json(contacts))
}

#[utoipa::path(
    post,
    path = "/emergency-contacts",
    tag = "emergency",
    security(("bearer_auth" = [])),
    request_body = CreateContact,
    responses(
        (status = 201, description = "Contact added", body = EmergencyContact),
        (status = 403, description = "Missing emergency.respond")
    )
)]
pub async fn create_contact(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<EmergencyContact>)> {
    claims.require(Permission::EmergencyRespond)?;

    let contact = state.services.emergency.create_contact(data)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    put,
    path = "/emergency-contacts/{id}",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Contact ID")
    ),
    request_body = UpdateContact,
    responses(
        (status = 200, description = "Contact updated", body = EmergencyContact),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn update_contact(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateContact>,
) -> AppResult<Json<EmergencyContact>> {
    claims.require(Permission::EmergencyRespond)?;

    let contact = state.services.emergency.update_contact(&id, &data)?;
    Ok(Json(contact))
}

#[utoipa::path(
    delete,
    path = "/emergency-contacts/{id}",
    tag = "emergency",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Contact ID")
    ),
    responses(
        (status = 204, description = "Contact removed"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn delete_contact(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::EmergencyRespond)?;

    state.services.emergency.delete_contact(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

//! Tenant service request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        permission::Permission,
        request::{
            AddComment, ApproveRequest, AttachDocument, CompleteRequest, CreateRequest,
            RejectRequest, Request, RequestComment, RequestDocument, RequestQuery, UpdateRequest,
        },
    },
};

use super::AuthenticatedUser;

const VIEW: [Permission; 2] = [Permission::RequestsViewAll, Permission::RequestsViewOwn];
const MODIFY: [Permission; 2] = [Permission::RequestsCreate, Permission::RequestsEdit];

/// List requests (own requests only without requests.view.all)
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "List of requests, newest first", body = Vec<Request>),
        (status = 403, description = "Cannot view requests")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<Request>>> {
    claims.require_any(&VIEW)?;

    let requests = state.services.requests.list(&claims.actor(), query)?;
    Ok(Json(requests))
}

/// Get request details by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = Request),
        (status = 403, description = "Not your request"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Request>> {
    claims.require_any(&VIEW)?;

    let request = state.services.requests.get(&claims.actor(), &id)?;
    Ok(Json(request))
}

/// Create a request (submitted unless `draft` is true)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = Request),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    claims.require(Permission::RequestsCreate)?;

    let request = state.services.requests.create(&claims.actor(), data)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Update a draft or submitted request
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = Request),
        (status = 422, description = "Request is no longer editable")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateRequest>,
) -> AppResult<Json<Request>> {
    claims.require_any(&MODIFY)?;

    let request = state.services.requests.update(&claims.actor(), &id, &data)?;
    Ok(Json(request))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::RequestsEdit)?;

    state.services.requests.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a draft
#[utoipa::path(
    post,
    path = "/requests/{id}/submit",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request submitted", body = Request),
        (status = 409, description = "Request is not a draft")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Request>> {
    claims.require_any(&MODIFY)?;

    let request = state.services.requests.submit(&claims.actor(), &id)?;
    Ok(Json(request))
}

/// Withdraw a submitted request back to draft
#[utoipa::path(
    post,
    path = "/requests/{id}/withdraw",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request back to draft", body = Request),
        (status = 409, description = "Request is not submitted")
    )
)]
pub async fn withdraw_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Request>> {
    claims.require_any(&MODIFY)?;

    let request = state.services.requests.withdraw(&claims.actor(), &id)?;
    Ok(Json(request))
}

/// Put a submitted request under review
#[utoipa::path(
    post,
    path = "/requests/{id}/review",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request under review", body = Request),
        (status = 409, description = "Request is not submitted")
    )
)]
pub async fn review_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Request>> {
    claims.require(Permission::RequestsApprove)?;

    let request = state.services.requests.start_review(&claims.actor(), &id)?;
    Ok(Json(request))
}

/// Approve a request, optionally with a comment
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Request approved", body = Request),
        (status = 409, description = "Request cannot be approved in its status")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> AppResult<Json<Request>> {
    claims.require(Permission::RequestsApprove)?;

    let data = body.map(|Json(data)| data).unwrap_or_default();
    let request = state
        .services
        .requests
        .approve(&claims.actor(), &id, data.comment.as_deref())?;
    Ok(Json(request))
}

/// Reject a request with a reason
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = Request),
        (status = 400, description = "Missing reason"),
        (status = 409, description = "Request cannot be rejected in its status")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<RejectRequest>,
) -> AppResult<Json<Request>> {
    claims.require(Permission::RequestsReject)?;

    let request = state
        .services
        .requests
        .reject(&claims.actor(), &id, &data.reason)?;
    Ok(Json(request))
}

/// Complete an approved request
#[utoipa::path(
    post,
    path = "/requests/{id}/complete",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Request completed", body = Request),
        (status = 409, description = "Request is not approved")
    )
)]
pub async fn complete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> AppResult<Json<Request>> {
    claims.require(Permission::RequestsApprove)?;

    let data = body.map(|Json(data)| data).unwrap_or_default();
    let request = state
        .services
        .requests
        .complete(&claims.actor(), &id, data.actual_cost)?;
    Ok(Json(request))
}

/// Add a comment to the request thread
#[utoipa::path(
    post,
    path = "/requests/{id}/comments",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = AddComment,
    responses(
        (status = 201, description = "Comment added", body = RequestComment),
        (status = 400, description = "Empty comment")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<AddComment>,
) -> AppResult<(StatusCode, Json<RequestComment>)> {
    claims.require_any(&VIEW)?;

    let comment = state
        .services
        .requests
        .add_comment(&claims.actor(), &id, &data.content)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Attach a document to the request
#[utoipa::path(
    post,
    path = "/requests/{id}/documents",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    request_body = AttachDocument,
    responses(
        (status = 201, description = "Document attached", body = RequestDocument),
        (status = 400, description = "Too large or unsupported type"),
        (status = 422, description = "Request is closed")
    )
)]
pub async fn attach_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<AttachDocument>,
) -> AppResult<(StatusCode, Json<RequestDocument>)> {
    claims.require_any(&MODIFY)?;

    let document = state
        .services
        .requests
        .attach_document(&claims.actor(), &id, data)?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Remove a document from a draft or submitted request
#[utoipa::path(
    delete,
    path = "/requests/{id}/documents/{doc_id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Request ID"),
        ("doc_id" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document removed"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn remove_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, doc_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    claims.require_any(&MODIFY)?;

    state
        .services
        .requests
        .remove_document(&claims.actor(), &id, &doc_id)?;
    Ok(StatusCode::NO_CONTENT)
}

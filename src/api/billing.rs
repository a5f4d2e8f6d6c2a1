//! Invoice and payment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;

use crate::{
    error::AppResult,
    models::{
        billing::{
            CreateInvoice, Invoice, InvoiceQuery, Payment, PaymentReceipt, RecordPayment,
            Revenue, RevenueQuery, SetInvoiceStatus, UpdateInvoice,
        },
        permission::Permission,
    },
};

use super::AuthenticatedUser;

const CHANGE_STATUS: [Permission; 2] = [Permission::BillingCreate, Permission::BillingEdit];

/// List invoices, latest first
#[utoipa::path(
    get,
    path = "/invoices",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(InvoiceQuery),
    responses(
        (status = 200, description = "List of invoices", body = Vec<Invoice>),
        (status = 403, description = "Missing billing.view")
    )
)]
pub async fn list_invoices(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    claims.require(Permission::BillingView)?;

    let invoices = state.services.billing.list(&query)?;
    Ok(Json(invoices))
}

/// Outstanding invoices past their due date
#[utoipa::path(
    get,
    path = "/invoices/overdue",
    tag = "billing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue invoices, oldest due date first", body = Vec<Invoice>)
    )
)]
pub async fn overdue_invoices(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Invoice>>> {
    claims.require(Permission::BillingView)?;

    let invoices = state.services.billing.overdue(Local::now().date_naive())?;
    Ok(Json(invoices))
}

/// Revenue from invoices paid within a date range
#[utoipa::path(
    get,
    path = "/invoices/revenue",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(RevenueQuery),
    responses(
        (status = 200, description = "Paid totals", body = Revenue)
    )
)]
pub async fn revenue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<Revenue>> {
    claims.require(Permission::BillingView)?;

    let revenue = state.services.billing.revenue(&query)?;
    Ok(Json(revenue))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Invoice details", body = Invoice),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn get_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Invoice>> {
    claims.require(Permission::BillingView)?;

    let invoice = state.services.billing.get(&id)?;
    Ok(Json(invoice))
}

/// Create a draft invoice
#[utoipa::path(
    post,
    path = "/invoices",
    tag = "billing",
    security(("bearer_auth" = [])),
    request_body = CreateInvoice,
    responses(
        (status = 201, description = "Invoice created", body = Invoice),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn create_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateInvoice>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    claims.require(Permission::BillingCreate)?;

    let invoice = state.services.billing.create(data)?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Edit a draft invoice
#[utoipa::path(
    put,
    path = "/invoices/{id}",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    request_body = UpdateInvoice,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 422, description = "Invoice is no longer a draft")
    )
)]
pub async fn update_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateInvoice>,
) -> AppResult<Json<Invoice>> {
    claims.require(Permission::BillingEdit)?;

    let invoice = state.services.billing.update(&id, &data)?;
    Ok(Json(invoice))
}

#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 409, description = "Only draft or cancelled invoices can be deleted")
    )
)]
pub async fn delete_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BillingEdit)?;

    state.services.billing.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move an invoice through issued, sent, overdue, paid or cancelled
#[utoipa::path(
    post,
    path = "/invoices/{id}/status",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    request_body = SetInvoiceStatus,
    responses(
        (status = 200, description = "Status changed", body = Invoice),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn set_invoice_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<SetInvoiceStatus>,
) -> AppResult<Json<Invoice>> {
    claims.require_any(&CHANGE_STATUS)?;

    let invoice = state.services.billing.set_status(&id, data.status)?;
    Ok(Json(invoice))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}/payments",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Payments, oldest first", body = Vec<Payment>),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn list_payments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Payment>>> {
    claims.require(Permission::BillingView)?;

    let payments = state.services.billing.payments(&id)?;
    Ok(Json(payments))
}

/// Record a payment against an issued, sent or overdue invoice
#[utoipa::path(
    post,
    path = "/invoices/{id}/payments",
    tag = "billing",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Invoice ID")
    ),
    request_body = RecordPayment,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentReceipt),
        (status = 400, description = "Amount must be positive"),
        (status = 422, description = "Invoice does not accept payments")
    )
)]
pub async fn add_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<RecordPayment>,
) -> AppResult<(StatusCode, Json<PaymentReceipt>)> {
    claims.require(Permission::BillingCreate)?;

    let (payment, invoice) = state.services.billing.add_payment(&id, data)?;
    Ok((StatusCode::CREATED, Json(PaymentReceipt { payment, invoice })))
}

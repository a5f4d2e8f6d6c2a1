//! Tenant service requests and their approval state machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::new_id;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Maintenance,
    Construction,
    MoveInOut,
    Equipment,
    Booking,
    Parking,
    Emergency,
    Event,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    /// States reachable in one step
    pub fn allowed_transitions(&self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::Draft => &[RequestStatus::Submitted],
            RequestStatus::Submitted => &[
                RequestStatus::Draft,
                RequestStatus::UnderReview,
                RequestStatus::Approved,
                RequestStatus::Rejected,
            ],
            RequestStatus::UnderReview => &[RequestStatus::Approved, RequestStatus::Rejected],
            RequestStatus::Approved => &[RequestStatus::Completed],
            RequestStatus::Rejected | RequestStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// The submitter may still edit the request
    pub fn is_editable(&self) -> bool {
        matches!(self, RequestStatus::Draft | RequestStatus::Submitted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::Submitted => "submitted",
            RequestStatus::UnderReview => "under_review",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Comment in a request thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestComment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// File attached to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestDocument {
    pub id: String,
    pub name: String,
    pub url: String,
    /// MIME type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Tenant service request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub title: String,
    pub description: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub submitter_id: String,
    pub submitter_name: String,
    pub assigned_to: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,
    pub location: Option<String>,
    pub documents: Vec<RequestDocument>,
    /// Append-only thread
    pub comments: Vec<RequestComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    fn transition(&mut self, next: RequestStatus, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {} and cannot become {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn submit(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(RequestStatus::Submitted, now)
    }

    pub fn withdraw(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(RequestStatus::Draft, now)
    }

    pub fn start_review(&mut self, reviewer: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(RequestStatus::UnderReview, now)?;
        self.reviewed_by = Some(reviewer.to_string());
        self.reviewed_at = Some(now);
        Ok(())
    }

    /// Approve; a non-blank `comment` is appended to the thread as the approver
    pub fn approve(
        &mut self,
        approver_id: &str,
        approver_name: &str,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.transition(RequestStatus::Approved, now)?;
        self.approved_by = Some(approver_id.to_string());
        self.approved_at = Some(now);
        if let Some(content) = comment.map(str::trim).filter(|c| !c.is_empty()) {
            self.add_comment(approver_id, approver_name, content, now)?;
        }
        Ok(())
    }

    pub fn reject(&mut self, reviewer: &str, reason: &str, now: DateTime<Utc>) -> AppResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }
        self.transition(RequestStatus::Rejected, now)?;
        self.rejection_reason = Some(reason.to_string());
        self.reviewed_by = Some(reviewer.to_string());
        self.reviewed_at = Some(now);
        Ok(())
    }

    pub fn complete(&mut self, actual_cost: Option<Decimal>, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(RequestStatus::Completed, now)?;
        self.completed_at = Some(now);
        if actual_cost.is_some() {
            self.actual_cost = actual_cost;
        }
        Ok(())
    }

    /// Append to the thread; allowed in every state
    pub fn add_comment(
        &mut self,
        user_id: &str,
        user_name: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<RequestComment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        let comment = RequestComment {
            id: new_id("comment"),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            content: content.to_string(),
            created_at: now,
        };
        self.comments.push(comment.clone());
        self.updated_at = now;
        Ok(comment)
    }

    pub fn attach_document(&mut self, document: RequestDocument, now: DateTime<Utc>) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::BusinessRule(format!(
                "Cannot attach documents to a {} request",
                self.status
            )));
        }
        self.documents.push(document);
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_document(&mut self, document_id: &str, now: DateTime<Utc>) -> AppResult<RequestDocument> {
        self.ensure_editable()?;
        let index = self
            .documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", document_id)))?;
        self.updated_at = now;
        Ok(self.documents.remove(index))
    }

    pub fn ensure_editable(&self) -> AppResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(AppError::BusinessRule(format!(
                "A {} request can no longer be edited",
                self.status
            )))
        }
    }

    pub fn apply(&mut self, data: &UpdateRequest, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_editable()?;
        if let Some(request_type) = data.request_type {
            self.request_type = request_type;
        }
        if let Some(ref title) = data.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::Validation("Title cannot be empty".to_string()));
            }
            self.title = title.to_string();
        }
        if let Some(ref description) = data.description {
            self.description = description.clone();
        }
        if let Some(priority) = data.priority {
            self.priority = priority;
        }
        if data.assigned_to.is_some() {
            self.assigned_to = data.assigned_to.clone();
        }
        if data.due_date.is_some() {
            self.due_date = data.due_date;
        }
        if data.estimated_cost.is_some() {
            self.estimated_cost = data.estimated_cost;
        }
        if data.location.is_some() {
            self.location = data.location.clone();
        }
        self.updated_at = now;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Create request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub priority: RequestPriority,
    pub due_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    pub location: Option<String>,
    /// Keep the request as a draft instead of submitting it
    #[serde(default)]
    pub draft: bool,
}

/// Update request payload (draft or submitted requests only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub priority: Option<RequestPriority>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CompleteRequest {
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddComment {
    pub content: String,
}

/// Attach document payload (the file itself is stored elsewhere)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AttachDocument {
    #[validate(length(min = 1, message = "Document name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Document URL is required"))]
    pub url: String,
    pub content_type: String,
    pub size: u64,
}

/// Query parameters for requests
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub submitter_id: Option<String>,
    pub status: Option<RequestStatus>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
}

impl RequestQuery {
    pub fn matches(&self, request: &Request) -> bool {
        self.submitter_id.as_ref().map_or(true, |s| &request.submitter_id == s)
            && self.status.map_or(true, |s| request.status == s)
            && self.request_type.map_or(true, |t| request.request_type == t)
    }
}

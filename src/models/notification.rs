//! User notifications emitted by workflow transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: String,
    /// Recipient
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub related_booking_id: Option<String>,
    pub related_request_id: Option<String>,
}

/// Notification to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    pub related_booking_id: Option<String>,
    pub related_request_id: Option<String>,
}

impl NewNotification {
    /// Notification not tied to a booking or request
    pub fn general(
        user_id: &str,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.into(),
            message: message.into(),
            level,
            related_booking_id: None,
            related_request_id: None,
        }
    }

    pub fn booking(
        user_id: &str,
        booking_id: &str,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.into(),
            message: message.into(),
            level,
            related_booking_id: Some(booking_id.to_string()),
            related_request_id: None,
        }
    }

    pub fn request(
        user_id: &str,
        request_id: &str,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.into(),
            message: message.into(),
            level,
            related_booking_id: None,
            related_request_id: Some(request_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread: usize,
}

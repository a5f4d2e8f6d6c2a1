//! Emergency incidents, their response workflow and the contact roster

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    Fire,
    Security,
    Medical,
    Infrastructure,
    Weather,
    Power,
    Water,
    Elevator,
    Hvac,
    Other,
}

impl IncidentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Fire => "fire",
            IncidentCategory::Security => "security",
            IncidentCategory::Medical => "medical",
            IncidentCategory::Infrastructure => "infrastructure",
            IncidentCategory::Weather => "weather",
            IncidentCategory::Power => "power",
            IncidentCategory::Water => "water",
            IncidentCategory::Elevator => "elevator",
            IncidentCategory::Hvac => "hvac",
            IncidentCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// Incident lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    Acknowledged,
    Responding,
    Resolved,
    Closed,
}

impl IncidentStatus {
    /// States reachable in one step
    pub fn allowed_transitions(&self) -> &'static [IncidentStatus] {
        match self {
            IncidentStatus::Reported => &[IncidentStatus::Acknowledged, IncidentStatus::Resolved],
            IncidentStatus::Acknowledged => &[IncidentStatus::Responding, IncidentStatus::Resolved],
            IncidentStatus::Responding => &[IncidentStatus::Resolved],
            IncidentStatus::Resolved => &[IncidentStatus::Closed],
            IncidentStatus::Closed => &[],
        }
    }

    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Still needs attention
    pub fn is_active(&self) -> bool {
        !matches!(self, IncidentStatus::Resolved | IncidentStatus::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Reported => "reported",
            IncidentStatus::Acknowledged => "acknowledged",
            IncidentStatus::Responding => "responding",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entry in an incident's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IncidentUpdate {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub location: String,
    pub building_id: String,
    pub reported_by: String,
    pub reporter_name: String,
    pub reporter_phone: Option<String>,
    pub status: IncidentStatus,
    pub assigned_to: Option<String>,
    /// Users who acknowledged the incident, in order
    pub responded_by: Vec<String>,
    /// First acknowledgement
    pub response_time: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updates: Vec<IncidentUpdate>,
    /// Emergency contact ids alerted so far
    pub notified_contacts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    fn transition(&mut self, next: IncidentStatus, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Incident {} is {} and cannot become {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn acknowledge(&mut self, user_id: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(IncidentStatus::Acknowledged, now)?;
        if !self.responded_by.iter().any(|u| u == user_id) {
            self.responded_by.push(user_id.to_string());
        }
        self.response_time.get_or_insert(now);
        self.log(user_id, "System", "Incident acknowledged", now)
    }

    /// Responders are on site; `assignee` takes ownership when given
    pub fn start_response(
        &mut self,
        user_id: &str,
        assignee: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.transition(IncidentStatus::Responding, now)?;
        self.assigned_to = Some(assignee.unwrap_or(user_id).to_string());
        self.log(user_id, "System", "Response under way", now)
    }

    pub fn resolve(&mut self, user_id: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(IncidentStatus::Resolved, now)?;
        self.resolved_at = Some(now);
        self.response_time.get_or_insert(now);
        self.log(user_id, "System", "Incident resolved", now)
    }

    pub fn close(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(IncidentStatus::Closed, now)
    }

    /// Append to the timeline; closed incidents are frozen
    pub fn add_update(
        &mut self,
        user_id: &str,
        user_name: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<IncidentUpdate> {
        if self.status == IncidentStatus::Closed {
            return Err(AppError::BusinessRule(format!(
                "Incident {} is closed",
                self.id
            )));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Update cannot be empty".to_string()));
        }
        let update = IncidentUpdate {
            id: new_id("update"),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            content: content.to_string(),
            timestamp: now,
        };
        self.updates.push(update.clone());
        self.updated_at = now;
        Ok(update)
    }

    fn log(&mut self, user_id: &str, user_name: &str, content: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.add_update(user_id, user_name, content, now).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactAvailability {
    #[serde(rename = "24h")]
    AllDay,
    BusinessHours,
    EmergencyOnly,
}

/// Person or desk alerted when incidents are reported
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
    pub availability: ContactAvailability,
    /// 1 is alerted first
    pub priority: u32,
    /// Restricts the contact to one building
    pub building_id: Option<String>,
    /// Portal account receiving in-app alerts
    pub user_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmergencyContact {
    /// Whether the contact covers incidents in `building_id`
    pub fn covers(&self, building_id: &str) -> bool {
        self.is_active && self.building_id.as_deref().map_or(true, |b| b == building_id)
    }

    pub fn apply(&mut self, data: &UpdateContact, now: DateTime<Utc>) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(ref v) = data.$field {
                    self.$field = v.clone();
                }
            };
        }
        set!(name);
        set!(role);
        set!(phone);
        set!(email);
        set!(availability);
        set!(priority);
        set!(is_active);
        if data.building_id.is_some() {
            self.building_id = data.building_id.clone();
        }
        if data.user_id.is_some() {
            self.user_id = data.user_id.clone();
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportIncident {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub building_id: String,
    pub reporter_phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartResponse {
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddIncidentUpdate {
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContact {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub availability: ContactAvailability,
    #[validate(range(min = 1, message = "Priority starts at 1"))]
    pub priority: u32,
    pub building_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContact {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub availability: Option<ContactAvailability>,
    #[validate(range(min = 1, message = "Priority starts at 1"))]
    pub priority: Option<u32>,
    pub building_id: Option<String>,
    pub user_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for incidents
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct IncidentQuery {
    pub building_id: Option<String>,
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
    /// Only reported, acknowledged or responding incidents
    #[serde(default)]
    pub active_only: bool,
}

impl IncidentQuery {
    pub fn matches(&self, incident: &Incident) -> bool {
        self.building_id.as_ref().map_or(true, |b| &incident.building_id == b)
            && self.status.map_or(true, |s| incident.status == s)
            && self.severity.map_or(true, |s| incident.severity == s)
            && (!self.active_only || incident.status.is_active())
    }
}

//! Emergency incident reporting and response

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        incident::{
            CreateContact, EmergencyContact, Incident, IncidentQuery, IncidentSeverity,
            IncidentStatus, IncidentUpdate, ReportIncident, UpdateContact,
        },
        new_id,
        notification::{NewNotification, NotificationLevel},
        permission::Permission,
        user::Actor,
    },
    repository::Repository,
};

use super::notifications::{notify, NotificationSink};

/// Contacts alerted on report, by priority
const ALERTED_CONTACTS: usize = 2;
const ALERTED_CONTACTS_CRITICAL: usize = 3;

#[derive(Clone)]
pub struct EmergencyService {
    repository: Repository,
    notifier: Arc<dyn NotificationSink>,
}

impl EmergencyService {
    pub fn new(repository: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    fn ensure_visible(actor: &Actor, incident: &Incident) -> AppResult<()> {
        if incident.reported_by == actor.user_id || actor.has(Permission::EmergencyView) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You can only view incidents you reported".to_string(),
            ))
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// List incidents; without `emergency.view` only the caller's own reports
    pub fn list(&self, actor: &Actor, query: IncidentQuery) -> AppResult<Vec<Incident>> {
        let reported_by = (!actor.has(Permission::EmergencyView)).then_some(actor.user_id.as_str());
        self.repository.incidents.list(&query, reported_by)
    }

    /// Unresolved critical incidents
    pub fn critical(&self) -> AppResult<Vec<Incident>> {
        let query = IncidentQuery {
            severity: Some(IncidentSeverity::Critical),
            active_only: true,
            ..Default::default()
        };
        self.repository.incidents.list(&query, None)
    }

    pub fn get(&self, actor: &Actor, id: &str) -> AppResult<Incident> {
        let incident = self.repository.incidents.get(id)?;
        Self::ensure_visible(actor, &incident)?;
        Ok(incident)
    }

    // -----------------------------------------------------------------------
    // Workflow
    // -----------------------------------------------------------------------

    /// Record a new incident and alert the top contacts for its building
    pub fn report(&self, actor: &Actor, data: ReportIncident) -> AppResult<Incident> {
        data.validate()?;
        let title = data.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        self.repository.buildings.get_building(&data.building_id)?;

        let now = Utc::now();
        let incident = Incident {
            id: new_id("incident"),
            title: title.to_string(),
            description: data.description,
            category: data.category,
            severity: data.severity,
            location: data.location,
            building_id: data.building_id,
            reported_by: actor.user_id.clone(),
            reporter_name: actor.name.clone(),
            reporter_phone: data.reporter_phone,
            status: IncidentStatus::Reported,
            assigned_to: None,
            responded_by: Vec::new(),
            response_time: None,
            resolved_at: None,
            updates: Vec::new(),
            notified_contacts: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let incident = self.repository.incidents.insert(incident)?;
        tracing::warn!(
            incident_id = %incident.id,
            building_id = %incident.building_id,
            category = incident.category.as_str(),
            severity = ?incident.severity,
            reporter = %actor.user_id,
            "Incident reported"
        );

        let count = if incident.severity == IncidentSeverity::Critical {
            ALERTED_CONTACTS_CRITICAL
        } else {
            ALERTED_CONTACTS
        };
        let contacts: Vec<EmergencyContact> = self
            .repository
            .incidents
            .contacts()?
            .into_iter()
            .filter(|c| c.covers(&incident.building_id))
            .take(count)
            .collect();
        self.alert_contacts(&incident.id, &contacts)
    }

    /// Record the alerted contacts and notify those with a portal account
    fn alert_contacts(&self, incident_id: &str, contacts: &[EmergencyContact]) -> AppResult<Incident> {
        let incident = self.repository.incidents.update(incident_id, |i| {
            for contact in contacts {
                if !i.notified_contacts.contains(&contact.id) {
                    i.notified_contacts.push(contact.id.clone());
                }
            }
            Ok(())
        })?;

        let level = if incident.severity == IncidentSeverity::Critical {
            NotificationLevel::Error
        } else {
            NotificationLevel::Warning
        };
        for contact in contacts {
            tracing::info!(incident_id = %incident.id, contact_id = %contact.id, "Emergency contact alerted");
            if let Some(ref user_id) = contact.user_id {
                notify(
                    self.notifier.as_ref(),
                    NewNotification::general(
                        user_id,
                        level,
                        "Emergency incident reported",
                        format!(
                            "{}: {} ({})",
                            incident.category.as_str(),
                            incident.title,
                            incident.location
                        ),
                    ),
                );
            }
        }
        Ok(incident)
    }

    pub fn acknowledge(&self, actor: &Actor, id: &str) -> AppResult<Incident> {
        let incident = self
            .repository
            .incidents
            .update(id, |i| i.acknowledge(&actor.user_id, Utc::now()))?;
        tracing::info!(incident_id = %id, by = %actor.user_id, "Incident acknowledged");
        self.notify_reporter(
            &incident,
            NotificationLevel::Info,
            "Incident acknowledged",
            format!("{} acknowledged \"{}\".", actor.name, incident.title),
        );
        Ok(incident)
    }

    pub fn start_response(&self, actor: &Actor, id: &str, assignee: Option<&str>) -> AppResult<Incident> {
        let incident = self
            .repository
            .incidents
            .update(id, |i| i.start_response(&actor.user_id, assignee, Utc::now()))?;
        tracing::info!(incident_id = %id, by = %actor.user_id, "Incident response started");
        Ok(incident)
    }

    pub fn resolve(&self, actor: &Actor, id: &str) -> AppResult<Incident> {
        let incident = self
            .repository
            .incidents
            .update(id, |i| i.resolve(&actor.user_id, Utc::now()))?;
        tracing::info!(incident_id = %id, by = %actor.user_id, "Incident resolved");
        self.notify_reporter(
            &incident,
            NotificationLevel::Success,
            "Incident resolved",
            format!("\"{}\" has been resolved.", incident.title),
        );
        Ok(incident)
    }

    pub fn close(&self, actor: &Actor, id: &str) -> AppResult<Incident> {
        let incident = self.repository.incidents.update(id, |i| i.close(Utc::now()))?;
        tracing::info!(incident_id = %id, by = %actor.user_id, "Incident closed");
        Ok(incident)
    }

    /// Responders and the reporter may add to the timeline
    pub fn add_update(&self, actor: &Actor, id: &str, content: &str) -> AppResult<IncidentUpdate> {
        let mut added = None;
        self.repository.incidents.update(id, |i| {
            if i.reported_by != actor.user_id && !actor.has(Permission::EmergencyRespond) {
                return Err(AppError::Authorization(
                    "Only responders and the reporter can update an incident".to_string(),
                ));
            }
            added = Some(i.add_update(&actor.user_id, &actor.name, content, Utc::now())?);
            Ok(())
        })?;
        added.ok_or_else(|| AppError::Internal("Incident update was not recorded".to_string()))
    }

    fn notify_reporter(&self, incident: &Incident, level: NotificationLevel, title: &str, message: String) {
        notify(
            self.notifier.as_ref(),
            NewNotification::general(&incident.reported_by, level, title, message),
        );
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    pub fn contacts(&self) -> AppResult<Vec<EmergencyContact>> {
        self.repository.incidents.contacts()
    }

    pub fn create_contact(&self, data: CreateContact) -> AppResult<EmergencyContact> {
        data.validate()?;
        if let Some(ref user_id) = data.user_id {
            self.repository.users.get_by_id(user_id)?;
        }
        let now = Utc::now();
        let contact = EmergencyContact {
            id: new_id("contact"),
            name: data.name,
            role: data.role,
            phone: data.phone,
            email: data.email,
            availability: data.availability,
            priority: data.priority,
            building_id: data.building_id,
            user_id: data.user_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(contact_id = %contact.id, priority = contact.priority, "Emergency contact added");
        self.repository.incidents.insert_contact(contact)
    }

    pub fn update_contact(&self, id: &str, data: &UpdateContact) -> AppResult<EmergencyContact> {
        data.validate()?;
        if let Some(ref user_id) = data.user_id {
            self.repository.users.get_by_id(user_id)?;
        }
        self.repository.incidents.update_contact(id, |c| {
            c.apply(data, Utc::now());
            Ok(())
        })
    }

    pub fn delete_contact(&self, id: &str) -> AppResult<()> {
        self.repository.incidents.delete_contact(id)?;
        tracing::info!(contact_id = %id, "Emergency contact removed");
        Ok(())
    }
}

//! Emergency incidents and contacts store

use crate::{
    error::AppResult,
    models::incident::{EmergencyContact, Incident, IncidentQuery},
};

use super::Table;

#[derive(Clone)]
pub struct IncidentsRepository {
    incidents: Table<Incident>,
    contacts: Table<EmergencyContact>,
}

impl IncidentsRepository {
    pub fn new() -> Self {
        Self {
            incidents: Table::new("Incident"),
            contacts: Table::new("Emergency contact"),
        }
    }

    pub fn get(&self, id: &str) -> AppResult<Incident> {
        self.incidents.fetch(id)
    }

    /// Incidents matching the query, newest first
    pub fn list(&self, query: &IncidentQuery, reported_by: Option<&str>) -> AppResult<Vec<Incident>> {
        let mut incidents = self.incidents.list(|i| {
            query.matches(i) && reported_by.map_or(true, |r| i.reported_by == r)
        })?;
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(incidents)
    }

    pub fn insert(&self, incident: Incident) -> AppResult<Incident> {
        self.incidents.insert(&incident.id.clone(), incident)
    }

    pub fn update<F>(&self, id: &str, f: F) -> AppResult<Incident>
    where
        F: FnOnce(&mut Incident) -> AppResult<()>,
    {
        self.incidents.update(id, f)
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    /// Contacts by ascending priority number
    pub fn contacts(&self) -> AppResult<Vec<EmergencyContact>> {
        let mut contacts = self.contacts.list(|_| true)?;
        contacts.sort_by_key(|c| c.priority);
        Ok(contacts)
    }

    pub fn get_contact(&self, id: &str) -> AppResult<EmergencyContact> {
        self.contacts.fetch(id)
    }

    pub fn insert_contact(&self, contact: EmergencyContact) -> AppResult<EmergencyContact> {
        self.contacts.insert(&contact.id.clone(), contact)
    }

    pub fn update_contact<F>(&self, id: &str, f: F) -> AppResult<EmergencyContact>
    where
        F: FnOnce(&mut EmergencyContact) -> AppResult<()>,
    {
        self.contacts.update(id, f)
    }

    pub fn delete_contact(&self, id: &str) -> AppResult<EmergencyContact> {
        self.contacts.remove(id)
    }
}

impl Default for IncidentsRepository {
    fn default() -> Self {
        Self::new()
    }
}

//! Service requests store

use crate::{
    error::AppResult,
    models::request::{Request, RequestQuery},
};

use super::Table;

#[derive(Clone)]
pub struct RequestsRepository {
    requests: Table<Request>,
}

impl RequestsRepository {
    pub fn new() -> Self {
        Self {
            requests: Table::new("Request"),
        }
    }

    pub fn get(&self, id: &str) -> AppResult<Request> {
        self.requests.fetch(id)
    }

    /// Requests matching the query, newest first
    pub fn list(&self, query: &RequestQuery) -> AppResult<Vec<Request>> {
        let mut requests = self.requests.list(|r| query.matches(r))?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub fn insert(&self, request: Request) -> AppResult<Request> {
        self.requests.insert(&request.id.clone(), request)
    }

    pub fn update<F>(&self, id: &str, f: F) -> AppResult<Request>
    where
        F: FnOnce(&mut Request) -> AppResult<()>,
    {
        self.requests.update(id, f)
    }

    pub fn delete(&self, id: &str) -> AppResult<Request> {
        self.requests.remove(id)
    }
}

impl Default for RequestsRepository {
    fn default() -> Self {
        Self::new()
    }
}

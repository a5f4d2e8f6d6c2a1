//! Repository layer: in-memory stores

pub mod billing;
pub mod bookings;
pub mod buildings;
pub mod incidents;
pub mod notifications;
pub mod requests;
pub mod seed;
pub mod users;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::error::{AppError, AppResult};

/// Rows keyed by id, in insertion order
pub type Rows<T> = IndexMap<String, T>;

/// Shared, lock-protected table of records
#[derive(Debug)]
pub struct Table<T> {
    name: &'static str,
    rows: Arc<RwLock<Rows<T>>>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    pub fn read(&self) -> AppResult<RwLockReadGuard<'_, Rows<T>>> {
        self.rows
            .read()
            .map_err(|_| AppError::Internal(format!("{} store lock poisoned", self.name)))
    }

    pub fn write(&self) -> AppResult<RwLockWriteGuard<'_, Rows<T>>> {
        self.rows
            .write()
            .map_err(|_| AppError::Internal(format!("{} store lock poisoned", self.name)))
    }

    pub fn get(&self, id: &str) -> AppResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Get a row or fail with `NotFound`
    pub fn fetch(&self, id: &str) -> AppResult<T> {
        self.get(id)?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", self.name, id)))
    }

    pub fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.read()?.contains_key(id))
    }

    pub fn list<F>(&self, filter: F) -> AppResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().filter(|row| filter(row)).cloned().collect())
    }

    pub fn insert(&self, id: &str, row: T) -> AppResult<T> {
        self.write()?.insert(id.to_string(), row.clone());
        Ok(row)
    }

    /// Apply `f` to a copy of the row and store it only if `f` succeeds.
    ///
    /// `f` also sees the other rows, all under the same write guard.
    pub fn update_with<F>(&self, id: &str, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut T, &Rows<T>) -> AppResult<()>,
    {
        let mut rows = self.write()?;
        let mut row = rows
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", self.name, id)))?;
        f(&mut row, &rows)?;
        rows.insert(id.to_string(), row.clone());
        Ok(row)
    }

    pub fn update<F>(&self, id: &str, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut T) -> AppResult<()>,
    {
        self.update_with(id, |row, _| f(row))
    }

    pub fn remove(&self, id: &str) -> AppResult<T> {
        self.write()?
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", self.name, id)))
    }
}

/// Main repository struct holding every store
#[derive(Clone)]
pub struct Repository {
    pub users: users::UsersRepository,
    pub bookings: bookings::BookingsRepository,
    pub requests: requests::RequestsRepository,
    pub buildings: buildings::BuildingsRepository,
    pub notifications: notifications::NotificationsRepository,
    pub incidents: incidents::IncidentsRepository,
    pub billing: billing::BillingRepository,
}

impl Repository {
    /// Create a repository with empty stores
    pub fn new() -> Self {
        Self {
            users: users::UsersRepository::new(),
            bookings: bookings::BookingsRepository::new(),
            requests: requests::RequestsRepository::new(),
            buildings: buildings::BuildingsRepository::new(),
            notifications: notifications::NotificationsRepository::new(),
            incidents: incidents::IncidentsRepository::new(),
            billing: billing::BillingRepository::new(),
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        value: i32,
    }

    #[test]
    fn failed_update_leaves_row_untouched() {
        let table = Table::new("Row");
        table.insert("a", Row { value: 1 }).unwrap();

        let result = table.update("a", |row| {
            row.value = 2;
            Err(AppError::Validation("nope".into()))
        });

        assert!(result.is_err());
        assert_eq!(table.fetch("a").unwrap(), Row { value: 1 });
    }

    #[test]
    fn missing_rows_are_not_found() {
        let table: Table<Row> = Table::new("Row");
        assert!(matches!(table.fetch("x"), Err(AppError::NotFound(_))));
        assert!(matches!(table.remove("x"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn remove_keeps_insertion_order() {
        let table = Table::new("Row");
        for (id, value) in [("a", 1), ("b", 2), ("c", 3)] {
            table.insert(id, Row { value }).unwrap();
        }
        table.remove("b").unwrap();
        let values: Vec<i32> = table.list(|_| true).unwrap().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 3]);
    }
}

//! Users store

use crate::{
    error::AppResult,
    models::user::User,
};

use super::Table;

#[derive(Clone)]
pub struct UsersRepository {
    users: Table<User>,
}

impl UsersRepository {
    pub fn new() -> Self {
        Self {
            users: Table::new("User"),
        }
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<User> {
        self.users.fetch(id)
    }

    /// Lookup by e-mail, case-insensitive
    pub fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim();
        Ok(self
            .users
            .read()?
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub fn list(&self) -> AppResult<Vec<User>> {
        self.users.list(|_| true)
    }

    /// Portal accounts belonging to a tenant company
    pub fn by_tenant(&self, tenant_id: &str) -> AppResult<Vec<User>> {
        self.users
            .list(|u| u.tenant_id.as_deref() == Some(tenant_id))
    }

    pub fn insert(&self, user: User) -> AppResult<User> {
        self.users.insert(&user.id.clone(), user)
    }
}

impl Default for UsersRepository {
    fn default() -> Self {
        Self::new()
    }
}

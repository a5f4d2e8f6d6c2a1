//! Notifications store

use crate::{
    error::{AppError, AppResult},
    models::notification::Notification,
};

use super::Table;

#[derive(Clone)]
pub struct NotificationsRepository {
    notifications: Table<Notification>,
}

impl NotificationsRepository {
    pub fn new() -> Self {
        Self {
            notifications: Table::new("Notification"),
        }
    }

    pub fn insert(&self, notification: Notification) -> AppResult<Notification> {
        self.notifications.insert(&notification.id.clone(), notification)
    }

    /// Inbox of a user, newest first
    pub fn by_user(&self, user_id: &str, unread_only: bool) -> AppResult<Vec<Notification>> {
        Ok(self
            .notifications
            .read()?
            .values()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect())
    }

    pub fn unread_count(&self, user_id: &str) -> AppResult<usize> {
        Ok(self
            .notifications
            .read()?
            .values()
            .filter(|n| n.user_id == user_id && !n.read)
            .count())
    }

    /// Mark one notification read; other users' notifications look absent
    pub fn mark_read(&self, user_id: &str, id: &str) -> AppResult<Notification> {
        self.notifications.update(id, |n| {
            if n.user_id != user_id {
                return Err(AppError::NotFound(format!("Notification {} not found", id)));
            }
            n.read = true;
            Ok(())
        })
    }

    /// Returns how many notifications changed
    pub fn mark_all_read(&self, user_id: &str) -> AppResult<usize> {
        let mut rows = self.notifications.write()?;
        let mut changed = 0;
        for n in rows.values_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    pub fn delete(&self, user_id: &str, id: &str) -> AppResult<()> {
        let mut rows = self.notifications.write()?;
        match rows.get(id) {
            Some(n) if n.user_id == user_id => {
                rows.shift_remove(id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("Notification {} not found", id))),
        }
    }
}

impl Default for NotificationsRepository {
    fn default() -> Self {
        Self::new()
    }
}

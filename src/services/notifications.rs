//! Notifications service and the sink workflow services write to

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{
        new_id,
        notification::{NewNotification, Notification},
    },
    repository::Repository,
};

/// Destination for workflow notifications
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: NewNotification) -> AppResult<()>;
}

/// Deliver without letting a failure reach the caller
pub fn notify(sink: &dyn NotificationSink, notification: NewNotification) {
    let user_id = notification.user_id.clone();
    if let Err(e) = sink.deliver(notification) {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to deliver notification");
    }
}

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn list(&self, user_id: &str, unread_only: bool) -> AppResult<Vec<Notification>> {
        self.repository.notifications.by_user(user_id, unread_only)
    }

    pub fn unread_count(&self, user_id: &str) -> AppResult<usize> {
        self.repository.notifications.unread_count(user_id)
    }

    pub fn mark_read(&self, user_id: &str, id: &str) -> AppResult<Notification> {
        self.repository.notifications.mark_read(user_id, id)
    }

    pub fn mark_all_read(&self, user_id: &str) -> AppResult<usize> {
        self.repository.notifications.mark_all_read(user_id)
    }

    pub fn delete(&self, user_id: &str, id: &str) -> AppResult<()> {
        self.repository.notifications.delete(user_id, id)
    }
}

impl NotificationSink for NotificationsService {
    fn deliver(&self, notification: NewNotification) -> AppResult<()> {
        let notification = Notification {
            id: new_id("notification"),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            level: notification.level,
            read: false,
            created_at: Utc::now(),
            related_booking_id: notification.related_booking_id,
            related_request_id: notification.related_request_id,
        };
        tracing::debug!(user_id = %notification.user_id, title = %notification.title, "Notification stored");
        self.repository.notifications.insert(notification)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::notification::NotificationLevel};

    fn note(user_id: &str, title: &str) -> NewNotification {
        NewNotification::booking(user_id, "booking-1", NotificationLevel::Info, title, "msg")
    }

    #[test]
    fn inbox_is_newest_first_and_per_user() {
        let service = NotificationsService::new(Repository::new());
        service.deliver(note("tenant-1", "first")).unwrap();
        service.deliver(note("mgmt-1", "other")).unwrap();
        service.deliver(note("tenant-1", "second")).unwrap();

        let inbox = service.list("tenant-1", false).unwrap();
        let titles: Vec<&str> = inbox.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(service.unread_count("tenant-1").unwrap(), 2);
    }

    #[test]
    fn users_only_touch_their_own_notifications() {
        let service = NotificationsService::new(Repository::new());
        service.deliver(note("tenant-1", "mine")).unwrap();
        let id = service.list("tenant-1", false).unwrap()[0].id.clone();

        assert!(matches!(service.mark_read("mgmt-1", &id), Err(AppError::NotFound(_))));
        assert!(matches!(service.delete("mgmt-1", &id), Err(AppError::NotFound(_))));

        service.mark_read("tenant-1", &id).unwrap();
        assert_eq!(service.unread_count("tenant-1").unwrap(), 0);
        assert!(service.list("tenant-1", true).unwrap().is_empty());

        service.delete("tenant-1", &id).unwrap();
        assert!(service.list("tenant-1", false).unwrap().is_empty());
    }

    #[test]
    fn mark_all_read_counts_changes() {
        let service = NotificationsService::new(Repository::new());
        service.deliver(note("tenant-1", "a")).unwrap();
        service.deliver(note("tenant-1", "b")).unwrap();
        assert_eq!(service.mark_all_read("tenant-1").unwrap(), 2);
        assert_eq!(service.mark_all_read("tenant-1").unwrap(), 0);
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        let mut sink = MockNotificationSink::new();
        sink.expect_deliver()
            .times(1)
            .returning(|_| Err(AppError::Internal("down".into())));
        notify(&sink, note("tenant-1", "lost"));
    }
}

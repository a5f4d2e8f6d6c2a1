//! Meeting-room booking workflow

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    config::BookingsConfig,
    error::{AppError, AppResult},
    models::{
        booking::{
            Booking, BookingDetails, BookingQuery, BookingStatus, BusinessHours, CreateBooking,
            CreateRoom, Room, TimeSlot, UpdateRoom,
        },
        new_id,
        notification::{NewNotification, NotificationLevel},
        permission::Permission,
        user::Actor,
    },
    repository::Repository,
};

use super::notifications::{notify, NotificationSink};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    hours: BusinessHours,
    reject_overlaps: bool,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingsService {
    pub fn new(
        repository: Repository,
        config: &BookingsConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            hours: BusinessHours::new(config.open_time, config.close_time),
            reject_overlaps: config.reject_overlaps,
            notifier,
        }
    }

    pub fn business_hours(&self) -> BusinessHours {
        self.hours
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    pub fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.repository.bookings.list_rooms()
    }

    pub fn get_room(&self, id: &str) -> AppResult<Room> {
        self.repository.bookings.get_room(id)
    }

    pub fn create_room(&self, data: CreateRoom) -> AppResult<Room> {
        data.validate()?;
        let room = Room {
            id: new_id("room"),
            name: data.name,
            floor: data.floor,
            capacity: data.capacity,
            equipment: data.equipment,
            hourly_rate: data.hourly_rate,
            is_active: true,
        };
        tracing::info!(room_id = %room.id, name = %room.name, "Room created");
        self.repository.bookings.insert_room(room)
    }

    pub fn update_room(&self, id: &str, data: &UpdateRoom) -> AppResult<Room> {
        data.validate()?;
        self.repository.bookings.update_room(id, |room| {
            room.apply(data);
            Ok(())
        })
    }

    pub fn delete_room(&self, id: &str) -> AppResult<()> {
        self.repository.bookings.delete_room(id)?;
        tracing::info!(room_id = %id, "Room deleted");
        Ok(())
    }

    /// Bookings of a room starting on `date`, rejected and cancelled excluded.
    /// Without `bookings.view.all` only the caller's own are returned.
    pub fn by_room(
        &self,
        actor: &Actor,
        room_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<BookingDetails>> {
        let room = self.repository.bookings.get_room(room_id)?;
        let view_all = actor.has(Permission::BookingsViewAll);
        let bookings = self.repository.bookings.by_room_and_date(room_id, date)?;
        Ok(bookings
            .into_iter()
            .filter(|b| view_all || b.user_id == actor.user_id)
            .map(|b| Self::with_room(b, Some(&room)))
            .collect())
    }

    /// Free intervals of a room within business hours on `date`
    pub fn available_slots(&self, room_id: &str, date: NaiveDate) -> AppResult<Vec<TimeSlot>> {
        self.repository.bookings.get_room(room_id)?;
        let bookings = self.repository.bookings.holding_slots_on(room_id, date)?;
        Ok(self.hours.free_slots(date, &bookings))
    }

    // -----------------------------------------------------------------------
    // Bookings
    // -----------------------------------------------------------------------

    fn with_room(booking: Booking, room: Option<&Room>) -> BookingDetails {
        BookingDetails {
            room_name: room.map(|r| r.name.clone()),
            estimated_cost: room.and_then(|r| booking.estimated_cost(r)),
            booking,
        }
    }

    fn details(&self, booking: Booking) -> AppResult<BookingDetails> {
        let room = self.repository.bookings.get_room(&booking.room_id).ok();
        Ok(Self::with_room(booking, room.as_ref()))
    }

    /// List bookings; without `bookings.view.all` only the caller's own
    pub fn list(&self, actor: &Actor, mut query: BookingQuery) -> AppResult<Vec<BookingDetails>> {
        if !actor.has(Permission::BookingsViewAll) {
            query.user_id = Some(actor.user_id.clone());
        }
        self.repository
            .bookings
            .list(&query)?
            .into_iter()
            .map(|b| self.details(b))
            .collect()
    }

    pub fn get(&self, actor: &Actor, id: &str) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.get(id)?;
        if booking.user_id != actor.user_id && !actor.has(Permission::BookingsViewAll) {
            return Err(AppError::Authorization(
                "You can only view your own bookings".to_string(),
            ));
        }
        self.details(booking)
    }

    /// Request a room; the booking starts out pending
    pub fn request(&self, actor: &Actor, data: CreateBooking) -> AppResult<BookingDetails> {
        data.validate()?;
        let title = data.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        self.hours.validate_range(data.start_time, data.end_time)?;

        let now = Utc::now();
        let booking = Booking {
            id: new_id("booking"),
            room_id: data.room_id,
            user_id: actor.user_id.clone(),
            title: title.to_string(),
            description: data.description,
            start_time: data.start_time,
            end_time: data.end_time,
            status: BookingStatus::Pending,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let booking = self
            .repository
            .bookings
            .create(booking, self.reject_overlaps)
            .map_err(|e| {
                if matches!(e, AppError::Overlap(_)) {
                    tracing::warn!(user_id = %actor.user_id, error = %e, "Booking refused");
                }
                e
            })?;

        tracing::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            user_id = %booking.user_id,
            start = %booking.start_time,
            end = %booking.end_time,
            "Booking requested"
        );
        self.details(booking)
    }

    pub fn approve(&self, actor: &Actor, id: &str) -> AppResult<BookingDetails> {
        let booking = self
            .repository
            .bookings
            .approve(id, &actor.user_id, Utc::now())?;
        tracing::info!(booking_id = %id, approver = %actor.user_id, "Booking approved");

        let details = self.details(booking)?;
        notify(
            self.notifier.as_ref(),
            NewNotification::booking(
                &details.booking.user_id,
                &details.booking.id,
                NotificationLevel::Success,
                "Meeting room booking approved",
                format!("Your booking {} has been approved.", describe(&details)),
            ),
        );
        Ok(details)
    }

    pub fn reject(&self, actor: &Actor, id: &str, reason: &str) -> AppResult<BookingDetails> {
        let booking = self
            .repository
            .bookings
            .update(id, |b| b.reject(&actor.user_id, reason, Utc::now()))?;
        tracing::info!(booking_id = %id, approver = %actor.user_id, "Booking rejected");

        let details = self.details(booking)?;
        notify(
            self.notifier.as_ref(),
            NewNotification::booking(
                &details.booking.user_id,
                &details.booking.id,
                NotificationLevel::Error,
                "Meeting room booking rejected",
                format!(
                    "Your booking {} was rejected. Reason: {}",
                    describe(&details),
                    details.booking.rejection_reason.as_deref().unwrap_or_default()
                ),
            ),
        );
        Ok(details)
    }

    /// The booker may cancel their own booking; others need `bookings.cancel`
    pub fn cancel(&self, actor: &Actor, id: &str) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.update(id, |b| {
            if b.user_id != actor.user_id && !actor.has(Permission::BookingsCancel) {
                return Err(AppError::Authorization(
                    "You can only cancel your own bookings".to_string(),
                ));
            }
            b.cancel(Utc::now())
        })?;
        tracing::info!(booking_id = %id, by = %actor.user_id, "Booking cancelled");

        let details = self.details(booking)?;
        if details.booking.user_id != actor.user_id {
            notify(
                self.notifier.as_ref(),
                NewNotification::booking(
                    &details.booking.user_id,
                    &details.booking.id,
                    NotificationLevel::Info,
                    "Meeting room booking cancelled",
                    format!("Your booking {} was cancelled by {}.", describe(&details), actor.name),
                ),
            );
        }
        Ok(details)
    }

    pub fn complete(&self, actor: &Actor, id: &str) -> AppResult<BookingDetails> {
        let booking = self
            .repository
            .bookings
            .update(id, |b| b.complete(Utc::now()))?;
        tracing::info!(booking_id = %id, by = %actor.user_id, "Booking completed");
        self.details(booking)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.bookings.delete(id)?;
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }
}

/// Title, room and time range for notification text
fn describe(details: &BookingDetails) -> String {
    let b = &details.booking;
    format!(
        "\"{}\" ({}, {} {}-{})",
        b.title,
        details.room_name.as_deref().unwrap_or(&b.room_id),
        b.start_time.format("%Y-%m-%d"),
        b.start_time.format("%H:%M"),
        b.end_time.format("%H:%M")
    )
}

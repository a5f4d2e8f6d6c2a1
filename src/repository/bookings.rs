//! Rooms and bookings store

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, BookingQuery, BookingStatus, Room},
};

use super::Table;

/// Rooms are always locked before bookings.
#[derive(Clone)]
pub struct BookingsRepository {
    rooms: Table<Room>,
    bookings: Table<Booking>,
}

impl BookingsRepository {
    pub fn new() -> Self {
        Self {
            rooms: Table::new("Room"),
            bookings: Table::new("Booking"),
        }
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    pub fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.rooms.list(|_| true)
    }

    pub fn get_room(&self, id: &str) -> AppResult<Room> {
        self.rooms.fetch(id)
    }

    pub fn insert_room(&self, room: Room) -> AppResult<Room> {
        self.rooms.insert(&room.id.clone(), room)
    }

    pub fn update_room<F>(&self, id: &str, f: F) -> AppResult<Room>
    where
        F: FnOnce(&mut Room) -> AppResult<()>,
    {
        self.rooms.update(id, f)
    }

    /// Delete a room unless it still has pending or approved bookings
    pub fn delete_room(&self, id: &str) -> AppResult<Room> {
        let mut rooms = self.rooms.write()?;
        if !rooms.contains_key(id) {
            return Err(AppError::NotFound(format!("Room {} not found", id)));
        }
        let live = self
            .bookings
            .read()?
            .values()
            .filter(|b| b.room_id == id && b.status.holds_slot())
            .count();
        if live > 0 {
            return Err(AppError::Conflict(format!(
                "Room {} still has {} active booking(s)",
                id, live
            )));
        }
        rooms
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))
    }

    // -----------------------------------------------------------------------
    // Bookings
    // -----------------------------------------------------------------------

    pub fn get(&self, id: &str) -> AppResult<Booking> {
        self.bookings.fetch(id)
    }

    /// Bookings matching the query, ordered by start time
    pub fn list(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let mut bookings = self.bookings.list(|b| query.matches(b))?;
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    /// Bookings of a room starting on `date`, rejected and cancelled ones excluded
    pub fn by_room_and_date(&self, room_id: &str, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let mut bookings = self.bookings.list(|b| {
            b.room_id == room_id
                && b.date() == date
                && !matches!(b.status, BookingStatus::Rejected | BookingStatus::Cancelled)
        })?;
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    /// Slot-holding bookings of a room that intersect `date`
    pub fn holding_slots_on(&self, room_id: &str, date: NaiveDate) -> AppResult<Vec<Booking>> {
        self.bookings.list(|b| {
            b.room_id == room_id
                && b.status.holds_slot()
                && b.start_time.date() <= date
                && b.end_time.date() >= date
        })
    }

    /// Insert a new booking.
    ///
    /// With `reject_overlaps`, the overlap check and the insert happen under
    /// one write guard so two concurrent requests cannot both take a slot.
    pub fn create(&self, booking: Booking, reject_overlaps: bool) -> AppResult<Booking> {
        let rooms = self.rooms.read()?;
        let room = rooms
            .get(&booking.room_id)
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", booking.room_id)))?;
        if !room.is_active {
            return Err(AppError::BusinessRule(format!(
                "Room {} is not available for booking",
                room.name
            )));
        }

        let mut bookings = self.bookings.write()?;
        if reject_overlaps {
            if let Some(existing) = bookings.values().find(|b| {
                b.room_id == booking.room_id
                    && b.status.holds_slot()
                    && b.overlaps(booking.start_time, booking.end_time)
            }) {
                return Err(AppError::Overlap(format!(
                    "{} is already booked from {} to {}",
                    room.name,
                    existing.start_time.format("%H:%M"),
                    existing.end_time.format("%H:%M")
                )));
            }
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    /// Approve a booking unless another approved booking of the room overlaps it
    pub fn approve(&self, id: &str, approver: &str, now: DateTime<Utc>) -> AppResult<Booking> {
        self.bookings.update_with(id, |booking, others| {
            let clash = others.values().any(|other| {
                other.id != booking.id
                    && other.room_id == booking.room_id
                    && other.status == BookingStatus::Approved
                    && other.overlaps(booking.start_time, booking.end_time)
            });
            if clash {
                return Err(AppError::Overlap(format!(
                    "Booking {} overlaps an approved booking of the same room",
                    booking.id
                )));
            }
            booking.approve(approver, now)
        })
    }

    pub fn update<F>(&self, id: &str, f: F) -> AppResult<Booking>
    where
        F: FnOnce(&mut Booking) -> AppResult<()>,
    {
        self.bookings.update(id, f)
    }

    pub fn delete(&self, id: &str) -> AppResult<Booking> {
        self.bookings.remove(id)
    }

    /// Seed helper: insert without checks
    pub fn insert(&self, booking: Booking) -> AppResult<Booking> {
        self.bookings.insert(&booking.id.clone(), booking)
    }
}

impl Default for BookingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn repo() -> BookingsRepository {
        let repo = BookingsRepository::new();
        repo.insert_room(Room {
            id: "room-1".into(),
            name: "Room A".into(),
            floor: 3,
            capacity: 8,
            equipment: vec![],
            hourly_rate: None,
            is_active: true,
        })
        .unwrap();
        repo
    }

    fn booking(id: &str, start: u32, end: u32) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.into(),
            room_id: "room-1".into(),
            user_id: "tenant-1".into(),
            title: "Sync".into(),
            description: None,
            start_time: at(start),
            end_time: at(end),
            status: BookingStatus::Pending,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn overlapping_create_is_refused() {
        let repo = repo();
        repo.create(booking("a", 10, 12), true).unwrap();
        assert!(matches!(
            repo.create(booking("b", 11, 13), true),
            Err(AppError::Overlap(_))
        ));
        // Adjacent is fine
        repo.create(booking("c", 12, 13), true).unwrap();
        // Switch off the check
        repo.create(booking("d", 10, 11), false).unwrap();
    }

    #[test]
    fn cancelled_booking_frees_the_slot() {
        let repo = repo();
        repo.create(booking("a", 10, 12), true).unwrap();
        repo.update("a", |b| b.cancel(Utc::now())).unwrap();
        repo.create(booking("b", 10, 12), true).unwrap();
    }

    #[test]
    fn approve_refuses_clash_with_approved() {
        let repo = repo();
        repo.create(booking("a", 10, 12), false).unwrap();
        repo.create(booking("b", 11, 13), false).unwrap();
        repo.approve("a", "mgmt-1", Utc::now()).unwrap();
        assert!(matches!(
            repo.approve("b", "mgmt-1", Utc::now()),
            Err(AppError::Overlap(_))
        ));
        assert_eq!(repo.get("b").unwrap().status, BookingStatus::Pending);
    }

    #[test]
    fn unknown_or_inactive_room_is_refused() {
        let repo = repo();
        let mut b = booking("a", 10, 11);
        b.room_id = "room-9".into();
        assert!(matches!(repo.create(b, true), Err(AppError::NotFound(_))));

        repo.update_room("room-1", |r| {
            r.is_active = false;
            Ok(())
        })
        .unwrap();
        assert!(matches!(
            repo.create(booking("b", 10, 11), true),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn room_with_live_bookings_cannot_be_deleted() {
        let repo = repo();
        repo.create(booking("a", 10, 11), true).unwrap();
        assert!(matches!(repo.delete_room("room-1"), Err(AppError::Conflict(_))));
        repo.update("a", |b| b.cancel(Utc::now())).unwrap();
        repo.delete_room("room-1").unwrap();
    }
}

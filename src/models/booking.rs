//! Meeting rooms, room bookings and the booking state machine

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Bookable meeting room
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Floor number the room is on
    pub floor: i32,
    /// Seats
    pub capacity: u32,
    pub equipment: Vec<String>,
    /// Price per hour
    #[schema(value_type = Option<String>)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
}

/// Create room request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoom {
    #[validate(length(min = 1, message = "Room name is required"))]
    pub name: String,
    pub floor: i32,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[schema(value_type = Option<String>)]
    pub hourly_rate: Option<Decimal>,
}

/// Update room request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoom {
    #[validate(length(min = 1, message = "Room name cannot be empty"))]
    pub name: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<u32>,
    pub equipment: Option<Vec<String>>,
    #[schema(value_type = Option<String>)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl Room {
    pub fn apply(&mut self, data: &UpdateRoom) {
        if let Some(ref name) = data.name {
            self.name = name.clone();
        }
        if let Some(floor) = data.floor {
            self.floor = floor;
        }
        if let Some(capacity) = data.capacity {
            self.capacity = capacity;
        }
        if let Some(ref equipment) = data.equipment {
            self.equipment = equipment.clone();
        }
        if data.hourly_rate.is_some() {
            self.hourly_rate = data.hourly_rate;
        }
        if let Some(is_active) = data.is_active {
            self.is_active = is_active;
        }
    }
}

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// States reachable in one step
    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[
                BookingStatus::Approved,
                BookingStatus::Rejected,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Approved => &[BookingStatus::Cancelled, BookingStatus::Completed],
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Pending and approved bookings block their time slot
    pub fn holds_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Meeting-room reservation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: String,
    pub room_id: String,
    /// Booker
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Start (building local time)
    pub start_time: NaiveDateTime,
    /// End (building local time, exclusive)
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    pub rejection_reason: Option<String>,
    /// User who approved or rejected the booking
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Half-open interval intersection
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && start < self.end_time
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    fn transition(&mut self, next: BookingStatus, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} is {} and cannot become {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn approve(&mut self, approver: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(BookingStatus::Approved, now)?;
        self.approved_by = Some(approver.to_string());
        self.approved_at = Some(now);
        Ok(())
    }

    pub fn reject(&mut self, approver: &str, reason: &str, now: DateTime<Utc>) -> AppResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }
        self.transition(BookingStatus::Rejected, now)?;
        self.rejection_reason = Some(reason.to_string());
        self.approved_by = Some(approver.to_string());
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(BookingStatus::Cancelled, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(BookingStatus::Completed, now)
    }

    /// Duration times the room's hourly rate, if the room has one
    pub fn estimated_cost(&self, room: &Room) -> Option<Decimal> {
        let rate = room.hourly_rate?;
        let minutes = (self.end_time - self.start_time).num_minutes();
        Some((Decimal::from(minutes) * rate / Decimal::from(60)).round_dp(2))
    }
}

/// Booking with room name and price estimate for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub room_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
}

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    #[validate(length(min = 1, message = "Room is required"))]
    pub room_id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    /// Start (YYYY-MM-DDTHH:MM:SS, building local time)
    pub start_time: NaiveDateTime,
    /// End (YYYY-MM-DDTHH:MM:SS, building local time)
    pub end_time: NaiveDateTime,
}

/// Reject booking request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectBooking {
    pub reason: String,
}

/// Query parameters for bookings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<BookingStatus>,
    /// Bookings starting on this date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.room_id.as_ref().map_or(true, |r| &booking.room_id == r)
            && self.user_id.as_ref().map_or(true, |u| &booking.user_id == u)
            && self.status.map_or(true, |s| booking.status == s)
            && self.date.map_or(true, |d| booking.date() == d)
    }
}

/// Query parameter carrying a single day
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateQuery {
    /// Day (YYYY-MM-DD)
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Free interval of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Daily window in which rooms can be booked
#[derive(Debug, Clone, Copy)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl BusinessHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn window(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.open), date.and_time(self.close))
    }

    /// Check a requested range: ordered, single day, inside the window
    pub fn validate_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> AppResult<()> {
        if start >= end {
            return Err(AppError::Validation(
                "End time must be after start time".to_string(),
            ));
        }
        let (open, close) = self.window(start.date());
        if end.date() != start.date() || start < open || end > close {
            return Err(AppError::Validation(format!(
                "Bookings must fit within business hours {}-{}",
                self.open.format("%H:%M"),
                self.close.format("%H:%M")
            )));
        }
        Ok(())
    }

    /// Gaps between the slot-holding bookings of one room on `date`.
    ///
    /// Bookings are clamped to the window, so entries from other days or
    /// outside business hours are ignored. The result is sorted, never
    /// overlaps, and together with the busy intervals covers the window once.
    pub fn free_slots<'a, I>(&self, date: NaiveDate, bookings: I) -> Vec<TimeSlot>
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let (open, close) = self.window(date);

        let mut busy: Vec<(NaiveDateTime, NaiveDateTime)> = bookings
            .into_iter()
            .filter(|b| b.status.holds_slot())
            .map(|b| (b.start_time.max(open), b.end_time.min(close)))
            .filter(|(start, end)| start < end)
            .collect();
        busy.sort();

        let mut slots = Vec::new();
        let mut cursor = open;
        for (start, end) in busy {
            if cursor < start {
                slots.push(TimeSlot { start: cursor, end: start });
            }
            if cursor < end {
                cursor = end;
            }
        }
        if cursor < close {
            slots.push(TimeSlot { start: cursor, end: close });
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn hours() -> BusinessHours {
        BusinessHours::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        )
    }

    fn booking(id: &str, start: NaiveDateTime, end: NaiveDateTime, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.to_string(),
            room_id: "room-1".to_string(),
            user_id: "tenant-1".to_string(),
            title: "Weekly sync".to_string(),
            description: None,
            start_time: start,
            end_time: end,
            status,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn free_slots_example_from_two_bookings() {
        let d = day();
        let bookings = vec![
            booking("b", at(d, 13, 0), at(d, 14, 0), BookingStatus::Pending),
            booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Approved),
        ];

        let slots = hours().free_slots(d, &bookings);

        assert_eq!(
            slots,
            vec![
                TimeSlot { start: at(d, 9, 0), end: at(d, 10, 0) },
                TimeSlot { start: at(d, 11, 0), end: at(d, 13, 0) },
                TimeSlot { start: at(d, 14, 0), end: at(d, 21, 0) },
            ]
        );
    }

    #[test]
    fn free_slots_ignore_rejected_cancelled_and_other_days() {
        let d = day();
        let other = d.succ_opt().unwrap();
        let bookings = vec![
            booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Rejected),
            booking("b", at(d, 12, 0), at(d, 13, 0), BookingStatus::Cancelled),
            booking("c", at(other, 10, 0), at(other, 11, 0), BookingStatus::Approved),
        ];

        let slots = hours().free_slots(d, &bookings);

        assert_eq!(slots, vec![TimeSlot { start: at(d, 9, 0), end: at(d, 21, 0) }]);
    }

    #[test]
    fn free_and_busy_cover_window_exactly_once() {
        let d = day();
        // Overlapping and out-of-window bookings
        let bookings = vec![
            booking("a", at(d, 8, 0), at(d, 9, 30), BookingStatus::Approved),
            booking("b", at(d, 12, 0), at(d, 14, 0), BookingStatus::Pending),
            booking("c", at(d, 13, 0), at(d, 15, 0), BookingStatus::Approved),
            booking("d", at(d, 14, 30), at(d, 14, 45), BookingStatus::Pending),
            booking("e", at(d, 20, 0), at(d, 22, 0), BookingStatus::Pending),
        ];

        let slots = hours().free_slots(d, &bookings);

        assert_eq!(
            slots,
            vec![
                TimeSlot { start: at(d, 9, 30), end: at(d, 12, 0) },
                TimeSlot { start: at(d, 15, 0), end: at(d, 20, 0) },
            ]
        );
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }

        // Walk the window minute by minute: each minute is free xor busy
        let (open, close) = hours().window(d);
        let mut t = open;
        while t < close {
            let free = slots.iter().filter(|s| s.start <= t && t < s.end).count();
            let busy = bookings
                .iter()
                .any(|b| b.status.holds_slot() && b.start_time <= t && t < b.end_time);
            assert_eq!(free, if busy { 0 } else { 1 }, "minute {}", t);
            t += chrono::Duration::minutes(1);
        }
    }

    #[test]
    fn fully_booked_day_has_no_slots() {
        let d = day();
        let bookings = vec![booking("a", at(d, 9, 0), at(d, 21, 0), BookingStatus::Approved)];
        assert!(hours().free_slots(d, &bookings).is_empty());
    }

    #[test]
    fn validate_range_rejects_inverted_and_out_of_hours() {
        let d = day();
        assert!(matches!(
            hours().validate_range(at(d, 11, 0), at(d, 10, 0)),
            Err(AppError::Validation(_))
        ));
        assert!(hours().validate_range(at(d, 10, 0), at(d, 10, 0)).is_err());
        assert!(hours().validate_range(at(d, 8, 0), at(d, 10, 0)).is_err());
        assert!(hours().validate_range(at(d, 20, 0), at(d, 21, 30)).is_err());
        assert!(hours().validate_range(at(d, 9, 0), at(d, 21, 0)).is_ok());
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in [
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert!(status.is_terminal());
            for next in [
                BookingStatus::Pending,
                BookingStatus::Approved,
                BookingStatus::Rejected,
                BookingStatus::Cancelled,
                BookingStatus::Completed,
            ] {
                assert!(!status.can_transition_to(next));
            }
        }
    }

    #[test]
    fn approve_then_reject_fails() {
        let d = day();
        let mut b = booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Pending);
        b.approve("mgmt-1", Utc::now()).unwrap();
        assert_eq!(b.status, BookingStatus::Approved);
        assert_eq!(b.approved_by.as_deref(), Some("mgmt-1"));

        let err = b.reject("mgmt-1", "x", Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(b.status, BookingStatus::Approved);
    }

    #[test]
    fn double_approval_fails() {
        let d = day();
        let mut b = booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Pending);
        b.approve("mgmt-1", Utc::now()).unwrap();
        assert!(b.approve("owner-1", Utc::now()).is_err());
        assert_eq!(b.approved_by.as_deref(), Some("mgmt-1"));
    }

    #[test]
    fn reject_requires_reason() {
        let d = day();
        let mut b = booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Pending);
        assert!(matches!(
            b.reject("mgmt-1", "   ", Utc::now()),
            Err(AppError::Validation(_))
        ));
        assert_eq!(b.status, BookingStatus::Pending);

        b.reject("mgmt-1", "Room under maintenance", Utc::now()).unwrap();
        assert_eq!(b.status, BookingStatus::Rejected);
        assert_eq!(b.rejection_reason.as_deref(), Some("Room under maintenance"));
        assert!(b.cancel(Utc::now()).is_err());
    }

    #[test]
    fn estimated_cost_uses_hourly_rate() {
        let d = day();
        let b = booking("a", at(d, 10, 0), at(d, 11, 30), BookingStatus::Pending);
        let mut room = Room {
            id: "room-1".into(),
            name: "Room A".into(),
            floor: 3,
            capacity: 8,
            equipment: vec![],
            hourly_rate: Some(Decimal::from(3000)),
            is_active: true,
        };
        assert_eq!(b.estimated_cost(&room), Some(Decimal::from(4500)));
        room.hourly_rate = None;
        assert_eq!(b.estimated_cost(&room), None);
    }

    #[test]
    fn overlap_is_half_open() {
        let d = day();
        let b = booking("a", at(d, 10, 0), at(d, 11, 0), BookingStatus::Approved);
        assert!(!b.overlaps(at(d, 11, 0), at(d, 12, 0)));
        assert!(!b.overlaps(at(d, 9, 0), at(d, 10, 0)));
        assert!(b.overlaps(at(d, 10, 30), at(d, 11, 30)));
    }
}

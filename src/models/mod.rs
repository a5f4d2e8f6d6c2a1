//! Data models for the building portal

pub mod billing;
pub mod booking;
pub mod building;
pub mod incident;
pub mod notification;
pub mod permission;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use billing::{Invoice, InvoiceStatus, Payment};
pub use booking::{Booking, BookingStatus, BusinessHours, Room, TimeSlot};
pub use building::{Building, Floor, Occupancy, Tenant, Unit};
pub use incident::{EmergencyContact, Incident, IncidentStatus};
pub use notification::{NewNotification, Notification, NotificationLevel};
pub use permission::{Permission, PermissionSet};
pub use request::{Request, RequestComment, RequestDocument, RequestStatus};
pub use user::{Actor, Role, User, UserClaims};

/// Identifier for a record created at runtime, e.g. `booking-3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

//! Booking push notifications.

pub mod booking_status;
pub mod messages;
pub mod recipients;
pub mod state;
pub mod storage;
pub mod types;

pub use booking_status::send_booking_status_push;
pub use recipients::Role;
pub use state::PushState;
pub use storage::{BookingDirectory, PgBookingDirectory};

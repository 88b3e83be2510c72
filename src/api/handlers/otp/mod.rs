//! Booking phone verification by one-time password.
//!
//! `send` issues a code (throttled per phone) and `verify` checks it against the
//! stored digest. Checks in `verify` run in a fixed order: already verified,
//! expired, attempt cap, then the hash comparison.

pub mod code;
pub mod phone;
pub mod send;
pub mod state;
pub mod storage;
pub mod types;
pub mod verify;

pub use phone::normalize_phone;
pub use send::send_booking_otp;
pub use state::{OtpConfig, OtpState};
pub use storage::{OtpRecord, OtpStore, PgOtpStore};
pub use verify::verify_booking_otp;

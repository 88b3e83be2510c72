//! Request/response types for booking push notifications.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct BookingPushRequest {
    pub booking_id: String,
    /// New booking status; required unless `type` is `otp`.
    pub status: Option<String>,
    /// `otp` for a handover-code event, otherwise a status event.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `pickup` or `delivery`, for OTP events.
    pub otp_kind: Option<String>,
    /// Driver that was replaced, for reassignment notices.
    pub previous_driver_id: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct BookingPushResponse {
    pub sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_kind: Option<String>,
}

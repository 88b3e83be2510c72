//! Route handlers and the helpers they share.
//!
//! Every handler family keeps its configuration, storage trait and request
//! types in its own module and reaches the outside world only through traits.

pub mod health;
pub mod otp;
pub mod payments;
pub mod push;

use uuid::Uuid;

use crate::api::error::ApiError;

/// Parse a UUID from a request field, naming the field on failure.
pub(crate) fn parse_uuid_field(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::Validation(format!("Invalid {field}")))
}

pub(crate) fn parse_booking_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid_field(raw, "booking_id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_id_is_trimmed_and_validated() {
        let id = Uuid::new_v4();
        assert_eq!(parse_booking_id(&format!(" {id} ")), Ok(id));
        assert_eq!(
            parse_booking_id("MV-1001"),
            Err(ApiError::Validation("Invalid booking_id".to_string()))
        );
    }
}

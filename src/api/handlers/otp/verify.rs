//! Check a submitted booking OTP.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::code::{hash_code, hashes_match, normalize_code};
use super::phone::normalize_phone;
use super::state::OtpState;
use super::types::{VerifyOtpRequest, VerifyOtpResponse};
use crate::api::error::ApiError;

pub(super) async fn check_code(
    state: &OtpState,
    raw_phone: &str,
    raw_code: &str,
    now: DateTime<Utc>,
) -> Result<VerifyOtpResponse, ApiError> {
    let config = state.config();
    let salt = config.salt()?;

    let phone = normalize_phone(raw_phone, config.default_country_code());
    if phone.is_empty() {
        return Err(ApiError::Validation("Invalid phone number".to_string()));
    }
    let Some(code) = normalize_code(raw_code) else {
        return Err(ApiError::Validation("Code must be 6 digits".to_string()));
    };

    let record = state
        .store()
        .fetch(&phone)
        .await
        .map_err(|err| ApiError::internal("Failed to load OTP", &err))?
        .ok_or_else(|| ApiError::NotFound("OTP not found".to_string()))?;

    if record.verified {
        return Ok(VerifyOtpResponse {
            valid: true,
            already_verified: Some(true),
            error: None,
        });
    }
    // Expiry is checked before attempts so a stale code never burns one.
    if now >= record.expires_at {
        return Err(ApiError::Expired);
    }
    if record.attempts >= config.max_attempts() {
        warn!(phone = %phone, "booking OTP attempts exhausted");
        return Err(ApiError::TooManyAttempts);
    }

    let candidate = hash_code(&phone, &code, salt);
    if hashes_match(&record.otp_hash, &candidate) {
        let marked = state
            .store()
            .mark_verified(&phone, &record.otp_hash)
            .await
            .map_err(|err| ApiError::internal("Failed to verify OTP", &err))?;
        if !marked {
            // A resend replaced the row between fetch and update.
            return Err(ApiError::InvalidCode);
        }
        info!(phone = %phone, "booking OTP verified");
        return Ok(VerifyOtpResponse {
            valid: true,
            already_verified: None,
            error: None,
        });
    }

    state
        .store()
        .record_failed_attempt(&phone, &record.otp_hash, config.max_attempts())
        .await
        .map_err(|err| ApiError::internal("Failed to verify OTP", &err))?;
    Err(ApiError::InvalidCode)
}

#[utoipa::path(
    post,
    path = "/verify-booking-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerifyOtpResponse),
        (status = 400, description = "Bad input, expired or invalid code", body = VerifyOtpResponse),
        (status = 404, description = "No code issued for this phone", body = VerifyOtpResponse),
        (status = 429, description = "Too many attempts", body = VerifyOtpResponse),
        (status = 500, description = "Missing configuration or upstream failure", body = VerifyOtpResponse)
    ),
    tag = "otp"
)]
pub async fn verify_booking_otp(
    otp: Extension<Arc<OtpState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Response {
    let result = match payload {
        Some(Json(request)) => check_code(&otp, &request.phone, &request.code, Utc::now()).await,
        None => Err(ApiError::Validation("Missing payload".to_string())),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (
            err.status(),
            Json(VerifyOtpResponse {
                valid: false,
                already_verified: None,
                error: Some(err.to_string()),
            }),
        )
            .into_response(),
    }
}

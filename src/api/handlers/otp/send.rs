//! Issue a booking OTP and deliver it by SMS.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::code::{generate_code, hash_code};
use super::phone::normalize_phone;
use super::state::OtpState;
use super::storage::OtpRecord;
use super::types::{SendOtpRequest, SendOtpResponse};
use crate::api::error::ApiError;

/// Generate, persist and send a fresh code for `raw_phone`.
///
/// The row is written before the SMS goes out. A failed dispatch is reported to
/// the caller but the new row stays, so any earlier code for the phone is gone.
pub(super) async fn issue_code(
    state: &OtpState,
    raw_phone: &str,
    now: DateTime<Utc>,
) -> Result<SendOtpResponse, ApiError> {
    let config = state.config();
    let salt = config.salt()?;
    if !config.sms_disabled() {
        state.sms().ensure_configured()?;
    }

    let phone = normalize_phone(raw_phone, config.default_country_code());
    if phone.is_empty() {
        return Err(ApiError::Validation("Invalid phone number".to_string()));
    }

    let existing = state
        .store()
        .fetch(&phone)
        .await
        .map_err(|err| ApiError::internal("Failed to load OTP", &err))?;
    if let Some(record) = existing {
        let elapsed = now - record.last_sent_at;
        if elapsed < config.resend_interval() {
            let wait = (config.resend_interval() - elapsed).num_seconds().max(1);
            return Err(ApiError::RateLimited(format!(
                "Please wait {wait}s before requesting a new code"
            )));
        }
    }

    let code = generate_code().map_err(|err| ApiError::internal("Failed to generate code", &err))?;
    let record = OtpRecord::issued(
        phone.clone(),
        hash_code(&phone, &code, salt),
        now,
        config.ttl(),
    );
    state
        .store()
        .upsert(&record)
        .await
        .map_err(|err| ApiError::internal("Failed to store OTP", &err))?;
    info!(phone = %phone, "booking OTP issued");

    if config.sms_disabled() {
        warn!(phone = %phone, "SMS dispatch disabled, returning code in response");
        return Ok(SendOtpResponse {
            sent: true,
            phone,
            expires_in: config.ttl_seconds(),
            dev_code: Some(code),
            sid: None,
        });
    }

    let receipt = state.sms().send(&phone, &config.render_sms(&code)).await?;

    Ok(SendOtpResponse {
        sent: true,
        phone,
        expires_in: config.ttl_seconds(),
        dev_code: None,
        sid: receipt.sid,
    })
}

#[utoipa::path(
    post,
    path = "/send-booking-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code issued", body = SendOtpResponse),
        (status = 400, description = "Invalid phone number"),
        (status = 429, description = "Resend requested too soon"),
        (status = 500, description = "Missing configuration or upstream failure")
    ),
    tag = "otp"
)]
pub async fn send_booking_otp(
    otp: Extension<Arc<OtpState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return ApiError::Validation("Missing payload".to_string()).into_response();
    };

    match issue_code(&otp, &request.phone, Utc::now()).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::otp::code::hash_code;
    use crate::api::handlers::otp::storage::memory::MemoryOtpStore;
    use crate::api::handlers::otp::test_support::{config, state, RecordingSms, SALT};
    use anyhow::Result;
    use chrono::Duration;
    use secrecy::SecretString;

    const PHONE: &str = "+919876543210";

    #[tokio::test]
    async fn disabled_sms_returns_dev_code() -> Result<()> {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(config().with_sms_disabled(true), store.clone(), sms.clone());
        let now = Utc::now();

        let response = issue_code(&otp, "98765 43210", now).await?;
        assert!(response.sent);
        assert_eq!(response.phone, PHONE);
        assert_eq!(response.expires_in, 600);
        assert!(response.sid.is_none());

        let code = response.dev_code.unwrap_or_default();
        assert_eq!(code.len(), 6);
        let record = store.get(PHONE);
        assert_eq!(
            record.map(|row| row.otp_hash),
            Some(hash_code(PHONE, &code, SALT))
        );
        assert!(sms.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sms_receives_rendered_body() -> Result<()> {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(
            config().with_sms_template("Moverline code: {code}".to_string()),
            store.clone(),
            sms.clone(),
        );

        let response = issue_code(&otp, PHONE, Utc::now()).await?;
        assert_eq!(response.sid.as_deref(), Some("SM0001"));
        assert!(response.dev_code.is_none());

        let messages = sms.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, PHONE);
        let code = messages[0].1.trim_start_matches("Moverline code: ");
        assert_eq!(code.len(), 6);
        assert_eq!(
            store.get(PHONE).map(|row| row.otp_hash),
            Some(hash_code(PHONE, code, SALT))
        );
        Ok(())
    }

    #[tokio::test]
    async fn resend_within_interval_is_rate_limited() -> Result<()> {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(config().with_sms_disabled(true), store.clone(), sms);
        let now = Utc::now();

        issue_code(&otp, PHONE, now).await?;
        let first = store.get(PHONE);

        let err = issue_code(&otp, PHONE, now + Duration::seconds(10))
            .await
            .err();
        assert_eq!(
            err,
            Some(ApiError::RateLimited(
                "Please wait 20s before requesting a new code".to_string()
            ))
        );
        assert_eq!(store.get(PHONE), first);
        Ok(())
    }

    #[tokio::test]
    async fn resend_after_interval_resets_record() -> Result<()> {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(config().with_sms_disabled(true), store.clone(), sms);
        let now = Utc::now();

        let mut stale = OtpRecord::issued(
            PHONE.to_string(),
            "old-hash".to_string(),
            now - Duration::seconds(31),
            Duration::seconds(600),
        );
        stale.attempts = 4;
        stale.verified = true;
        store.insert(stale);

        issue_code(&otp, PHONE, now).await?;
        let record = store.get(PHONE);
        assert!(record.as_ref().is_some_and(|row| row.otp_hash != "old-hash"));
        assert!(record.as_ref().is_some_and(|row| row.attempts == 0));
        assert!(record.as_ref().is_some_and(|row| !row.verified));
        assert_eq!(
            record.map(|row| row.expires_at),
            Some(now + Duration::seconds(600))
        );
        Ok(())
    }

    #[tokio::test]
    async fn configured_ttl_and_interval_apply() -> Result<()> {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(
            config()
                .with_sms_disabled(true)
                .with_ttl_seconds(120)
                .with_resend_interval_seconds(5),
            store.clone(),
            sms,
        );
        let now = Utc::now();

        let first = issue_code(&otp, PHONE, now).await?;
        assert_eq!(first.expires_in, 120);

        let err = issue_code(&otp, PHONE, now + Duration::seconds(3))
            .await
            .err();
        assert_eq!(
            err,
            Some(ApiError::RateLimited(
                "Please wait 2s before requesting a new code".to_string()
            ))
        );

        let later = now + Duration::seconds(6);
        let second = issue_code(&otp, PHONE, later).await?;
        assert_eq!(second.expires_in, 120);
        assert_eq!(
            store.get(PHONE).map(|row| row.expires_at),
            Some(later + Duration::seconds(120))
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_phone_stores_nothing() {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(config(), store.clone(), sms.clone());

        let err = issue_code(&otp, "123", Utc::now()).await.err();
        assert_eq!(
            err,
            Some(ApiError::Validation("Invalid phone number".to_string()))
        );
        assert!(store.get("123").is_none());
        assert!(sms.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_salt_fails_closed() {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms::default());
        let otp = state(
            crate::api::handlers::otp::OtpConfig::new(Some(SecretString::from(String::new()))),
            store.clone(),
            sms,
        );

        let err = issue_code(&otp, PHONE, Utc::now()).await.err();
        assert_eq!(err, Some(ApiError::Configuration("MOVERLINE_OTP_SALT")));
        assert!(store.get(PHONE).is_none());
    }

    #[tokio::test]
    async fn unconfigured_sms_persists_nothing() {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms {
            unconfigured: true,
            ..RecordingSms::default()
        });
        let otp = state(config(), store.clone(), sms);

        let err = issue_code(&otp, PHONE, Utc::now()).await.err();
        assert_eq!(
            err,
            Some(ApiError::Configuration("MOVERLINE_TWILIO_ACCOUNT_SID"))
        );
        assert!(store.get(PHONE).is_none());
    }

    #[tokio::test]
    async fn sms_failure_keeps_persisted_record() {
        let store = Arc::new(MemoryOtpStore::default());
        let sms = Arc::new(RecordingSms {
            fail: true,
            ..RecordingSms::default()
        });
        let otp = state(config(), store.clone(), sms);

        let err = issue_code(&otp, PHONE, Utc::now()).await.err();
        assert_eq!(
            err,
            Some(ApiError::Upstream(
                "The 'To' number is not valid.".to_string()
            ))
        );
        assert!(store.get(PHONE).is_some());
    }

    #[tokio::test]
    async fn store_failure_is_upstream() {
        let otp = state(
            config(),
            Arc::new(MemoryOtpStore::failing()),
            Arc::new(RecordingSms::default()),
        );

        let err = issue_code(&otp, PHONE, Utc::now()).await.err();
        assert_eq!(err, Some(ApiError::Upstream("Failed to load OTP".to_string())));
    }

    #[tokio::test]
    async fn missing_payload_is_bad_request() {
        let otp = Arc::new(state(
            config(),
            Arc::new(MemoryOtpStore::default()),
            Arc::new(RecordingSms::default()),
        ));

        let response = send_booking_otp(Extension(otp), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Verify a checkout signature returned to the client after payment.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, warn};

use super::signature::verify_payment_signature;
use super::state::PaymentState;
use super::storage::{PaymentRecord, PaymentStatus};
use super::types::{VerifyPaymentRequest, VerifyPaymentResponse};
use crate::api::error::ApiError;
use crate::api::handlers::parse_booking_id;

pub(super) async fn verify_payment(
    state: &PaymentState,
    request: VerifyPaymentRequest,
) -> Result<VerifyPaymentResponse, ApiError> {
    let order_id = request.razorpay_order_id.trim();
    let payment_id = request.razorpay_payment_id.trim();
    let signature = request.razorpay_signature.trim();
    if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
        return Err(ApiError::Validation(
            "Missing order id, payment id or signature".to_string(),
        ));
    }
    let booking_id = request
        .booking_id
        .as_deref()
        .map(parse_booking_id)
        .transpose()?;

    let key_secret = state.config().key_secret()?;
    if !verify_payment_signature(order_id, payment_id, signature, key_secret.expose_secret()) {
        warn!(order_id, "payment signature mismatch");
        return Err(ApiError::Validation("Invalid payment signature".to_string()));
    }

    let record = PaymentRecord {
        order_id: order_id.to_string(),
        payment_id: Some(payment_id.to_string()),
        booking_id,
        status: PaymentStatus::Captured,
    };
    state
        .ledger()
        .record_payment(&record)
        .await
        .map_err(|err| ApiError::internal("Failed to record payment", &err))?;
    info!(order_id, payment_id, "payment verified");

    Ok(VerifyPaymentResponse {
        valid: true,
        error: None,
    })
}

#[utoipa::path(
    post,
    path = "/razorpay-verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Signature valid, payment recorded", body = VerifyPaymentResponse),
        (status = 400, description = "Bad input or signature mismatch", body = VerifyPaymentResponse),
        (status = 500, description = "Missing configuration or store failure", body = VerifyPaymentResponse)
    ),
    tag = "payments"
)]
pub async fn razorpay_verify(
    payments: Extension<Arc<PaymentState>>,
    payload: Option<Json<VerifyPaymentRequest>>,
) -> Response {
    let result = match payload {
        Some(Json(request)) => verify_payment(&payments, request).await,
        None => Err(ApiError::Validation("Missing payload".to_string())),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (
            err.status(),
            Json(VerifyPaymentResponse {
                valid: false,
                error: Some(err.to_string()),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::payments::signature::sign_hmac_sha256;
    use crate::api::handlers::payments::storage::memory::MemoryLedger;
    use crate::api::handlers::payments::test_support::{
        config, state, RecordingGateway, KEY_SECRET,
    };
    use anyhow::Result;
    use uuid::Uuid;

    fn request(signature: String, booking_id: Option<String>) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            razorpay_order_id: "order_A".to_string(),
            razorpay_payment_id: "pay_B".to_string(),
            razorpay_signature: signature,
            booking_id,
        }
    }

    #[tokio::test]
    async fn valid_signature_records_capture() -> Result<()> {
        let ledger = Arc::new(MemoryLedger::default());
        let payments = state(config(), Arc::new(RecordingGateway::default()), ledger.clone());
        let booking_id = Uuid::new_v4();
        let signature = sign_hmac_sha256(b"order_A|pay_B", KEY_SECRET.as_bytes());

        let response =
            verify_payment(&payments, request(signature, Some(booking_id.to_string()))).await?;
        assert_eq!(
            response,
            VerifyPaymentResponse {
                valid: true,
                error: None
            }
        );
        assert_eq!(
            ledger.payments(),
            vec![PaymentRecord {
                order_id: "order_A".to_string(),
                payment_id: Some("pay_B".to_string()),
                booking_id: Some(booking_id),
                status: PaymentStatus::Captured,
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn mismatch_records_nothing() {
        let ledger = Arc::new(MemoryLedger::default());
        let payments = state(config(), Arc::new(RecordingGateway::default()), ledger.clone());
        let signature = sign_hmac_sha256(b"order_A|pay_B", b"another-secret");

        let err = verify_payment(&payments, request(signature, None)).await.err();
        assert_eq!(
            err,
            Some(ApiError::Validation("Invalid payment signature".to_string()))
        );
        assert!(ledger.payments().is_empty());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let payments = state(
            config(),
            Arc::new(RecordingGateway::default()),
            Arc::new(MemoryLedger::default()),
        );
        let err = verify_payment(&payments, request(" ".to_string(), None))
            .await
            .err();
        assert!(matches!(err, Some(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn handler_reports_valid_false() {
        let payments = Arc::new(state(
            config(),
            Arc::new(RecordingGateway::default()),
            Arc::new(MemoryLedger::default()),
        ));

        let response = razorpay_verify(
            Extension(payments),
            Some(Json(request("deadbeef".to_string(), None))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Authenticated payment gateway callbacks.
//!
//! The raw body is verified against `X-Razorpay-Signature` before it is parsed;
//! a mismatch is answered with 401 and nothing else happens.

use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::signature::verify_hmac_sha256;
use super::state::PaymentState;
use super::storage::{PaymentRecord, PaymentStatus};
use super::types::WebhookResponse;
use crate::api::error::ApiError;

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Pull the payment outcome out of a webhook event, if the event carries one.
fn payment_record(event: &Value) -> Option<PaymentRecord> {
    let status = match event.get("event").and_then(Value::as_str)? {
        "payment.captured" | "order.paid" => PaymentStatus::Captured,
        "payment.failed" => PaymentStatus::Failed,
        _ => return None,
    };

    let payment = event.pointer("/payload/payment/entity");
    let order = event.pointer("/payload/order/entity");
    let order_id = payment
        .and_then(|entity| entity.get("order_id"))
        .or_else(|| order.and_then(|entity| entity.get("id")))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())?;
    let payment_id = payment
        .and_then(|entity| entity.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let booking_id = [payment, order]
        .into_iter()
        .flatten()
        .find_map(|entity| entity.pointer("/notes/booking_id").and_then(Value::as_str))
        .and_then(|id| Uuid::parse_str(id).ok());

    Some(PaymentRecord {
        order_id: order_id.to_string(),
        payment_id,
        booking_id,
        status,
    })
}

pub(super) async fn process_webhook(
    state: &PaymentState,
    signature: Option<&str>,
    body: &[u8],
) -> Result<WebhookResponse, ApiError> {
    let secret = state.config().webhook_secret()?;
    let Some(signature) = signature else {
        return Err(ApiError::Unauthorized("Missing signature".to_string()));
    };
    if !verify_hmac_sha256(body, signature, secret.expose_secret().as_bytes()) {
        warn!("webhook signature mismatch");
        return Err(ApiError::Unauthorized("Invalid signature".to_string()));
    }

    let event: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::Validation("Invalid webhook payload".to_string()))?;

    match payment_record(&event) {
        Some(record) => {
            state
                .ledger()
                .record_payment(&record)
                .await
                .map_err(|err| ApiError::internal("Failed to record payment", &err))?;
            info!(
                order_id = %record.order_id,
                status = record.status.as_str(),
                "webhook payment recorded"
            );
        }
        None => debug!(event = ?event.get("event"), "webhook event ignored"),
    }

    Ok(WebhookResponse { received: true })
}

#[utoipa::path(
    post,
    path = "/razorpay-webhook",
    request_body(content = String, description = "Raw gateway event"),
    params(
        ("X-Razorpay-Signature" = String, Header, description = "Hex HMAC-SHA256 of the body")
    ),
    responses(
        (status = 200, description = "Event accepted", body = WebhookResponse),
        (status = 400, description = "Malformed event"),
        (status = 401, description = "Signature mismatch"),
        (status = 500, description = "Missing configuration or store failure")
    ),
    tag = "payments"
)]
pub async fn razorpay_webhook(
    headers: HeaderMap,
    payments: Extension<Arc<PaymentState>>,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match process_webhook(&payments, signature, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

//! Create a gateway order for a booking.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::state::{PaymentState, DEFAULT_CURRENCY};
use super::storage::{PaymentRecord, PaymentStatus};
use super::types::CreateOrderRequest;
use crate::api::error::ApiError;
use crate::api::handlers::parse_booking_id;
use crate::gateway::OrderRequest;

/// Convert a rupee amount to paise, rejecting anything that rounds to nothing.
#[allow(clippy::cast_possible_truncation)]
fn rupees_to_paise(amount: f64) -> Result<i64, ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("Invalid amount".to_string()));
    }
    let paise = (amount * 100.0).round();
    if paise < 1.0 || paise > i64::MAX as f64 {
        return Err(ApiError::Validation("Invalid amount".to_string()));
    }
    Ok(paise as i64)
}

pub(super) async fn create_order(
    state: &PaymentState,
    request: CreateOrderRequest,
) -> Result<Value, ApiError> {
    let booking_id = request
        .booking_id
        .as_deref()
        .map(parse_booking_id)
        .transpose()?;

    let config = state.config();
    let key_id = config.key_id()?;
    let key_secret = config.key_secret()?;

    let amount = match (request.amount, booking_id) {
        (Some(amount), _) => rupees_to_paise(amount)?,
        (None, Some(booking_id)) => state
            .ledger()
            .quote_amount(booking_id)
            .await
            .map_err(|err| ApiError::internal("Failed to load quote", &err))?
            .ok_or_else(|| ApiError::NotFound("Quote not found".to_string()))?,
        (None, None) => {
            return Err(ApiError::Validation(
                "Either amount or booking_id is required".to_string(),
            ))
        }
    };

    let currency = request
        .currency
        .map(|currency| currency.trim().to_uppercase())
        .filter(|currency| !currency.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let notes = booking_id.map_or(Value::Null, |id| json!({ "booking_id": id }));
    let order = OrderRequest {
        amount,
        currency,
        receipt: request.receipt.filter(|receipt| !receipt.is_empty()),
        notes,
    };

    let mut body = state
        .gateway()
        .create_order(key_id, key_secret, &order)
        .await?;

    if let Some(order_id) = body.get("id").and_then(Value::as_str) {
        info!(order_id, amount, "payment order created");
        let record = PaymentRecord {
            order_id: order_id.to_string(),
            payment_id: None,
            booking_id,
            status: PaymentStatus::Created,
        };
        // The order exists at the gateway; a bookkeeping miss is repaired by the webhook.
        if let Err(err) = state.ledger().record_payment(&record).await {
            error!("Failed to record payment order: {err:#}");
        }
    }

    if let Value::Object(map) = &mut body {
        map.insert("key_id".to_string(), Value::String(key_id.to_string()));
    }
    Ok(body)
}

#[utoipa::path(
    post,
    path = "/razorpay-order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Gateway order plus the public key id"),
        (status = 400, description = "Invalid amount or booking id"),
        (status = 404, description = "No accepted quote for the booking"),
        (status = 500, description = "Missing configuration or gateway failure")
    ),
    tag = "payments"
)]
pub async fn razorpay_order(
    payments: Extension<Arc<PaymentState>>,
    payload: Option<Json<CreateOrderRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return ApiError::Validation("Missing payload".to_string()).into_response();
    };

    match create_order(&payments, request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::payments::storage::memory::MemoryLedger;
    use crate::api::handlers::payments::test_support::{config, state, RecordingGateway};
    use anyhow::Result;
    use uuid::Uuid;

    #[test]
    fn converts_rupees_to_paise() {
        assert_eq!(rupees_to_paise(499.99), Ok(49_999));
        assert_eq!(rupees_to_paise(1.0), Ok(100));
        assert!(rupees_to_paise(0.0).is_err());
        assert!(rupees_to_paise(-5.0).is_err());
        assert!(rupees_to_paise(f64::NAN).is_err());
        assert!(rupees_to_paise(0.001).is_err());
    }

    #[tokio::test]
    async fn explicit_amount_is_sent_in_paise() -> Result<()> {
        let gateway = Arc::new(RecordingGateway::default());
        let ledger = Arc::new(MemoryLedger::default());
        let payments = state(config(), gateway.clone(), ledger.clone());

        let body = create_order(
            &payments,
            CreateOrderRequest {
                amount: Some(2500.0),
                receipt: Some("rcpt-1".to_string()),
                ..CreateOrderRequest::default()
            },
        )
        .await?;

        assert_eq!(body["id"], "order_test_1");
        assert_eq!(body["key_id"], "rzp_test_key");
        let orders = gateway.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].amount, 250_000);
        assert_eq!(orders[0].currency, "INR");
        assert_eq!(orders[0].receipt.as_deref(), Some("rcpt-1"));
        assert!(orders[0].notes.is_null());

        let recorded = ledger.payments();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].status, PaymentStatus::Created);
        Ok(())
    }

    #[tokio::test]
    async fn booking_quote_supplies_amount() -> Result<()> {
        let booking_id = Uuid::new_v4();
        let gateway = Arc::new(RecordingGateway::default());
        let ledger = Arc::new(MemoryLedger::with_quote(booking_id, 1_234_500));
        let payments = state(config(), gateway.clone(), ledger.clone());

        create_order(
            &payments,
            CreateOrderRequest {
                booking_id: Some(booking_id.to_string()),
                currency: Some("inr".to_string()),
                ..CreateOrderRequest::default()
            },
        )
        .await?;

        let orders = gateway.orders();
        assert_eq!(orders[0].amount, 1_234_500);
        assert_eq!(orders[0].currency, "INR");
        assert_eq!(orders[0].notes["booking_id"], booking_id.to_string());
        assert_eq!(ledger.payments()[0].booking_id, Some(booking_id));
        Ok(())
    }

    #[tokio::test]
    async fn missing_quote_is_not_found() {
        let gateway = Arc::new(RecordingGateway::default());
        let payments = state(config(), gateway.clone(), Arc::new(MemoryLedger::default()));

        let err = create_order(
            &payments,
            CreateOrderRequest {
                booking_id: Some(Uuid::new_v4().to_string()),
                ..CreateOrderRequest::default()
            },
        )
        .await
        .err();
        assert_eq!(err, Some(ApiError::NotFound("Quote not found".to_string())));
        assert!(gateway.orders().is_empty());
    }

    #[tokio::test]
    async fn amount_or_booking_is_required() {
        let payments = state(
            config(),
            Arc::new(RecordingGateway::default()),
            Arc::new(MemoryLedger::default()),
        );

        let err = create_order(&payments, CreateOrderRequest::default())
            .await
            .err();
        assert!(matches!(err, Some(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_closed() {
        let gateway = Arc::new(RecordingGateway::default());
        let payments = state(
            crate::api::handlers::payments::PaymentConfig::new(),
            gateway.clone(),
            Arc::new(MemoryLedger::default()),
        );

        let err = create_order(
            &payments,
            CreateOrderRequest {
                amount: Some(10.0),
                ..CreateOrderRequest::default()
            },
        )
        .await
        .err();
        assert_eq!(
            err,
            Some(ApiError::Configuration("MOVERLINE_RAZORPAY_KEY_ID"))
        );
        assert!(gateway.orders().is_empty());
    }

    #[tokio::test]
    async fn gateway_rejection_surfaces_message() {
        let gateway = Arc::new(RecordingGateway::rejecting());
        let payments = state(config(), gateway, Arc::new(MemoryLedger::default()));

        let err = create_order(
            &payments,
            CreateOrderRequest {
                amount: Some(10.0),
                ..CreateOrderRequest::default()
            },
        )
        .await
        .err();
        assert_eq!(
            err,
            Some(ApiError::Upstream(
                "The amount must be atleast INR 1.00".to_string()
            ))
        );
    }
}

//! Razorpay order creation.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{rejected, GatewayError, GatewayFuture};

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

/// Order payload as the gateway expects it (`amount` in the smallest currency unit).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub notes: Value,
}

pub trait PaymentGateway: Send + Sync {
    /// Create an order and return the gateway's JSON body untouched.
    fn create_order<'a>(
        &'a self,
        key_id: &'a str,
        key_secret: &'a SecretString,
        order: &'a OrderRequest,
    ) -> GatewayFuture<'a, Value>;
}

#[derive(Clone, Debug)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
}

impl RazorpayClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: RAZORPAY_API_BASE.to_string(),
        }
    }

    #[instrument(skip(self, key_secret))]
    async fn post_order(
        &self,
        key_id: &str,
        key_secret: &SecretString,
        order: &OrderRequest,
    ) -> Result<Value, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(key_id, Some(key_secret.expose_secret()))
            .json(order)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(format!("order request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(rejected("Razorpay", response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Transport(format!("invalid order response: {err}")))?;

        debug!(order_id = ?body.get("id"), "order created");

        Ok(body)
    }
}

impl PaymentGateway for RazorpayClient {
    fn create_order<'a>(
        &'a self,
        key_id: &'a str,
        key_secret: &'a SecretString,
        order: &'a OrderRequest,
    ) -> GatewayFuture<'a, Value> {
        Box::pin(self.post_order(key_id, key_secret, order))
    }
}

//! Outbound clients for the third-party providers (SMS, push, payments).
//!
//! Each provider sits behind a small trait so handlers can be exercised with
//! recording fakes. All real clients share one `reqwest::Client`, built once at
//! startup with the gateway timeout, and handed to each gateway explicitly.

pub mod push;
pub mod razorpay;
pub mod sms;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::{future::Future, pin::Pin, time::Duration};
use thiserror::Error;

pub use push::{ExpoPush, PushGateway, PushMessage};
pub use razorpay::{OrderRequest, PaymentGateway, RazorpayClient};
pub use sms::{SmsGateway, SmsReceipt, TwilioOptions, TwilioSms};

pub const DEFAULT_GATEWAY_TIMEOUT_SECONDS: u64 = 20;

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A credential or setting the gateway needs was not provided.
    #[error("missing configuration: {0}")]
    NotConfigured(&'static str),
    /// The request never produced a usable response (connect, timeout, decode).
    #[error("{0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Build the shared HTTP client used by every gateway.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .context("failed to build gateway HTTP client")
}

/// Pull a human-readable message out of a provider error body.
///
/// Understands the Twilio (`message`), Razorpay (`error.description`) and Expo
/// (`errors[0].message`) shapes.
pub(crate) fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/error/description").and_then(Value::as_str))
        .or_else(|| value.pointer("/errors/0/message").and_then(Value::as_str))
        .map(str::to_string)
}

/// Turn a non-success response into a `GatewayError::Rejected`.
pub(crate) async fn rejected(provider: &str, response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message =
        upstream_message(&body).unwrap_or_else(|| format!("{provider} returned {status}"));
    GatewayError::Rejected {
        status: status.as_u16(),
        message,
    }
}

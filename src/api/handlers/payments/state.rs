//! Razorpay credentials and shared payment handler state.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::storage::PaymentLedger;
use crate::api::error::ApiError;
use crate::gateway::PaymentGateway;

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Clone, Default)]
pub struct PaymentConfig {
    key_id: Option<String>,
    key_secret: Option<SecretString>,
    webhook_secret: Option<SecretString>,
}

impl PaymentConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key_id(mut self, key_id: Option<String>) -> Self {
        self.key_id = key_id.filter(|value| !value.is_empty());
        self
    }

    #[must_use]
    pub fn with_key_secret(mut self, secret: Option<SecretString>) -> Self {
        self.key_secret = secret.filter(|value| !value.expose_secret().is_empty());
        self
    }

    #[must_use]
    pub fn with_webhook_secret(mut self, secret: Option<SecretString>) -> Self {
        self.webhook_secret = secret.filter(|value| !value.expose_secret().is_empty());
        self
    }

    pub(super) fn key_id(&self) -> Result<&str, ApiError> {
        self.key_id
            .as_deref()
            .ok_or(ApiError::Configuration("MOVERLINE_RAZORPAY_KEY_ID"))
    }

    pub(super) fn key_secret(&self) -> Result<&SecretString, ApiError> {
        self.key_secret
            .as_ref()
            .ok_or(ApiError::Configuration("MOVERLINE_RAZORPAY_KEY_SECRET"))
    }

    pub(super) fn webhook_secret(&self) -> Result<&SecretString, ApiError> {
        self.webhook_secret
            .as_ref()
            .ok_or(ApiError::Configuration("MOVERLINE_RAZORPAY_WEBHOOK_SECRET"))
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "***"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

pub struct PaymentState {
    config: PaymentConfig,
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn PaymentLedger>,
}

impl PaymentState {
    #[must_use]
    pub fn new(
        config: PaymentConfig,
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn PaymentLedger>,
    ) -> Self {
        Self {
            config,
            gateway,
            ledger,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    pub(super) fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    pub(super) fn ledger(&self) -> &dyn PaymentLedger {
        self.ledger.as_ref()
    }
}

//! OTP configuration and shared handler state.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::phone::DEFAULT_COUNTRY_CODE;
use super::storage::OtpStore;
use crate::api::error::ApiError;
use crate::gateway::SmsGateway;

const DEFAULT_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_RESEND_INTERVAL_SECONDS: i64 = 30;
const DEFAULT_MAX_ATTEMPTS: i32 = 5;
pub const DEFAULT_SMS_TEMPLATE: &str =
    "Your moverline booking code is {code}. It expires in 10 minutes.";

#[derive(Clone)]
pub struct OtpConfig {
    salt: Option<SecretString>,
    sms_template: String,
    sms_disabled: bool,
    default_country_code: String,
    ttl_seconds: i64,
    resend_interval_seconds: i64,
    max_attempts: i32,
}

impl OtpConfig {
    #[must_use]
    pub fn new(salt: Option<SecretString>) -> Self {
        Self {
            salt,
            sms_template: DEFAULT_SMS_TEMPLATE.to_string(),
            sms_disabled: false,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
            resend_interval_seconds: DEFAULT_RESEND_INTERVAL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_sms_template(mut self, template: String) -> Self {
        self.sms_template = template;
        self
    }

    /// Skip real SMS dispatch and echo the code back in the response.
    #[must_use]
    pub fn with_sms_disabled(mut self, disabled: bool) -> Self {
        self.sms_disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_default_country_code(mut self, code: String) -> Self {
        self.default_country_code = code.trim_start_matches('+').to_string();
        self
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_resend_interval_seconds(mut self, seconds: i64) -> Self {
        self.resend_interval_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: i32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// The salt is required for both issuance and verification.
    pub(super) fn salt(&self) -> Result<&str, ApiError> {
        self.salt
            .as_ref()
            .map(|salt| salt.expose_secret())
            .filter(|salt| !salt.is_empty())
            .ok_or(ApiError::Configuration("MOVERLINE_OTP_SALT"))
    }

    /// Render the SMS body; `{code}` is replaced by the code.
    pub(super) fn render_sms(&self, code: &str) -> String {
        if self.sms_template.contains("{code}") {
            self.sms_template.replace("{code}", code)
        } else {
            format!("{} {code}", self.sms_template.trim_end())
        }
    }

    pub(super) fn sms_disabled(&self) -> bool {
        self.sms_disabled
    }

    pub(super) fn default_country_code(&self) -> &str {
        &self.default_country_code
    }

    pub(super) fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub(super) fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }

    pub(super) fn resend_interval(&self) -> Duration {
        Duration::seconds(self.resend_interval_seconds)
    }

    pub(super) fn max_attempts(&self) -> i32 {
        self.max_attempts
    }
}

impl std::fmt::Debug for OtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpConfig")
            .field("salt", &self.salt.as_ref().map(|_| "***"))
            .field("sms_template", &self.sms_template)
            .field("sms_disabled", &self.sms_disabled)
            .field("default_country_code", &self.default_country_code)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("resend_interval_seconds", &self.resend_interval_seconds)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

pub struct OtpState {
    config: OtpConfig,
    store: Arc<dyn OtpStore>,
    sms: Arc<dyn SmsGateway>,
}

impl OtpState {
    #[must_use]
    pub fn new(config: OtpConfig, store: Arc<dyn OtpStore>, sms: Arc<dyn SmsGateway>) -> Self {
        Self { config, store, sms }
    }

    #[must_use]
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    pub(super) fn store(&self) -> &dyn OtpStore {
        self.store.as_ref()
    }

    pub(super) fn sms(&self) -> &dyn SmsGateway {
        self.sms.as_ref()
    }
}

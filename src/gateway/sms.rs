//! SMS delivery through the Twilio Messages API.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{rejected, GatewayError, GatewayFuture};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Clone, Debug, Default)]
pub struct SmsReceipt {
    /// Provider message id, when the provider returns one.
    pub sid: Option<String>,
}

pub trait SmsGateway: Send + Sync {
    /// Fail fast when credentials are missing, before anything is persisted.
    ///
    /// # Errors
    /// Returns `GatewayError::NotConfigured` naming the first missing setting.
    fn ensure_configured(&self) -> Result<(), GatewayError>;

    fn send<'a>(&'a self, to: &'a str, body: &'a str) -> GatewayFuture<'a, SmsReceipt>;
}

#[derive(Clone, Default)]
pub struct TwilioOptions {
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    pub from: Option<String>,
}

impl std::fmt::Debug for TwilioOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioOptions")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TwilioSms {
    client: Client,
    options: TwilioOptions,
    base_url: String,
}

impl TwilioSms {
    #[must_use]
    pub fn new(client: Client, options: TwilioOptions) -> Self {
        Self {
            client,
            options,
            base_url: TWILIO_API_BASE.to_string(),
        }
    }

    fn credentials(&self) -> Result<(&str, &SecretString, &str), GatewayError> {
        let sid = self
            .options
            .account_sid
            .as_deref()
            .filter(|sid| !sid.is_empty())
            .ok_or(GatewayError::NotConfigured("MOVERLINE_TWILIO_ACCOUNT_SID"))?;
        let token = self
            .options
            .auth_token
            .as_ref()
            .filter(|token| !token.expose_secret().is_empty())
            .ok_or(GatewayError::NotConfigured("MOVERLINE_TWILIO_AUTH_TOKEN"))?;
        let from = self
            .options
            .from
            .as_deref()
            .filter(|from| !from.is_empty())
            .ok_or(GatewayError::NotConfigured("MOVERLINE_TWILIO_FROM"))?;
        Ok((sid, token, from))
    }

    #[instrument(skip(self, body))]
    async fn send_message(&self, to: &str, body: &str) -> Result<SmsReceipt, GatewayError> {
        let (sid, token, from) = self.credentials()?;
        let url = format!("{}/2010-04-01/Accounts/{sid}/Messages.json", self.base_url);

        let form = [("To", to), ("From", from), ("Body", body)];
        let response = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(format!("SMS request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(rejected("Twilio", response).await);
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|err| GatewayError::Transport(format!("invalid SMS response: {err}")))?;

        debug!(sid = ?resource.sid, "SMS accepted");

        Ok(SmsReceipt { sid: resource.sid })
    }
}

impl SmsGateway for TwilioSms {
    fn ensure_configured(&self) -> Result<(), GatewayError> {
        self.credentials().map(|_| ())
    }

    fn send<'a>(&'a self, to: &'a str, body: &'a str) -> GatewayFuture<'a, SmsReceipt> {
        Box::pin(self.send_message(to, body))
    }
}

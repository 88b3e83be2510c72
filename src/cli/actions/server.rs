use crate::{
    api::{
        self,
        handlers::{
            otp::{OtpConfig, OtpState, PgOtpStore},
            payments::{PaymentConfig, PaymentState, PgPaymentLedger},
            push::{PgBookingDirectory, PushState},
        },
        AppState,
    },
    cli::commands::otp,
    gateway::{self, ExpoPush, RazorpayClient, TwilioOptions, TwilioSms},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub gateway_timeout_seconds: u64,
    pub otp: otp::Options,
    pub twilio: TwilioOptions,
    pub payments: PaymentConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database or HTTP client cannot be set up, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    // One client for every provider, built once for the life of the process.
    let client = gateway::http_client(Duration::from_secs(args.gateway_timeout_seconds))?;

    let otp_config = OtpConfig::new(args.otp.salt)
        .with_sms_template(args.otp.sms_template)
        .with_sms_disabled(args.otp.sms_disabled)
        .with_default_country_code(args.otp.default_country_code);

    let state = AppState {
        pool: pool.clone(),
        otp: Arc::new(OtpState::new(
            otp_config,
            Arc::new(PgOtpStore::new(pool.clone())),
            Arc::new(TwilioSms::new(client.clone(), args.twilio)),
        )),
        payments: Arc::new(PaymentState::new(
            args.payments,
            Arc::new(RazorpayClient::new(client.clone())),
            Arc::new(PgPaymentLedger::new(pool.clone())),
        )),
        push: Arc::new(PushState::new(
            Arc::new(PgBookingDirectory::new(pool)),
            Arc::new(ExpoPush::new(client)),
        )),
    };

    api::new(args.port, state).await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        gateway_timeout_seconds = args.gateway_timeout_seconds,
        default_country_code = %args.otp.default_country_code,
        "starting moverline"
    );
    if args.otp.salt.is_none() {
        warn!("MOVERLINE_OTP_SALT is not set; OTP endpoints will fail closed");
    }
    if args.otp.sms_disabled {
        warn!("SMS dispatch disabled; OTP codes are returned in responses");
    } else if args.twilio.account_sid.is_none()
        || args.twilio.auth_token.is_none()
        || args.twilio.from.is_none()
    {
        warn!("Twilio credentials incomplete; OTP sending will fail closed");
    }
}

use crate::api::handlers::payments::PaymentConfig;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_RAZORPAY_KEY_ID: &str = "razorpay-key-id";
pub const ARG_RAZORPAY_KEY_SECRET: &str = "razorpay-key-secret";
pub const ARG_RAZORPAY_WEBHOOK_SECRET: &str = "razorpay-webhook-secret";

#[must_use]
pub fn parse(matches: &ArgMatches) -> PaymentConfig {
    let get_non_empty = |id: &str| {
        matches
            .get_one::<String>(id)
            .cloned()
            .filter(|v| !v.trim().is_empty())
    };

    PaymentConfig::new()
        .with_key_id(get_non_empty(ARG_RAZORPAY_KEY_ID))
        .with_key_secret(get_non_empty(ARG_RAZORPAY_KEY_SECRET).map(SecretString::from))
        .with_webhook_secret(get_non_empty(ARG_RAZORPAY_WEBHOOK_SECRET).map(SecretString::from))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_RAZORPAY_KEY_ID)
                .long(ARG_RAZORPAY_KEY_ID)
                .help("Razorpay API key id (returned to clients with each order)")
                .env("MOVERLINE_RAZORPAY_KEY_ID"),
        )
        .arg(
            Arg::new(ARG_RAZORPAY_KEY_SECRET)
                .long(ARG_RAZORPAY_KEY_SECRET)
                .help("Razorpay API key secret")
                .env("MOVERLINE_RAZORPAY_KEY_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_RAZORPAY_WEBHOOK_SECRET)
                .long(ARG_RAZORPAY_WEBHOOK_SECRET)
                .help("Razorpay webhook signing secret")
                .env("MOVERLINE_RAZORPAY_WEBHOOK_SECRET")
                .hide_env_values(true),
        )
}

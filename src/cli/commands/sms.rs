use crate::gateway::TwilioOptions;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TWILIO_ACCOUNT_SID: &str = "twilio-account-sid";
pub const ARG_TWILIO_AUTH_TOKEN: &str = "twilio-auth-token";
pub const ARG_TWILIO_FROM: &str = "twilio-from";

/// Twilio credentials are optional at startup; sending fails closed without them.
#[must_use]
pub fn parse(matches: &ArgMatches) -> TwilioOptions {
    let get_non_empty = |id: &str| {
        matches
            .get_one::<String>(id)
            .cloned()
            .filter(|v| !v.trim().is_empty())
    };

    TwilioOptions {
        account_sid: get_non_empty(ARG_TWILIO_ACCOUNT_SID),
        auth_token: get_non_empty(ARG_TWILIO_AUTH_TOKEN).map(SecretString::from),
        from: get_non_empty(ARG_TWILIO_FROM),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TWILIO_ACCOUNT_SID)
                .long(ARG_TWILIO_ACCOUNT_SID)
                .help("Twilio account SID")
                .env("MOVERLINE_TWILIO_ACCOUNT_SID"),
        )
        .arg(
            Arg::new(ARG_TWILIO_AUTH_TOKEN)
                .long(ARG_TWILIO_AUTH_TOKEN)
                .help("Twilio auth token")
                .env("MOVERLINE_TWILIO_AUTH_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TWILIO_FROM)
                .long(ARG_TWILIO_FROM)
                .help("Sender number or messaging service for booking SMS")
                .env("MOVERLINE_TWILIO_FROM"),
        )
}

//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    otp, payments, sms, ARG_DSN, ARG_GATEWAY_TIMEOUT_SECONDS, ARG_PORT,
};
use crate::gateway::DEFAULT_GATEWAY_TIMEOUT_SECONDS;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let gateway_timeout_seconds = matches
        .get_one::<u64>(ARG_GATEWAY_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECONDS);

    let otp = otp::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        gateway_timeout_seconds,
        otp,
        twilio: sms::parse(matches),
        payments: payments::parse(matches),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DSN: &str = "postgres://moverline@localhost:5432/moverline";

    #[test]
    fn server_action_collects_every_group() {
        temp_env::with_vars(
            [
                ("MOVERLINE_DSN", Some(DSN)),
                ("MOVERLINE_OTP_SALT", Some("pepper")),
                ("MOVERLINE_DEFAULT_COUNTRY_CODE", Some("+44")),
                ("MOVERLINE_TWILIO_ACCOUNT_SID", Some("AC123")),
                ("MOVERLINE_TWILIO_AUTH_TOKEN", Some("")),
                ("MOVERLINE_PORT", None),
                ("MOVERLINE_OTP_DISABLE_SMS", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["moverline"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.dsn, DSN);
                    assert_eq!(args.gateway_timeout_seconds, 20);
                    assert!(args.otp.salt.is_some());
                    assert!(!args.otp.sms_disabled);
                    assert_eq!(args.otp.default_country_code, "44");
                    assert_eq!(args.twilio.account_sid.as_deref(), Some("AC123"));
                    assert!(args.twilio.auth_token.is_none());
                }
            },
        );
    }

    #[test]
    fn invalid_country_code_is_rejected() {
        temp_env::with_vars(
            [
                ("MOVERLINE_DSN", Some(DSN)),
                ("MOVERLINE_DEFAULT_COUNTRY_CODE", Some("IN")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["moverline"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err.to_string().contains("--default-country-code"));
                }
            },
        );
    }
}

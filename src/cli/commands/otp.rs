use crate::api::handlers::otp::state::DEFAULT_SMS_TEMPLATE;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_OTP_SALT: &str = "otp-salt";
pub const ARG_OTP_SMS_TEMPLATE: &str = "otp-sms-template";
pub const ARG_OTP_DISABLE_SMS: &str = "otp-disable-sms";
pub const ARG_DEFAULT_COUNTRY_CODE: &str = "default-country-code";

#[derive(Clone)]
pub struct Options {
    pub salt: Option<SecretString>,
    pub sms_template: String,
    pub sms_disabled: bool,
    pub default_country_code: String,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("salt", &self.salt.as_ref().map(|_| "***"))
            .field("sms_template", &self.sms_template)
            .field("sms_disabled", &self.sms_disabled)
            .field("default_country_code", &self.default_country_code)
            .finish()
    }
}

impl Options {
    /// Parse OTP arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the default country code is not numeric.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let default_country_code = matches
            .get_one::<String>(ARG_DEFAULT_COUNTRY_CODE)
            .map_or("91", String::as_str)
            .trim()
            .trim_start_matches('+')
            .to_string();
        if default_country_code.is_empty()
            || !default_country_code.chars().all(|c| c.is_ascii_digit())
        {
            anyhow::bail!("invalid --{ARG_DEFAULT_COUNTRY_CODE}: {default_country_code}");
        }

        Ok(Self {
            salt: matches
                .get_one::<String>(ARG_OTP_SALT)
                .filter(|salt| !salt.is_empty())
                .map(|salt| SecretString::from(salt.clone())),
            sms_template: matches
                .get_one::<String>(ARG_OTP_SMS_TEMPLATE)
                .cloned()
                .unwrap_or_else(|| DEFAULT_SMS_TEMPLATE.to_string()),
            sms_disabled: matches.get_flag(ARG_OTP_DISABLE_SMS),
            default_country_code,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OTP_SALT)
                .long(ARG_OTP_SALT)
                .help("Secret salt mixed into every stored OTP digest")
                .env("MOVERLINE_OTP_SALT")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_OTP_SMS_TEMPLATE)
                .long(ARG_OTP_SMS_TEMPLATE)
                .help("SMS body; {code} is replaced by the code")
                .env("MOVERLINE_OTP_SMS_TEMPLATE")
                .default_value(DEFAULT_SMS_TEMPLATE),
        )
        .arg(
            Arg::new(ARG_OTP_DISABLE_SMS)
                .long(ARG_OTP_DISABLE_SMS)
                .help("Do not send SMS; return the code in the response (development only)")
                .env("MOVERLINE_OTP_DISABLE_SMS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_DEFAULT_COUNTRY_CODE)
                .long(ARG_DEFAULT_COUNTRY_CODE)
                .help("Country code prefixed to bare 10-digit phone numbers")
                .env("MOVERLINE_DEFAULT_COUNTRY_CODE")
                .default_value("91"),
        )
}

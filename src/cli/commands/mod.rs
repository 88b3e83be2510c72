pub mod logging;
pub mod otp;
pub mod payments;
pub mod sms;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_GATEWAY_TIMEOUT_SECONDS: &str = "gateway-timeout-seconds";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("moverline")
        .about("Booking backend for a packers & movers app")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("MOVERLINE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("MOVERLINE_DSN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_GATEWAY_TIMEOUT_SECONDS)
                .long(ARG_GATEWAY_TIMEOUT_SECONDS)
                .help("Timeout for calls to SMS, push and payment providers")
                .env("MOVERLINE_GATEWAY_TIMEOUT_SECONDS")
                .default_value("20")
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        );

    let command = otp::with_args(command);
    let command = sms::with_args(command);
    let command = payments::with_args(command);
    logging::with_args(command)
}

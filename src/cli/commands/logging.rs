use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept either a count (`0..=5`) or a level name in `MOVERLINE_LOG_LEVEL`.
fn parse_log_level(level: &str) -> Result<u8, String> {
    if let Ok(count) = level.parse::<u8>() {
        return if count <= 5 {
            Ok(count)
        } else {
            Err(format!("log level {count} is out of range (0-5)"))
        };
    }

    let level = level.to_ascii_lowercase();
    LEVEL_NAMES
        .iter()
        .position(|name| *name == level)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("MOVERLINE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_log_level)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_counts_parse() {
        assert_eq!(parse_log_level("ERROR"), Ok(0));
        assert_eq!(parse_log_level("debug"), Ok(3));
        assert_eq!(parse_log_level("4"), Ok(4));
        assert!(parse_log_level("9").is_err());
        assert!(parse_log_level("loud").is_err());
    }
}

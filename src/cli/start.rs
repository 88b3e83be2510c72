use crate::cli::{actions::Action, commands, commands::logging::ARG_VERBOSITY, dispatch, telemetry};
use anyhow::Result;
use tracing::Level;

/// Parse the command line, install telemetry and return the action to run.
///
/// # Errors
/// Returns an error if telemetry cannot be installed or the arguments are invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(get_verbosity_level(
        matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0),
    ))?;

    dispatch::handler(&matches)
}

/// `None` leaves the default (ERROR) in place.
fn get_verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

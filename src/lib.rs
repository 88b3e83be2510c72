//! # Moverline (booking backend for a packers & movers app)
//!
//! `moverline` hosts the backend functions the mobile client calls for
//! anything that needs a server-held secret:
//!
//! - **Booking OTP:** issue and verify a 6-digit code that confirms the customer's
//!   phone number before a booking is placed. Codes are never stored; the database
//!   keeps a salted SHA-256 digest, an expiry, an attempt counter and a verified flag
//!   in a single row per phone number.
//! - **Payments:** thin proxies to Razorpay for order creation and checkout
//!   signature verification, plus the signed webhook the gateway calls back.
//! - **Push fan-out:** booking status changes and OTP disclosures are pushed to
//!   the customer, the administrators and the assigned driver, one message per
//!   unique device token.
//!
//! ## Failure model
//!
//! Every handler is a stateless request/response cycle. Validation and rate
//! limits are enforced before any side effect, missing secrets fail closed with
//! `500`, and every failure is returned as a JSON `{ "error": ... }` body.

pub mod api;
pub mod cli;
pub mod gateway;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

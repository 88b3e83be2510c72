//! Error taxonomy shared by every handler.
//!
//! Each variant maps to one HTTP status and renders as `{ "error": "..." }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed input, rejected before any side effect.
    #[error("{0}")]
    Validation(String),
    /// Resend throttling, rejected before any side effect.
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Code expired")]
    Expired,
    #[error("Too many attempts")]
    TooManyAttempts,
    #[error("Invalid code")]
    InvalidCode,
    #[error("{0}")]
    Unauthorized(String),
    /// A store or gateway call failed.
    #[error("{0}")]
    Upstream(String),
    /// A required secret or setting is absent.
    #[error("Missing configuration: {0}")]
    Configuration(&'static str),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Expired | Self::InvalidCode => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) | Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) | Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log an internal failure and hide its details behind a generic message.
    pub fn internal(context: &str, err: &anyhow::Error) -> Self {
        error!("{context}: {err:#}");
        Self::Upstream(context.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured(setting) => Self::Configuration(setting),
            GatewayError::Transport(message) | GatewayError::Rejected { message, .. } => {
                error!("gateway call failed: {message}");
                Self::Upstream(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use http_body_util::BodyExt;
    use serde_json::Value;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("Invalid phone number".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RateLimited("slow down".to_string()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ApiError::TooManyAttempts.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::NotFound("OTP not found".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthorized("Invalid signature".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Configuration("MOVERLINE_OTP_SALT").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn gateway_not_configured_becomes_configuration() {
        let err: ApiError = GatewayError::NotConfigured("MOVERLINE_TWILIO_FROM").into();
        assert_eq!(err, ApiError::Configuration("MOVERLINE_TWILIO_FROM"));
        assert_eq!(
            err.to_string(),
            "Missing configuration: MOVERLINE_TWILIO_FROM"
        );
    }

    #[test]
    fn gateway_rejection_keeps_upstream_message() {
        let err: ApiError = GatewayError::Rejected {
            status: 400,
            message: "The 'To' number is not valid.".to_string(),
        }
        .into();
        assert_eq!(
            err,
            ApiError::Upstream("The 'To' number is not valid.".to_string())
        );
    }

    #[test]
    fn internal_error_hides_details() {
        let err = ApiError::internal("Failed to load OTP", &anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Failed to load OTP");
    }

    #[tokio::test]
    async fn renders_json_error_body() -> Result<()> {
        let response = ApiError::NotFound("Booking not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await?.to_bytes();
        let body: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["error"], "Booking not found");
        Ok(())
    }
}

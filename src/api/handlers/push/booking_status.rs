//! Fan out booking status changes and handover-code events as push notifications.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::messages::{otp_notification, status_notification, OtpKind};
use super::recipients::{Audience, RecipientList};
use super::state::PushState;
use super::storage::{BookingParties, Profile};
use super::types::{BookingPushRequest, BookingPushResponse};
use crate::api::error::ApiError;
use crate::api::handlers::{parse_booking_id, parse_uuid_field};
use crate::gateway::PushMessage;

#[derive(Clone, Debug, PartialEq, Eq)]
enum PushEvent {
    Status {
        status: String,
        previous_driver_id: Option<Uuid>,
    },
    Otp(OtpKind),
}

fn parse_event(request: &BookingPushRequest) -> Result<(Uuid, PushEvent), ApiError> {
    let booking_id = parse_booking_id(&request.booking_id)?;

    if request.kind.as_deref().map(str::trim) == Some("otp") {
        let kind = request
            .otp_kind
            .as_deref()
            .and_then(OtpKind::parse)
            .ok_or_else(|| {
                ApiError::Validation("otp_kind must be pickup or delivery".to_string())
            })?;
        return Ok((booking_id, PushEvent::Otp(kind)));
    }

    let status = request
        .status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing status".to_string()))?
        .to_ascii_lowercase();
    let previous_driver_id = request
        .previous_driver_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(|id| parse_uuid_field(id, "previous_driver_id"))
        .transpose()?;

    Ok((
        booking_id,
        PushEvent::Status {
            status,
            previous_driver_id,
        },
    ))
}

fn token_of(profiles: &[Profile], id: Option<Uuid>) -> Option<&str> {
    let id = id?;
    profiles
        .iter()
        .find(|profile| profile.id == id)
        .and_then(|profile| profile.push_token.as_deref())
}

/// Customer first, then administrators, then drivers.
async fn resolve_recipients(
    state: &PushState,
    booking: &BookingParties,
    event: &PushEvent,
) -> Result<RecipientList, ApiError> {
    let previous_driver_id = match event {
        PushEvent::Status {
            previous_driver_id, ..
        } => previous_driver_id.filter(|id| Some(*id) != booking.driver_id),
        PushEvent::Otp(_) => None,
    };
    let ids: Vec<Uuid> = [booking.customer_id, booking.driver_id, previous_driver_id]
        .into_iter()
        .flatten()
        .collect();
    let profiles = state
        .directory()
        .profiles(&ids)
        .await
        .map_err(|err| ApiError::internal("Failed to load recipients", &err))?;

    let mut recipients = RecipientList::new();
    recipients.add(token_of(&profiles, booking.customer_id), Audience::Customer);

    if let PushEvent::Status { .. } = event {
        let administrators = state
            .directory()
            .administrators()
            .await
            .map_err(|err| ApiError::internal("Failed to load recipients", &err))?;
        for admin in &administrators {
            recipients.add(admin.push_token.as_deref(), Audience::Admin);
        }
        recipients.add(
            token_of(&profiles, booking.driver_id),
            Audience::AssignedDriver,
        );
        recipients.add(
            token_of(&profiles, previous_driver_id),
            Audience::UnassignedDriver,
        );
    }

    Ok(recipients)
}

pub(super) async fn notify_booking(
    state: &PushState,
    request: &BookingPushRequest,
) -> Result<BookingPushResponse, ApiError> {
    let (booking_id, event) = parse_event(request)?;

    let booking = state
        .directory()
        .booking(booking_id)
        .await
        .map_err(|err| ApiError::internal("Failed to load booking", &err))?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    let recipients = resolve_recipients(state, &booking, &event).await?;
    let otp_kind = match &event {
        PushEvent::Otp(kind) => Some(kind.as_str().to_string()),
        PushEvent::Status { .. } => None,
    };
    if recipients.is_empty() {
        return Ok(BookingPushResponse {
            sent: 0,
            skipped: Some(true),
            reason: Some("No push tokens".to_string()),
            otp_kind,
        });
    }

    let reference = booking.display_reference();
    let data: Value = match &event {
        PushEvent::Status { status, .. } => json!({ "booking_id": booking_id, "status": status }),
        PushEvent::Otp(kind) => {
            json!({ "booking_id": booking_id, "type": "otp", "otp_kind": kind.as_str() })
        }
    };

    let mut sent = 0;
    for recipient in recipients.into_vec() {
        let notification = match &event {
            PushEvent::Status { status, .. } => {
                status_notification(status, &reference, recipient.audience)
            }
            PushEvent::Otp(kind) => otp_notification(*kind, &reference),
        };
        let message = PushMessage::new(
            recipient.token,
            notification.title,
            notification.body,
            data.clone(),
        );
        match state.gateway().send(&message).await {
            Ok(()) => sent += 1,
            Err(err) => warn!(
                booking_id = %booking_id,
                audience = ?recipient.audience,
                "push delivery failed: {err}"
            ),
        }
    }
    info!(booking_id = %booking_id, sent, "booking push dispatched");

    Ok(BookingPushResponse {
        sent,
        skipped: None,
        reason: None,
        otp_kind,
    })
}

#[utoipa::path(
    post,
    path = "/send-booking-status-push",
    request_body = BookingPushRequest,
    responses(
        (status = 200, description = "Notifications dispatched or skipped", body = BookingPushResponse),
        (status = 400, description = "Invalid booking id or event"),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Store failure")
    ),
    tag = "push"
)]
pub async fn send_booking_status_push(
    push: Extension<Arc<PushState>>,
    payload: Option<Json<BookingPushRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return ApiError::Validation("Missing payload".to_string()).into_response();
    };

    match notify_booking(&push, &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

//! Notification wording per booking status, OTP kind and audience.

use super::recipients::Audience;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Which code the customer must hand to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpKind {
    Pickup,
    Delivery,
}

impl OtpKind {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pickup" => Some(Self::Pickup),
            "delivery" => Some(Self::Delivery),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

fn humanize(status: &str) -> String {
    status.replace(['_', '-'], " ")
}

/// Message for a status change. Unknown statuses get a generic update.
#[must_use]
pub fn status_notification(status: &str, reference: &str, audience: Audience) -> Notification {
    match audience {
        Audience::UnassignedDriver => {
            return Notification::new(
                "Job unassigned",
                format!("You are no longer assigned to booking {reference}."),
            )
        }
        Audience::Admin => {
            return Notification::new(
                format!("Booking {reference}"),
                format!("Status changed to {}.", humanize(status)),
            )
        }
        Audience::Customer | Audience::AssignedDriver => {}
    }

    let driver = audience == Audience::AssignedDriver;
    match status {
        "confirmed" => Notification::new(
            "Booking confirmed",
            format!("Booking {reference} is confirmed."),
        ),
        "driver_assigned" if driver => Notification::new(
            "New job assigned",
            format!("You have been assigned booking {reference}."),
        ),
        "driver_assigned" => Notification::new(
            "Driver assigned",
            format!("A driver has been assigned to your booking {reference}."),
        ),
        "driver_arriving" if driver => Notification::new(
            "Head to pickup",
            format!("The customer for booking {reference} is expecting you."),
        ),
        "driver_arriving" => Notification::new(
            "Driver on the way",
            format!("Your driver is on the way for booking {reference}."),
        ),
        "in_transit" => Notification::new(
            "In transit",
            format!("Booking {reference} is on the move."),
        ),
        "delivered" => Notification::new(
            "Delivered",
            format!("Booking {reference} has been delivered."),
        ),
        "completed" => Notification::new(
            "Booking completed",
            format!("Booking {reference} is complete. Thank you for moving with us."),
        ),
        "cancelled" => Notification::new(
            "Booking cancelled",
            format!("Booking {reference} has been cancelled."),
        ),
        other => Notification::new(
            "Booking update",
            format!("Booking {reference} is now {}.", humanize(other)),
        ),
    }
}

/// Tell the customer their handover code is ready. The code itself is never pushed.
#[must_use]
pub fn otp_notification(kind: OtpKind, reference: &str) -> Notification {
    match kind {
        OtpKind::Pickup => Notification::new(
            "Pickup code ready",
            format!("Share your pickup code with the driver to start booking {reference}."),
        ),
        OtpKind::Delivery => Notification::new(
            "Delivery code ready",
            format!("Share your delivery code with the driver to complete booking {reference}."),
        ),
    }
}

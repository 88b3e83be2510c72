use super::handlers::{health, otp, payments, push};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Every documented route, registered once for both serving and the document.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(otp::send::send_booking_otp))
        .routes(routes!(otp::verify::verify_booking_otp))
        .routes(routes!(payments::order::razorpay_order))
        .routes(routes!(payments::verify::razorpay_verify))
        .routes(routes!(payments::webhook::razorpay_webhook))
        .routes(routes!(push::booking_status::send_booking_status_push))
}

fn tags() -> Vec<Tag> {
    [
        ("health", "Service and database health"),
        ("otp", "Booking phone verification"),
        ("payments", "Payment orders, verification and webhooks"),
        ("push", "Booking notifications"),
    ]
    .into_iter()
    .map(|(name, description)| {
        let mut tag = Tag::new(name);
        tag.description = Some(description.to_string());
        tag
    })
    .collect()
}

/// Document info taken from the package manifest, plus the tag list.
fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    // Only the first of the `;` separated authors becomes the contact.
    info.contact = env!("CARGO_PKG_AUTHORS")
        .split(';')
        .next()
        .map(parse_author)
        .filter(|(name, email)| name.is_some() || email.is_some())
        .map(|(name, email)| {
            let mut contact = Contact::new();
            contact.name = name.map(str::to_string);
            contact.email = email.map(str::to_string);
            contact
        });

    info.license = non_empty(env!("CARGO_PKG_LICENSE")).map(|spdx| {
        let mut license = License::new(spdx);
        license.identifier = Some(spdx.to_string());
        license
    });

    OpenApiBuilder::new().info(info).tags(Some(tags())).build()
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Split `Name <email>` into its parts.
fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}

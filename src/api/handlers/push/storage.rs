//! Booking and profile lookups for push fan-out.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::{warn, Instrument};
use uuid::Uuid;

use super::recipients::Role;
use crate::api::handlers::otp::storage::StoreFuture;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingParties {
    pub id: Uuid,
    pub reference: Option<String>,
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

impl BookingParties {
    /// Human reference for messages; falls back to the short id.
    #[must_use]
    pub fn display_reference(&self) -> String {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
            .map_or_else(
                || self.id.simple().to_string()[..8].to_uppercase(),
                str::to_string,
            )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub push_token: Option<String>,
}

pub trait BookingDirectory: Send + Sync {
    fn booking<'a>(&'a self, booking_id: Uuid) -> StoreFuture<'a, Option<BookingParties>>;

    /// Profiles for the given ids, in no particular order.
    fn profiles<'a>(&'a self, ids: &'a [Uuid]) -> StoreFuture<'a, Vec<Profile>>;

    /// Every administrative profile that has a push token.
    fn administrators<'a>(&'a self) -> StoreFuture<'a, Vec<Profile>>;
}

fn profile_from_row(row: &sqlx::postgres::PgRow) -> Option<Profile> {
    let id: Uuid = row.get("id");
    let role: String = row.get("role");
    let Some(role) = Role::parse(&role) else {
        warn!(profile_id = %id, role, "skipping profile with unknown role");
        return None;
    };
    Some(Profile {
        id,
        role,
        push_token: row.get("push_token"),
    })
}

#[derive(Clone, Debug)]
pub struct PgBookingDirectory {
    pool: PgPool,
}

impl PgBookingDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn booking_row(&self, booking_id: Uuid) -> Result<Option<BookingParties>> {
        let query = r"
            SELECT id, reference, customer_id, driver_id
            FROM bookings
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup booking")?;

        Ok(row.map(|row| BookingParties {
            id: row.get("id"),
            reference: row.get("reference"),
            customer_id: row.get("customer_id"),
            driver_id: row.get("driver_id"),
        }))
    }

    async fn profile_rows(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = r"
            SELECT id, role, push_token
            FROM profiles
            WHERE id = ANY($1)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(ids)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup profiles")?;

        Ok(rows.iter().filter_map(profile_from_row).collect())
    }

    async fn administrator_rows(&self) -> Result<Vec<Profile>> {
        let query = r"
            SELECT id, role, push_token
            FROM profiles
            WHERE role IN ('admin', 'staff') AND push_token IS NOT NULL
            ORDER BY id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup administrators")?;

        Ok(rows
            .iter()
            .filter_map(profile_from_row)
            .filter(|profile| profile.role.is_administrative())
            .collect())
    }
}

impl BookingDirectory for PgBookingDirectory {
    fn booking<'a>(&'a self, booking_id: Uuid) -> StoreFuture<'a, Option<BookingParties>> {
        Box::pin(self.booking_row(booking_id))
    }

    fn profiles<'a>(&'a self, ids: &'a [Uuid]) -> StoreFuture<'a, Vec<Profile>> {
        Box::pin(self.profile_rows(ids))
    }

    fn administrators<'a>(&'a self) -> StoreFuture<'a, Vec<Profile>> {
        Box::pin(self.administrator_rows())
    }
}

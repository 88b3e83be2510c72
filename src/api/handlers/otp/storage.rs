//! Database access for the per-phone OTP row.
//!
//! Every write is a single statement so the row is never observed half-updated:
//! issuance replaces all mutable columns in one upsert, and verification touches
//! either `verified` or `attempts` with a conditional `UPDATE`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::{future::Future, pin::Pin};
use tracing::Instrument;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpRecord {
    pub phone: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub verified: bool,
    pub last_sent_at: DateTime<Utc>,
}

impl OtpRecord {
    /// A fresh row for a newly issued code.
    #[must_use]
    pub fn issued(
        phone: String,
        otp_hash: String,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            phone,
            otp_hash,
            expires_at: now + ttl,
            attempts: 0,
            verified: false,
            last_sent_at: now,
        }
    }
}

pub trait OtpStore: Send + Sync {
    fn fetch<'a>(&'a self, phone: &'a str) -> StoreFuture<'a, Option<OtpRecord>>;

    /// Insert or fully replace the row for `record.phone`.
    fn upsert<'a>(&'a self, record: &'a OtpRecord) -> StoreFuture<'a, ()>;

    /// Flip `verified` to true if the row still carries `otp_hash`.
    /// Returns false when a newer issuance replaced the hash in between.
    fn mark_verified<'a>(&'a self, phone: &'a str, otp_hash: &'a str) -> StoreFuture<'a, bool>;

    /// Count a failed attempt against the issuance carrying `otp_hash`, never
    /// exceeding `max_attempts`. A row replaced in between is left untouched.
    fn record_failed_attempt<'a>(
        &'a self,
        phone: &'a str,
        otp_hash: &'a str,
        max_attempts: i32,
    ) -> StoreFuture<'a, ()>;
}

#[derive(Clone, Debug)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_row(&self, phone: &str) -> Result<Option<OtpRecord>> {
        let query = r"
            SELECT phone, otp_hash, expires_at, attempts, verified, last_sent_at
            FROM booking_otps
            WHERE phone = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup OTP record")?;

        Ok(row.map(|row| OtpRecord {
            phone: row.get("phone"),
            otp_hash: row.get("otp_hash"),
            expires_at: row.get("expires_at"),
            attempts: row.get("attempts"),
            verified: row.get("verified"),
            last_sent_at: row.get("last_sent_at"),
        }))
    }

    async fn upsert_row(&self, record: &OtpRecord) -> Result<()> {
        let query = r"
            INSERT INTO booking_otps
                (phone, otp_hash, expires_at, attempts, verified, last_sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (phone) DO UPDATE SET
                otp_hash = EXCLUDED.otp_hash,
                expires_at = EXCLUDED.expires_at,
                attempts = EXCLUDED.attempts,
                verified = EXCLUDED.verified,
                last_sent_at = EXCLUDED.last_sent_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&record.phone)
            .bind(&record.otp_hash)
            .bind(record.expires_at)
            .bind(record.attempts)
            .bind(record.verified)
            .bind(record.last_sent_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to upsert OTP record")?;

        Ok(())
    }

    async fn mark_verified_row(&self, phone: &str, otp_hash: &str) -> Result<bool> {
        let query = r"
            UPDATE booking_otps
            SET verified = TRUE
            WHERE phone = $1 AND otp_hash = $2
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(phone)
            .bind(otp_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to mark OTP verified")?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_failed_attempt_row(
        &self,
        phone: &str,
        otp_hash: &str,
        max_attempts: i32,
    ) -> Result<()> {
        let query = r"
            UPDATE booking_otps
            SET attempts = attempts + 1
            WHERE phone = $1 AND attempts < $2 AND otp_hash = $3
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(phone)
            .bind(max_attempts)
            .bind(otp_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to record OTP attempt")?;

        Ok(())
    }
}

impl OtpStore for PgOtpStore {
    fn fetch<'a>(&'a self, phone: &'a str) -> StoreFuture<'a, Option<OtpRecord>> {
        Box::pin(self.fetch_row(phone))
    }

    fn upsert<'a>(&'a self, record: &'a OtpRecord) -> StoreFuture<'a, ()> {
        Box::pin(self.upsert_row(record))
    }

    fn mark_verified<'a>(&'a self, phone: &'a str, otp_hash: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(self.mark_verified_row(phone, otp_hash))
    }

    fn record_failed_attempt<'a>(
        &'a self,
        phone: &'a str,
        otp_hash: &'a str,
        max_attempts: i32,
    ) -> StoreFuture<'a, ()> {
        Box::pin(self.record_failed_attempt_row(phone, otp_hash, max_attempts))
    }
}

//! Quote lookup and payment bookkeeping.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::handlers::otp::storage::StoreFuture;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Created,
    Captured,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Captured => "captured",
            Self::Failed => "failed",
        }
    }

    /// Value written to `bookings.payment_status`, if this status changes it.
    fn booking_payment_status(self) -> Option<&'static str> {
        match self {
            Self::Created => None,
            Self::Captured => Some("paid"),
            Self::Failed => Some("failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRecord {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub booking_id: Option<Uuid>,
    pub status: PaymentStatus,
}

pub trait PaymentLedger: Send + Sync {
    /// Amount in paise of the newest accepted quote for a booking.
    fn quote_amount<'a>(&'a self, booking_id: Uuid) -> StoreFuture<'a, Option<i64>>;

    /// Upsert the payment row keyed by order id and mirror the outcome on the booking.
    fn record_payment<'a>(&'a self, record: &'a PaymentRecord) -> StoreFuture<'a, ()>;
}

#[derive(Clone, Debug)]
pub struct PgPaymentLedger {
    pool: PgPool,
}

impl PgPaymentLedger {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn quote_amount_row(&self, booking_id: Uuid) -> Result<Option<i64>> {
        let query = r"
            SELECT amount_paise
            FROM quotes
            WHERE booking_id = $1 AND accepted
            ORDER BY created_at DESC
            LIMIT 1
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
            .context("failed to lookup accepted quote")?;

        Ok(row.map(|row| row.get("amount_paise")))
    }

    async fn record_payment_rows(&self, record: &PaymentRecord) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin payment transaction")?;

        let query = r"
            INSERT INTO payments
                (razorpay_order_id, razorpay_payment_id, booking_id, status, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (razorpay_order_id) DO UPDATE SET
                razorpay_payment_id = COALESCE(EXCLUDED.razorpay_payment_id, payments.razorpay_payment_id),
                booking_id = COALESCE(EXCLUDED.booking_id, payments.booking_id),
                status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING booking_id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&record.order_id)
            .bind(record.payment_id.as_deref())
            .bind(record.booking_id)
            .bind(record.status.as_str())
            .fetch_one(&mut *tx)
            .instrument(span)
            .await
            .context("failed to upsert payment")?;
        let booking_id: Option<Uuid> = row.get("booking_id");

        if let (Some(booking_id), Some(payment_status)) =
            (booking_id, record.status.booking_payment_status())
        {
            let query = r"
                UPDATE bookings
                SET payment_status = $2
                WHERE id = $1
            ";
            let span = tracing::info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "UPDATE",
                db.statement = query
            );
            sqlx::query(query)
                .bind(booking_id)
                .bind(payment_status)
                .execute(&mut *tx)
                .instrument(span)
                .await
                .context("failed to update booking payment status")?;
        }

        tx.commit()
            .await
            .context("failed to commit payment transaction")?;

        Ok(())
    }
}

impl PaymentLedger for PgPaymentLedger {
    fn quote_amount<'a>(&'a self, booking_id: Uuid) -> StoreFuture<'a, Option<i64>> {
        Box::pin(self.quote_amount_row(booking_id))
    }

    fn record_payment<'a>(&'a self, record: &'a PaymentRecord) -> StoreFuture<'a, ()> {
        Box::pin(self.record_payment_rows(record))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_schema() {
        assert_eq!(PaymentStatus::Created.as_str(), "created");
        assert_eq!(PaymentStatus::Captured.as_str(), "captured");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn only_settled_payments_touch_booking() {
        assert_eq!(PaymentStatus::Created.booking_payment_status(), None);
        assert_eq!(
            PaymentStatus::Captured.booking_payment_status(),
            Some("paid")
        );
        assert_eq!(
            PaymentStatus::Failed.booking_payment_status(),
            Some("failed")
        );
    }
}

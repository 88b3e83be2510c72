//! Razorpay order creation, checkout verification and webhooks.

pub mod order;
pub mod signature;
pub mod state;
pub mod storage;
pub mod types;
pub mod verify;
pub mod webhook;

pub use order::razorpay_order;
pub use signature::{verify_hmac_sha256, verify_payment_signature};
pub use state::{PaymentConfig, PaymentState};
pub use storage::{PaymentLedger, PaymentRecord, PaymentStatus, PgPaymentLedger};
pub use verify::razorpay_verify;
pub use webhook::razorpay_webhook;

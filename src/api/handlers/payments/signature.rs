//! HMAC-SHA256 signature checks for gateway callbacks.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
#[must_use]
pub fn sign_hmac_sha256(payload: &[u8], secret: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// True when `signature` is exactly the hex HMAC-SHA256 of `payload`.
///
/// An empty signature or secret never verifies.
#[must_use]
pub fn verify_hmac_sha256(payload: &[u8], signature: &str, secret: &[u8]) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }
    let expected = sign_hmac_sha256(payload, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Checkout signature: HMAC of `order_id|payment_id` with the API key secret.
#[must_use]
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    let payload = format!("{order_id}|{payment_id}");
    verify_hmac_sha256(payload.as_bytes(), signature, key_secret.as_bytes())
}

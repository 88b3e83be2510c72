//! OTP code generation, hashing and comparison.

use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const OTP_DIGITS: usize = 6;

const OTP_MODULUS: u32 = 1_000_000;
// Largest multiple of OTP_MODULUS below 2^32; draws above it are rejected so
// every code is equally likely.
const OTP_REJECTION_ZONE: u32 = u32::MAX - (u32::MAX % OTP_MODULUS);

/// Draw a zero-padded 6-digit code from the OS CSPRNG.
pub(super) fn generate_code() -> Result<String> {
    generate_code_with_rng(&mut OsRng)
}

fn generate_code_with_rng<R: RngCore + ?Sized>(rng: &mut R) -> Result<String> {
    loop {
        let mut bytes = [0u8; 4];
        rng.try_fill_bytes(&mut bytes)
            .context("failed to generate OTP code")?;
        let value = u32::from_le_bytes(bytes);
        if value < OTP_REJECTION_ZONE {
            return Ok(format!("{:0width$}", value % OTP_MODULUS, width = OTP_DIGITS));
        }
    }
}

/// Strip non-digits from a submitted code; `None` unless exactly 6 digits remain.
pub(super) fn normalize_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == OTP_DIGITS).then_some(digits)
}

/// Hex SHA-256 of `phone|code|salt`; the code itself is never stored.
pub(super) fn hash_code(phone: &str, code: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{phone}|{code}|{salt}").as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two hex digests without short-circuiting on the first difference.
pub(super) fn hashes_match(expected: &str, candidate: &str) -> bool {
    expected.as_bytes().ct_eq(candidate.as_bytes()).into()
}

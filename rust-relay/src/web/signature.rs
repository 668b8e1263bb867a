//! GitHub webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 of the raw body under the
//! webhook secret and sends it as `X-Hub-Signature-256: sha256=<hex>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("webhook secret not configured")]
    SecretNotConfigured,

    /// Empty value, or no `sha256=` prefix.
    #[error("invalid signature format")]
    InvalidFormat,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a GitHub webhook signature.
///
/// # Arguments
///
/// * `secret` - The webhook secret shared with GitHub, if one was loaded
/// * `body` - The raw request body, exactly as received
/// * `signature` - The `X-Hub-Signature-256` header value
pub fn verify_github_signature(
    secret: Option<&str>,
    body: &[u8],
    signature: &str,
) -> Result<(), SignatureError> {
    let secret = match secret {
        Some(s) if !s.is_empty() => s,
        _ => return Err(SignatureError::SecretNotConfigured),
    };

    if signature.is_empty() {
        return Err(SignatureError::InvalidFormat);
    }

    let received = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::InvalidFormat)?;

    let expected = compute_signature(secret, body);

    if !constant_time_compare(&expected, received) {
        warn!(
            expected_length = expected.len(),
            actual_length = received.len(),
            "github_signature_mismatch"
        );
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

/// Lowercase hex HMAC-SHA256 of `body` under `secret`, without the prefix.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

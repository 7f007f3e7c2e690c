//! Inbound webhook signature verification.
//!
//! Relay webhooks are signed with HMAC-SHA256 over the raw request
//! body; the hex digest travels in the `X-Webhook-Signature` header.
//! Verification runs before the body is parsed into a submission.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Verify an HMAC-SHA256 hex signature over the raw request body.
///
/// A malformed signature (wrong length, bad hex) fails the comparison
/// the same way a mismatched one does; callers surface one uniform
/// "invalid signature" error so missing and malformed are not
/// distinguishable from outside.
pub fn verify_signature(raw_body: &[u8], signature_hex: &str, secret: &str) -> bool {
    if secret.is_empty() || signature_hex.is_empty() {
        warn!(
            has_secret = !secret.is_empty(),
            has_signature = !signature_hex.is_empty(),
            "webhook_signature_missing_fields"
        );
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("webhook_signature_invalid_key");
            return false;
        }
    };

    mac.update(raw_body);

    let expected = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected, signature_hex);

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature_hex.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
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

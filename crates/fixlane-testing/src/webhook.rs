//! Signed webhook helpers.
//!
//! Produces `stripe-signature` header values the way the payment gateway
//! does: `t=<unix>,v1=<hex(hmac_sha256(secret, "<t>.<body>"))>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded v1 signature over `"<timestamp>.<payload>"`.
pub fn signature(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Full `stripe-signature` header value for `payload` signed at `timestamp`.
pub fn sign_webhook(secret: &str, payload: &[u8], timestamp: i64) -> String {
    format!("t={timestamp},v1={}", signature(secret, payload, timestamp))
}

//! Credential fingerprints and request signing.
//!
//! Access tokens never appear in logs. Anything that needs to correlate
//! log lines for the same credential uses [`token_fingerprint`], a short
//! non-reversible xxHash64 digest of the token.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use xxhash_rust::xxh64::xxh64;

/// Seed for token fingerprints. Changing it invalidates log correlation.
const FINGERPRINT_SEED: u64 = 0x6665_6564;

/// Compute the log-safe fingerprint of an access token.
pub fn token_fingerprint(token: &str) -> String {
    format!("{:016x}", xxh64(token.as_bytes(), FINGERPRINT_SEED))
}

/// Compute the Graph API `appsecret_proof` for a token.
///
/// The proof is the hex-encoded HMAC-SHA256 of the access token keyed
/// with the app secret.
pub fn appsecret_proof(app_secret: &[u8], token: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret)
        .expect("HMAC accepts any key size");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

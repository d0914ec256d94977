//! Bearer token issuance.
//!
//! Tokens are opaque: 32 random bytes, base64url-encoded. Only the
//! SHA-256 of the token string is persisted, so a leaked database does
//! not leak usable credentials.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A freshly issued token: the client-facing secret, its stored hash,
/// and when it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a new opaque bearer token valid for `ttl_secs`.
pub fn issue_token(ttl_secs: u64) -> IssuedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let token_hash = token_hash(&token);
    let expires_at = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);
    IssuedToken {
        token,
        token_hash,
        expires_at,
    }
}

/// Storage key for a token: base64url of its SHA-256.
pub fn token_hash(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

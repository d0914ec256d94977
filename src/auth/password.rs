//! Password hashing — salted, iterated SHA-256.
//!
//! Stored format: `v1$<iterations>$<salt-b64>$<digest-b64>`. The version
//! and iteration count are part of the string so parameters can change
//! without invalidating existing hashes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand::RngCore;
use sha2::{Digest, Sha256};

const HASH_VERSION: &str = "v1";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = derive(password.as_bytes(), &salt, ITERATIONS);
    format!(
        "{HASH_VERSION}${ITERATIONS}${}${}",
        B64.encode(salt),
        B64.encode(digest)
    )
}

/// Check a password against a stored hash.
///
/// Returns `false` for wrong passwords and for malformed stored values;
/// callers only ever see match / no-match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(version), Some(iterations), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if version != HASH_VERSION {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = B64.decode(salt) else {
        return false;
    };
    let Ok(expected) = B64.decode(digest) else {
        return false;
    };

    let actual = derive(password.as_bytes(), &salt, iterations);
    constant_time_eq(&actual, &expected)
}

/// Iterated digest chain: each round re-mixes the password.
fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password);
        hasher.finalize().into()
    };
    for _ in 1..iterations {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(password);
        digest = hasher.finalize().into();
    }
    digest
}

/// Compare digests without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

//! Access-password digest
//!
//! Capsules may carry an optional viewing password. Only a salted SHA-256
//! digest is ever stored, in `<hex salt>$<hex digest>` form. The viewing
//! flow itself lives outside this service; the server never checks the
//! digest on read.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Digest a password with a fresh random salt
pub fn digest(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), hex::encode(hash(&salt, password)))
}

/// Check a password against a stored digest.
///
/// Malformed stored values never match.
pub fn matches(stored: &str, password: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    hash(&salt, password) == expected
}

fn hash(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

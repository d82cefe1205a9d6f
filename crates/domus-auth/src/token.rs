//! Opaque session token generation and hashing.
//!
//! Tokens are bearer secrets returned to the client once. Only the
//! SHA-256 digest is persisted, so a leaked session table cannot be
//! replayed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random opaque session token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw session token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`.
pub fn hash_session_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("stored hash is malformed: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::InternalError(anyhow::anyhow!(
            "password verification failed: {e}"
        ))),
    }
}

/// Refresh tokens are stored only as a SHA-256 digest; the opaque token
/// itself never touches the database.
pub fn hash_refresh_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_password() {
        let hash = hash_password("正确的密码123").expect("hash should succeed");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("正确的密码123", &hash).expect("verify should succeed"));
        assert!(!verify_password("错误的密码", &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("password123").expect("hash should succeed");
        let second = hash_password("password123").expect("hash should succeed");

        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let result = verify_password("password123", "not-a-phc-string");
        assert!(result.is_err());
    }

    #[test]
    fn refresh_token_digest_is_stable_hex() {
        let digest = hash_refresh_token("opaque-token");

        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_refresh_token("opaque-token"));
        assert_ne!(digest, hash_refresh_token("other-token"));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

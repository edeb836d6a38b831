// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2 password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), so parameters and
//! salt travel with the hash.
//!
//! Argon2 is deliberately slow. Async callers use [`hash_in_background`] and
//! [`check_credentials`], which run the work on the blocking thread pool.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::PasswordError;

/// Well-formed hash with the default parameters that no password matches.
///
/// Accounts without a usable hash are verified against it, so every login
/// attempt costs one Argon2 run.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c21hcnRvbmUtZHVtbXkxNg$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verifies a password against a stored PHC string.
///
/// A malformed hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(phc: &str, password: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(phc).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hashes a password on the blocking thread pool.
pub async fn hash_in_background(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// Checks a login attempt on the blocking thread pool.
///
/// With no stored hash the password is verified against a dummy hash and the
/// result is always `Ok(false)`.
pub async fn check_credentials(
    stored: Option<String>,
    password: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || match stored {
        Some(phc) => verify_password(&phc, &password),
        None => verify_password(DUMMY_HASH, &password).map(|_| false),
    })
    .await
    .map_err(|e| PasswordError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let phc = hash_password("correct horse").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password(&phc, "correct horse").unwrap());
        assert!(!verify_password(&phc, "battery staple").unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("plaintext", "x"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_dummy_hash_is_well_formed() {
        assert!(!verify_password(DUMMY_HASH, "").unwrap());
        assert!(!verify_password(DUMMY_HASH, "admin-password-1").unwrap());
    }

    #[tokio::test]
    async fn test_check_credentials() {
        let phc = hash_in_background("correct horse".to_string()).await.unwrap();

        assert!(check_credentials(Some(phc.clone()), "correct horse".to_string())
            .await
            .unwrap());
        assert!(!check_credentials(Some(phc), "battery staple".to_string())
            .await
            .unwrap());
        assert!(!check_credentials(None, "correct horse".to_string()).await.unwrap());
        assert!(check_credentials(Some("plaintext".to_string()), "x".to_string())
            .await
            .is_err());
    }
}

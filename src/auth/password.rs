//! Account passwords are stored as argon2id PHC strings (`$argon2id$v=19$...`).

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a signup password with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(phc) => Ok(phc.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(anyhow::anyhow!("password hashing failed: {e}"))
        }
    }
}

/// `Ok(false)` on a wrong password. A stored value that is not a valid PHC
/// string is an error, since it means the users row is corrupt.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("stored password hash is malformed: {e}")
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verification failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_password_verifies_at_login() {
        let stored = hash_password("annlee-pass").expect("hash");
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("annlee-pass", &stored).expect("verify"));
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let stored = hash_password("annlee-pass").expect("hash");
        assert!(!verify_password("annlee-PASS", &stored).expect("verify"));
        assert!(!verify_password("", &stored).expect("verify"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("shared-secret").expect("hash");
        let b = hash_password("shared-secret").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_is_an_error() {
        assert!(verify_password("anything", "plain-text-password").is_err());
    }
}

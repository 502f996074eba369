use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::AppError;

/// Hash a password with Argon2id and a fresh random salt.
///
/// The result is a self-describing PHC string (algorithm, parameters, salt
/// and hash), which is what gets persisted as the user's digest.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Verify a password against a stored PHC digest.
///
/// A mismatch is `Ok(false)`; only a corrupt digest is an error.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AppError::Crypto(format!("Invalid stored digest: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Crypto(format!("Password verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify() {
        let password = "test_password_123";

        let digest = hash_password(password).unwrap();
        assert!(verify_password(password, &digest).unwrap());
        assert!(!verify_password("wrong_password", &digest).unwrap());
    }

    #[test]
    fn test_digest_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same"));
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn test_corrupt_digest_is_error() {
        assert!(matches!(
            verify_password("pw", "not-a-phc-string"),
            Err(AppError::Crypto(_))
        ));
    }
}

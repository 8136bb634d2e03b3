//! Password hashing.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::auth::AuthServiceError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Hash a password with Argon2 and a random salt, returning the PHC string.
///
/// # Errors
///
/// Returns [`AuthServiceError::InvalidData`] for passwords shorter than
/// [`MIN_PASSWORD_CHARS`] and [`AuthServiceError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthServiceError::InvalidData("password is too short"));
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| AuthServiceError::PasswordHash(error.to_string()))
}

/// Check a password against a stored PHC string.
///
/// # Errors
///
/// Returns [`AuthServiceError::PasswordHash`] if the stored hash cannot be parsed.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool, AuthServiceError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|error| AuthServiceError::PasswordHash(error.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(AuthServiceError::PasswordHash(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn hash_then_verify() -> TestResult {
        let hash = hash_password("correct horse")?;

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse")?);
        assert!(!verify_password(&hash, "wrong horse")?);

        Ok(())
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            hash_password("short"),
            Err(AuthServiceError::InvalidData(_))
        ));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("not-a-phc-string", "whatever").is_err());
    }
}

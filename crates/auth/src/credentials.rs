//! Salted password hashes (Argon2id, PHC string format).
//!
//! Accounts never store the plaintext password; the PHC string carries the
//! salt and parameters needed to verify.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};

use realprint_core::{DomainError, DomainResult};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Hash `password` with a fresh random salt.
    pub fn hash(password: &str) -> DomainResult<Self> {
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::invariant(format!("password hashing failed: {e}")))?;
        Ok(Self(hash.to_string()))
    }

    /// Constant-time verification; a malformed stored hash never verifies.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_hashed_password() {
        let cred = Credential::hash("admin123").unwrap();
        assert!(cred.verify("admin123"));
        assert!(!cred.verify("wrongpass"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = Credential::hash("secret").unwrap();
        let b = Credential::hash("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        let cred: Credential = serde_json::from_str("\"plaintext\"").unwrap();
        assert!(!cred.verify("plaintext"));
    }

    #[test]
    fn debug_does_not_leak_hash() {
        let cred = Credential::hash("secret").unwrap();
        assert_eq!(format!("{cred:?}"), "Credential(<redacted>)");
    }
}

//! Credential hashing with Argon2id.
//!
//! Hashes are PHC strings with a per-call random salt, so two hashes of the
//! same password differ while verification stays correct. Cost parameters
//! are fixed at startup.

use anyhow::{Context, Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;

pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug)]
pub struct HasherConfig {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HasherConfig {
    #[must_use]
    pub fn with_memory_kib(mut self, memory_kib: u32) -> Self {
        self.memory_kib = memory_kib;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }
}

/// One-way password hashing and verification.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher with the given cost parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters are rejected by Argon2.
    pub fn new(config: HasherConfig) -> Result<Self> {
        let params = argon2::Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| anyhow!("invalid Argon2id parameters: {err}"))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }

    /// Hash a raw password into a PHC string with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, raw_password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))
            .context("credential hashing failed")?;
        Ok(hash.to_string())
    }

    /// Verify a raw password against a stored PHC string.
    ///
    /// A malformed stored hash counts as a verification failure, not a crash.
    #[must_use]
    pub fn verify(&self, raw_password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(raw_password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low-cost parameters keep the test suite fast; production costs come
    // from configuration.
    fn hasher() -> CredentialHasher {
        CredentialHasher::new(
            HasherConfig::default()
                .with_memory_kib(1024)
                .with_iterations(1),
        )
        .expect("test hasher")
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hasher = hasher();
        let hash = hasher.hash("Str0ng!Pw").expect("hash");
        assert!(hasher.verify("Str0ng!Pw", &hash));
        assert!(!hasher.verify("wrongpass", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = hasher();
        let first = hasher.hash("Str0ng!Pw").expect("hash");
        let second = hasher.hash("Str0ng!Pw").expect("hash");
        // Salts are random per call.
        assert_ne!(first, second);
        assert!(hasher.verify("Str0ng!Pw", &first));
        assert!(hasher.verify("Str0ng!Pw", &second));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch_not_a_panic() {
        let hasher = hasher();
        assert!(!hasher.verify("Str0ng!Pw", "not-a-phc-string"));
        assert!(!hasher.verify("Str0ng!Pw", ""));
    }

    #[test]
    fn rejects_unreasonable_parameters() {
        assert!(CredentialHasher::new(HasherConfig::default().with_memory_kib(0)).is_err());
        assert!(CredentialHasher::new(HasherConfig::default().with_parallelism(0)).is_err());
    }
}

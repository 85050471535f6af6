//! Algorithm Registry
//!
//! Maps algorithm names to [`PasswordScheme`] implementations. A registry is
//! built once, then shared read-only (typically behind an `Arc`). Adding an
//! algorithm means registering another scheme; call sites do not change.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::EncodedHash;
use super::argon2id::Argon2idScheme;
use super::bcrypt::BcryptScheme;
use super::format::DecodedHash;
use super::params::AlgorithmParameters;
use crate::error::{PasswordHashError, PasswordHashResult};

/// One password hashing algorithm
///
/// Implementations are stateless; every call is independent.
pub trait PasswordScheme: fmt::Debug + Send + Sync {
    /// Registry key, also the tag in the encoded form (`$<name>$...`)
    fn name(&self) -> &'static str;

    /// Hash `password` with `params`, producing the canonical encoding
    fn encode(
        &self,
        password: &[u8],
        params: &AlgorithmParameters,
    ) -> PasswordHashResult<EncodedHash>;

    /// Parse an encoding produced by this scheme
    fn decode(&self, encoded: &str) -> PasswordHashResult<DecodedHash>;

    /// `Ok(false)` on mismatch; errors only for unusable input
    fn verify(&self, password: &[u8], encoded: &str) -> PasswordHashResult<bool>;
}

/// Immutable name -> scheme table
#[derive(Clone)]
pub struct Registry {
    schemes: HashMap<&'static str, Arc<dyn PasswordScheme>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find the scheme registered under `algorithm`
    pub fn lookup(&self, algorithm: &str) -> PasswordHashResult<&dyn PasswordScheme> {
        self.schemes
            .get(algorithm)
            .map(Arc::as_ref)
            .ok_or_else(|| PasswordHashError::UnsupportedAlgorithm(algorithm.to_string()))
    }

    pub fn contains(&self, algorithm: &str) -> bool {
        self.schemes.contains_key(algorithm)
    }

    /// Registered names, sorted
    pub fn algorithms(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemes.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    /// argon2id and bcrypt
    fn default() -> Self {
        Self::builder()
            .register(Argon2idScheme)
            .register(BcryptScheme)
            .build()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    schemes: HashMap<&'static str, Arc<dyn PasswordScheme>>,
}

impl RegistryBuilder {
    /// Add a scheme; a later registration under the same name replaces the
    /// earlier one
    pub fn register(mut self, scheme: impl PasswordScheme + 'static) -> Self {
        let name = scheme.name();
        if self.schemes.insert(name, Arc::new(scheme)).is_some() {
            tracing::debug!(algorithm = name, "Replacing registered password scheme");
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            schemes: self.schemes,
        }
    }
}

//! Password Hashing and Verification
//!
//! Algorithm-agnostic password encoding with:
//! - Argon2id (memory-hard) and bcrypt behind one [`Registry`]
//! - Self-describing encoded hashes (`$argon2id$v=19,m=..,t=..,p=..$salt$hash`)
//! - Parameters re-read from configuration on every call
//! - Constant-time comparison
//! - Zeroization of plaintext and derived bytes
//!
//! ## Examples
//! ```rust
//! use std::sync::Arc;
//!
//! use authn::config::{MemorySource, ParameterStore};
//! use authn::password::{ClearTextPassword, PasswordHasher, Registry};
//! use authn::password::params::BcryptParams;
//!
//! let store = ParameterStore::new(MemorySource::new().with_bcrypt(BcryptParams { cost: 4 }));
//! let hasher = PasswordHasher::new(Arc::new(Registry::default()), store);
//!
//! let password = ClearTextPassword::from("password123");
//! let encoded = hasher.hash("bcrypt", &password)?;
//!
//! // Later, verify
//! assert!(hasher.verify(&password, encoded.as_str())?);
//! # Ok::<(), authn::PasswordHashError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{ConfigSource, EnvSource, ParameterStore};
use crate::error::{PasswordHashError, PasswordHashResult};

pub mod argon2id;
pub mod bcrypt;
pub mod format;
pub mod params;
pub mod registry;

pub use format::{DecodedHash, HashSummary, decode};
pub use params::{AlgorithmParameters, Argon2idParams, BcryptParams};
pub use registry::{PasswordScheme, Registry, RegistryBuilder};

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
///
/// Any byte sequence is accepted; policy checks belong to the caller.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(Vec<u8>);

impl ClearTextPassword {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for ClearTextPassword {
    fn from(raw: String) -> Self {
        Self(raw.into_bytes())
    }
}

impl From<&str> for ClearTextPassword {
    fn from(raw: &str) -> Self {
        Self(raw.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for ClearTextPassword {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Encoded Hash (Safe to store)
// ============================================================================

/// Canonical encoded hash, the only artifact meant for storage
///
/// Opaque text to storage layers: `$<algorithm>$<params>[$<salt>]$<hash>`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedHash(String);

impl EncodedHash {
    pub(crate) fn new_unchecked(encoded: String) -> Self {
        Self(encoded)
    }

    /// Create from a stored string (e.g., from database), checking it against
    /// the built-in grammars
    pub fn parse(encoded: impl Into<String>) -> PasswordHashResult<Self> {
        let encoded = encoded.into();
        format::decode(&encoded)?;
        Ok(Self(encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Algorithm tag of this hash
    pub fn algorithm(&self) -> &str {
        // Every constructor produces a `$<tag>$..` string.
        self.0.split(format::DELIMITER).nth(1).unwrap_or_default()
    }
}

impl TryFrom<String> for EncodedHash {
    type Error = PasswordHashError;

    fn try_from(encoded: String) -> Result<Self, Self::Error> {
        Self::parse(encoded)
    }
}

impl From<EncodedHash> for String {
    fn from(encoded: EncodedHash) -> Self {
        encoded.0
    }
}

impl AsRef<str> for EncodedHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodedHash")
            .field(&self.algorithm())
            .field(&"[HASH]")
            .finish()
    }
}

// ============================================================================
// Encoder / Verifier
// ============================================================================

/// Hash `password` with `algorithm` using the parameters currently configured
///
/// ## Errors
/// - `UnsupportedAlgorithm` if `algorithm` is not registered
/// - `Configuration` if its parameters cannot be resolved
/// - `Crypto` if the random source or derivation fails
pub fn encode<S: ConfigSource>(
    registry: &Registry,
    store: &ParameterStore<S>,
    algorithm: &str,
    password: &[u8],
) -> PasswordHashResult<EncodedHash> {
    let scheme = registry.lookup(algorithm)?;
    let params = store.resolve(scheme.name())?;
    scheme.encode(password, &params)
}

/// Check `password` against a stored encoded hash
///
/// The algorithm is taken from the hash itself. A wrong password is
/// `Ok(false)`; errors mean the stored value itself is unusable.
pub fn verify(registry: &Registry, password: &[u8], encoded: &str) -> PasswordHashResult<bool> {
    let algorithm = format::algorithm_tag(encoded)?;
    let scheme = registry.lookup(algorithm)?;
    let matched = scheme.verify(password, encoded)?;

    tracing::debug!(algorithm = scheme.name(), matched, "Password verified");
    Ok(matched)
}

// ============================================================================
// Facade
// ============================================================================

/// Registry plus parameter store, the usual entry point for callers
#[derive(Debug, Clone)]
pub struct PasswordHasher<S = EnvSource> {
    registry: Arc<Registry>,
    store: ParameterStore<S>,
}

impl PasswordHasher<EnvSource> {
    /// Default algorithms, parameters from the process environment
    pub fn from_env() -> Self {
        Self::new(Arc::new(Registry::default()), ParameterStore::from_env())
    }
}

impl<S: ConfigSource> PasswordHasher<S> {
    pub fn new(registry: Arc<Registry>, store: ParameterStore<S>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &ParameterStore<S> {
        &self.store
    }

    pub fn hash(
        &self,
        algorithm: &str,
        password: &ClearTextPassword,
    ) -> PasswordHashResult<EncodedHash> {
        encode(&self.registry, &self.store, algorithm, password.as_bytes())
    }

    pub fn verify(&self, password: &ClearTextPassword, encoded: &str) -> PasswordHashResult<bool> {
        verify(&self.registry, password.as_bytes(), encoded)
    }

    /// Decode through the scheme registered for the hash's tag
    pub fn decode(&self, encoded: &str) -> PasswordHashResult<DecodedHash> {
        let algorithm = format::algorithm_tag(encoded)?;
        self.registry.lookup(algorithm)?.decode(encoded)
    }

    /// Check if a stored hash should be replaced after the next successful
    /// verification
    ///
    /// True when the hash uses another algorithm than `algorithm`, or
    /// parameters that differ from the configuration now in effect.
    pub fn needs_rehash(&self, algorithm: &str, encoded: &str) -> PasswordHashResult<bool> {
        let scheme = self.registry.lookup(algorithm)?;
        if format::algorithm_tag(encoded)? != scheme.name() {
            return Ok(true);
        }

        let decoded = scheme.decode(encoded)?;
        let current = self.store.resolve(scheme.name())?;
        Ok(decoded.params() != &current)
    }
}

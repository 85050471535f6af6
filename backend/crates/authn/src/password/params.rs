//! Algorithm Parameters
//!
//! Tunables for each supported algorithm plus the legal ranges they are
//! checked against, both when read from configuration and when parsed out
//! of a stored hash.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Argon2 version emitted and accepted (0x13)
pub const ARGON2ID_VERSION: u32 = 19;

/// Minimum Argon2 memory cost in KiB (also bounded below by 8 x parallelism)
pub const ARGON2ID_MIN_MEMORY_KIB: u32 = 8;

/// Maximum Argon2 memory cost in KiB (4 GiB); stored hashes above it are
/// rejected before any memory is allocated
pub const ARGON2ID_MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Minimum Argon2 iteration count
pub const ARGON2ID_MIN_ITERATIONS: u32 = 1;

/// Salt length bounds in bytes
pub const ARGON2ID_MIN_SALT_LENGTH: u32 = 8;
pub const ARGON2ID_MAX_SALT_LENGTH: u32 = 64;

/// Derived key length bounds in bytes
pub const ARGON2ID_MIN_KEY_LENGTH: u32 = 4;
pub const ARGON2ID_MAX_KEY_LENGTH: u32 = 1024;

/// bcrypt cost bounds
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for one algorithm, resolved per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
#[non_exhaustive]
pub enum AlgorithmParameters {
    Argon2id(Argon2idParams),
    Bcrypt(BcryptParams),
}

impl AlgorithmParameters {
    /// Registry name of the algorithm these parameters belong to
    pub fn algorithm(&self) -> &'static str {
        match self {
            AlgorithmParameters::Argon2id(_) => super::argon2id::NAME,
            AlgorithmParameters::Bcrypt(_) => super::bcrypt::NAME,
        }
    }
}

/// Argon2id tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2idParams {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u8,
    pub salt_length: u32,
    pub key_length: u32,
}

impl Default for Argon2idParams {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_cost_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// bcrypt tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BcryptParams {
    pub cost: u32,
}

impl Default for BcryptParams {
    fn default() -> Self {
        Self {
            cost: ::bcrypt::DEFAULT_COST,
        }
    }
}

/// A parameter outside its legal range
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RangeViolation {
    pub param: &'static str,
    pub reason: Cow<'static, str>,
}

impl RangeViolation {
    fn new(param: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            param,
            reason: reason.into(),
        }
    }
}

impl Argon2idParams {
    /// Check every field against the legal Argon2id ranges
    ///
    /// `param` in the violation is the short grammar key (`m`, `t`, `p`)
    /// or `salt` / `hash` for the lengths.
    pub(crate) fn validate(&self) -> Result<(), RangeViolation> {
        if self.parallelism == 0 {
            return Err(RangeViolation::new("p", "parallelism must be at least 1"));
        }
        if self.iterations < ARGON2ID_MIN_ITERATIONS {
            return Err(RangeViolation::new("t", "iterations must be at least 1"));
        }
        let min_memory = ARGON2ID_MIN_MEMORY_KIB.max(8 * u32::from(self.parallelism));
        if self.memory_cost_kib < min_memory {
            return Err(RangeViolation::new(
                "m",
                format!("memory cost must be at least {min_memory} KiB"),
            ));
        }
        if self.memory_cost_kib > ARGON2ID_MAX_MEMORY_KIB {
            return Err(RangeViolation::new(
                "m",
                format!("memory cost must be at most {ARGON2ID_MAX_MEMORY_KIB} KiB"),
            ));
        }
        if !(ARGON2ID_MIN_SALT_LENGTH..=ARGON2ID_MAX_SALT_LENGTH).contains(&self.salt_length) {
            return Err(RangeViolation::new(
                "salt",
                format!(
                    "salt length must be between {ARGON2ID_MIN_SALT_LENGTH} and {ARGON2ID_MAX_SALT_LENGTH} bytes"
                ),
            ));
        }
        if !(ARGON2ID_MIN_KEY_LENGTH..=ARGON2ID_MAX_KEY_LENGTH).contains(&self.key_length) {
            return Err(RangeViolation::new(
                "hash",
                format!(
                    "key length must be between {ARGON2ID_MIN_KEY_LENGTH} and {ARGON2ID_MAX_KEY_LENGTH} bytes"
                ),
            ));
        }
        Ok(())
    }
}

impl BcryptParams {
    pub(crate) fn validate(&self) -> Result<(), RangeViolation> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.cost) {
            return Err(RangeViolation::new(
                "c",
                format!("cost must be between {BCRYPT_MIN_COST} and {BCRYPT_MAX_COST}"),
            ));
        }
        Ok(())
    }
}

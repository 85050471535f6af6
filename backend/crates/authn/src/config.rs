//! Parameter Store
//!
//! Resolves an algorithm name to its tunables by reading named values from
//! a [`ConfigSource`]. The source is re-read on every call, so a changed
//! value takes effect on the next hash without a restart.
//!
//! ## Keys
//! | Algorithm  | Key                     | Meaning               |
//! |------------|-------------------------|-----------------------|
//! | `argon2id` | `ARGON2ID_MEMORY`       | memory cost in KiB    |
//! | `argon2id` | `ARGON2ID_ITERATIONS`   | time cost             |
//! | `argon2id` | `ARGON2ID_PARALLELISM`  | lanes                 |
//! | `argon2id` | `ARGON2ID_SALT_LENGTH`  | salt bytes            |
//! | `argon2id` | `ARGON2ID_KEY_LENGTH`   | derived key bytes     |
//! | `bcrypt`   | `BCRYPT_COST`           | work factor (4..=31)  |
//!
//! Every key is required. A missing or invalid value is a
//! [`PasswordHashError::Configuration`], never a silent default.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use crate::error::{PasswordHashError, PasswordHashResult};
use crate::password::params::{AlgorithmParameters, Argon2idParams, BcryptParams, RangeViolation};
use crate::password::{argon2id, bcrypt};

pub const ARGON2ID_MEMORY: &str = "ARGON2ID_MEMORY";
pub const ARGON2ID_ITERATIONS: &str = "ARGON2ID_ITERATIONS";
pub const ARGON2ID_PARALLELISM: &str = "ARGON2ID_PARALLELISM";
pub const ARGON2ID_SALT_LENGTH: &str = "ARGON2ID_SALT_LENGTH";
pub const ARGON2ID_KEY_LENGTH: &str = "ARGON2ID_KEY_LENGTH";
pub const BCRYPT_COST: &str = "BCRYPT_COST";

// ============================================================================
// Sources
// ============================================================================

/// Somewhere named configuration values can be read from
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment, read at call time
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory configuration that can be changed while in use
#[derive(Debug, Default)]
pub struct MemorySource {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl ToString) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.into(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }

    /// Populate every Argon2id key from `params`
    pub fn with_argon2id(self, params: Argon2idParams) -> Self {
        self.with(ARGON2ID_MEMORY, params.memory_cost_kib)
            .with(ARGON2ID_ITERATIONS, params.iterations)
            .with(ARGON2ID_PARALLELISM, params.parallelism)
            .with(ARGON2ID_SALT_LENGTH, params.salt_length)
            .with(ARGON2ID_KEY_LENGTH, params.key_length)
    }

    pub fn with_bcrypt(self, params: BcryptParams) -> Self {
        self.with(BCRYPT_COST, params.cost)
    }
}

impl ConfigSource for MemorySource {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

// ============================================================================
// Parameter Store
// ============================================================================

/// Resolves algorithm parameters from a [`ConfigSource`]
#[derive(Debug, Clone, Default)]
pub struct ParameterStore<S = EnvSource> {
    source: S,
}

impl ParameterStore<EnvSource> {
    pub fn from_env() -> Self {
        Self { source: EnvSource }
    }
}

impl<S: ConfigSource> ParameterStore<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the parameters for `algorithm` from the current configuration
    ///
    /// ## Errors
    /// - `UnsupportedAlgorithm` if no parameters are known for the name
    /// - `Configuration` if a key is missing, non-numeric, or out of range
    pub fn resolve(&self, algorithm: &str) -> PasswordHashResult<AlgorithmParameters> {
        let resolved = match algorithm {
            argon2id::NAME => self.argon2id().map(AlgorithmParameters::Argon2id),
            bcrypt::NAME => self.bcrypt().map(AlgorithmParameters::Bcrypt),
            other => return Err(PasswordHashError::UnsupportedAlgorithm(other.to_string())),
        };

        if let Err(e) = &resolved {
            tracing::warn!(algorithm, error = %e, "Password hashing parameters misconfigured");
        }
        resolved
    }

    fn argon2id(&self) -> PasswordHashResult<Argon2idParams> {
        let params = Argon2idParams {
            memory_cost_kib: self.number(ARGON2ID_MEMORY)?,
            iterations: self.number(ARGON2ID_ITERATIONS)?,
            parallelism: self.number(ARGON2ID_PARALLELISM)?,
            salt_length: self.number(ARGON2ID_SALT_LENGTH)?,
            key_length: self.number(ARGON2ID_KEY_LENGTH)?,
        };

        params.validate().map_err(|RangeViolation { param, reason }| {
            let key = match param {
                "m" => ARGON2ID_MEMORY,
                "t" => ARGON2ID_ITERATIONS,
                "p" => ARGON2ID_PARALLELISM,
                "salt" => ARGON2ID_SALT_LENGTH,
                _ => ARGON2ID_KEY_LENGTH,
            };
            PasswordHashError::config(key, reason)
        })?;

        Ok(params)
    }

    fn bcrypt(&self) -> PasswordHashResult<BcryptParams> {
        let params = BcryptParams {
            cost: self.number(BCRYPT_COST)?,
        };
        params
            .validate()
            .map_err(|v| PasswordHashError::config(BCRYPT_COST, v.reason))?;
        Ok(params)
    }

    /// Read a required unsigned decimal value
    fn number<T: FromStr>(&self, key: &'static str) -> PasswordHashResult<T> {
        let raw = self
            .source
            .get(key)
            .ok_or_else(|| PasswordHashError::config(key, "value is not set"))?;
        let value = raw.trim();

        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PasswordHashError::config(
                key,
                "value is not an unsigned integer",
            ));
        }

        value
            .parse()
            .map_err(|_| PasswordHashError::config(key, "value is out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn argon2id_source() -> MemorySource {
        MemorySource::new()
            .with(ARGON2ID_MEMORY, 65536)
            .with(ARGON2ID_ITERATIONS, 6)
            .with(ARGON2ID_PARALLELISM, 2)
            .with(ARGON2ID_SALT_LENGTH, 16)
            .with(ARGON2ID_KEY_LENGTH, 32)
    }

    fn config_key(err: PasswordHashError) -> String {
        match err {
            PasswordHashError::Configuration { key, .. } => key.into_owned(),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_argon2id() {
        let store = ParameterStore::new(argon2id_source());
        let params = store.resolve("argon2id").unwrap();
        assert_eq!(
            params,
            AlgorithmParameters::Argon2id(Argon2idParams {
                memory_cost_kib: 65536,
                iterations: 6,
                parallelism: 2,
                salt_length: 16,
                key_length: 32,
            })
        );
    }

    #[test]
    fn test_resolve_bcrypt() {
        let store = ParameterStore::new(MemorySource::new().with(BCRYPT_COST, " 10 "));
        assert_eq!(
            store.resolve("bcrypt").unwrap(),
            AlgorithmParameters::Bcrypt(BcryptParams { cost: 10 })
        );
    }

    #[test]
    fn test_missing_key() {
        let source = argon2id_source();
        source.remove(ARGON2ID_KEY_LENGTH);
        let store = ParameterStore::new(source);

        let err = store.resolve("argon2id").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(config_key(err), ARGON2ID_KEY_LENGTH);
    }

    #[test]
    fn test_non_numeric_values() {
        for bad in ["", "abc", "-1", "+4", "1.5", "0x10"] {
            let store = ParameterStore::new(MemorySource::new().with(BCRYPT_COST, bad));
            let err = store.resolve("bcrypt").unwrap_err();
            assert_eq!(config_key(err), BCRYPT_COST, "value {bad:?}");
        }
    }

    #[test]
    fn test_parallelism_overflowing_u8() {
        let source = argon2id_source().with(ARGON2ID_PARALLELISM, 256);
        let err = ParameterStore::new(source).resolve("argon2id").unwrap_err();
        assert_eq!(config_key(err), ARGON2ID_PARALLELISM);
    }

    #[test]
    fn test_out_of_range_values() {
        let source = argon2id_source().with(ARGON2ID_SALT_LENGTH, 4);
        let err = ParameterStore::new(source).resolve("argon2id").unwrap_err();
        assert_eq!(config_key(err), ARGON2ID_SALT_LENGTH);

        let source = argon2id_source().with(ARGON2ID_MEMORY, 8);
        let err = ParameterStore::new(source).resolve("argon2id").unwrap_err();
        assert_eq!(config_key(err), ARGON2ID_MEMORY);

        let source = argon2id_source().with(ARGON2ID_MEMORY, 4 * 1024 * 1024 + 1);
        let err = ParameterStore::new(source).resolve("argon2id").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(config_key(err), ARGON2ID_MEMORY);

        let store = ParameterStore::new(MemorySource::new().with(BCRYPT_COST, 32));
        assert_eq!(config_key(store.resolve("bcrypt").unwrap_err()), BCRYPT_COST);
    }

    #[test]
    fn test_unknown_algorithm() {
        let store = ParameterStore::new(MemorySource::new());
        assert_eq!(
            store.resolve("scrypt").unwrap_err(),
            PasswordHashError::UnsupportedAlgorithm("scrypt".to_string())
        );
    }

    #[test]
    fn test_changes_visible_on_next_call() {
        let store = ParameterStore::new(MemorySource::new().with(BCRYPT_COST, 4));
        assert_eq!(
            store.resolve("bcrypt").unwrap(),
            AlgorithmParameters::Bcrypt(BcryptParams { cost: 4 })
        );

        store.source().set(BCRYPT_COST, 5);
        assert_eq!(
            store.resolve("bcrypt").unwrap(),
            AlgorithmParameters::Bcrypt(BcryptParams { cost: 5 })
        );
    }

    #[test]
    fn test_env_source() {
        temp_env::with_vars(
            [
                (ARGON2ID_MEMORY, Some("1024")),
                (ARGON2ID_ITERATIONS, Some("2")),
                (ARGON2ID_PARALLELISM, Some("1")),
                (ARGON2ID_SALT_LENGTH, Some("16")),
                (ARGON2ID_KEY_LENGTH, Some("32")),
            ],
            || {
                let params = ParameterStore::from_env().resolve("argon2id").unwrap();
                assert_eq!(
                    params,
                    AlgorithmParameters::Argon2id(Argon2idParams {
                        memory_cost_kib: 1024,
                        iterations: 2,
                        parallelism: 1,
                        salt_length: 16,
                        key_length: 32,
                    })
                );
            },
        );
    }

    #[test]
    fn test_env_source_unset() {
        temp_env::with_vars([(BCRYPT_COST, None::<&str>)], || {
            let err = ParameterStore::from_env().resolve("bcrypt").unwrap_err();
            assert_eq!(config_key(err), BCRYPT_COST);
        });
    }
}

//! Authn Crate - Password Hashing Core
//!
//! This crate turns clear text passwords into self-describing encoded hashes
//! and checks passwords against them:
//! - Argon2id and bcrypt behind a pluggable algorithm registry
//! - Parameters resolved from configuration on every call
//! - Canonical `$<algorithm>$<params>$<salt>$<hash>` encoding
//! - Constant-time verification
//!
//! ## Security Model
//! - Plaintext passwords and derived bytes are zeroized after use
//! - Error messages never contain passwords or hash material
//! - A wrong password is `Ok(false)`, never an error

pub mod config;
pub mod crypto;
pub mod error;
pub mod password;

// Re-exports for convenience
pub use config::{ConfigSource, EnvSource, MemorySource, ParameterStore};
pub use error::{ErrorKind, PasswordHashError, PasswordHashResult};
pub use password::{
    AlgorithmParameters, ClearTextPassword, DecodedHash, EncodedHash, PasswordHasher,
    PasswordScheme, Registry,
};

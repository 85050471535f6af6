//! bcrypt Scheme
//!
//! bcrypt manages its own salt and embeds it, with the cost, in its
//! `$2b$NN$...` output. That whole string is what gets base64-wrapped into
//! `$bcrypt$c=NN$<base64>`, and verification hands it straight back to the
//! bcrypt primitive, which compares in constant time.
//!
//! bcrypt only reads the first 72 bytes of a password.

use super::format::{self, DecodedHash};
use super::params::AlgorithmParameters;
use super::registry::PasswordScheme;
use super::EncodedHash;
use crate::error::{PasswordHashError, PasswordHashResult};

/// Registry name and encoded tag
pub const NAME: &str = "bcrypt";

#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptScheme;

impl PasswordScheme for BcryptScheme {
    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(
        &self,
        password: &[u8],
        params: &AlgorithmParameters,
    ) -> PasswordHashResult<EncodedHash> {
        let AlgorithmParameters::Bcrypt(params) = params else {
            return Err(PasswordHashError::config(
                "algorithm",
                format!("{} parameters cannot drive {NAME}", params.algorithm()),
            ));
        };
        params
            .validate()
            .map_err(|v| PasswordHashError::config(v.param, v.reason))?;

        let hashed = ::bcrypt::hash(password, params.cost).map_err(|e| {
            tracing::error!(error = %e, "bcrypt hashing failed");
            PasswordHashError::crypto(format!("bcrypt hashing failed: {e}"))
        })?;

        tracing::debug!(algorithm = NAME, cost = params.cost, "Password hash encoded");

        Ok(EncodedHash::new_unchecked(format::encode_bcrypt(
            params.cost,
            &hashed,
        )))
    }

    fn decode(&self, encoded: &str) -> PasswordHashResult<DecodedHash> {
        format::decode_bcrypt(encoded)
    }

    fn verify(&self, password: &[u8], encoded: &str) -> PasswordHashResult<bool> {
        let decoded = format::decode_bcrypt(encoded)?;
        let inner = std::str::from_utf8(decoded.hash())
            .map_err(|_| PasswordHashError::format("hash", "not a bcrypt hash"))?;

        // bcrypt's own error text echoes the hash; keep it out of the error.
        ::bcrypt::verify(password, inner)
            .map_err(|_| PasswordHashError::format("hash", "bcrypt rejected the embedded hash"))
    }
}

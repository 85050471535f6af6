//! Argon2id Scheme
//!
//! Derivation goes through the `argon2` crate's raw `hash_password_into`
//! rather than its PHC string support, because the stored grammar here
//! folds the version into the parameter field (`v=19,m=..,t=..,p=..`).

use argon2::{Algorithm, Argon2, Version};
use zeroize::Zeroizing;

use super::format::{self, DecodedHash};
use super::params::{AlgorithmParameters, Argon2idParams};
use super::registry::PasswordScheme;
use super::EncodedHash;
use crate::crypto::{constant_time_eq, random_bytes};
use crate::error::{PasswordHashError, PasswordHashResult};

/// Registry name and encoded tag
pub const NAME: &str = "argon2id";

/// Memory-hard hashing with a random salt per password
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2idScheme;

impl Argon2idScheme {
    /// Derive `key_length` bytes from password and salt
    ///
    /// The Argon2 memory blocks (`memory_cost_kib` KiB) are allocated for
    /// this call only and released before returning.
    fn derive(
        password: &[u8],
        salt: &[u8],
        params: &Argon2idParams,
    ) -> PasswordHashResult<Zeroizing<Vec<u8>>> {
        // `Argon2idParams::validate` admits only values Argon2 accepts, on
        // both the configuration and the decode path.
        let argon2_params = argon2::Params::new(
            params.memory_cost_kib,
            params.iterations,
            u32::from(params.parallelism),
            Some(params.key_length as usize),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Argon2 rejected validated parameters");
            PasswordHashError::crypto(format!("Argon2 rejected parameters: {e}"))
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

        let mut output = Zeroizing::new(vec![0u8; params.key_length as usize]);
        argon2
            .hash_password_into(password, salt, output.as_mut_slice())
            .map_err(|e| {
                tracing::error!(error = %e, "Argon2 derivation failed");
                PasswordHashError::crypto(format!("Argon2 derivation failed: {e}"))
            })?;

        Ok(output)
    }
}

impl PasswordScheme for Argon2idScheme {
    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(
        &self,
        password: &[u8],
        params: &AlgorithmParameters,
    ) -> PasswordHashResult<EncodedHash> {
        let AlgorithmParameters::Argon2id(params) = params else {
            return Err(PasswordHashError::config(
                "algorithm",
                format!("{} parameters cannot drive {NAME}", params.algorithm()),
            ));
        };
        params
            .validate()
            .map_err(|v| PasswordHashError::config(v.param, v.reason))?;

        // Generate a cryptographically secure random salt
        let salt = random_bytes(params.salt_length as usize)?;
        let hash = Self::derive(password, &salt, params)?;

        tracing::debug!(
            algorithm = NAME,
            memory_cost_kib = params.memory_cost_kib,
            iterations = params.iterations,
            parallelism = params.parallelism,
            "Password hash encoded"
        );

        Ok(EncodedHash::new_unchecked(format::encode_argon2id(
            params, &salt, &hash,
        )))
    }

    fn decode(&self, encoded: &str) -> PasswordHashResult<DecodedHash> {
        format::decode_argon2id(encoded)
    }

    fn verify(&self, password: &[u8], encoded: &str) -> PasswordHashResult<bool> {
        let decoded = format::decode_argon2id(encoded)?;
        let AlgorithmParameters::Argon2id(params) = decoded.params() else {
            return Err(PasswordHashError::format("algorithm", "expected argon2id"));
        };

        // Same derivation as encode, sized by the decoded salt and hash.
        let derived = Self::derive(password, decoded.salt(), params)?;

        Ok(constant_time_eq(&derived, decoded.hash()))
    }
}

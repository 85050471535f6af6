//! Encoded Hash Grammar
//!
//! ```text
//! $argon2id$v=<version>,m=<memory>,t=<iterations>,p=<parallelism>$<salt>$<hash>
//! $bcrypt$c=<cost>$<hash>
//! ```
//!
//! Salt and hash are unpadded standard base64 decoded strictly. For bcrypt
//! the hash field is the base64 of bcrypt's own `$2b$..` string, which
//! carries its salt.
//!
//! Numbers must be canonical (no sign, no leading zeros) so that decoding
//! and re-encoding reproduces the input byte for byte.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroize;

use super::params::{
    ARGON2ID_VERSION, AlgorithmParameters, Argon2idParams, BcryptParams, RangeViolation,
};
use super::{EncodedHash, argon2id, bcrypt};
use crate::crypto::{from_base64, to_base64};
use crate::error::{PasswordHashError, PasswordHashResult};

/// Field delimiter
pub const DELIMITER: char = '$';

/// bcrypt variants accepted inside the hash field
const BCRYPT_PREFIXES: [&str; 4] = ["2a", "2b", "2x", "2y"];

/// Length of bcrypt's salt + checksum section
const BCRYPT_BODY_LENGTH: usize = 53;

// ============================================================================
// Decoded Hash
// ============================================================================

/// Everything parsed out of an encoded hash
///
/// Salt and hash bytes are zeroized on drop. `Debug` shows lengths only.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedHash {
    params: AlgorithmParameters,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl DecodedHash {
    pub fn algorithm(&self) -> &'static str {
        self.params.algorithm()
    }

    pub fn params(&self) -> &AlgorithmParameters {
        &self.params
    }

    /// Salt bytes (empty for bcrypt, whose salt lives inside [`Self::hash`])
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Re-serialize into the canonical grammar
    pub fn encode(&self) -> EncodedHash {
        let encoded = match &self.params {
            AlgorithmParameters::Argon2id(params) => {
                encode_argon2id(params, &self.salt, &self.hash)
            }
            AlgorithmParameters::Bcrypt(params) => {
                format!(
                    "{DELIMITER}{}{DELIMITER}c={}{DELIMITER}{}",
                    bcrypt::NAME,
                    params.cost,
                    to_base64(&self.hash)
                )
            }
        };
        EncodedHash::new_unchecked(encoded)
    }

    /// Non-secret description for diagnostics
    pub fn summary(&self) -> HashSummary {
        HashSummary {
            algorithm: self.algorithm(),
            version: match self.params {
                AlgorithmParameters::Argon2id(_) => Some(ARGON2ID_VERSION),
                AlgorithmParameters::Bcrypt(_) => None,
            },
            parameters: self.params,
            salt_bytes: self.salt.len(),
            hash_bytes: self.hash.len(),
        }
    }
}

impl Drop for DecodedHash {
    fn drop(&mut self) {
        self.salt.zeroize();
        self.hash.zeroize();
    }
}

impl fmt::Debug for DecodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedHash")
            .field("params", &self.params)
            .field("salt_bytes", &self.salt.len())
            .field("hash_bytes", &self.hash.len())
            .finish()
    }
}

/// Serializable, secret-free view of a [`DecodedHash`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashSummary {
    pub algorithm: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub parameters: AlgorithmParameters,
    pub salt_bytes: usize,
    pub hash_bytes: usize,
}

// ============================================================================
// Decoding
// ============================================================================

/// Extract the algorithm tag (`$<tag>$...`)
///
/// Strings without a leading delimiter or with fewer than three fields are
/// malformed rather than "not a match".
pub fn algorithm_tag(encoded: &str) -> PasswordHashResult<&str> {
    let mut fields = encoded.split(DELIMITER);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(""), Some(tag), Some(_)) if !tag.is_empty() => Ok(tag),
        _ => Err(PasswordHashError::format(
            "algorithm",
            "expected `$<algorithm>$...` prefix",
        )),
    }
}

/// Decode any built-in format, dispatching on the algorithm tag
pub fn decode(encoded: &str) -> PasswordHashResult<DecodedHash> {
    match algorithm_tag(encoded)? {
        argon2id::NAME => decode_argon2id(encoded),
        bcrypt::NAME => decode_bcrypt(encoded),
        other => Err(PasswordHashError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// Decode `$argon2id$v=..,m=..,t=..,p=..$<salt>$<hash>`
pub fn decode_argon2id(encoded: &str) -> PasswordHashResult<DecodedHash> {
    let [params_field, salt_field, hash_field] = split_fields::<3>(encoded, argon2id::NAME)?;

    // Version gate comes before the rest of the grammar: a newer format may
    // change the remaining keys.
    let (version_pair, cost_pairs) = params_field
        .split_once(',')
        .ok_or_else(|| PasswordHashError::format("params", "expected `v=..,m=..,t=..,p=..`"))?;
    let [version] = parse_params(version_pair, ["v"])?;
    if version != ARGON2ID_VERSION {
        tracing::warn!(
            found = version,
            supported = ARGON2ID_VERSION,
            "Incompatible Argon2 version in stored hash"
        );
        return Err(PasswordHashError::Incompatible {
            algorithm: argon2id::NAME,
            found: version,
            supported: ARGON2ID_VERSION,
        });
    }

    let [memory_cost_kib, iterations, parallelism] = parse_params(cost_pairs, ["m", "t", "p"])?;
    let parallelism = u8::try_from(parallelism)
        .map_err(|_| PasswordHashError::format("params", "`p` is out of range"))?;

    let salt = decode_base64("salt", salt_field)?;
    let hash = decode_base64("hash", hash_field)?;

    // Lengths come from the bytes actually present.
    let params = Argon2idParams {
        memory_cost_kib,
        iterations,
        parallelism,
        salt_length: salt.len() as u32,
        key_length: hash.len() as u32,
    };
    params.validate().map_err(|RangeViolation { param, reason }| {
        let field = match param {
            "salt" => "salt",
            "hash" => "hash",
            _ => "params",
        };
        PasswordHashError::format(field, reason)
    })?;

    Ok(DecodedHash {
        params: AlgorithmParameters::Argon2id(params),
        salt,
        hash,
    })
}

/// Decode `$bcrypt$c=<cost>$<base64 of bcrypt string>`
pub fn decode_bcrypt(encoded: &str) -> PasswordHashResult<DecodedHash> {
    let [params_field, hash_field] = split_fields::<2>(encoded, bcrypt::NAME)?;

    let [cost] = parse_params(params_field, ["c"])?;
    let params = BcryptParams { cost };
    params
        .validate()
        .map_err(|v| PasswordHashError::format("params", v.reason))?;

    let hash = decode_base64("hash", hash_field)?;
    let embedded_cost = bcrypt_embedded_cost(&hash)?;
    if embedded_cost != cost {
        return Err(PasswordHashError::format(
            "params",
            "`c` does not match the cost embedded in the bcrypt hash",
        ));
    }

    Ok(DecodedHash {
        params: AlgorithmParameters::Bcrypt(params),
        salt: Vec::new(),
        hash,
    })
}

/// Split into exactly the fields `tag` expects, returning those after the tag
fn split_fields<'a, const N: usize>(
    encoded: &'a str,
    tag: &'static str,
) -> PasswordHashResult<[&'a str; N]> {
    let found = algorithm_tag(encoded)?;
    if found != tag {
        return Err(PasswordHashError::format(
            "algorithm",
            format!("expected `{tag}`"),
        ));
    }

    let fields: Vec<&str> = encoded.split(DELIMITER).skip(2).collect();
    let count = fields.len();
    fields.try_into().map_err(|_| {
        PasswordHashError::format(
            "fields",
            format!(
                "{tag} expects {} `$`-separated fields, found {}",
                N + 2,
                count + 2
            ),
        )
    })
}

/// Parse `k1=v1,k2=v2,..` with exactly `keys`, in order
fn parse_params<const N: usize>(
    field: &str,
    keys: [&'static str; N],
) -> PasswordHashResult<[u32; N]> {
    let mut values = [0u32; N];
    let mut pairs = field.split(',');

    for (slot, key) in values.iter_mut().zip(keys) {
        let pair = pairs.next().ok_or_else(|| {
            PasswordHashError::format("params", format!("missing `{key}`"))
        })?;
        let value = pair
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| PasswordHashError::format("params", format!("expected `{key}=`")))?;
        *slot = parse_canonical_u32(value).ok_or_else(|| {
            PasswordHashError::format(
                "params",
                format!("`{key}` is not a canonical unsigned integer"),
            )
        })?;
    }

    if pairs.next().is_some() {
        return Err(PasswordHashError::format(
            "params",
            "unexpected trailing parameter",
        ));
    }
    Ok(values)
}

fn parse_canonical_u32(value: &str) -> Option<u32> {
    let canonical = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    if !canonical {
        return None;
    }
    value.parse().ok()
}

fn decode_base64(field: &'static str, value: &str) -> PasswordHashResult<Vec<u8>> {
    // The decoder's own message would echo offending bytes.
    from_base64(value).map_err(|_| PasswordHashError::format(field, "invalid base64"))
}

/// Structural check of a `$2b$NN$<53 chars>` string; returns `NN`
fn bcrypt_embedded_cost(hash: &[u8]) -> PasswordHashResult<u32> {
    let invalid = || PasswordHashError::format("hash", "not a bcrypt hash");

    let hash = std::str::from_utf8(hash).map_err(|_| invalid())?;
    let mut parts = hash.split(DELIMITER);
    match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(""), Some(prefix), Some(cost), Some(body), None)
            if BCRYPT_PREFIXES.contains(&prefix)
                && cost.len() == 2
                && cost.bytes().all(|b| b.is_ascii_digit())
                && body.len() == BCRYPT_BODY_LENGTH =>
        {
            cost.parse().map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

pub(crate) fn encode_argon2id(params: &Argon2idParams, salt: &[u8], hash: &[u8]) -> String {
    format!(
        "{DELIMITER}{}{DELIMITER}v={},m={},t={},p={}{DELIMITER}{}{DELIMITER}{}",
        argon2id::NAME,
        ARGON2ID_VERSION,
        params.memory_cost_kib,
        params.iterations,
        params.parallelism,
        to_base64(salt),
        to_base64(hash),
    )
}

pub(crate) fn encode_bcrypt(cost: u32, bcrypt_hash: &str) -> String {
    format!(
        "{DELIMITER}{}{DELIMITER}c={cost}{DELIMITER}{}",
        bcrypt::NAME,
        to_base64(bcrypt_hash.as_bytes())
    )
}

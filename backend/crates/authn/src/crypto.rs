//! Cryptographic Utilities

use std::hint::black_box;

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

use crate::error::{PasswordHashError, PasswordHashResult};

/// Generate cryptographically secure random bytes
///
/// The OS entropy source is acquired for this call only.
pub fn random_bytes(len: usize) -> PasswordHashResult<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        PasswordHashError::crypto("secure random source unavailable")
    })?;
    Ok(bytes)
}

/// Encode bytes as unpadded standard base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD_NO_PAD.encode(bytes)
}

/// Decode unpadded standard base64, rejecting padding and non-canonical
/// trailing bits
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD_NO_PAD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
///
/// Runs over the longer input; a length difference is folded into the
/// result instead of returning early.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut result = 0u8;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        result |= black_box(x ^ y);
    }
    let len_diff = a.len() ^ b.len();
    black_box(result as usize | len_diff) == 0
}

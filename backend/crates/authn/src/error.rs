//! Password Hashing Errors
//!
//! Every failure of the hashing core is a [`PasswordHashError`]. A password
//! that simply does not match is *not* an error: verification reports it as
//! `Ok(false)`.
//!
//! ## Secrecy
//! Messages name the offending field or configuration key but never embed the
//! plaintext password, raw hash bytes, or third-party diagnostics that could
//! echo them.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Result type alias for the hashing core
pub type PasswordHashResult<T> = Result<T, PasswordHashError>;

/// Password hashing/verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// A required parameter is missing, non-numeric, or out of range
    #[error("Invalid configuration for {key}: {reason}")]
    Configuration {
        key: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    /// The algorithm name is not registered
    #[error("Unsupported password hashing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The encoded hash is structurally invalid
    #[error("Malformed encoded hash ({field}): {reason}")]
    Format {
        field: &'static str,
        reason: Cow<'static, str>,
    },

    /// The encoded hash is well-formed but was produced by an unsupported
    /// algorithm version
    #[error("Incompatible {algorithm} version {found} (supported: {supported})")]
    Incompatible {
        algorithm: &'static str,
        found: u32,
        supported: u32,
    },

    /// The random source or the derivation primitive failed
    #[error("Cryptographic failure: {0}")]
    Crypto(Cow<'static, str>),
}

impl PasswordHashError {
    pub(crate) fn config(
        key: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn format(field: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Format {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn crypto(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Crypto(reason.into())
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PasswordHashError::Configuration { .. } => ErrorKind::Configuration,
            PasswordHashError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            PasswordHashError::Format { .. } => ErrorKind::Format,
            PasswordHashError::Incompatible { .. } => ErrorKind::Incompatible,
            PasswordHashError::Crypto(_) => ErrorKind::Crypto,
        }
    }
}

/// Classification of [`PasswordHashError`]
///
/// Lets callers decide policy without matching on error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    Configuration,
    UnsupportedAlgorithm,
    Format,
    Incompatible,
    Crypto,
}

impl ErrorKind {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::UnsupportedAlgorithm => "unsupported_algorithm",
            ErrorKind::Format => "format",
            ErrorKind::Incompatible => "incompatible",
            ErrorKind::Crypto => "crypto",
        }
    }

    /// The offending value came from the caller (a stored hash or an
    /// algorithm name)
    #[inline]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedAlgorithm | ErrorKind::Format | ErrorKind::Incompatible
        )
    }

    /// The deployment is at fault (bad parameters, broken entropy source)
    #[inline]
    pub const fn is_operational_error(&self) -> bool {
        !self.is_input_error()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

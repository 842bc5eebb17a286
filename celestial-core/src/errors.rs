//! Error types for sky-position calculations.
//!
//! [`AstroError`] covers the failure modes of the numeric layer: coordinates
//! that are not finite or fall outside their domain, and functions evaluated
//! outside theirs.
//!
//! # Usage
//!
//! ```
//! use celestial_core::{AstroError, MathErrorKind};
//!
//! fn checked_dec(dec: f64) -> Result<f64, AstroError> {
//!     if !(-90.0..=90.0).contains(&dec) {
//!         return Err(AstroError::math_error(
//!             "checked_dec",
//!             MathErrorKind::OutOfRange,
//!             "declination outside [-90, 90]",
//!         ));
//!     }
//!     Ok(dec)
//! }
//! # assert!(checked_dec(91.0).is_err());
//! ```

use thiserror::Error;

/// Classification of mathematical errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MathErrorKind {
    /// Input value is invalid for the operation.
    InvalidInput,
    /// Input or result is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g., declination > 90°).
    OutOfRange,
}

/// Unified error type for the numeric layer.
#[derive(Error, Debug)]
pub enum AstroError {
    /// Numerical computation failure.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },
}

/// Convenience alias for `Result<T, AstroError>`.
pub type AstroResult<T> = Result<T, AstroError>;

impl AstroError {
    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    /// The [`MathErrorKind`] for math errors, `None` otherwise.
    pub fn kind(&self) -> Option<&MathErrorKind> {
        match self {
            Self::MathError { kind, .. } => Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_error_with_kind() {
        let err = AstroError::math_error(
            "validate_declination",
            MathErrorKind::OutOfRange,
            "Dec 91.00° out of range [-90°, +90°]",
        );
        assert!(err.to_string().contains("Math error"));
        assert!(err.to_string().contains("OutOfRange"));
        assert_eq!(err.kind(), Some(&MathErrorKind::OutOfRange));
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<AstroError>();
        _assert_sync::<AstroError>();
    }
}

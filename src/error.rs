//! Error types for shapebloom operations.
//!
//! The two filter operations, [`insert`] and [`possibly_contains`], fail in
//! exactly one way: the value cannot be represented in the fixed-width
//! encoding. Everything else in this module covers construction, union and
//! snapshot restore.
//!
//! # Error Propagation
//!
//! ```
//! use shapebloom::{Result, ShapeBloomFilter};
//!
//! fn seen_before(filter: &ShapeBloomFilter, id: u64) -> Result<bool> {
//!     let hit = filter.possibly_contains(&id)?;
//!     if !hit {
//!         filter.insert(&id)?;
//!     }
//!     Ok(hit)
//! }
//! # let filter = ShapeBloomFilter::new();
//! # assert!(!seen_before(&filter, 7).unwrap());
//! # assert!(seen_before(&filter, 7).unwrap());
//! ```
//!
//! [`insert`]: crate::ShapeBloomFilter::insert
//! [`possibly_contains`]: crate::ShapeBloomFilter::possibly_contains

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for shapebloom operations.
pub type Result<T> = std::result::Result<T, ShapeBloomError>;

/// Errors that can occur while building, updating or restoring a filter.
///
/// `Clone` + `PartialEq` so tests can compare errors directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeBloomError {
    /// The value has no fixed-width encoding.
    ///
    /// Raised by the encoder before any bucket is touched, so the filter is
    /// left exactly as it was.
    Encoding {
        /// Fully qualified name of the rejected type.
        type_name: &'static str,
        /// Why the shape cannot be encoded.
        reason: String,
    },

    /// Invalid configuration provided to a constructor or builder.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Two filters cannot be combined.
    ///
    /// Filters that encode with different byte orders place the same value's
    /// bits at different positions, so their bitfields cannot be unioned.
    IncompatibleFilters {
        /// Description of the incompatibility.
        reason: String,
    },

    /// A serialized snapshot could not be restored.
    #[cfg(feature = "serde")]
    SerializationError {
        /// Description of what failed.
        message: String,
    },
}

impl fmt::Display for ShapeBloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding { type_name, reason } => {
                write!(
                    f,
                    "Value of type `{}` cannot be encoded as a fixed-width pattern: {}.",
                    type_name, reason
                )
            }
            Self::InvalidParameters { message } => {
                write!(f, "Invalid filter parameters: {}.", message)
            }
            Self::IncompatibleFilters { reason } => {
                write!(
                    f,
                    "Cannot perform operation on incompatible filters: {}.",
                    reason
                )
            }
            #[cfg(feature = "serde")]
            Self::SerializationError { message } => {
                write!(f, "Serialization error: {}.", message)
            }
        }
    }
}

impl std::error::Error for ShapeBloomError {}

impl ShapeBloomError {
    /// Create an `Encoding` error for type `T`.
    #[must_use]
    pub fn encoding<T: ?Sized>(reason: impl Into<String>) -> Self {
        Self::Encoding {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Create an `InvalidParameters` error.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `IncompatibleFilters` error.
    #[must_use]
    pub fn incompatible_filters(reason: impl Into<String>) -> Self {
        Self::IncompatibleFilters {
            reason: reason.into(),
        }
    }

    /// Create a `SerializationError`.
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Whether this is the encoding failure returned by filter operations.
    #[must_use]
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_encoding() {
        let err = ShapeBloomError::encoding::<String>("variable width");
        let display = format!("{}", err);
        assert!(display.contains("alloc::string::String"));
        assert!(display.contains("variable width"));
        assert!(err.is_encoding());
    }

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = ShapeBloomError::invalid_parameters("shard_count must be greater than 0");
        let display = format!("{}", err);
        assert!(display.contains("Invalid filter parameters"));
        assert!(display.contains("shard_count"));
        assert!(!err.is_encoding());
    }

    #[test]
    fn test_error_display_incompatible_filters() {
        let err = ShapeBloomError::incompatible_filters("byte order mismatch");
        assert!(format!("{}", err).contains("byte order mismatch"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_error_display_serialization() {
        let err = ShapeBloomError::serialization_error("truncated bucket");
        assert!(format!("{}", err).contains("truncated bucket"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(ShapeBloomError::invalid_parameters("test"));
    }

    #[test]
    fn test_error_clone() {
        let err1 = ShapeBloomError::encoding::<usize>("platform-dependent width");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(ShapeBloomError::encoding::<str>("variable width"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(
            outer(),
            Err(ShapeBloomError::Encoding { type_name: "str", .. })
        ));
    }
}

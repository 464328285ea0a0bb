//! Error types for the ID analysis core.
//!
//! This module defines the central `Error` enum covering every failure the
//! core can report. All other computation is total: a structurally valid
//! 64-bit ID always decodes, and a well-formed scheme always partitions.
//!
//! ## Error Cases
//! - `InvalidInput`: an ID string is not a decimal 64-bit unsigned integer,
//!   or its value cannot carry a timestamp field.
//! - `EmptyCorpus`: validation or correlation was requested over zero
//!   usable records, so rates and extrema are undefined.
//! - `MalformedScheme`: a partition scheme does not tile the low 32 bits
//!   exactly; detected at registry construction, never at analysis time.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the ID analysis core.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input was not a representable 64-bit aweme ID.
    ///
    /// Raised for negative, non-integral, or out-of-range ID strings, and
    /// for values whose high 32 bits are all zero (no timestamp field).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Statistics were requested over zero usable records.
    ///
    /// Accuracy rates and delta extrema are undefined on an empty corpus
    /// and must never be reported as `0%`, `100%`, or NaN.
    #[error("corpus contains no usable records")]
    EmptyCorpus,

    /// A partition scheme's fields do not tile bits `[0, 32)` exactly.
    ///
    /// This is a configuration-time invariant violation: the registry
    /// refuses to construct rather than silently mis-partition.
    #[error("malformed scheme `{scheme}`: {reason}")]
    MalformedScheme { scheme: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_scheme(scheme: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedScheme {
            scheme: scheme.into(),
            reason: reason.into(),
        }
    }
}

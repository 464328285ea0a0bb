//! Error types for corpus loading and extraction.
//!
//! This module defines the central `Error` enum for everything that can go
//! wrong between a file on disk and a usable record list. Analysis errors
//! stay in the `snowmelt` core; this enum only covers the I/O boundary.
//!
//! ## Error Cases
//! - `Io`: the document could not be read or written.
//! - `Json`: the document is not valid JSON or not the expected shape.
//! - `BadRecord`: a structurally valid document carries an unusable
//!   record, such as an id too small to hold a timestamp field.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for corpus I/O.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Reading or writing the document failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record inside the document cannot become an [`IdRecord`].
    ///
    /// [`IdRecord`]: snowmelt::IdRecord
    #[error("bad record: {reason}")]
    BadRecord { reason: String },
}

impl Error {
    pub(crate) fn bad_record(reason: impl Into<String>) -> Self {
        Self::BadRecord {
            reason: reason.into(),
        }
    }
}

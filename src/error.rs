//! Error types for the aggregation engine.

use crate::types::SampleId;
use std::fmt;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for backing store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The kind of entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A [`Location`](crate::Location)
    Location,
    /// A [`Sample`](crate::Sample)
    Sample,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Location => f.write_str("location"),
            EntityKind::Sample => f.write_str("sample"),
        }
    }
}

/// Errors returned by every public engine operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range input.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// Human readable constraint that was violated
        reason: String,
    },

    /// A referenced location or sample does not exist.
    #[error("{kind} {id} does not exist")]
    NotFound {
        /// Kind of the missing entity
        kind: EntityKind,
        /// Identifier that was looked up
        id: u64,
    },

    /// The caller does not own the sample it tried to change.
    #[error("sample {sample} belongs to a different user than {caller:?}")]
    Authorization {
        /// The protected sample
        sample: SampleId,
        /// The caller identity, empty when anonymous
        caller: String,
    },

    /// The backing store failed; passed through unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: u64) -> Self {
        Error::NotFound { kind, id }
    }
}

/// Errors raised by a [`Collection`](crate::store::Collection) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failure reported by a backend implementation.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A snapshot belongs to another partition.
    #[error("snapshot scope {found:?} does not match collection scope {expected:?}")]
    ScopeMismatch {
        /// Scope of the collection being restored
        expected: String,
        /// Scope recorded in the snapshot
        found: String,
    },

    /// Snapshot serialization failed.
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Snapshot bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Reading or writing a snapshot file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for the enumeration engine.
//!
//! All errors are returned by value; nothing in the hot loops unwinds.
//! `Overflow` is special: it is raised internally when a native-width
//! tableau overflows, caught at the enumeration entry points, and retried
//! with a wider integer representation.  It should never escape the crate.

use thiserror::Error;

/// Errors reported by the enumeration engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumError {
    /// The chosen coordinate system does not support the requested
    /// operation on this triangulation (for example, quad-closed
    /// coordinates on a triangulation that is not ideal).
    #[error("coordinate system not supported here: {0}")]
    InvalidCoordinateSystem(String),

    /// A persisted surface vector failed its structural checks
    /// (index bounds, duplicate indices, or a malformed field).
    #[error("invalid surface data: {0}")]
    InvalidInput(String),

    /// The triangulation fails a structural precondition of the
    /// requested operation.
    #[error("triangulation precondition failed: {0}")]
    PreconditionFailed(String),

    /// A native-width integer overflowed inside the LP tableau.
    /// Recoverable: the engine retries with a wider width.
    #[error("native integer overflow in LP tableau")]
    Overflow,

    /// The operation was cancelled through its progress tracker.
    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EnumError>;

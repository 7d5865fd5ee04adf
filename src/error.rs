// =====================================================================
// File: error.rs
// Author: Bob Jack
// Date: Oct. 6, 2025
//
//! Error types shared by the B-tree index, its configuration, and the
//! command session.
//!
//! Only caller mistakes are reported through [`Error`]. A broken tree
//! structure is a bug in the index itself: the algorithms panic on it
//! instead of returning an error, and [`Error::ConsistencyViolation`]
//! is only produced by the read-only [`crate::BTreeIndex::validate`] check.
// =====================================================================

use thiserror::Error;

/// Errors produced by the index and the command layer on top of it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tree cannot be built with the requested settings, e.g. a
    /// minimum degree below 2 or a degree that is not a number.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A key or value required by an operation was missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A structural B-tree invariant does not hold.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),
}


/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

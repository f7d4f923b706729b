//! Error types
//!
//! Only failures that cross the resolver boundary are errors. A declaration
//! that is not found, or a location list without ranges, is a normal
//! [`Resolution`](crate::resolver::Resolution).

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::DumpKind;

/// Failures of a single resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The front-end reported an architecture outside the supported family
    #[error("Unsupported architecture '{found}' (only {supported} is supported)")]
    UnsupportedArchitecture { found: String, supported: String },

    /// The dump utility could not produce a usable dump
    ///
    /// Covers spawn failures, non-zero exits, non-UTF-8 and empty output.
    /// Dumps are deterministic for a given object file, so this is never
    /// retried.
    #[error("{kind} dump failed: {reason}")]
    DumpUtilityFailure { kind: DumpKind, reason: String },

    /// The object file could not be read while detecting its architecture
    #[error("Cannot inspect object file {}: {reason}", .path.display())]
    ObjectInspection { path: PathBuf, reason: String },
}

impl ResolveError {
    pub(crate) fn dump(kind: DumpKind, reason: impl Into<String>) -> Self {
        ResolveError::DumpUtilityFailure {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result alias for resolver operations
pub type Result<T> = std::result::Result<T, ResolveError>;

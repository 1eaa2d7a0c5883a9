//! Error types for Duskblade.

use thiserror::Error;

use crate::version::SchemaVersion;

/// Top-level error type for Duskblade operations.
#[derive(Debug, Error)]
pub enum DuskbladeError {
    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: SchemaVersion,
        /// Actual version found
        actual: SchemaVersion,
    },
}

//! Gameplay error types.
//!
//! Gameplay never faults at runtime: vitals are clamped and redundant
//! calls are ignored. These errors are raised while constructing characters
//! and are fatal for the session.

use thiserror::Error;

/// Errors raised while building gameplay objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameplayError {
    /// A character data record holds an unusable value
    #[error("invalid {record} data: {field} {reason}")]
    InvalidData {
        /// Record being validated ("player" or "enemy")
        record: &'static str,
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The player state handler table does not line up with the state set
    #[error("state table slot {slot} is registered for {found}, expected {expected}")]
    StateTableMismatch {
        /// Table slot index
        slot: usize,
        /// State the slot should serve
        expected: &'static str,
        /// State the slot actually serves
        found: &'static str,
    },
}

/// Result type for gameplay construction.
pub type GameplayResult<T> = Result<T, GameplayError>;

//! Per-tick player input signals.
//!
//! Device polling and rebinding live in the host; the state machine only
//! sees the resolved signals for the current tick.

use serde::{Deserialize, Serialize};

/// Input signals sampled for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal movement axis in [-1, 1]
    pub move_axis: f32,
    /// Jump pressed this tick
    pub jump: bool,
    /// Normal attack pressed this tick
    pub attack: bool,
    /// Dash held
    pub dash: bool,
}

impl PlayerInput {
    /// No input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Input with only a movement axis.
    #[must_use]
    pub fn moving(axis: f32) -> Self {
        Self {
            move_axis: axis.clamp(-1.0, 1.0),
            ..Self::default()
        }
    }

    /// Add a jump press.
    #[must_use]
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Add an attack press.
    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }

    /// Hold dash.
    #[must_use]
    pub fn with_dash(mut self) -> Self {
        self.dash = true;
        self
    }

    /// Check if there is any horizontal movement input.
    #[must_use]
    pub fn has_movement(&self) -> bool {
        self.move_axis != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let input = PlayerInput::moving(2.0).with_attack().with_dash();
        assert_eq!(input.move_axis, 1.0);
        assert!(input.attack && input.dash && !input.jump);
        assert!(input.has_movement());
        assert!(!PlayerInput::new().has_movement());
    }
}

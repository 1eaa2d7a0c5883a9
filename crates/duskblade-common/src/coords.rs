//! Gameplay-plane coordinates.
//!
//! Characters move in 3D space but gameplay is confined to the `z = 0`
//! plane: x is horizontal, y is vertical.

pub use glam::Vec3;

/// Depth of the gameplay plane.
pub const GAMEPLAY_PLANE_Z: f32 = 0.0;

/// Speeds at or below this magnitude count as standing still.
pub const STANDSTILL_SPEED: f32 = 0.1;

/// Project a position back onto the gameplay plane.
#[must_use]
pub fn confine_to_plane(position: Vec3) -> Vec3 {
    Vec3::new(position.x, position.y, GAMEPLAY_PLANE_Z)
}

/// Check whether a horizontal speed counts as standing still.
#[must_use]
pub fn is_standstill(horizontal_speed: f32) -> bool {
    horizontal_speed.abs() <= STANDSTILL_SPEED
}

/// Horizontal direction a character faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Facing {
    /// Facing +x (default)
    #[default]
    Right,
    /// Facing -x
    Left,
}

impl Facing {
    /// Sign of the horizontal axis this facing points along.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Facing implied by a horizontal input axis, if any.
    #[must_use]
    pub fn from_axis(axis: f32) -> Option<Self> {
        if axis > 0.0 {
            Some(Facing::Right)
        } else if axis < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standstill_threshold() {
        assert!(is_standstill(0.1));
        assert!(is_standstill(-0.05));
        assert!(!is_standstill(0.11));
    }

    #[test]
    fn test_facing_from_axis() {
        assert_eq!(Facing::from_axis(0.7), Some(Facing::Right));
        assert_eq!(Facing::from_axis(-1.0), Some(Facing::Left));
        assert_eq!(Facing::from_axis(0.0), None);
        assert_eq!(Facing::Left.sign(), -1.0);
    }

    proptest::proptest! {
        #[test]
        fn test_confine_keeps_plane_coordinates(x in -1e6f32..1e6, y in -1e6f32..1e6, z in -1e6f32..1e6) {
            let confined = confine_to_plane(Vec3::new(x, y, z));
            proptest::prop_assert_eq!(confined, Vec3::new(x, y, GAMEPLAY_PLANE_Z));
        }

        #[test]
        fn test_facing_matches_axis_sign(axis in -1.0f32..1.0) {
            if let Some(facing) = Facing::from_axis(axis) {
                proptest::prop_assert_eq!(facing.sign(), axis.signum());
            } else {
                proptest::prop_assert_eq!(axis, 0.0);
            }
        }
    }
}

//! Captured input samples
//!
//! The input capture subsystem produces a finite sequence of
//! [`PressurePoint`]s per gesture; the brush consumes them through its
//! sliding window and never rewinds.

use sumi_core::{Point, Vec3, ViewSpace};

/// One pointer/stylus event: position in view space plus pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressurePoint {
    pub x: f32,
    pub y: f32,
    /// Stylus pressure in [0, 1]; mice report 1.0.
    pub pressure: f32,
}

impl PressurePoint {
    pub const ZERO: PressurePoint = PressurePoint {
        x: 0.0,
        y: 0.0,
        pressure: 0.0,
    };

    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
        }
    }

    pub fn point(&self) -> Point<ViewSpace> {
        Point::new(self.x, self.y)
    }

    /// Position and pressure packed the way the interpolator consumes them.
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.pressure)
    }
}

impl std::fmt::Display for PressurePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.pressure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_is_clamped() {
        assert_eq!(PressurePoint::new(0.0, 0.0, 1.5).pressure, 1.0);
        assert_eq!(PressurePoint::new(0.0, 0.0, -0.5).pressure, 0.0);
    }
}

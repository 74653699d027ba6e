//! Color types and blending
//!
//! `color_mix` is the one blend primitive of the brush pipeline. It runs on
//! both execution units: this host implementation and the identical WGSL
//! function in the brush shaders. The formula is `base + (additional - base)
//! * t` with operand order preserved, so `t = 0` reproduces `base` exactly
//! and `t = 1` reproduces `additional` exactly.

use crate::math::{Vec2, Vec3, Vec4};

/// RGBA color (linear space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(v: [f32; 4]) -> Self {
        Self::rgba(v[0], v[1], v[2], v[3])
    }

    /// Linear interpolation between two colors, with `t` clamped to [0, 1].
    ///
    /// For the unclamped blend primitive see [`color_mix`].
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        color_mix(*a, *b, t.clamp(0.0, 1.0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Componentwise linear blend, implemented by every fixed-arity
/// vector-of-float type that can flow through the brush pipeline.
pub trait Mix: Copy {
    /// `self + (other - self) * t`, preserving operand order per component.
    fn mix(self, other: Self, t: f32) -> Self;
}

/// Blend `additional` over `base` by factor `t`.
///
/// Pure and allocation-free; safe to call from any thread. `t` is not
/// clamped: boundary exactness (`t = 0` -> `base`, `t = 1` -> `additional`)
/// is the contract, and callers that need clamping do it at the edge
/// (`Color::lerp`, the sampler options).
pub fn color_mix<T: Mix>(base: T, additional: T, t: f32) -> T {
    base.mix(additional, t)
}

impl Mix for f32 {
    fn mix(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Mix for Vec2 {
    fn mix(self, other: Self, t: f32) -> Self {
        Vec2::new(self.x.mix(other.x, t), self.y.mix(other.y, t))
    }
}

impl Mix for Vec3 {
    fn mix(self, other: Self, t: f32) -> Self {
        Vec3::new(
            self.x.mix(other.x, t),
            self.y.mix(other.y, t),
            self.z.mix(other.z, t),
        )
    }
}

impl Mix for Vec4 {
    fn mix(self, other: Self, t: f32) -> Self {
        Vec4::new(
            self.x.mix(other.x, t),
            self.y.mix(other.y, t),
            self.z.mix(other.z, t),
            self.w.mix(other.w, t),
        )
    }
}

impl Mix for [f32; 4] {
    fn mix(self, other: Self, t: f32) -> Self {
        [
            self[0].mix(other[0], t),
            self[1].mix(other[1], t),
            self[2].mix(other[2], t),
            self[3].mix(other[3], t),
        ]
    }
}

impl Mix for Color {
    fn mix(self, other: Self, t: f32) -> Self {
        Color {
            r: self.r.mix(other.r, t),
            g: self.g.mix(other.g, t),
            b: self.b.mix(other.b, t),
            a: self.a.mix(other.a, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_boundaries_are_exact() {
        let a = Color::rgba(0.123, 0.456, 0.789, 0.25);
        let b = Color::rgba(0.987, 0.654, 0.321, 1.0);
        assert_eq!(color_mix(a, b, 0.0), a);
        assert_eq!(color_mix(a, b, 1.0), b);
    }

    #[test]
    fn test_mix_midpoint() {
        let brush = Color::rgba(1.0, 0.0, 0.0, 1.0);
        let current = Color::rgba(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            color_mix(brush, current, 0.5),
            Color::rgba(0.5, 0.0, 0.5, 1.0)
        );
    }

    #[test]
    fn test_mix_stays_between_endpoints() {
        let a = Color::rgba(0.2, 0.9, 0.1, 0.3);
        let b = Color::rgba(0.7, 0.1, 0.8, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let c = color_mix(a, b, t);
            for (component, (lo, hi)) in [
                (c.r, (a.r.min(b.r), a.r.max(b.r))),
                (c.g, (a.g.min(b.g), a.g.max(b.g))),
                (c.b, (a.b.min(b.b), a.b.max(b.b))),
                (c.a, (a.a.min(b.a), a.a.max(b.a))),
            ] {
                assert!(component >= lo && component <= hi);
            }
        }
    }

    #[test]
    fn test_mix_equal_inputs_is_identity() {
        let a = Color::rgba(0.3, 0.4, 0.5, 0.6);
        for i in 0..=8 {
            let t = i as f32 / 8.0;
            assert_eq!(color_mix(a, a, t), a);
        }
    }

    #[test]
    fn test_mix_scalar_and_vector_agree() {
        let a = Vec4::new(0.0, 0.5, 1.0, 0.25);
        let b = Vec4::new(1.0, 0.5, 0.0, 0.75);
        let mixed = color_mix(a, b, 0.25);
        assert_eq!(mixed.x, color_mix(a.x, b.x, 0.25));
        assert_eq!(mixed.w, color_mix(a.w, b.w, 0.25));
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(Color::lerp(&a, &b, -1.0), a);
        assert_eq!(Color::lerp(&a, &b, 2.0), b);
    }

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex(0xFF8000);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 2e-3);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }
}

//! Cubic Bezier stroke interpolation
//!
//! Expands a window of four captured input points into a run of GPU-ready
//! [`Stroke`] samples along the cubic Bezier they define. This is the host
//! reference for the compute shader in `sumi_gpu`; both use the same sample
//! count rule so a stroke renders identically on either path.

use smallvec::SmallVec;
use sumi_core::{LayerPixelSpace, Mix, Transform2D, Vec3, ViewSpace};

use crate::layout::Stroke;
use crate::stroke::PressurePoint;

/// Samples per layer pixel of control-polygon length.
const SAMPLES_PER_PIXEL: f32 = 1.5;

/// Lower bound on samples so very short gestures still leave a mark.
const MIN_SAMPLES: usize = 4;

/// Interpolates input windows into stroke samples in layer-pixel space.
#[derive(Clone, Copy, Debug)]
pub struct BezierInterpolator {
    /// View space -> layer-pixel space, from the host's canvas transform.
    pub transform: Transform2D<LayerPixelSpace, ViewSpace>,
}

impl BezierInterpolator {
    pub fn new(transform: Transform2D<LayerPixelSpace, ViewSpace>) -> Self {
        Self { transform }
    }

    /// Number of samples for a control polygon of the given length.
    pub fn sample_count(length: f32) -> usize {
        ((length * SAMPLES_PER_PIXEL).ceil() as usize).max(MIN_SAMPLES)
    }

    /// Expand four control points into stroke samples.
    ///
    /// Control points are transformed into layer-pixel space first, then the
    /// curve is sampled uniformly in parameter space with step `1 / count`,
    /// covering `t` in `[0, 1)`. Pressure follows the same cubic.
    pub fn interpolate(
        &self,
        input0: PressurePoint,
        input1: PressurePoint,
        input2: PressurePoint,
        input3: PressurePoint,
        color: [f32; 4],
    ) -> SmallVec<[Stroke; 16]> {
        let p0 = self.to_layer(input0);
        let p1 = self.to_layer(input1);
        let p2 = self.to_layer(input2);
        let p3 = self.to_layer(input3);

        let length =
            p0.xy().distance(p1.xy()) + p1.xy().distance(p2.xy()) + p2.xy().distance(p3.xy());
        let count = Self::sample_count(length);
        let delta = 1.0 / count as f32;
        tracing::trace!(length, count, "interpolate stroke window");

        let mut strokes = SmallVec::with_capacity(count);
        for i in 0..count {
            let t = i as f32 * delta;
            let sample = cubic_bezier(p0, p1, p2, p3, t);
            strokes.push(Stroke::new(
                Vec3::new(sample.x, sample.y, 0.0),
                color,
                sample.z.clamp(0.0, 1.0),
            ));
        }
        strokes
    }

    /// Transform into layer-pixel space, carrying pressure along in z.
    fn to_layer(&self, input: PressurePoint) -> Vec3 {
        let point = self.transform.apply(input.point());
        Vec3::new(point.x, point.y, input.pressure)
    }
}

/// Pointwise cubic Bezier via repeated linear interpolation (de Casteljau).
fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let a = p0.mix(p1, t);
    let b = p1.mix(p2, t);
    let c = p2.mix(p3, t);
    let d = a.mix(b, t);
    let e = b.mix(c, t);
    d.mix(e, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_interpolator() -> BezierInterpolator {
        BezierInterpolator::new(Transform2D::identity())
    }

    #[test]
    fn test_first_sample_is_first_control_point() {
        let interpolator = identity_interpolator();
        let strokes = interpolator.interpolate(
            PressurePoint::new(10.0, 20.0, 0.8),
            PressurePoint::new(30.0, 40.0, 0.9),
            PressurePoint::new(50.0, 40.0, 0.7),
            PressurePoint::new(70.0, 20.0, 0.6),
            [0.0, 0.0, 0.0, 1.0],
        );

        let first = strokes.first().unwrap();
        assert_eq!(first.point, [10.0, 20.0, 0.0]);
        assert_eq!(first.pressure, 0.8);
    }

    #[test]
    fn test_sample_count_rule() {
        assert_eq!(BezierInterpolator::sample_count(0.0), 4);
        assert_eq!(BezierInterpolator::sample_count(1.0), 4);
        assert_eq!(BezierInterpolator::sample_count(10.0), 15);
        assert_eq!(BezierInterpolator::sample_count(100.0), 150);
    }

    #[test]
    fn test_degenerate_window_produces_minimum_samples() {
        let interpolator = identity_interpolator();
        let p = PressurePoint::new(5.0, 5.0, 1.0);
        let strokes = interpolator.interpolate(p, p, p, p, [1.0; 4]);

        assert_eq!(strokes.len(), 4);
        for stroke in &strokes {
            assert_eq!(stroke.point, [5.0, 5.0, 0.0]);
            assert_eq!(stroke.pressure, 1.0);
        }
    }

    #[test]
    fn test_straight_line_samples_are_monotonic() {
        let interpolator = identity_interpolator();
        let strokes = interpolator.interpolate(
            PressurePoint::new(0.0, 0.0, 1.0),
            PressurePoint::new(10.0, 0.0, 1.0),
            PressurePoint::new(20.0, 0.0, 1.0),
            PressurePoint::new(30.0, 0.0, 1.0),
            [1.0; 4],
        );

        assert_eq!(strokes.len(), BezierInterpolator::sample_count(30.0));
        for pair in strokes.windows(2) {
            assert!(pair[1].point[0] > pair[0].point[0]);
            assert_eq!(pair[1].point[1], 0.0);
        }
    }

    #[test]
    fn test_transform_applies_before_interpolation() {
        let transform = Transform2D::<LayerPixelSpace, ViewSpace>::scale(2.0, 2.0);
        let interpolator = BezierInterpolator::new(transform);

        let p = PressurePoint::new(3.0, 4.0, 1.0);
        let strokes = interpolator.interpolate(p, p, p, p, [1.0; 4]);
        assert_eq!(strokes[0].point, [6.0, 8.0, 0.0]);
    }

    #[test]
    fn test_pressure_interpolates_between_endpoints() {
        let interpolator = identity_interpolator();
        let strokes = interpolator.interpolate(
            PressurePoint::new(0.0, 0.0, 0.0),
            PressurePoint::new(10.0, 0.0, 0.25),
            PressurePoint::new(20.0, 0.0, 0.75),
            PressurePoint::new(30.0, 0.0, 1.0),
            [1.0; 4],
        );

        for stroke in &strokes {
            assert!((0.0..=1.0).contains(&stroke.pressure));
        }
        // Pressure grows along this window.
        let last = strokes.last().unwrap();
        assert!(last.pressure > strokes[0].pressure);
    }
}

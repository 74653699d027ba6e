//! Typed coordinate spaces
//!
//! Every 2D quantity in the brush pipeline lives in a named coordinate
//! space, and transforms are typed by the pair of spaces they connect.
//! Mixing up the texture projection and the layer projection is then a
//! compile error rather than a corrupted stroke.
//!
//! Spaces:
//! - [`ViewSpace`]: pointer/stylus input, pixels of the host view
//! - [`ViewPortSpace`]: normalized device coordinates, [-1, 1]
//! - [`LayerPixelSpace`]: pixels of one drawing layer
//! - [`LayerSpace`]: the layer's clip-space output coordinate
//! - [`TextureSpace`]: normalized texture coordinate, [0, 1]

use std::marker::PhantomData;

use crate::math::{Mat4, Vec2, Vec4};

/// Marker trait for coordinate space tags.
pub trait CoordinateSpace: 'static {}

/// Pointer/stylus input space (host view pixels).
pub enum ViewSpace {}
/// Normalized device coordinates, [-1, 1] on both axes.
pub enum ViewPortSpace {}
/// Pixels of one drawing layer.
pub enum LayerPixelSpace {}
/// Layer output (clip) coordinate.
pub enum LayerSpace {}
/// Normalized texture coordinate, [0, 1] on both axes.
pub enum TextureSpace {}

impl CoordinateSpace for ViewSpace {}
impl CoordinateSpace for ViewPortSpace {}
impl CoordinateSpace for LayerPixelSpace {}
impl CoordinateSpace for LayerSpace {}
impl CoordinateSpace for TextureSpace {}

/// A 2D point tagged with the space it lives in.
pub struct Point<S: CoordinateSpace> {
    pub x: f32,
    pub y: f32,
    _space: PhantomData<S>,
}

impl<S: CoordinateSpace> Point<S> {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn from_vec2(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Homogeneous position for matrix application (z = 0, w = 1).
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::position(self.x, self.y, 0.0)
    }
}

impl<S: CoordinateSpace> Clone for Point<S> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<S: CoordinateSpace> Copy for Point<S> {}

impl<S: CoordinateSpace> PartialEq for Point<S> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<S: CoordinateSpace> std::fmt::Debug for Point<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D size tagged with the space it is measured in.
pub struct Size<S: CoordinateSpace> {
    pub width: f32,
    pub height: f32,
    _space: PhantomData<S>,
}

impl<S: CoordinateSpace> Size<S> {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            _space: PhantomData,
        }
    }
}

impl<S: CoordinateSpace> Clone for Size<S> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<S: CoordinateSpace> Copy for Size<S> {}

impl<S: CoordinateSpace> PartialEq for Size<S> {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<S: CoordinateSpace> std::fmt::Debug for Size<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A transform taking points from `Src` into `Dst`.
///
/// Wraps a [`Mat4`] so the same value can be handed to the GPU unchanged.
pub struct Transform2D<Dst: CoordinateSpace, Src: CoordinateSpace> {
    pub matrix: Mat4,
    _spaces: PhantomData<fn(Src) -> Dst>,
}

impl<Dst: CoordinateSpace, Src: CoordinateSpace> Transform2D<Dst, Src> {
    pub const fn new(matrix: Mat4) -> Self {
        Self {
            matrix,
            _spaces: PhantomData,
        }
    }

    pub const fn identity() -> Self {
        Self::new(Mat4::IDENTITY)
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(Mat4::translation(x, y, 0.0))
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(Mat4::scale(sx, sy, 1.0))
    }

    /// Normalized device coordinates [-1, 1] to pixels [0, size].
    pub fn ndc_to_pixels(size: Size<Dst>) -> Self {
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        Self::new(Mat4::translation(half_w, half_h, 0.0).mul(&Mat4::scale(half_w, half_h, 1.0)))
    }

    /// Unit square [0, 1] to normalized device coordinates [-1, 1].
    pub fn unit_to_ndc() -> Self {
        Self::new(Mat4::translation(-1.0, -1.0, 0.0).mul(&Mat4::scale(2.0, 2.0, 1.0)))
    }

    /// Pixels [0, size] to the unit square with the y axis flipped
    /// (top-left pixel origin to bottom-left unit origin).
    pub fn pixels_to_unit_flipped(size: Size<Src>) -> Self {
        Self::new(
            Mat4::translation(0.0, 1.0, 0.0)
                .mul(&Mat4::scale(1.0 / size.width, -1.0 / size.height, 1.0)),
        )
    }

    pub fn apply(&self, point: Point<Src>) -> Point<Dst> {
        let v = self.matrix.mul_vec4(point.to_vec4());
        Point::new(v.x, v.y)
    }

    /// The reverse transform, or `None` for degenerate matrices.
    pub fn inverse(&self) -> Option<Transform2D<Src, Dst>> {
        Some(Transform2D::new(self.matrix.inverse()?))
    }
}

impl<Dst: CoordinateSpace, Src: CoordinateSpace> Clone for Transform2D<Dst, Src> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Dst: CoordinateSpace, Src: CoordinateSpace> Copy for Transform2D<Dst, Src> {}

impl<Dst: CoordinateSpace, Src: CoordinateSpace> std::fmt::Debug for Transform2D<Dst, Src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform2D")
            .field("matrix", &self.matrix)
            .finish()
    }
}

/// Composition: `(a * b).apply(p) == a.apply(b.apply(p))`.
impl<Dst, Mid, Src> std::ops::Mul<Transform2D<Mid, Src>> for Transform2D<Dst, Mid>
where
    Dst: CoordinateSpace,
    Mid: CoordinateSpace,
    Src: CoordinateSpace,
{
    type Output = Transform2D<Dst, Src>;

    fn mul(self, rhs: Transform2D<Mid, Src>) -> Self::Output {
        Transform2D::new(self.matrix.mul(&rhs.matrix))
    }
}

impl<Dst, Src> std::ops::Mul<Point<Src>> for Transform2D<Dst, Src>
where
    Dst: CoordinateSpace,
    Src: CoordinateSpace,
{
    type Output = Point<Dst>;

    fn mul(self, rhs: Point<Src>) -> Self::Output {
        self.apply(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq<S: CoordinateSpace>(expected: Point<S>, actual: Point<S>) {
        assert!(
            (expected.x - actual.x).abs() < 1e-4 && (expected.y - actual.y).abs() < 1e-4,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_ndc_to_pixels() {
        let size = Size::<ViewSpace>::new(100.0, 200.0);
        let transform = Transform2D::<ViewSpace, ViewPortSpace>::ndc_to_pixels(size);

        assert_point_eq(Point::new(0.0, 0.0), transform * Point::new(-1.0, -1.0));
        assert_point_eq(Point::new(0.0, 200.0), transform * Point::new(-1.0, 1.0));
        assert_point_eq(Point::new(100.0, 0.0), transform * Point::new(1.0, -1.0));
        assert_point_eq(Point::new(100.0, 200.0), transform * Point::new(1.0, 1.0));
    }

    #[test]
    fn test_unit_to_ndc() {
        let transform = Transform2D::<ViewPortSpace, LayerSpace>::unit_to_ndc();

        assert_point_eq(Point::new(-1.0, -1.0), transform * Point::new(0.0, 0.0));
        assert_point_eq(Point::new(-1.0, 1.0), transform * Point::new(0.0, 1.0));
        assert_point_eq(Point::new(1.0, -1.0), transform * Point::new(1.0, 0.0));
        assert_point_eq(Point::new(1.0, 1.0), transform * Point::new(1.0, 1.0));
    }

    #[test]
    fn test_pixels_to_unit_flipped() {
        let size = Size::<LayerPixelSpace>::new(100.0, 200.0);
        let transform = Transform2D::<TextureSpace, LayerPixelSpace>::pixels_to_unit_flipped(size);

        assert_point_eq(Point::new(0.0, 0.0), transform * Point::new(0.0, 200.0));
        assert_point_eq(Point::new(0.0, 1.0), transform * Point::new(0.0, 0.0));
        assert_point_eq(Point::new(1.0, 0.0), transform * Point::new(100.0, 200.0));
        assert_point_eq(Point::new(1.0, 1.0), transform * Point::new(100.0, 0.0));
    }

    #[test]
    fn test_composition_order() {
        let size = Size::<ViewSpace>::new(100.0, 200.0);
        let to_pixels = Transform2D::<ViewSpace, ViewPortSpace>::ndc_to_pixels(size);
        let to_ndc = Transform2D::<ViewPortSpace, LayerSpace>::unit_to_ndc();

        let combined = to_pixels * to_ndc;
        let p = Point::<LayerSpace>::new(0.5, 0.5);
        assert_point_eq(combined * p, to_pixels * (to_ndc * p));
    }

    #[test]
    fn test_inverse_round_trip() {
        let transform = Transform2D::<LayerPixelSpace, ViewSpace>::translation(10.0, -5.0);
        let inverse = transform.inverse().unwrap();

        let p = Point::<ViewSpace>::new(42.0, 7.0);
        assert_point_eq(p, inverse * (transform * p));
    }
}

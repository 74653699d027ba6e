//! GPU-shared buffer layout
//!
//! The structs here are copied by value into GPU-addressable memory for the
//! duration of one draw call and read back never. Field order, size, and
//! alignment must match the WGSL struct blocks in `sumi_gpu::shaders`
//! bit-for-bit; that contract is enforced below with const assertions, at
//! build time, because a layout mismatch is an integration bug and not a
//! runtime condition.
//!
//! This is version 2 of the layout. Version 1 lacked `current_color` and
//! `pressure`; it is no longer constructible.

use bytemuck::{Pod, Zeroable};
use sumi_core::{Color, LayerPixelSpace, LayerSpace, TextureSpace, Transform2D, Vec3};

/// Layout schema version shared with the shaders.
pub const LAYOUT_VERSION: u32 = 2;

/// Per-draw-call GPU-visible state for one brush stroke render pass.
///
/// Memory layout (176 bytes, align 16):
/// - brush_color: `vec4<f32>`          (offset   0)
/// - current_color: `vec4<f32>`        (offset  16)
/// - brush_size: `f32` + 12 pad bytes  (offset  32)
/// - texture_projection: `mat4x4<f32>` (offset  48)
/// - layer_projection: `mat4x4<f32>`   (offset 112)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerContext {
    /// Original brush color
    pub brush_color: [f32; 4],
    /// Brush color mixed with the surrounding canvas color
    pub current_color: [f32; 4],
    /// Brush diameter in layer pixels
    pub brush_size: f32,
    pub _pad: [f32; 3],
    /// Layer-pixel coordinate -> texture coordinate
    pub texture_projection: [[f32; 4]; 4],
    /// Layer-pixel coordinate -> layer coordinate
    pub layer_projection: [[f32; 4]; 4],
}

impl LayerContext {
    /// Build a context from typed host state. `current_color` starts out
    /// equal to `brush_color` until the watercolor mixer updates it.
    pub fn new(
        brush_color: Color,
        brush_size: f32,
        texture_projection: Transform2D<TextureSpace, LayerPixelSpace>,
        layer_projection: Transform2D<LayerSpace, LayerPixelSpace>,
    ) -> Self {
        Self {
            brush_color: brush_color.to_array(),
            current_color: brush_color.to_array(),
            brush_size,
            _pad: [0.0; 3],
            texture_projection: texture_projection.matrix.cols,
            layer_projection: layer_projection.matrix.cols,
        }
    }

    pub fn texture_projection(&self) -> Transform2D<TextureSpace, LayerPixelSpace> {
        Transform2D::new(sumi_core::Mat4 {
            cols: self.texture_projection,
        })
    }

    pub fn layer_projection(&self) -> Transform2D<LayerSpace, LayerPixelSpace> {
        Transform2D::new(sumi_core::Mat4 {
            cols: self.layer_projection,
        })
    }
}

/// One sampled input point along a brush stroke, GPU-ready.
///
/// Memory layout (48 bytes, align 16):
/// - point: `vec3<f32>` + 4 pad bytes (offset  0)
/// - color: `vec4<f32>`               (offset 16)
/// - pressure: `f32` + 12 pad bytes   (offset 32)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Stroke {
    /// Position in layer-pixel space (z unused, kept for the vec3 layout)
    pub point: [f32; 3],
    pub _pad: f32,
    /// Sample color
    pub color: [f32; 4],
    /// Stylus pressure in [0, 1]
    pub pressure: f32,
    pub _pad2: [f32; 3],
}

impl Stroke {
    pub fn new(point: Vec3, color: [f32; 4], pressure: f32) -> Self {
        Self {
            point: point.to_array(),
            _pad: 0.0,
            color,
            pressure,
            _pad2: [0.0; 3],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.point[0], self.point[1], self.point[2])
    }
}

// Build-time layout contract with the WGSL sources.
const _: () = {
    use std::mem::{align_of, offset_of, size_of};

    assert!(size_of::<LayerContext>() == 176);
    assert!(align_of::<LayerContext>() == 4);
    assert!(offset_of!(LayerContext, brush_color) == 0);
    assert!(offset_of!(LayerContext, current_color) == 16);
    assert!(offset_of!(LayerContext, brush_size) == 32);
    assert!(offset_of!(LayerContext, texture_projection) == 48);
    assert!(offset_of!(LayerContext, layer_projection) == 112);

    assert!(size_of::<Stroke>() == 48);
    assert!(offset_of!(Stroke, point) == 0);
    assert!(offset_of!(Stroke, color) == 16);
    assert!(offset_of!(Stroke, pressure) == 32);
};

#[cfg(test)]
mod tests {
    use super::*;
    use sumi_core::Mat4;

    #[test]
    fn test_layer_context_round_trips_through_bytes() {
        let context = LayerContext::new(
            Color::rgba(0.1, 0.2, 0.3, 1.0),
            50.0,
            Transform2D::new(Mat4::scale(0.5, 0.25, 1.0)),
            Transform2D::new(Mat4::translation(1.0, 2.0, 0.0)),
        );

        let bytes = bytemuck::bytes_of(&context);
        assert_eq!(bytes.len(), 176);

        let restored: LayerContext = *bytemuck::from_bytes(bytes);
        assert_eq!(restored, context);
    }

    #[test]
    fn test_stroke_round_trips_without_field_drift() {
        let stroke = Stroke::new(Vec3::new(10.0, 20.0, 0.0), [0.0, 1.0, 0.0, 1.0], 0.8);

        let bytes = bytemuck::bytes_of(&stroke);
        assert_eq!(bytes.len(), 48);

        let restored: Stroke = *bytemuck::from_bytes(bytes);
        assert_eq!(restored.point, [10.0, 20.0, 0.0]);
        assert_eq!(restored.color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(restored.pressure, 0.8);
    }

    #[test]
    fn test_stroke_slice_is_densely_packed() {
        let strokes = [
            Stroke::new(Vec3::new(0.0, 0.0, 0.0), [1.0; 4], 1.0),
            Stroke::new(Vec3::new(1.0, 1.0, 0.0), [1.0; 4], 0.5),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&strokes);
        assert_eq!(bytes.len(), 96);

        // Second element's pressure sits at 48 + 32.
        let pressure = f32::from_le_bytes(bytes[80..84].try_into().unwrap());
        assert_eq!(pressure, 0.5);
    }

    #[test]
    fn test_new_context_starts_with_brush_color() {
        let context = LayerContext::new(
            Color::RED,
            32.0,
            Transform2D::identity(),
            Transform2D::identity(),
        );
        assert_eq!(context.brush_color, context.current_color);
        assert_eq!(context.brush_size, 32.0);
    }
}

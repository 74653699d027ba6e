//! CPU-side layer pixels and texture sampling
//!
//! `PixelBuffer` is the host rendition of the layer texture the fragment
//! shader samples. It exists for the watercolor mixer, for previews, and so
//! the lookup semantics of the shader have a testable counterpart.
//!
//! Sampling never fails: out-of-range coordinates are resolved by the
//! configured [`AddressMode`] (clamp-to-edge by default, matching the GPU
//! sampler the renderer creates) and every lookup returns a color.

use sumi_core::{color_mix, Color, Vec4};

use crate::layout::LayerContext;

/// Blend factor applied when a lookup mixes the brush color with the canvas
/// color underneath it. Exposed so hosts can see (and tests can pin) the
/// pickup behavior; the watercolor mixer takes its own configurable rate.
pub const PICKUP_RATE: f32 = 0.5;

/// How texture coordinates outside [0, 1] are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressMode {
    /// Clamp to the edge texel (default, matches the GPU sampler)
    #[default]
    ClampToEdge,
    /// Repeat the texture
    Repeat,
    /// Mirror on each repeat
    MirrorRepeat,
}

/// How a sample between texel centers is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    /// Bilinear filtering (default, matches the GPU sampler)
    #[default]
    Bilinear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerOptions {
    pub address_mode: AddressMode,
    pub filter_mode: FilterMode,
}

/// RGBA f32 pixel storage for one layer.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "pixel buffer must be non-empty");
        Self {
            width,
            height,
            texels: vec![[0.0; 4]; (width * height) as usize],
        }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let mut buffer = Self::new(width, height);
        buffer.texels.fill(color.to_array());
        buffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.texels[(y * self.width + x) as usize] = color.to_array();
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        Color::from_array(self.texels[(y * self.width + x) as usize])
    }

    /// Sample at normalized texture coordinates (u, v) in [0, 1].
    pub fn sample(&self, u: f32, v: f32, options: &SamplerOptions) -> Color {
        let u = resolve_coordinate(u, options.address_mode);
        let v = resolve_coordinate(v, options.address_mode);

        match options.filter_mode {
            FilterMode::Nearest => {
                let x = texel_index(u, self.width);
                let y = texel_index(v, self.height);
                self.get(x, y)
            }
            FilterMode::Bilinear => {
                // Texel centers sit at (i + 0.5) / extent.
                let fx = (u * self.width as f32 - 0.5).max(0.0);
                let fy = (v * self.height as f32 - 0.5).max(0.0);
                let x0 = fx.floor() as u32;
                let y0 = fy.floor() as u32;
                let tx = fx - fx.floor();
                let ty = fy - fy.floor();

                let top = color_mix(self.get(x0, y0), self.get(x0 + 1, y0), tx);
                let bottom = color_mix(self.get(x0, y0 + 1), self.get(x0 + 1, y0 + 1), tx);
                color_mix(top, bottom, ty)
            }
        }
    }
}

fn resolve_coordinate(c: f32, mode: AddressMode) -> f32 {
    match mode {
        AddressMode::ClampToEdge => c.clamp(0.0, 1.0),
        AddressMode::Repeat => c.rem_euclid(1.0),
        AddressMode::MirrorRepeat => {
            let period = c.rem_euclid(2.0);
            if period <= 1.0 {
                period
            } else {
                2.0 - period
            }
        }
    }
}

fn texel_index(c: f32, extent: u32) -> u32 {
    ((c * extent as f32) as u32).min(extent - 1)
}

/// Host implementation of the shader's layer color lookup.
///
/// Transforms `point` from layer-pixel space into texture space with the
/// context's texture projection, samples the layer underneath, and blends
/// the brush color toward the sampled canvas color by [`PICKUP_RATE`].
pub fn layer_get_color(
    context: &LayerContext,
    texture: &PixelBuffer,
    point: Vec4,
    options: &SamplerOptions,
) -> Color {
    let tex = context.texture_projection().matrix.mul_vec4(point);
    let sampled = texture.sample(tex.x, tex.y, options);
    color_mix(Color::from_array(context.brush_color), sampled, PICKUP_RATE)
}

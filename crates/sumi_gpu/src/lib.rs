//! Sumi GPU Renderer
//!
//! Brush stroke rendering using wgpu.
//!
//! # Features
//!
//! - **Bezier expansion**: compute-shader interpolation of input windows
//! - **Watercolor mixing**: running brush/canvas color mix kept on-device
//! - **Stroke rasterization**: pressure-scaled point sprites with a soft
//!   circular mask
//! - **Layer textures**: offscreen Rgba layers uploadable from host pixels
//!
//! The GPU structs bound by these pipelines are defined in `sumi_brush`;
//! both sides of the layout contract are asserted at build time.

pub mod buffer;
pub mod renderer;
pub mod shaders;

pub use buffer::DynamicBuffer;
pub use renderer::{GpuContext, LayerTexture, RendererError, StrokeRenderer};
pub use shaders::{BEZIER_SHADER, BRUSH_SHADER, WATERCOLOR_SHADER};

//! Sumi brush model
//!
//! The host half of the brush pipeline:
//!
//! - [`layout`]: the GPU-shared `LayerContext` / `Stroke` structs, with
//!   their byte layout const-asserted against the WGSL sources
//! - [`stroke`]: captured pointer/stylus input samples
//! - [`bezier`]: expansion of input windows into stroke sample runs
//! - [`watercolor`]: the running brush/canvas color mix
//! - [`pixels`]: CPU layer pixels and the host `layer_get_color` lookup
//! - [`brush`]: the session lifecycle tying the above together
//!
//! Everything here is plain value types; the GPU side lives in `sumi_gpu`.

pub mod bezier;
pub mod brush;
pub mod layout;
pub mod pixels;
pub mod stroke;
pub mod watercolor;

pub use bezier::BezierInterpolator;
pub use brush::{Brush, BrushOptions};
pub use layout::{LayerContext, Stroke, LAYOUT_VERSION};
pub use pixels::{layer_get_color, AddressMode, FilterMode, PixelBuffer, SamplerOptions};
pub use stroke::PressurePoint;
pub use watercolor::{WaterColorMixer, DEFAULT_PICKUP_RATE};

//! Sumi core types
//!
//! Foundation types for the Sumi brush engine:
//!
//! - **Math**: `Vec2`/`Vec3`/`Vec4`/`Mat4`, `#[repr(C)]` and `Pod`, laid out
//!   to match their WGSL counterparts so one definition serves host and GPU
//! - **Color**: linear RGBA color and the `color_mix` blend primitive
//! - **Spaces**: phantom-typed coordinate spaces and `Transform2D` so
//!   projections between layer, texture, and view space cannot be confused
//! - **Ring buffer**: the sliding input window used for stroke interpolation

pub mod color;
pub mod math;
pub mod ring_buffer;
pub mod space;

pub use color::{color_mix, Color, Mix};
pub use math::{Mat4, Vec2, Vec3, Vec4};
pub use ring_buffer::RingBuffer;
pub use space::{
    CoordinateSpace, LayerPixelSpace, LayerSpace, Point, Size, TextureSpace, Transform2D,
    ViewPortSpace, ViewSpace,
};

//! Brush session lifecycle
//!
//! A gesture begins on the first captured point and ends with `commit`.
//! Points accumulate in a four-slot ring window; every time the window
//! fills, the Bezier interpolator expands it into a stroke batch, the
//! watercolor mixer folds the batch into the current color, and the batch
//! is handed to the caller for rendering.

use smallvec::SmallVec;
use sumi_core::{Color, LayerPixelSpace, LayerSpace, RingBuffer, TextureSpace, Transform2D, ViewSpace};

use crate::bezier::BezierInterpolator;
use crate::layout::{LayerContext, Stroke};
use crate::pixels::PixelBuffer;
use crate::stroke::PressurePoint;
use crate::watercolor::{WaterColorMixer, DEFAULT_PICKUP_RATE};

/// Control points per interpolation window.
const WINDOW: usize = 4;

#[derive(Clone, Copy, Debug)]
pub struct BrushOptions {
    /// Brush diameter in layer pixels.
    pub size: f32,
    /// Fraction of canvas color picked up per batch at full pressure.
    pub pickup_rate: f32,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            size: 50.0,
            pickup_rate: DEFAULT_PICKUP_RATE,
        }
    }
}

struct Session {
    interpolator: BezierInterpolator,
    mixer: WaterColorMixer,
}

/// One brush tool: owns the layer context and the in-progress gesture.
pub struct Brush {
    context: LayerContext,
    options: BrushOptions,
    view_transform: Transform2D<LayerPixelSpace, ViewSpace>,
    window: RingBuffer<PressurePoint>,
    session: Option<Session>,
}

impl Brush {
    pub fn new(
        color: Color,
        options: BrushOptions,
        texture_projection: Transform2D<TextureSpace, LayerPixelSpace>,
        layer_projection: Transform2D<LayerSpace, LayerPixelSpace>,
        view_transform: Transform2D<LayerPixelSpace, ViewSpace>,
    ) -> Self {
        Self {
            context: LayerContext::new(color, options.size, texture_projection, layer_projection),
            options,
            view_transform,
            window: RingBuffer::new(WINDOW),
            session: None,
        }
    }

    pub fn color(&self) -> Color {
        Color::from_array(self.context.brush_color)
    }

    pub fn set_color(&mut self, color: Color) {
        tracing::info!(
            r = color.r,
            g = color.g,
            b = color.b,
            a = color.a,
            "brush color changed"
        );
        self.context.brush_color = color.to_array();
    }

    pub fn size(&self) -> f32 {
        self.context.brush_size
    }

    pub fn set_size(&mut self, size: f32) {
        self.context.brush_size = size;
    }

    /// Snapshot of the GPU-visible context for the next draw call.
    pub fn context(&self) -> LayerContext {
        self.context
    }

    /// Feed one captured input point.
    ///
    /// Returns the stroke batch ready for rendering, empty while the window
    /// is still filling.
    pub fn add(&mut self, point: PressurePoint, layer: &PixelBuffer) -> SmallVec<[Stroke; 16]> {
        tracing::trace!(x = point.x, y = point.y, pressure = point.pressure, "add");
        self.window.push(point);

        if self.session.is_none() {
            tracing::debug!("brush session starts");
            self.session = Some(Session {
                interpolator: BezierInterpolator::new(self.view_transform),
                mixer: WaterColorMixer::new(&self.context, self.options.pickup_rate),
            });
        }

        if self.window.len() == WINDOW {
            self.drain_window(layer)
        } else {
            tracing::trace!(stored = self.window.len(), "skip rendering, window not full");
            SmallVec::new()
        }
    }

    /// End the gesture: flush whatever the window holds and drop the session.
    pub fn commit(&mut self, layer: &PixelBuffer) -> SmallVec<[Stroke; 16]> {
        tracing::debug!("brush session ends");
        let strokes = if self.session.is_some() && !self.window.is_empty() {
            self.drain_window(layer)
        } else {
            SmallVec::new()
        };
        self.session = None;
        self.window.clear();
        strokes
    }

    fn drain_window(&mut self, layer: &PixelBuffer) -> SmallVec<[Stroke; 16]> {
        let fallback = *self.window.last().unwrap_or(&PressurePoint::ZERO);
        let input0 = *self.window.get(0).unwrap_or(&fallback);
        let input1 = *self.window.get(1).unwrap_or(&fallback);
        let input2 = *self.window.get(2).unwrap_or(&fallback);
        let input3 = *self.window.get(3).unwrap_or(&fallback);

        let Some(session) = self.session.as_mut() else {
            return SmallVec::new();
        };
        let strokes = session.interpolator.interpolate(
            input0,
            input1,
            input2,
            input3,
            self.context.brush_color,
        );
        session.mixer.mix(&strokes, &mut self.context, layer);

        // Keep the newest point so consecutive windows join up.
        self.window.clear();
        self.window.push(input3);

        strokes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_brush() -> Brush {
        Brush::new(
            Color::BLACK,
            BrushOptions::default(),
            Transform2D::scale(0.01, 0.01),
            Transform2D::identity(),
            Transform2D::identity(),
        )
    }

    fn layer() -> PixelBuffer {
        PixelBuffer::filled(4, 4, Color::WHITE)
    }

    #[test]
    fn test_no_output_until_window_fills() {
        let mut brush = test_brush();
        let layer = layer();

        for i in 0..3 {
            let batch = brush.add(PressurePoint::new(i as f32, 0.0, 1.0), &layer);
            assert!(batch.is_empty());
        }

        let batch = brush.add(PressurePoint::new(3.0, 0.0, 1.0), &layer);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_windows_join_at_last_point() {
        let mut brush = test_brush();
        let layer = layer();

        for i in 0..4 {
            brush.add(PressurePoint::new(i as f32 * 10.0, 0.0, 1.0), &layer);
        }
        // Window kept (30, 0); three more points fill it again.
        for i in 4..7 {
            let batch = brush.add(PressurePoint::new(i as f32 * 10.0, 0.0, 1.0), &layer);
            if i < 6 {
                assert!(batch.is_empty());
            } else {
                // Next batch starts where the previous one ended.
                assert_eq!(batch.first().unwrap().point[0], 30.0);
            }
        }
    }

    #[test]
    fn test_commit_flushes_partial_window() {
        let mut brush = test_brush();
        let layer = layer();

        brush.add(PressurePoint::new(1.0, 2.0, 1.0), &layer);
        brush.add(PressurePoint::new(3.0, 4.0, 1.0), &layer);

        let batch = brush.commit(&layer);
        assert!(!batch.is_empty());

        // Session is gone; the next gesture starts fresh.
        let batch = brush.add(PressurePoint::new(0.0, 0.0, 1.0), &layer);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_commit_without_gesture_is_empty() {
        let mut brush = test_brush();
        let batch = brush.commit(&layer());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_mixing_updates_context_current_color() {
        let mut brush = test_brush();
        let layer = PixelBuffer::filled(4, 4, Color::WHITE);

        for i in 0..4 {
            brush.add(PressurePoint::new(i as f32, 0.0, 1.0), &layer);
        }

        // Black brush on a white canvas drifts toward white.
        let current = Color::from_array(brush.context().current_color);
        assert!(current.r > 0.0);
        assert_eq!(brush.color(), Color::BLACK);
    }
}

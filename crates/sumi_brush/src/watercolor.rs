//! Watercolor color mixing
//!
//! Maintains the context's `current_color`: the brush color as it picks up
//! paint already on the canvas. On session start the current color is
//! initialized from the layer under the first sample; after that every
//! batch nudges it toward the canvas color under the newest sample, scaled
//! by pressure. Harder presses pick up more paint.

use sumi_core::{color_mix, Color, Vec4};

use crate::layout::{LayerContext, Stroke};
use crate::pixels::{layer_get_color, PixelBuffer, SamplerOptions};

/// Fraction of canvas color absorbed per batch at full pressure.
pub const DEFAULT_PICKUP_RATE: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct WaterColorMixer {
    current: Color,
    pickup_rate: f32,
    sampler: SamplerOptions,
    initialized: bool,
}

impl WaterColorMixer {
    pub fn new(context: &LayerContext, pickup_rate: f32) -> Self {
        Self {
            current: Color::from_array(context.brush_color),
            pickup_rate: pickup_rate.clamp(0.0, 1.0),
            sampler: SamplerOptions::default(),
            initialized: false,
        }
    }

    pub fn with_sampler(mut self, sampler: SamplerOptions) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn current_color(&self) -> Color {
        self.current
    }

    /// Fold a stroke batch into the running color and write the result into
    /// the context the GPU will see.
    pub fn mix(&mut self, strokes: &[Stroke], context: &mut LayerContext, layer: &PixelBuffer) {
        let Some(first) = strokes.first() else {
            return;
        };

        if !self.initialized {
            self.current = layer_get_color(context, layer, sample_point(first), &self.sampler);
            self.initialized = true;
            tracing::trace!(
                r = self.current.r,
                g = self.current.g,
                b = self.current.b,
                a = self.current.a,
                "watercolor initialized"
            );
        } else if let Some(last) = strokes.last() {
            let canvas = layer.sample_under(last, context, &self.sampler);
            let t = self.pickup_rate * last.pressure;
            self.current = color_mix(self.current, canvas, t);
            tracing::trace!(
                r = self.current.r,
                g = self.current.g,
                b = self.current.b,
                a = self.current.a,
                "watercolor mixed"
            );
        }

        context.current_color = self.current.to_array();
    }
}

impl PixelBuffer {
    /// Canvas color under a stroke sample, via the context's texture
    /// projection.
    fn sample_under(
        &self,
        stroke: &Stroke,
        context: &LayerContext,
        options: &SamplerOptions,
    ) -> Color {
        let tex = context
            .texture_projection()
            .matrix
            .mul_vec4(sample_point(stroke));
        self.sample(tex.x, tex.y, options)
    }
}

fn sample_point(stroke: &Stroke) -> Vec4 {
    Vec4::position(stroke.point[0], stroke.point[1], 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumi_core::{Mat4, Transform2D, Vec3};

    fn test_context() -> LayerContext {
        // 100x100 layer; texture projection divides by layer size.
        LayerContext::new(
            Color::RED,
            50.0,
            Transform2D::new(Mat4::scale(0.01, 0.01, 1.0)),
            Transform2D::identity(),
        )
    }

    fn stroke_at(x: f32, y: f32, pressure: f32) -> Stroke {
        Stroke::new(Vec3::new(x, y, 0.0), [0.0; 4], pressure)
    }

    #[test]
    fn test_empty_batch_is_ignored() {
        let mut context = test_context();
        let layer = PixelBuffer::filled(4, 4, Color::BLUE);
        let mut mixer = WaterColorMixer::new(&context, DEFAULT_PICKUP_RATE);

        mixer.mix(&[], &mut context, &layer);
        assert_eq!(context.current_color, Color::RED.to_array());
    }

    #[test]
    fn test_first_batch_initializes_from_canvas() {
        let mut context = test_context();
        let layer = PixelBuffer::filled(4, 4, Color::BLUE);
        let mut mixer = WaterColorMixer::new(&context, DEFAULT_PICKUP_RATE);

        mixer.mix(&[stroke_at(50.0, 50.0, 1.0)], &mut context, &layer);

        // layer_get_color blends brush red toward canvas blue by PICKUP_RATE.
        assert_eq!(context.current_color, [0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_later_batches_pick_up_canvas_color() {
        let mut context = test_context();
        let layer = PixelBuffer::filled(4, 4, Color::BLUE);
        let mut mixer = WaterColorMixer::new(&context, DEFAULT_PICKUP_RATE);

        mixer.mix(&[stroke_at(50.0, 50.0, 1.0)], &mut context, &layer);
        let after_init = Color::from_array(context.current_color);

        mixer.mix(&[stroke_at(52.0, 50.0, 1.0)], &mut context, &layer);
        let after_mix = Color::from_array(context.current_color);

        // Moves toward blue, away from red.
        assert!(after_mix.b > after_init.b);
        assert!(after_mix.r < after_init.r);
    }

    #[test]
    fn test_zero_pressure_picks_up_nothing() {
        let mut context = test_context();
        let layer = PixelBuffer::filled(4, 4, Color::BLUE);
        let mut mixer = WaterColorMixer::new(&context, DEFAULT_PICKUP_RATE);

        mixer.mix(&[stroke_at(50.0, 50.0, 1.0)], &mut context, &layer);
        let before = context.current_color;

        mixer.mix(&[stroke_at(52.0, 50.0, 0.0)], &mut context, &layer);
        assert_eq!(context.current_color, before);
    }
}

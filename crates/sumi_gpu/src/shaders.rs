//! GPU shaders for brush stroke rendering
//!
//! These shaders cover the three stages of the stroke pipeline:
//! - Cubic Bezier expansion of input windows into stroke samples
//! - Watercolor mixing of the running brush color against the canvas
//! - Point-sprite rasterization of stroke samples onto the layer
//!
//! The `LayerContext` and `Stroke` struct blocks must match the host structs
//! in `sumi_brush::layout` byte for byte; the host side const-asserts the
//! offsets documented there.

/// Brush stroke render shader
///
/// Draws one quad per stroke sample, expanded in the vertex stage to the
/// brush diameter scaled by pressure, and masked to a soft circle in the
/// fragment stage. The fill color is the mixed `current_color`, picking up
/// canvas paint under the sample via `layer_get_color`.
pub const BRUSH_SHADER: &str = r#"
// ============================================================================
// Sumi Brush Stroke Shader
// ============================================================================

// Fraction of canvas color folded into the brush color on lookup.
const PICKUP_RATE: f32 = 0.5;

struct LayerContext {
    brush_color: vec4<f32>,
    current_color: vec4<f32>,
    brush_size: f32,
    texture_projection: mat4x4<f32>,
    layer_projection: mat4x4<f32>,
}

struct Stroke {
    point: vec3<f32>,
    color: vec4<f32>,
    pressure: f32,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) @interpolate(flat) instance_index: u32,
}

@group(0) @binding(0) var<uniform> context: LayerContext;
@group(0) @binding(1) var<storage, read> strokes: array<Stroke>;
@group(0) @binding(2) var layer_texture: texture_2d<f32>;
@group(0) @binding(3) var layer_sampler: sampler;

// Interpolate from base toward additional; t = 0 keeps base, t = 1 lands
// on additional.
fn color_mix(base: vec4<f32>, additional: vec4<f32>, t: f32) -> vec4<f32> {
    return base + (additional - base) * t;
}

// Brush color blended with the canvas color under a layer-pixel point.
fn layer_get_color(point: vec4<f32>) -> vec4<f32> {
    let tex = context.texture_projection * point;
    let canvas = textureSampleLevel(layer_texture, layer_sampler, tex.xy, 0.0);
    return color_mix(context.brush_color, canvas, PICKUP_RATE);
}

// ============================================================================
// Vertex Shader
// ============================================================================

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    var out: VertexOutput;

    let stroke = strokes[instance_index];

    // Quad corners in [-1, 1], two triangles.
    let quad_verts = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    let corner = quad_verts[vertex_index];

    let radius = context.brush_size * 0.5 * stroke.pressure;
    let center = vec4<f32>(stroke.point.xy, 0.0, 1.0);
    let offset = vec4<f32>(corner * radius, 0.0, 0.0);

    out.position = context.layer_projection * (center + offset);
    out.uv = corner;
    out.instance_index = instance_index;
    return out;
}

// ============================================================================
// Fragment Shader
// ============================================================================

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let stroke = strokes[in.instance_index];

    // Soft circular falloff toward the quad edge.
    let dist = length(in.uv);
    let mask = 1.0 - smoothstep(0.8, 1.0, dist);
    if (mask <= 0.0) {
        discard;
    }

    let color = context.current_color;
    return vec4<f32>(color.rgb, color.a * mask * stroke.pressure);
}
"#;

/// Bezier interpolation compute shader
///
/// Expands one four-point input window into `count` stroke samples by
/// de Casteljau evaluation, one sample per invocation. The host mirror of
/// `InterpolateParams` lives in `renderer.rs`.
pub const BEZIER_SHADER: &str = r#"
// ============================================================================
// Sumi Bezier Interpolation Shader
// ============================================================================

struct Stroke {
    point: vec3<f32>,
    color: vec4<f32>,
    pressure: f32,
}

// Control points carry x/y in layer-pixel space and pressure in z.
struct InterpolateParams {
    p0: vec4<f32>,
    p1: vec4<f32>,
    p2: vec4<f32>,
    p3: vec4<f32>,
    color: vec4<f32>,
    delta: f32,
    count: u32,
}

@group(0) @binding(0) var<uniform> params: InterpolateParams;
@group(0) @binding(1) var<storage, read_write> strokes: array<Stroke>;

fn cubic_bezier(t: f32) -> vec3<f32> {
    let a = mix(params.p0.xyz, params.p1.xyz, t);
    let b = mix(params.p1.xyz, params.p2.xyz, t);
    let c = mix(params.p2.xyz, params.p3.xyz, t);
    let d = mix(a, b, t);
    let e = mix(b, c, t);
    return mix(d, e, t);
}

@compute @workgroup_size(64)
fn cs_main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if (i >= params.count) {
        return;
    }

    let t = f32(i) * params.delta;
    let sample = cubic_bezier(t);

    var stroke: Stroke;
    stroke.point = vec3<f32>(sample.xy, 0.0);
    stroke.color = params.color;
    stroke.pressure = clamp(sample.z, 0.0, 1.0);
    strokes[i] = stroke;
}
"#;

/// Watercolor mixing compute shader
///
/// Single-invocation passes that maintain the running brush color in a
/// storage cell:
/// - `init_current_color` seeds it from the canvas under the first sample
/// - `mix_current_color` folds in the canvas under the newest sample,
///   scaled by pickup rate and pressure
pub const WATERCOLOR_SHADER: &str = r#"
// ============================================================================
// Sumi Watercolor Mixing Shader
// ============================================================================

const PICKUP_RATE: f32 = 0.5;

struct LayerContext {
    brush_color: vec4<f32>,
    current_color: vec4<f32>,
    brush_size: f32,
    texture_projection: mat4x4<f32>,
    layer_projection: mat4x4<f32>,
}

struct Stroke {
    point: vec3<f32>,
    color: vec4<f32>,
    pressure: f32,
}

struct MixParams {
    pickup_rate: f32,
    count: u32,
}

struct CurrentColor {
    value: vec4<f32>,
}

@group(0) @binding(0) var<uniform> context: LayerContext;
@group(0) @binding(1) var<uniform> params: MixParams;
@group(0) @binding(2) var<storage, read> strokes: array<Stroke>;
@group(0) @binding(3) var<storage, read_write> current: CurrentColor;
@group(0) @binding(4) var layer_texture: texture_2d<f32>;
@group(0) @binding(5) var layer_sampler: sampler;

fn color_mix(base: vec4<f32>, additional: vec4<f32>, t: f32) -> vec4<f32> {
    return base + (additional - base) * t;
}

fn sample_canvas(point: vec3<f32>) -> vec4<f32> {
    let tex = context.texture_projection * vec4<f32>(point.xy, 0.0, 1.0);
    return textureSampleLevel(layer_texture, layer_sampler, tex.xy, 0.0);
}

@compute @workgroup_size(1)
fn init_current_color() {
    if (params.count == 0u) {
        return;
    }
    let canvas = sample_canvas(strokes[0].point);
    current.value = color_mix(context.brush_color, canvas, PICKUP_RATE);
}

@compute @workgroup_size(1)
fn mix_current_color() {
    if (params.count == 0u) {
        return;
    }
    let last = strokes[params.count - 1u];
    let canvas = sample_canvas(last.point);
    let t = params.pickup_rate * last.pressure;
    current.value = color_mix(current.value, canvas, t);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_shader_declares_both_entry_points() {
        assert!(BRUSH_SHADER.contains("fn vs_main"));
        assert!(BRUSH_SHADER.contains("fn fs_main"));
        assert!(BRUSH_SHADER.contains("fn layer_get_color"));
    }

    #[test]
    fn test_compute_shaders_guard_out_of_range_invocations() {
        assert!(BEZIER_SHADER.contains("if (i >= params.count)"));
        assert!(WATERCOLOR_SHADER.contains("if (params.count == 0u)"));
    }

    #[test]
    fn test_shared_struct_blocks_agree() {
        // The same Stroke block appears in all three sources.
        let block = "struct Stroke {\n    point: vec3<f32>,\n    color: vec4<f32>,\n    pressure: f32,\n}";
        assert!(BRUSH_SHADER.contains(block));
        assert!(BEZIER_SHADER.contains(block));
        assert!(WATERCOLOR_SHADER.contains(block));
    }
}

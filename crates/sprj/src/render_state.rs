//! Fixed-function render state
//!
//! `RenderState` is the payload of render-state pipeline items. Its document
//! form is a flat list of child elements, each omitted when equal to the
//! default, described once by the field table at the bottom of this module.

use crate::fields::{Field, FieldTable, named_enum, parse_bool, parse_f32, parse_u32};
use serde::Serialize;

named_enum! {
    /// Rasterization fill mode
    #[derive(Default)]
    pub enum PolygonMode {
        #[default]
        Fill => "Fill",
        Line => "Line",
    }
}

named_enum! {
    /// Which face is culled when culling is enabled
    #[derive(Default)]
    pub enum Face {
        Front => "Front",
        #[default]
        Back => "Back",
    }
}

named_enum! {
    /// Winding order of front-facing triangles
    #[derive(Default)]
    pub enum FrontFace {
        #[default]
        CounterClockwise => "CCW",
        Clockwise => "CW",
    }
}

named_enum! {
    /// Legacy cull-mode names used by old rasterizer items
    pub enum CullMode {
        None => "None",
        Front => "Front",
        Back => "Back",
    }
}

impl CullMode {
    /// Looks up a cull mode, treating unknown names as `Back`
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::Back)
    }
}

named_enum! {
    /// Blend source/destination factor
    pub enum BlendFactor {
        Zero => "Zero",
        One => "One",
        SrcColor => "SrcColor",
        InvSrcColor => "InvSrcColor",
        SrcAlpha => "SrcAlpha",
        InvSrcAlpha => "InvSrcAlpha",
        DestAlpha => "DestAlpha",
        InvDestAlpha => "InvDestAlpha",
        DestColor => "DestColor",
        InvDestColor => "InvDestColor",
        SrcAlphaSat => "SrcAlphaSat",
        BlendFactor => "BlendFactor",
        InvBlendFactor => "InvBlendFactor",
        Src1Color => "Src1Color",
        InvSrc1Color => "InvSrc1Color",
        Src1Alpha => "Src1Alpha",
        InvSrc1Alpha => "InvSrc1Alpha",
    }
}

impl BlendFactor {
    /// Looks up a factor, treating unknown names as the constant blend color
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::BlendFactor)
    }
}

named_enum! {
    /// How blended source and destination are combined
    #[derive(Default)]
    pub enum BlendOp {
        #[default]
        Add => "Add",
        Subtract => "Subtract",
        RevSubtract => "RevSubtract",
        Min => "Min",
        Max => "Max",
    }
}

impl BlendOp {
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

named_enum! {
    /// Depth and stencil comparison function
    pub enum CompareFunction {
        Never => "Never",
        Less => "Less",
        Equal => "Equal",
        LessEqual => "LessEqual",
        Greater => "Greater",
        NotEqual => "NotEqual",
        GreaterEqual => "GreaterEqual",
        Always => "Always",
    }
}

impl CompareFunction {
    /// Looks up a comparison, treating unknown names as "always passes"
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::Always)
    }
}

named_enum! {
    /// Stencil buffer update operation
    #[derive(Default)]
    pub enum StencilOp {
        #[default]
        Keep => "Keep",
        Zero => "Zero",
        Replace => "Replace",
        IncrSat => "IncrSat",
        DecrSat => "DecrSat",
        Invert => "Invert",
        Incr => "Incr",
        Decr => "Decr",
    }
}

impl StencilOp {
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

/// Stencil configuration for one face orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StencilFace {
    pub function: CompareFunction,
    pub pass: StencilOp,
    pub stencil_fail: StencilOp,
    pub depth_fail: StencilOp,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            function: CompareFunction::Equal,
            pass: StencilOp::Keep,
            stencil_fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
        }
    }
}

/// Full fixed-function pipeline state
///
/// Defaults: filled polygons, back-face culling with counter-clockwise front
/// faces, blending/depth/stencil tests disabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub polygon_mode: PolygonMode,
    pub cull: bool,
    pub cull_face: Face,
    pub front_face: FrontFace,

    pub blend: bool,
    pub alpha_to_coverage: bool,
    pub color_src_factor: BlendFactor,
    pub color_dst_factor: BlendFactor,
    pub color_op: BlendOp,
    pub alpha_src_factor: BlendFactor,
    pub alpha_dst_factor: BlendFactor,
    pub alpha_op: BlendOp,
    /// Constant blend color (r, g, b, a)
    pub blend_constant: [f32; 4],

    pub depth_test: bool,
    pub depth_clamp: bool,
    pub depth_mask: bool,
    pub depth_function: CompareFunction,
    pub depth_bias: f32,

    pub stencil_test: bool,
    pub stencil_mask: u8,
    pub stencil_reference: u8,
    pub stencil_front: StencilFace,
    pub stencil_back: StencilFace,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            cull: true,
            cull_face: Face::Back,
            front_face: FrontFace::CounterClockwise,
            blend: false,
            alpha_to_coverage: false,
            color_src_factor: BlendFactor::SrcAlpha,
            color_dst_factor: BlendFactor::InvSrcAlpha,
            color_op: BlendOp::Add,
            alpha_src_factor: BlendFactor::SrcAlpha,
            alpha_dst_factor: BlendFactor::InvSrcAlpha,
            alpha_op: BlendOp::Add,
            blend_constant: [0.0; 4],
            depth_test: false,
            depth_clamp: true,
            depth_mask: true,
            depth_function: CompareFunction::Less,
            depth_bias: 0.0,
            stencil_test: false,
            stencil_mask: 0,
            stencil_reference: 0,
            stencil_front: StencilFace::default(),
            stencil_back: StencilFace::default(),
        }
    }
}

fn parse_u8(text: &str) -> u8 {
    parse_u32(text).min(u8::MAX as u32) as u8
}

static RENDER_STATE_FIELDS: [Field<RenderState>; 32] = [
    // rasterizer
    Field { name: "wireframe", get: |s| (s.polygon_mode == PolygonMode::Line).to_string(), set: |s, t| s.polygon_mode = if parse_bool(t) { PolygonMode::Line } else { PolygonMode::Fill } },
    Field { name: "cull", get: |s| s.cull.to_string(), set: |s, t| s.cull = parse_bool(t) },
    Field { name: "cullfront", get: |s| (s.cull_face == Face::Front).to_string(), set: |s, t| s.cull_face = if parse_bool(t) { Face::Front } else { Face::Back } },
    Field { name: "ccw", get: |s| (s.front_face == FrontFace::CounterClockwise).to_string(), set: |s, t| s.front_face = if parse_bool(t) { FrontFace::CounterClockwise } else { FrontFace::Clockwise } },
    // blend
    Field { name: "blend", get: |s| s.blend.to_string(), set: |s, t| s.blend = parse_bool(t) },
    Field { name: "alpha2coverage", get: |s| s.alpha_to_coverage.to_string(), set: |s, t| s.alpha_to_coverage = parse_bool(t) },
    Field { name: "colorsrcfactor", get: |s| s.color_src_factor.to_string(), set: |s, t| s.color_src_factor = BlendFactor::from_name_or_default(t.trim()) },
    Field { name: "colordstfactor", get: |s| s.color_dst_factor.to_string(), set: |s, t| s.color_dst_factor = BlendFactor::from_name_or_default(t.trim()) },
    Field { name: "colorfunc", get: |s| s.color_op.to_string(), set: |s, t| s.color_op = BlendOp::from_name_or_default(t.trim()) },
    Field { name: "alphasrcfactor", get: |s| s.alpha_src_factor.to_string(), set: |s, t| s.alpha_src_factor = BlendFactor::from_name_or_default(t.trim()) },
    Field { name: "alphadstfactor", get: |s| s.alpha_dst_factor.to_string(), set: |s, t| s.alpha_dst_factor = BlendFactor::from_name_or_default(t.trim()) },
    Field { name: "alphafunc", get: |s| s.alpha_op.to_string(), set: |s, t| s.alpha_op = BlendOp::from_name_or_default(t.trim()) },
    Field { name: "blendfactor_r", get: |s| s.blend_constant[0].to_string(), set: |s, t| s.blend_constant[0] = parse_f32(t) },
    Field { name: "blendfactor_g", get: |s| s.blend_constant[1].to_string(), set: |s, t| s.blend_constant[1] = parse_f32(t) },
    Field { name: "blendfactor_b", get: |s| s.blend_constant[2].to_string(), set: |s, t| s.blend_constant[2] = parse_f32(t) },
    Field { name: "blendfactor_a", get: |s| s.blend_constant[3].to_string(), set: |s, t| s.blend_constant[3] = parse_f32(t) },
    // depth
    Field { name: "depthtest", get: |s| s.depth_test.to_string(), set: |s, t| s.depth_test = parse_bool(t) },
    Field { name: "depthclamp", get: |s| s.depth_clamp.to_string(), set: |s, t| s.depth_clamp = parse_bool(t) },
    Field { name: "depthmask", get: |s| s.depth_mask.to_string(), set: |s, t| s.depth_mask = parse_bool(t) },
    Field { name: "depthfunc", get: |s| s.depth_function.to_string(), set: |s, t| s.depth_function = CompareFunction::from_name_or_default(t.trim()) },
    Field { name: "depthbias", get: |s| s.depth_bias.to_string(), set: |s, t| s.depth_bias = parse_f32(t) },
    // stencil
    Field { name: "stenciltest", get: |s| s.stencil_test.to_string(), set: |s, t| s.stencil_test = parse_bool(t) },
    Field { name: "stencilmask", get: |s| s.stencil_mask.to_string(), set: |s, t| s.stencil_mask = parse_u8(t) },
    Field { name: "stencilref", get: |s| s.stencil_reference.to_string(), set: |s, t| s.stencil_reference = parse_u8(t) },
    Field { name: "stencilfrontfunc", get: |s| s.stencil_front.function.to_string(), set: |s, t| s.stencil_front.function = CompareFunction::from_name_or_default(t.trim()) },
    Field { name: "stencilbackfunc", get: |s| s.stencil_back.function.to_string(), set: |s, t| s.stencil_back.function = CompareFunction::from_name_or_default(t.trim()) },
    Field { name: "stencilfrontpass", get: |s| s.stencil_front.pass.to_string(), set: |s, t| s.stencil_front.pass = StencilOp::from_name_or_default(t.trim()) },
    Field { name: "stencilbackpass", get: |s| s.stencil_back.pass.to_string(), set: |s, t| s.stencil_back.pass = StencilOp::from_name_or_default(t.trim()) },
    Field { name: "stencilfrontfail", get: |s| s.stencil_front.stencil_fail.to_string(), set: |s, t| s.stencil_front.stencil_fail = StencilOp::from_name_or_default(t.trim()) },
    Field { name: "stencilbackfail", get: |s| s.stencil_back.stencil_fail.to_string(), set: |s, t| s.stencil_back.stencil_fail = StencilOp::from_name_or_default(t.trim()) },
    Field { name: "depthfrontfail", get: |s| s.stencil_front.depth_fail.to_string(), set: |s, t| s.stencil_front.depth_fail = StencilOp::from_name_or_default(t.trim()) },
    Field { name: "depthbackfail", get: |s| s.stencil_back.depth_fail.to_string(), set: |s, t| s.stencil_back.depth_fail = StencilOp::from_name_or_default(t.trim()) },
];

impl FieldTable for RenderState {
    fn fields() -> &'static [Field<Self>] {
        &RENDER_STATE_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = RenderState::default();
        assert!(state.cull);
        assert_eq!(state.cull_face, Face::Back);
        assert_eq!(state.front_face, FrontFace::CounterClockwise);
        assert!(!state.blend);
        assert!(!state.depth_test);
        assert!(!state.stencil_test);
        assert!(state.changed_fields().is_empty());
    }

    #[test]
    fn test_blend_only_emits_one_field() {
        let state = RenderState { blend: true, ..Default::default() };
        assert_eq!(state.changed_fields(), vec![("blend", "true".to_string())]);

        let mut reparsed = RenderState::default();
        for (name, value) in state.changed_fields() {
            assert!(reparsed.apply_field(name, &value));
        }
        assert_eq!(reparsed, state);
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let mut state = RenderState::default();
        state.apply_field("colorsrcfactor", "Bogus");
        state.apply_field("depthfunc", "Sometimes");
        state.apply_field("stencilfrontpass", "???");
        state.apply_field("colorfunc", "Multiply");
        assert_eq!(state.color_src_factor, BlendFactor::BlendFactor);
        assert_eq!(state.depth_function, CompareFunction::Always);
        assert_eq!(state.stencil_front.pass, StencilOp::Keep);
        assert_eq!(state.color_op, BlendOp::Add);
        assert_eq!(CullMode::from_name_or_default("Sideways"), CullMode::Back);
    }

    #[test]
    fn test_every_field_round_trips() {
        let state = RenderState {
            polygon_mode: PolygonMode::Line,
            cull: false,
            cull_face: Face::Front,
            front_face: FrontFace::Clockwise,
            blend: true,
            alpha_to_coverage: true,
            color_src_factor: BlendFactor::One,
            color_dst_factor: BlendFactor::Zero,
            color_op: BlendOp::Max,
            alpha_src_factor: BlendFactor::DestAlpha,
            alpha_dst_factor: BlendFactor::InvSrc1Alpha,
            alpha_op: BlendOp::RevSubtract,
            blend_constant: [0.25, 0.5, 0.75, 1.0],
            depth_test: true,
            depth_clamp: false,
            depth_mask: false,
            depth_function: CompareFunction::GreaterEqual,
            depth_bias: 0.125,
            stencil_test: true,
            stencil_mask: 0xFF,
            stencil_reference: 3,
            stencil_front: StencilFace { function: CompareFunction::NotEqual, pass: StencilOp::Replace, stencil_fail: StencilOp::Incr, depth_fail: StencilOp::Decr },
            stencil_back: StencilFace { function: CompareFunction::Never, pass: StencilOp::Invert, stencil_fail: StencilOp::Zero, depth_fail: StencilOp::IncrSat },
        };

        let mut reparsed = RenderState::default();
        for (name, value) in state.changed_fields() {
            reparsed.apply_field(name, &value);
        }
        assert_eq!(reparsed, state);
    }
}

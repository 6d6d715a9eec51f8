//! Version 1 layout
//!
//! The legacy layout declares variables per shader stage, stores shader paths
//! as child elements, splits render states into blend, depth/stencil and
//! rasterizer items, names the default target "Window" and encodes colors as
//! 0..255 integers. Everything is translated into the current model while
//! reading.

use super::{Reader, Schema, read_item_values, render_target_ref};
use crate::codec::values::read_variable;
use crate::codec::xml::{attr, child_text, elements, elements_named, section, text};
use crate::fields::{parse_bool, parse_f32, parse_u32};
use crate::model::{ItemKind, PipelineItem, ShaderPass, ShaderStage, ShaderStageKind};
use crate::paths::to_generic;
use crate::render_state::{BlendFactor, BlendOp, CompareFunction, CullMode, Face, FrontFace, PolygonMode, RenderState, StencilOp};
use xmltree::Element;

impl Reader<'_> {
    pub(crate) fn read_v1(&mut self, root: &Element) {
        tracing::debug!("Parsing a v1 project document");

        for node in section(root, "pipeline", "pass") {
            let pass = self.read_pass_v1(node);
            self.parsed.project.passes.push(pass);
        }

        self.read_objects(root, Schema::V1);
        self.read_settings(root, Schema::V1);
    }

    fn read_pass_v1(&mut self, node: &Element) -> ShaderPass {
        let mut pass = ShaderPass::new(attr(node, "name").unwrap_or_default());
        pass.collapsed = attr(node, "collapsed").is_some_and(parse_bool);

        for target in elements_named(node, "rendertexture") {
            pass.render_targets.push(render_target_ref(attr(target, "name"), Schema::V1));
        }

        for shader in elements_named(node, "shader") {
            let Some(kind) = attr(shader, "type").and_then(ShaderStageKind::from_short_name) else {
                tracing::warn!("Skipping shader of unknown type in pass '{}'", pass.name);
                continue;
            };

            let stage = ShaderStage {
                path: to_generic(&child_text(shader, "path").unwrap_or_default()),
                entry: child_text(shader, "entry").unwrap_or_default(),
            };
            if kind == ShaderStageKind::Geometry {
                pass.geometry_used = attr(shader, "used").is_some_and(parse_bool);
            }

            self.check_shader_file(&pass.name, kind, &stage.path);
            *pass.stage_mut(kind) = stage;

            // Stages share one store; a repeated name overwrites the earlier value in place
            for variable in section(shader, "variables", "variable") {
                pass.variables.merge(read_variable(variable, false));
            }
        }

        if let Some(items) = node.get_child("items") {
            for item in elements(items) {
                if let Some(item) = self.read_item_v1(&pass.name, item) {
                    pass.items.push(item);
                }
            }
        }

        read_item_values(&mut pass, node);
        pass
    }

    fn read_item_v1(&mut self, pass: &str, node: &Element) -> Option<PipelineItem> {
        let name = attr(node, "name").unwrap_or_default().to_string();
        let kind = match attr(node, "type").unwrap_or_default() {
            "geometry" => ItemKind::Geometry(self.read_geometry(node)),
            "blend" => ItemKind::RenderState(read_blend(node)),
            "depthstencil" => ItemKind::RenderState(read_depth_stencil(node)),
            "rasterizer" => ItemKind::RenderState(read_rasterizer(node)),
            "model" => ItemKind::Model(self.read_model(pass, &name, node)),
            other => {
                tracing::warn!("Skipping item '{name}' of unknown type '{other}' in pass '{pass}'");
                return None;
            }
        };
        Some(PipelineItem { name, kind })
    }
}

fn read_blend(node: &Element) -> RenderState {
    let mut state = RenderState { blend: true, blend_constant: [0.0; 4], ..Default::default() };

    for child in elements(node) {
        let value = text(child);
        match child.name.as_str() {
            "srcblend" => state.color_src_factor = BlendFactor::from_name_or_default(&value),
            "blendop" => state.color_op = BlendOp::from_name_or_default(&value),
            "destblend" => state.color_dst_factor = BlendFactor::from_name_or_default(&value),
            "srcblendalpha" => state.alpha_src_factor = BlendFactor::from_name_or_default(&value),
            "alphablendop" => state.alpha_op = BlendOp::from_name_or_default(&value),
            "destblendalpha" => state.alpha_dst_factor = BlendFactor::from_name_or_default(&value),
            "alpha2cov" => state.alpha_to_coverage = parse_bool(&value),
            "bf_red" => state.blend_constant[0] = parse_u32(&value) as f32,
            "bf_green" => state.blend_constant[1] = parse_u32(&value) as f32,
            "bf_blue" => state.blend_constant[2] = parse_u32(&value) as f32,
            "bf_alpha" => state.blend_constant[3] = parse_u32(&value) as f32,
            _ => {}
        }
    }
    state
}

/// Reads a depth/stencil item
///
/// A face's `fail` operation is stored as both its stencil-fail and its
/// depth-fail operation.
fn read_depth_stencil(node: &Element) -> RenderState {
    let mut state = RenderState { stencil_mask: 0xFF, ..Default::default() };

    for child in elements(node) {
        let value = text(child);
        match child.name.as_str() {
            "depthenable" => state.depth_test = parse_bool(&value),
            "depthfunc" => state.depth_function = CompareFunction::from_name_or_default(&value),
            "stencilenable" => state.stencil_test = parse_bool(&value),
            "frontfunc" => state.stencil_front.function = CompareFunction::from_name_or_default(&value),
            "frontpass" => state.stencil_front.pass = StencilOp::from_name_or_default(&value),
            "frontfail" => {
                let op = StencilOp::from_name_or_default(&value);
                state.stencil_front.stencil_fail = op;
                state.stencil_front.depth_fail = op;
            }
            "backfunc" => state.stencil_back.function = CompareFunction::from_name_or_default(&value),
            "backpass" => state.stencil_back.pass = StencilOp::from_name_or_default(&value),
            "backfail" => {
                let op = StencilOp::from_name_or_default(&value);
                state.stencil_back.stencil_fail = op;
                state.stencil_back.depth_fail = op;
            }
            "sref" => state.stencil_reference = parse_u32(&value).min(u8::MAX as u32) as u8,
            _ => {}
        }
    }
    state
}

fn read_rasterizer(node: &Element) -> RenderState {
    let mut state = RenderState::default();

    for child in elements(node) {
        let value = text(child);
        match child.name.as_str() {
            "wireframe" => state.polygon_mode = if parse_bool(&value) { PolygonMode::Line } else { PolygonMode::Fill },
            "cull" => match CullMode::from_name_or_default(&value) {
                CullMode::None => state.cull = false,
                CullMode::Front => {
                    state.cull = true;
                    state.cull_face = Face::Front;
                }
                CullMode::Back => {
                    state.cull = true;
                    state.cull_face = Face::Back;
                }
            },
            "ccw" => state.front_face = if parse_bool(&value) { FrontFace::CounterClockwise } else { FrontFace::Clockwise },
            "depthbias" => state.depth_bias = parse_f32(&value),
            "depthclip" => state.depth_clamp = parse_bool(&value),
            _ => {}
        }
    }
    state
}

//! Version 2 layout
//!
//! Shader stages carry their path and entry point as attributes, variables are
//! declared once per pass, render states are a single item kind, and passes may
//! declare macros.

use super::{Reader, Schema, read_fields, read_item_values, render_target_ref};
use crate::codec::values::read_variable;
use crate::codec::xml::{attr, elements, elements_named, section, text};
use crate::fields::parse_bool;
use crate::model::{ItemKind, Macro, PipelineItem, ShaderPass, ShaderStage, ShaderStageKind};
use crate::paths::to_generic;
use xmltree::Element;

impl Reader<'_> {
    pub(crate) fn read_v2(&mut self, root: &Element) {
        tracing::debug!("Parsing a v2 project document");

        for node in section(root, "pipeline", "pass") {
            let pass = self.read_pass_v2(node);
            self.parsed.project.passes.push(pass);
        }

        self.read_objects(root, Schema::V2);
        self.read_settings(root, Schema::V2);
    }

    fn read_pass_v2(&mut self, node: &Element) -> ShaderPass {
        let mut pass = ShaderPass::new(attr(node, "name").unwrap_or_default());
        pass.collapsed = attr(node, "collapsed").is_some_and(parse_bool);

        for shader in elements_named(node, "shader") {
            let Some(kind) = attr(shader, "type").and_then(ShaderStageKind::from_short_name) else {
                tracing::warn!("Skipping shader of unknown type in pass '{}'", pass.name);
                continue;
            };

            let stage = ShaderStage {
                path: to_generic(attr(shader, "path").unwrap_or_default()),
                entry: attr(shader, "entry").unwrap_or_default().to_string(),
            };
            if kind == ShaderStageKind::Geometry {
                pass.geometry_used = attr(shader, "used").is_some_and(parse_bool);
            }

            self.check_shader_file(&pass.name, kind, &stage.path);
            *pass.stage_mut(kind) = stage;
        }

        for target in elements_named(node, "rendertexture") {
            pass.render_targets.push(render_target_ref(attr(target, "name"), Schema::V2));
        }

        for variable in section(node, "variables", "variable") {
            pass.variables.add(read_variable(variable, true));
        }

        for define in section(node, "macros", "define") {
            pass.macros.push(Macro {
                name: attr(define, "name").unwrap_or_default().to_string(),
                value: text(define),
                active: attr(define, "active").is_none_or(parse_bool),
            });
        }

        if let Some(items) = node.get_child("items") {
            for item in elements(items) {
                if let Some(item) = self.read_item_v2(&pass.name, item) {
                    pass.items.push(item);
                }
            }
        }

        read_item_values(&mut pass, node);
        pass
    }

    fn read_item_v2(&mut self, pass: &str, node: &Element) -> Option<PipelineItem> {
        let name = attr(node, "name").unwrap_or_default().to_string();
        let kind = match attr(node, "type").unwrap_or_default() {
            "geometry" => ItemKind::Geometry(self.read_geometry(node)),
            "renderstate" => ItemKind::RenderState(read_fields(node)),
            "model" => ItemKind::Model(self.read_model(pass, &name, node)),
            other => {
                tracing::warn!("Skipping item '{name}' of unknown type '{other}' in pass '{pass}'");
                return None;
            }
        };
        Some(PipelineItem { name, kind })
    }
}

//! Pipeline tree: project, passes and items

use super::SettingEntry;
use crate::fields::{Field, FieldTable, named_enum, parse_f32};
use crate::mesh::{LoadedMesh, MeshHandle};
use crate::paths::ProjectPaths;
use crate::registry::ResourceHandle;
use crate::render_state::RenderState;
use crate::variables::{ShaderVariable, VariableStore};
use serde::Serialize;
use std::sync::Arc;

/// An open project: where it lives, its passes and its UI settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    pub paths: ProjectPaths,
    pub passes: Vec<ShaderPass>,
    pub settings: Vec<SettingEntry>,
}

impl Project {
    /// Creates an empty project rooted at the given paths
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths, ..Default::default() }
    }

    pub fn pass(&self, name: &str) -> Option<&ShaderPass> {
        self.passes.iter().find(|pass| pass.name == name)
    }

    pub fn pass_mut(&mut self, name: &str) -> Option<&mut ShaderPass> {
        self.passes.iter_mut().find(|pass| pass.name == name)
    }

    /// Resolves pinned-variable settings to their (pass, variable) pairs
    ///
    /// Entries naming a pass or variable that does not exist are skipped.
    pub fn pinned_variables(&self) -> Vec<(&ShaderPass, &ShaderVariable)> {
        self.settings
            .iter()
            .filter_map(|entry| match entry {
                SettingEntry::Pinned { name, owner } => {
                    let pass = self.pass(owner)?;
                    Some((pass, pass.variables.find(name)?))
                }
                _ => None,
            })
            .collect()
    }
}

/// Shader stage of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShaderStageKind {
    Vertex,
    Pixel,
    Geometry,
}

impl ShaderStageKind {
    /// Short document name ("vs", "ps", "gs")
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Vertex => "vs",
            Self::Pixel => "ps",
            Self::Geometry => "gs",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        match name {
            "vs" => Some(Self::Vertex),
            "ps" => Some(Self::Pixel),
            "gs" => Some(Self::Geometry),
            _ => None,
        }
    }

    /// Human-readable name used in diagnostics
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Pixel => "pixel",
            Self::Geometry => "geometry",
        }
    }

    /// Suffix used when shader files are copied next to a project
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Vertex => "VS",
            Self::Pixel => "PS",
            Self::Geometry => "GS",
        }
    }
}

/// Source file and entry point of one shader stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShaderStage {
    /// Project-relative path with forward slashes
    pub path: String,
    pub entry: String,
}

impl ShaderStage {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() || self.entry.is_empty()
    }
}

/// Where a pass renders to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RenderTargetRef {
    /// The tool's primary output surface
    Default,
    /// An off-screen render target object
    Named(String),
}

/// A compile-time shader macro
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro {
    pub name: String,
    pub value: String,
    pub active: bool,
}

/// Per-item override of a pass variable's value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemValue {
    /// Name of the overridden pass variable
    pub variable: String,
    /// Item the override applies to, if it still exists
    pub item: Option<String>,
    /// Copy of the pass variable holding the overriding value
    pub value: ShaderVariable,
}

/// One configured draw stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShaderPass {
    pub name: String,
    pub vertex: ShaderStage,
    pub pixel: ShaderStage,
    pub geometry: ShaderStage,
    pub geometry_used: bool,
    /// Declared render-target references; empty means the default target
    pub render_targets: Vec<RenderTargetRef>,
    /// Handles resolved from `render_targets` after binding
    pub render_target_handles: Vec<Option<ResourceHandle>>,
    pub items: Vec<PipelineItem>,
    pub variables: VariableStore,
    pub macros: Vec<Macro>,
    pub item_values: Vec<ItemValue>,
    /// Pipeline panel state, passed through untouched
    pub collapsed: bool,
}

impl ShaderPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Number of render targets this pass writes
    pub fn render_target_count(&self) -> usize {
        self.render_targets.len().max(1)
    }

    pub fn stage(&self, kind: ShaderStageKind) -> &ShaderStage {
        match kind {
            ShaderStageKind::Vertex => &self.vertex,
            ShaderStageKind::Pixel => &self.pixel,
            ShaderStageKind::Geometry => &self.geometry,
        }
    }

    pub fn stage_mut(&mut self, kind: ShaderStageKind) -> &mut ShaderStage {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Pixel => &mut self.pixel,
            ShaderStageKind::Geometry => &mut self.geometry,
        }
    }

    /// Stages that take part in rendering: vertex, pixel and (if used) geometry
    pub fn active_stages(&self) -> Vec<ShaderStageKind> {
        let mut stages = vec![ShaderStageKind::Vertex, ShaderStageKind::Pixel];
        if self.geometry_used {
            stages.push(ShaderStageKind::Geometry);
        }
        stages
    }

    pub fn item(&self, name: &str) -> Option<&PipelineItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

/// One renderable or stateful unit inside a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineItem {
    pub name: String,
    pub kind: ItemKind,
}

/// Payload of a pipeline item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemKind {
    Geometry(GeometryItem),
    RenderState(RenderState),
    Model(ModelItem),
}

impl ItemKind {
    /// Item type name used in v2 documents
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "geometry",
            Self::RenderState(_) => "renderstate",
            Self::Model(_) => "model",
        }
    }
}

named_enum! {
    /// Built-in geometry shapes
    #[derive(Default)]
    pub enum GeometryShape {
        #[default]
        Cube => "Cube",
        Circle => "Circle",
        Plane => "Plane",
        Rectangle => "Rectangle",
        Sphere => "Sphere",
        Triangle => "Triangle",
    }
}

named_enum! {
    /// Primitive topology of a geometry draw
    #[derive(Default)]
    pub enum Topology {
        Undefined => "Undefined",
        PointList => "PointList",
        LineList => "LineList",
        LineStrip => "LineStrip",
        #[default]
        TriangleList => "TriangleList",
        TriangleStrip => "TriangleStrip",
        LineListAdjacency => "LineListAdjecent",
        LineStripAdjacency => "LineStripAdjecent",
        TriangleListAdjacency => "TriangleListAdjecent",
        TriangleStripAdjacency => "TriangleStripAdjecent",
    }
}

impl Topology {
    /// Looks up a topology, also accepting the "Adjacent" spelling
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_name(name).or_else(|| Self::from_name(&name.replace("Adjacent", "Adjecent")))
    }
}

/// Scale, rotation and position of a geometry or model item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: [f32; 3],
    /// Rotation in radians: x = pitch, y = yaw, z = roll
    pub rotation: [f32; 3],
    pub position: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self { scale: [1.0; 3], rotation: [0.0; 3], position: [0.0; 3] }
    }
}

static TRANSFORM_FIELDS: [Field<Transform>; 9] = [
    Field { name: "scaleX", get: |t| t.scale[0].to_string(), set: |t, s| t.scale[0] = parse_f32(s) },
    Field { name: "scaleY", get: |t| t.scale[1].to_string(), set: |t, s| t.scale[1] = parse_f32(s) },
    Field { name: "scaleZ", get: |t| t.scale[2].to_string(), set: |t, s| t.scale[2] = parse_f32(s) },
    Field { name: "roll", get: |t| t.rotation[2].to_string(), set: |t, s| t.rotation[2] = parse_f32(s) },
    Field { name: "pitch", get: |t| t.rotation[0].to_string(), set: |t, s| t.rotation[0] = parse_f32(s) },
    Field { name: "yaw", get: |t| t.rotation[1].to_string(), set: |t, s| t.rotation[1] = parse_f32(s) },
    Field { name: "x", get: |t| t.position[0].to_string(), set: |t, s| t.position[0] = parse_f32(s) },
    Field { name: "y", get: |t| t.position[1].to_string(), set: |t, s| t.position[1] = parse_f32(s) },
    Field { name: "z", get: |t| t.position[2].to_string(), set: |t, s| t.position[2] = parse_f32(s) },
];

impl FieldTable for Transform {
    fn fields() -> &'static [Field<Self>] {
        &TRANSFORM_FIELDS
    }
}

/// A procedurally generated mesh draw
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometryItem {
    pub shape: GeometryShape,
    /// Width, height, depth
    pub size: [f32; 3],
    pub transform: Transform,
    pub topology: Topology,
    /// Mesh produced by the geometry factory when the item was read
    #[serde(skip)]
    pub mesh: Option<MeshHandle>,
}

/// A mesh loaded from a model file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelItem {
    /// Project-relative path with forward slashes
    pub path: String,
    pub group: String,
    pub only_group: bool,
    pub transform: Transform,
    /// Shared mesh from the model cache; `None` if loading failed
    #[serde(skip)]
    pub mesh: Option<Arc<LoadedMesh>>,
}

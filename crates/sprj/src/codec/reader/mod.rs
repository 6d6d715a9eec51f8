//! Project document reader
//!
//! Both schema versions are read into a fresh `ParsedProject`. Nothing outside
//! of it is touched: object creations and slot bindings are only recorded here
//! and are applied by the binding resolver when the project is committed.

mod v1;
mod v2;

use super::buffer_file;
use super::values::read_value_rows;
use super::xml::{attr, child_text, elements, elements_named, section, text};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::fields::{FieldTable, parse_bool, parse_f32, parse_i32};
use crate::mesh::{GeometryFactory, MeshLoader, ModelCache};
use crate::model::{
    BufferObject, CameraSettings, CubemapFaces, GeometryItem, GeometryShape, ItemValue, ModelItem, Project, RenderTarget, RenderTargetRef, RenderTargetSize,
    SceneObject, SettingEntry, ShaderPass, ShaderStageKind, SizeParseError, TextureFormat, Topology,
};
use crate::paths::{ProjectPaths, to_generic};
use crate::resolver::PendingBindings;
use xmltree::Element;

/// External services the reader calls while building items
pub struct ReadServices<'a> {
    pub geometry: &'a mut dyn GeometryFactory,
    pub meshes: &'a dyn MeshLoader,
}

/// A fully read project that has not been committed yet
#[derive(Debug)]
pub struct ParsedProject {
    pub project: Project,
    /// Objects to create, in document order
    pub creations: Vec<SceneObject>,
    /// Slot bindings recorded by name
    pub bindings: PendingBindings,
    /// Models loaded while reading the items
    pub models: ModelCache,
    pub diagnostics: Diagnostics,
}

/// Document layout being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Schema {
    V1,
    V2,
}

pub(crate) struct Reader<'a> {
    services: ReadServices<'a>,
    parsed: ParsedProject,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(paths: ProjectPaths, services: ReadServices<'a>) -> Self {
        Self {
            services,
            parsed: ParsedProject {
                project: Project::new(paths),
                creations: Vec::new(),
                bindings: PendingBindings::default(),
                models: ModelCache::new(),
                diagnostics: Diagnostics::new(),
            },
        }
    }

    pub(crate) fn finish(self) -> ParsedProject {
        self.parsed
    }

    fn paths(&self) -> &ProjectPaths {
        &self.parsed.project.paths
    }

    /// Records a diagnostic if a shader source file is missing
    fn check_shader_file(&mut self, pass: &str, kind: ShaderStageKind, path: &str) {
        if !self.paths().file_exists(path) {
            self.parsed.diagnostics.push(DiagnosticKind::MissingResourceFile, pass, format!("{} shader does not exist.", kind.display_name()));
        }
    }

    fn read_geometry(&mut self, node: &Element) -> GeometryItem {
        let mut item = GeometryItem::default();
        for child in elements(node) {
            let value = text(child);
            match child.name.as_str() {
                "width" => item.size[0] = parse_f32(&value),
                "height" => item.size[1] = parse_f32(&value),
                "depth" => item.size[2] = parse_f32(&value),
                "type" => {
                    if let Some(shape) = GeometryShape::from_name(&value) {
                        item.shape = shape;
                    }
                }
                "topology" => {
                    if let Some(topology) = Topology::parse(&value) {
                        item.topology = topology;
                    }
                }
                name => {
                    item.transform.apply_field(name, &value);
                }
            }
        }

        item.mesh = Some(self.services.geometry.create(&item));
        item
    }

    fn read_model(&mut self, pass: &str, item_name: &str, node: &Element) -> ModelItem {
        let mut model = ModelItem::default();
        for child in elements(node) {
            let value = text(child);
            match child.name.as_str() {
                "filepath" => model.path = to_generic(&value),
                "group" => model.group = value,
                "grouponly" => model.only_group = parse_bool(&value),
                name => {
                    model.transform.apply_field(name, &value);
                }
            }
        }

        if model.path.is_empty() {
            return model;
        }

        if !self.paths().file_exists(&model.path) {
            self.parsed.diagnostics.push(DiagnosticKind::MissingResourceFile, pass, format!("model file {} does not exist.", model.path));
            return model;
        }

        let absolute = self.paths().to_absolute(&model.path);
        match self.parsed.models.get_or_load(&model.path, &absolute, self.services.meshes) {
            Ok(Some(mesh)) => model.mesh = Some(mesh),
            Ok(None) => {
                self.parsed.diagnostics.push(DiagnosticKind::ModelLoadFailure, pass, format!("Failed to load .obj model {item_name}"));
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.parsed.diagnostics.push(DiagnosticKind::ModelLoadFailure, pass, format!("Failed to load .obj model {item_name}"));
            }
        }
        model
    }

    fn read_objects(&mut self, root: &Element, schema: Schema) {
        for node in section(root, "objects", "object") {
            let object = match attr(node, "type").unwrap_or_default() {
                "texture" => read_texture(node),
                "rendertexture" => {
                    let name = attr(node, "name").unwrap_or_default().to_string();
                    let target = self.read_render_target(&name, node, schema);
                    SceneObject::RenderTarget { name, target }
                }
                "audio" => SceneObject::Audio { path: to_generic(attr(node, "path").unwrap_or_default()) },
                "buffer" if schema == Schema::V2 => self.read_buffer(node),
                other => {
                    tracing::warn!("Skipping object of unknown type '{other}'");
                    continue;
                }
            };

            for bind in elements_named(node, "bind") {
                let pass = attr(bind, "name").unwrap_or_default();
                let Ok(slot) = usize::try_from(attr(bind, "slot").map_or(0, parse_i32)) else {
                    tracing::warn!("Ignoring negative binding slot for '{}' in pass '{pass}'", object.name());
                    continue;
                };

                let recorded = if object.is_uniform() {
                    self.parsed.bindings.record_uniform(pass, slot, object.name())
                } else {
                    self.parsed.bindings.record_texture(pass, slot, object.name())
                };
                if !recorded {
                    tracing::warn!("Ignoring out-of-range binding slot {slot} for '{}' in pass '{pass}'", object.name());
                }
            }

            self.parsed.creations.push(object);
        }
    }

    fn read_render_target(&mut self, name: &str, node: &Element, schema: Schema) -> RenderTarget {
        let mut target = RenderTarget::default();

        if schema == Schema::V2 {
            if let Some(format) = attr(node, "format") {
                target.format = TextureFormat::from_name(format).unwrap_or_else(|| {
                    tracing::warn!("Unknown render target format '{format}' on '{name}'");
                    TextureFormat::default()
                });
            }
            target.clear = attr(node, "clear").is_none_or(parse_bool);
        }

        let size = match (attr(node, "fsize"), attr(node, "rsize")) {
            (Some(fixed), _) => RenderTargetSize::parse_fixed(fixed),
            (None, Some(ratio)) => RenderTargetSize::parse_ratio(ratio),
            (None, None) => Err(SizeParseError::InvalidFormat),
        };
        target.size = size.unwrap_or_else(|err| {
            tracing::warn!("Render target '{name}' has an invalid size ({err}), using the output size");
            self.parsed.diagnostics.push(DiagnosticKind::InvalidValue, name, format!("{err}; render target uses the output size"));
            RenderTargetSize::default()
        });

        target.clear_color = ["r", "g", "b", "a"].map(|channel| color_channel(node, channel, schema));
        target
    }

    fn read_buffer(&mut self, node: &Element) -> SceneObject {
        let name = attr(node, "name").unwrap_or_default().to_string();
        let size = attr(node, "size").map_or(0, parse_i32).max(0) as usize;
        let mut buffer = BufferObject::zeroed(size, attr(node, "format").unwrap_or_default());

        let side_car = buffer_file(&name);
        if self.paths().file_exists(&side_car) {
            match self.paths().load_project_file_bytes(&side_car) {
                Ok(bytes) => buffer.fill_from(&bytes),
                Err(err) => tracing::warn!("{err}"),
            }
        }

        SceneObject::Buffer { name, buffer }
    }

    fn read_settings(&mut self, root: &Element, schema: Schema) {
        for node in section(root, "settings", "entry") {
            let entry = read_setting(node, schema).unwrap_or_else(|| SettingEntry::Other(node.clone()));
            self.parsed.project.settings.push(entry);
        }
    }
}

/// Builds a field-table record from the child elements of `node`
fn read_fields<T: FieldTable>(node: &Element) -> T {
    let mut record = T::default();
    for child in elements(node) {
        record.apply_field(&child.name, &text(child));
    }
    record
}

/// Maps a `<rendertexture>` name to a render-target reference
fn render_target_ref(name: Option<&str>, schema: Schema) -> RenderTargetRef {
    match name {
        None | Some("") => RenderTargetRef::Default,
        Some("Window") if schema == Schema::V1 => RenderTargetRef::Default,
        Some(name) => RenderTargetRef::Named(name.to_string()),
    }
}

/// Reads per-item overrides of the pass's variables
///
/// Overrides of variables the pass does not declare are dropped.
fn read_item_values(pass: &mut ShaderPass, node: &Element) {
    for value_node in section(node, "itemvalues", "value") {
        let variable_name = attr(value_node, "variable").unwrap_or_default();
        let Some(variable) = pass.variables.find(variable_name) else {
            tracing::debug!("Dropping override of unknown variable '{variable_name}' in pass '{}'", pass.name);
            continue;
        };

        let mut value = variable.clone();
        read_value_rows(value_node, &mut value);
        let item = attr(value_node, "for").filter(|item| pass.item(item).is_some()).map(str::to_string);
        pass.item_values.push(ItemValue { variable: variable_name.to_string(), item, value });
    }
}

fn read_texture(node: &Element) -> SceneObject {
    if !attr(node, "cube").is_some_and(parse_bool) {
        return SceneObject::Texture { path: to_generic(attr(node, "path").unwrap_or_default()) };
    }

    let face = |name: &str| to_generic(attr(node, name).unwrap_or_default());
    SceneObject::Cubemap {
        name: attr(node, "name").unwrap_or_default().to_string(),
        faces: CubemapFaces {
            left: face("left"),
            top: face("top"),
            front: face("front"),
            bottom: face("bottom"),
            right: face("right"),
            back: face("back"),
        },
    }
}

/// Color channel attribute: 0..255 integers in v1, floats in v2, 0 when absent
fn color_channel(node: &Element, channel: &str, schema: Schema) -> f32 {
    attr(node, channel).map_or(0.0, |value| match schema {
        Schema::V1 => parse_i32(value) as f32 / 255.0,
        Schema::V2 => parse_f32(value),
    })
}

/// Decodes a settings entry; `None` keeps the element verbatim
fn read_setting(node: &Element, schema: Schema) -> Option<SettingEntry> {
    let name = || attr(node, "name").filter(|name| !name.is_empty()).map(str::to_string);

    match attr(node, "type")? {
        "property" => Some(SettingEntry::Property { name: name()? }),
        "file" => Some(SettingEntry::File {
            name: name()?,
            stage: attr(node, "shader").and_then(ShaderStageKind::from_short_name).unwrap_or(ShaderStageKind::Geometry),
        }),
        "pinned" => Some(SettingEntry::Pinned { name: name()?, owner: attr(node, "owner").unwrap_or_default().to_string() }),
        "camera" => Some(SettingEntry::Camera(read_camera(node, schema))),
        "clearcolor" => Some(SettingEntry::ClearColor(["r", "g", "b", "a"].map(|channel| color_channel(node, channel, schema)))),
        _ => None,
    }
}

fn read_camera(node: &Element, schema: Schema) -> CameraSettings {
    let value = |name: &str| child_text(node, name).map_or(0.0, |text| parse_f32(&text));

    if attr(node, "fp").is_some_and(parse_bool) {
        return CameraSettings::FirstPerson {
            position: [value("positionX"), value("positionY"), value("positionZ")],
            yaw: value("yaw"),
            pitch: value("pitch"),
        };
    }

    match schema {
        Schema::V1 => CameraSettings::ArcBall { distance: value("distance"), yaw: value("rotationX"), pitch: value("rotationY"), roll: value("rotationZ") },
        Schema::V2 => CameraSettings::ArcBall { distance: value("distance"), pitch: value("pitch"), yaw: value("yaw"), roll: value("roll") },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_state::RenderState;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_render_target_refs() {
        assert_eq!(render_target_ref(None, Schema::V2), RenderTargetRef::Default);
        assert_eq!(render_target_ref(Some("Window"), Schema::V1), RenderTargetRef::Default);
        assert_eq!(render_target_ref(Some("Window"), Schema::V2), RenderTargetRef::Named("Window".into()));
        assert_eq!(render_target_ref(Some("RT"), Schema::V1), RenderTargetRef::Named("RT".into()));
    }

    #[test]
    fn test_read_fields_applies_known_children() {
        let node = parse(r#"<item name="State" type="renderstate"><blend>true</blend><depthbias>0.5</depthbias><unknown>1</unknown></item>"#);
        let state: RenderState = read_fields(&node);
        assert_eq!(state, RenderState { blend: true, depth_bias: 0.5, ..Default::default() });
    }

    #[test]
    fn test_color_channels_per_schema() {
        let node = parse(r#"<object r="255" g="128"/>"#);
        assert_eq!(color_channel(&node, "r", Schema::V1), 1.0);
        assert_eq!(color_channel(&node, "g", Schema::V1), 128.0 / 255.0);
        assert_eq!(color_channel(&node, "b", Schema::V1), 0.0);

        let node = parse(r#"<object r="0.25"/>"#);
        assert_eq!(color_channel(&node, "r", Schema::V2), 0.25);
    }

    #[test]
    fn test_settings_entries() {
        let settings = parse(
            r#"<settings>
                <entry type="property" name="Box"/>
                <entry type="file" name="Simple" shader="ps"/>
                <entry type="pinned" name="Color" owner="Simple"/>
                <entry type="camera" fp="false"><distance>10</distance><pitch>0.5</pitch><yaw>1</yaw><roll>0</roll></entry>
                <entry type="clearcolor" r="0.5" g="0" b="0" a="1"/>
                <entry type="bookmarks" count="2"/>
                <entry type="property"/>
            </settings>"#,
        );
        let entries: Vec<_> = elements(&settings).map(|node| read_setting(node, Schema::V2)).collect();

        assert_eq!(entries[0], Some(SettingEntry::Property { name: "Box".into() }));
        assert_eq!(entries[1], Some(SettingEntry::File { name: "Simple".into(), stage: ShaderStageKind::Pixel }));
        assert_eq!(entries[2], Some(SettingEntry::Pinned { name: "Color".into(), owner: "Simple".into() }));
        assert_eq!(entries[3], Some(SettingEntry::Camera(CameraSettings::ArcBall { distance: 10.0, pitch: 0.5, yaw: 1.0, roll: 0.0 })));
        assert_eq!(entries[4], Some(SettingEntry::ClearColor([0.5, 0.0, 0.0, 1.0])));
        assert_eq!(entries[5], None);
        assert_eq!(entries[6], None);
    }

    #[test]
    fn test_legacy_arcball_rotation() {
        let node = parse(r#"<entry type="camera"><distance>4</distance><rotationX>1</rotationX><rotationY>2</rotationY><rotationZ>3</rotationZ></entry>"#);
        assert_eq!(read_camera(&node, Schema::V1), CameraSettings::ArcBall { distance: 4.0, yaw: 1.0, pitch: 2.0, roll: 3.0 });
    }

    #[test]
    fn test_cubemap_faces() {
        let node = parse(r#"<object type="texture" cube="true" name="Sky" left="sky\l.png" top="t.png" front="f.png" bottom="b.png" right="r.png" back="k.png"/>"#);
        match read_texture(&node) {
            SceneObject::Cubemap { name, faces } => {
                assert_eq!(name, "Sky");
                assert_eq!(faces.left, "sky/l.png");
                assert_eq!(faces.back, "k.png");
            }
            other => panic!("expected a cubemap, got {other:?}"),
        }
    }
}

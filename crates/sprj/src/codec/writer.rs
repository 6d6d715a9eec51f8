//! Project document writer
//!
//! Always produces the version 2 layout. Passes, items, variables and objects
//! are written in the order they are held; record fields equal to their default
//! are left out. Paths are written exactly as stored in the model, so a caller
//! saving to another location relocates the model first.

use super::values::{write_value_rows, write_variables};
use super::xml::{push, set_attr, text_element};
use super::{SCHEMA_VERSION, buffer_file};
use crate::fields::FieldTable;
use crate::model::{
    CameraSettings, ItemKind, PipelineItem, Project, RenderTarget, RenderTargetRef, RenderTargetSize, SceneObject, SettingEntry, ShaderPass, ShaderStageKind,
    TextureFormat,
};
use crate::registry::ObjectRegistry;
use bytes::Bytes;
use xmltree::Element;

/// A serialized project: the document tree plus its side-car files
#[derive(Debug, Clone)]
pub struct WrittenDocument {
    pub root: Element,
    /// Project-relative side-car paths and their contents
    pub side_cars: Vec<(String, Bytes)>,
}

/// Serializes a project and the registry's objects and bindings
pub fn write_document(project: &Project, registry: &dyn ObjectRegistry) -> WrittenDocument {
    let mut root = Element::new("project");
    set_attr(&mut root, "version", SCHEMA_VERSION);

    let mut pipeline = Element::new("pipeline");
    for pass in &project.passes {
        push(&mut pipeline, write_pass(pass));
    }
    push(&mut root, pipeline);

    let mut objects = Element::new("objects");
    let mut side_cars = Vec::new();
    for object in registry.objects() {
        let mut node = write_object(&object);
        if let SceneObject::Buffer { name, buffer } = &object {
            side_cars.push((buffer_file(name), buffer.data.clone().freeze()));
        }

        for pass in &project.passes {
            let bound = if object.is_uniform() { registry.uniform_bind_list(&pass.name) } else { registry.bind_list(&pass.name) };
            for (slot, _) in bound.iter().enumerate().filter(|(_, name)| name.as_str() == object.name()) {
                let mut bind = Element::new("bind");
                set_attr(&mut bind, "slot", slot);
                set_attr(&mut bind, "name", &pass.name);
                push(&mut node, bind);
            }
        }
        push(&mut objects, node);
    }
    push(&mut root, objects);

    let mut settings = Element::new("settings");
    for entry in &project.settings {
        push(&mut settings, write_setting(entry));
    }
    push(&mut root, settings);

    WrittenDocument { root, side_cars }
}

fn write_pass(pass: &ShaderPass) -> Element {
    let mut node = Element::new("pass");
    set_attr(&mut node, "name", &pass.name);
    if pass.collapsed {
        set_attr(&mut node, "collapsed", true);
    }

    for kind in [ShaderStageKind::Vertex, ShaderStageKind::Pixel, ShaderStageKind::Geometry] {
        let stage = pass.stage(kind);
        if kind == ShaderStageKind::Geometry && stage.is_empty() {
            continue;
        }

        let mut shader = Element::new("shader");
        if kind == ShaderStageKind::Geometry {
            set_attr(&mut shader, "used", pass.geometry_used);
        }
        set_attr(&mut shader, "type", kind.short_name());
        set_attr(&mut shader, "path", &stage.path);
        set_attr(&mut shader, "entry", &stage.entry);
        push(&mut node, shader);
    }

    for target in &pass.render_targets {
        let mut rendertexture = Element::new("rendertexture");
        if let RenderTargetRef::Named(name) = target {
            set_attr(&mut rendertexture, "name", name);
        }
        push(&mut node, rendertexture);
    }

    write_variables(&mut node, &pass.variables);

    let mut macros = Element::new("macros");
    for definition in &pass.macros {
        let mut define = text_element("define", &definition.value);
        set_attr(&mut define, "name", &definition.name);
        set_attr(&mut define, "active", definition.active);
        push(&mut macros, define);
    }
    push(&mut node, macros);

    let mut items = Element::new("items");
    for item in &pass.items {
        push(&mut items, write_item(item));
    }
    push(&mut node, items);

    // Overrides for items that no longer exist are dropped
    let mut item_values = Element::new("itemvalues");
    for item_value in &pass.item_values {
        let Some(item) = item_value.item.as_deref().filter(|item| pass.item(item).is_some()) else {
            continue;
        };
        let mut value = Element::new("value");
        set_attr(&mut value, "variable", &item_value.variable);
        set_attr(&mut value, "for", item);
        write_value_rows(&mut value, &item_value.value);
        push(&mut item_values, value);
    }
    push(&mut node, item_values);

    node
}

fn write_item(item: &PipelineItem) -> Element {
    let mut node = Element::new("item");
    set_attr(&mut node, "name", &item.name);
    set_attr(&mut node, "type", item.kind.type_name());

    match &item.kind {
        ItemKind::Geometry(geometry) => {
            push(&mut node, text_element("type", geometry.shape));
            push(&mut node, text_element("width", geometry.size[0]));
            push(&mut node, text_element("height", geometry.size[1]));
            push(&mut node, text_element("depth", geometry.size[2]));
            push_changed_fields(&mut node, &geometry.transform);
            push(&mut node, text_element("topology", geometry.topology));
        }
        ItemKind::RenderState(state) => push_changed_fields(&mut node, state),
        ItemKind::Model(model) => {
            push(&mut node, text_element("filepath", &model.path));
            push(&mut node, text_element("grouponly", model.only_group));
            if model.only_group {
                push(&mut node, text_element("group", &model.group));
            }
            push_changed_fields(&mut node, &model.transform);
        }
    }
    node
}

fn push_changed_fields<T: FieldTable>(node: &mut Element, record: &T) {
    for (name, value) in record.changed_fields() {
        push(node, text_element(name, value));
    }
}

fn write_object(object: &SceneObject) -> Element {
    let mut node = Element::new("object");
    match object {
        SceneObject::Texture { path } => {
            set_attr(&mut node, "type", "texture");
            set_attr(&mut node, "path", path);
        }
        SceneObject::Cubemap { name, faces } => {
            set_attr(&mut node, "type", "texture");
            set_attr(&mut node, "name", name);
            set_attr(&mut node, "cube", true);
            set_attr(&mut node, "left", &faces.left);
            set_attr(&mut node, "top", &faces.top);
            set_attr(&mut node, "front", &faces.front);
            set_attr(&mut node, "bottom", &faces.bottom);
            set_attr(&mut node, "right", &faces.right);
            set_attr(&mut node, "back", &faces.back);
        }
        SceneObject::RenderTarget { name, target } => {
            set_attr(&mut node, "type", "rendertexture");
            set_attr(&mut node, "name", name);
            write_render_target(&mut node, target);
        }
        SceneObject::Audio { path } => {
            set_attr(&mut node, "type", "audio");
            set_attr(&mut node, "path", path);
        }
        SceneObject::Buffer { name, buffer } => {
            set_attr(&mut node, "type", "buffer");
            set_attr(&mut node, "name", name);
            set_attr(&mut node, "size", buffer.size());
            set_attr(&mut node, "format", &buffer.format);
        }
    }
    node
}

fn write_render_target(node: &mut Element, target: &RenderTarget) {
    if target.format != TextureFormat::Rgba {
        set_attr(node, "format", target.format);
    }
    match target.size {
        RenderTargetSize::Fixed(_) => set_attr(node, "fsize", target.size),
        RenderTargetSize::Ratio(_) => set_attr(node, "rsize", target.size),
    }
    set_attr(node, "clear", target.clear);
    for (channel, value) in ["r", "g", "b", "a"].into_iter().zip(target.clear_color) {
        if value != 0.0 {
            set_attr(node, channel, value);
        }
    }
}

fn write_setting(entry: &SettingEntry) -> Element {
    let mut node = Element::new("entry");
    match entry {
        SettingEntry::Property { name } => {
            set_attr(&mut node, "type", "property");
            set_attr(&mut node, "name", name);
        }
        SettingEntry::File { name, stage } => {
            set_attr(&mut node, "type", "file");
            set_attr(&mut node, "name", name);
            set_attr(&mut node, "shader", stage.short_name());
        }
        SettingEntry::Pinned { name, owner } => {
            set_attr(&mut node, "type", "pinned");
            set_attr(&mut node, "name", name);
            set_attr(&mut node, "owner", owner);
        }
        SettingEntry::Camera(CameraSettings::FirstPerson { position, yaw, pitch }) => {
            set_attr(&mut node, "type", "camera");
            set_attr(&mut node, "fp", true);
            push(&mut node, text_element("positionX", position[0]));
            push(&mut node, text_element("positionY", position[1]));
            push(&mut node, text_element("positionZ", position[2]));
            push(&mut node, text_element("yaw", yaw));
            push(&mut node, text_element("pitch", pitch));
        }
        SettingEntry::Camera(CameraSettings::ArcBall { distance, pitch, yaw, roll }) => {
            set_attr(&mut node, "type", "camera");
            set_attr(&mut node, "fp", false);
            push(&mut node, text_element("distance", distance));
            push(&mut node, text_element("pitch", pitch));
            push(&mut node, text_element("yaw", yaw));
            push(&mut node, text_element("roll", roll));
        }
        SettingEntry::ClearColor([r, g, b, a]) => {
            set_attr(&mut node, "type", "clearcolor");
            set_attr(&mut node, "r", r);
            set_attr(&mut node, "g", g);
            set_attr(&mut node, "b", b);
            set_attr(&mut node, "a", a);
        }
        SettingEntry::Other(element) => return element.clone(),
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml::{attr, child_text, elements_named};
    use crate::model::{BufferObject, GeometryItem, ItemValue, Transform};
    use crate::registry::MemoryRegistry;
    use crate::render_state::RenderState;
    use crate::variables::{ShaderVariable, ValueType};

    fn pass_with_items() -> ShaderPass {
        let mut pass = ShaderPass::new("Simple");
        pass.vertex.path = "shaders/simple.vert".into();
        pass.vertex.entry = "main".into();
        pass.pixel.path = "shaders/simple.frag".into();
        pass.pixel.entry = "main".into();
        pass.items.push(PipelineItem { name: "State".into(), kind: ItemKind::RenderState(RenderState { blend: true, ..Default::default() }) });
        pass.items.push(PipelineItem {
            name: "Box".into(),
            kind: ItemKind::Geometry(GeometryItem { size: [1.0, 1.0, 1.0], transform: Transform { position: [0.0, 2.0, 0.0], ..Default::default() }, ..Default::default() }),
        });
        pass
    }

    #[test]
    fn test_render_state_writes_only_changed_fields() {
        let node = write_item(&pass_with_items().items[0]);
        assert_eq!(attr(&node, "type"), Some("renderstate"));
        let children: Vec<_> = node.children.iter().filter_map(|child| child.as_element()).map(|child| child.name.as_str()).collect();
        assert_eq!(children, vec!["blend"]);
    }

    #[test]
    fn test_geometry_transform_omits_defaults() {
        let node = write_item(&pass_with_items().items[1]);
        let children: Vec<_> = node.children.iter().filter_map(|child| child.as_element()).map(|child| child.name.as_str()).collect();
        assert_eq!(children, vec!["type", "width", "height", "depth", "y", "topology"]);
        assert_eq!(child_text(&node, "topology").as_deref(), Some("TriangleList"));
    }

    #[test]
    fn test_geometry_shader_only_when_set() {
        let mut pass = pass_with_items();
        assert_eq!(elements_named(&write_pass(&pass), "shader").count(), 2);

        pass.geometry.path = "shaders/simple.geom".into();
        pass.geometry.entry = "main".into();
        let node = write_pass(&pass);
        let gs = elements_named(&node, "shader").nth(2).unwrap();
        assert_eq!(attr(gs, "used"), Some("false"));
        assert_eq!(attr(gs, "type"), Some("gs"));
    }

    #[test]
    fn test_item_values_for_missing_items_are_dropped() {
        let mut pass = pass_with_items();
        let variable = ShaderVariable::new("Scale", ValueType::Float1);
        pass.variables.add(variable.clone());
        pass.item_values.push(ItemValue { variable: "Scale".into(), item: Some("Box".into()), value: variable.clone() });
        pass.item_values.push(ItemValue { variable: "Scale".into(), item: Some("Gone".into()), value: variable.clone() });
        pass.item_values.push(ItemValue { variable: "Scale".into(), item: None, value: variable });

        let node = write_pass(&pass);
        let values: Vec<_> = node.get_child("itemvalues").map(|section| elements_named(section, "value").collect()).unwrap_or_default();
        assert_eq!(values.len(), 1);
        assert_eq!(attr(values[0], "for"), Some("Box"));
    }

    #[test]
    fn test_objects_and_bindings() {
        let mut registry = MemoryRegistry::default();
        registry.create_texture("textures/a.png");
        registry.create_render_target("RT", &RenderTarget { clear_color: [1.0, 0.0, 0.0, 0.5], ..Default::default() });
        registry.create_buffer("Data", &BufferObject::zeroed(8, "vec2"));
        registry.bind("RT", "Simple");
        registry.bind("textures/a.png", "Simple");
        registry.bind_uniform("Data", "Simple");

        let project = Project { passes: vec![pass_with_items()], ..Default::default() };
        let written = write_document(&project, &registry);

        let objects: Vec<_> = written.root.get_child("objects").map(|section| elements_named(section, "object").collect()).unwrap_or_default();
        assert_eq!(objects.len(), 3);

        let texture_bind = objects[0].get_child("bind").unwrap();
        assert_eq!(attr(texture_bind, "slot"), Some("1"));
        assert_eq!(attr(texture_bind, "name"), Some("Simple"));

        assert_eq!(attr(objects[1], "rsize"), Some("1,1"));
        assert_eq!(attr(objects[1], "r"), Some("1"));
        assert_eq!(attr(objects[1], "g"), None);
        assert_eq!(attr(objects[1], "a"), Some("0.5"));
        assert_eq!(attr(objects[1].get_child("bind").unwrap(), "slot"), Some("0"));

        assert_eq!(attr(objects[2], "size"), Some("8"));
        assert_eq!(written.side_cars, vec![("buffers/Data.buf".to_string(), Bytes::from(vec![0u8; 8]))]);
    }

    #[test]
    fn test_unknown_settings_are_preserved() {
        let element = Element::parse(r#"<entry type="bookmarks" count="2"><line>4</line></entry>"#.as_bytes()).unwrap();
        let written = write_setting(&SettingEntry::Other(element.clone()));
        assert_eq!(written, element);
    }
}

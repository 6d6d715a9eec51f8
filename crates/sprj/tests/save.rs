use sprj::codec::{self, SCHEMA_VERSION};
use sprj::model::{ItemKind, SceneObject};
use sprj::{CodecConfig, ObjectRegistry, ProjectError, ProjectManager};
use std::fs;
use std::path::{Path, PathBuf};

fn write(dir: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_render_state_writes_only_changed_fields() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline>
                <pass name="Blend">
                    <items>
                        <item name="State" type="renderstate"><blend>true</blend></item>
                    </items>
                </pass>
            </pipeline>
        </project>"#,
    );

    let mut manager = ProjectManager::headless(CodecConfig::default());
    manager.open(&file).unwrap();
    manager.save().unwrap();

    let root = codec::parse_document(&fs::read(&file).unwrap()).unwrap();
    assert_eq!(codec::schema_version(&root).unwrap(), SCHEMA_VERSION);
    let item = root.get_child("pipeline").and_then(|p| p.get_child("pass")).and_then(|p| p.get_child("items")).and_then(|i| i.get_child("item")).unwrap();
    let fields: Vec<&str> = item.children.iter().filter_map(|node| node.as_element()).map(|e| e.name.as_str()).collect();
    assert_eq!(fields, vec!["blend"]);

    manager.open(&file).unwrap();
    let ItemKind::RenderState(state) = &manager.project().passes[0].items[0].kind else {
        panic!("render state was not read back");
    };
    assert!(state.blend);
    assert!(state.cull);
}

#[test]
fn test_buffer_side_car_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline><pass name="Lit"/></pipeline>
            <objects><object type="buffer" name="Lights" size="64" format="vec4"><bind slot="0" name="Lit"/></object></objects>
        </project>"#,
    );

    let mut manager = ProjectManager::headless(CodecConfig::default());
    manager.open(&file).unwrap();
    if let Some(SceneObject::Buffer { buffer, .. }) = manager.registry_mut().object_mut("Lights") {
        buffer.data[0] = 7;
        buffer.data[63] = 9;
    }
    manager.save().unwrap();

    let side_car = fs::read(dir.path().join("buffers/Lights.buf")).unwrap();
    assert_eq!(side_car.len(), 64);
    assert_eq!((side_car[0], side_car[63]), (7, 9));

    manager.open(&file).unwrap();
    assert_eq!(manager.registry().uniform_bind_list("Lit"), vec!["Lights".to_string()]);
}

#[test]
fn test_template_cannot_be_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let template = write(dir.path(), "templates/GLSL/template.sprj", br#"<project version="2"><pipeline><pass name="Simple"/></pipeline></project>"#);
    let original = fs::read(&template).unwrap();

    let config = CodecConfig { templates_dir: dir.path().join("templates"), ..Default::default() };
    let mut manager = ProjectManager::headless(config);
    manager.open_template().unwrap();

    assert_eq!(manager.project().passes[0].name, "Simple");
    assert_eq!(manager.paths().file(), None);
    assert_eq!(manager.paths().root(), template.parent().unwrap());
    assert!(matches!(manager.save(), Err(ProjectError::NoProjectFile)));
    assert_eq!(fs::read(&template).unwrap(), original);

    let saved = dir.path().join("mine/project.sprj");
    manager.save_as(&saved, false).unwrap();
    assert!(saved.is_file());
    manager.save().unwrap();
}

#[test]
fn test_v1_project_is_saved_as_v2() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shaders/a.vert", b"void main() {}");
    write(dir.path(), "shaders/a.frag", b"void main() {}");
    let file = write(
        dir.path(),
        "legacy.sprj",
        br#"<project>
            <pipeline>
                <pass name="Legacy">
                    <shader type="vs"><path>shaders/a.vert</path><entry>main</entry></shader>
                    <shader type="ps"><path>shaders/a.frag</path><entry>main</entry></shader>
                    <items><item name="Raster" type="rasterizer"><wireframe>true</wireframe></item></items>
                </pass>
            </pipeline>
            <objects>
                <object type="texture" path="tex.png"><bind slot="0" name="Legacy"/></object>
            </objects>
        </project>"#,
    );

    let mut manager = ProjectManager::headless(CodecConfig::default());
    manager.open(&file).unwrap();
    let migrated = dir.path().join("out/migrated.sprj");
    manager.save_as(&migrated, false).unwrap();

    let mut reloaded = ProjectManager::headless(CodecConfig::default());
    reloaded.open(&migrated).unwrap();
    assert!(reloaded.diagnostics().is_empty());

    let pass = &reloaded.project().passes[0];
    assert_eq!(pass.vertex.path, "../shaders/a.vert");
    assert_eq!(pass.items, manager.project().passes[0].items);
    assert_eq!(reloaded.registry().bind_list("Legacy"), vec!["tex.png".to_string()]);

    let text = fs::read_to_string(&migrated).unwrap();
    assert!(text.contains(r#"<item name="Raster" type="renderstate">"#));
}

#[test]
fn test_buffer_contents_and_format_survive_save() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline><pass name="Lit"/></pipeline>
            <objects><object type="buffer" name="Particles" size="64"><bind slot="2" name="Lit"/></object></objects>
        </project>"#,
    );

    let pattern: Vec<u8> = (0..64u32).map(|i| (i * 37 + 11) as u8 ^ 0xA5).collect();
    let mut manager = ProjectManager::headless(CodecConfig::default());
    manager.open(&file).unwrap();
    let Some(SceneObject::Buffer { buffer, .. }) = manager.registry_mut().object_mut("Particles") else {
        panic!("buffer object was not created");
    };
    buffer.data.copy_from_slice(&pattern);
    buffer.format = "vec3;float;ivec4;uint".to_string();

    let copy = dir.path().join("copy/project.sprj");
    manager.save_as(&copy, false).unwrap();
    assert_eq!(fs::read(dir.path().join("copy/buffers/Particles.buf")).unwrap(), pattern);

    let mut reloaded = ProjectManager::headless(CodecConfig::default());
    reloaded.open(&copy).unwrap();
    let Some(SceneObject::Buffer { buffer, .. }) = reloaded.registry().object("Particles") else {
        panic!("buffer object was not read back");
    };
    assert_eq!(&buffer.data[..], &pattern[..]);
    assert_eq!(buffer.format, "vec3;float;ivec4;uint");
    assert_eq!(reloaded.registry().uniform_bind_list("Lit"), vec!["Particles".to_string()]);
}

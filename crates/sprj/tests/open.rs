use sprj::model::{ItemKind, RenderTargetRef, RenderTargetSize, SceneObject, SettingEntry};
use sprj::render_state::{Face, StencilOp};
use sprj::variables::{SystemVariable, ValueType, VariableSource};
use sprj::{CodecConfig, DiagnosticKind, MemoryRegistry, ObjectRegistry, ProjectError, ProjectManager, ResourceHandle};
use std::fs;
use std::path::{Path, PathBuf};

fn write(dir: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn open(file: &Path) -> ProjectManager<MemoryRegistry> {
    let mut manager = ProjectManager::headless(CodecConfig::default());
    manager.open(file).unwrap();
    manager
}

const LEGACY: &str = r#"<project>
    <pipeline>
        <pass name="Simple">
            <shader type="vs">
                <path>shaders\simple.vert</path>
                <entry>main</entry>
                <variables>
                    <variable type="float" name="Time" system="Time"/>
                    <variable type="float4" name="Color"><row><value>1</value><value>0</value><value>0</value><value>1</value></row></variable>
                </variables>
            </shader>
            <shader type="ps">
                <path>shaders/simple.frag</path>
                <entry>main</entry>
                <variables>
                    <variable type="float" name="Time"><row><value>2</value></row></variable>
                </variables>
            </shader>
            <rendertexture name="Window"/>
            <items>
                <item name="Box" type="geometry"><type>Cube</type><width>1</width><height>1</height><depth>1</depth></item>
                <item name="Blend" type="blend"><srcblend>One</srcblend><destblend>Zero</destblend></item>
                <item name="DS" type="depthstencil"><depthenable>true</depthenable><frontfail>Replace</frontfail></item>
                <item name="Raster" type="rasterizer"><cull>Front</cull></item>
            </items>
        </pass>
    </pipeline>
    <objects>
        <object type="rendertexture" name="Scene" rsize="0.5,0.5" r="255" g="128"/>
    </objects>
    <settings>
        <entry type="clearcolor" r="255" g="0" b="0" a="255"/>
        <entry type="camera" fp="false"><distance>5</distance><rotationX>10</rotationX><rotationY>20</rotationY><rotationZ>30</rotationZ></entry>
        <entry type="watch" name="Unknown"/>
    </settings>
</project>"#;

#[test]
fn test_v1_is_migrated_on_read() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shaders/simple.vert", b"void main() {}");
    write(dir.path(), "shaders/simple.frag", b"void main() {}");
    let file = write(dir.path(), "legacy.sprj", LEGACY.as_bytes());

    let manager = open(&file);
    let pass = &manager.project().passes[0];

    assert_eq!(pass.vertex.path, "shaders/simple.vert");
    assert_eq!(pass.render_targets, vec![RenderTargetRef::Default]);
    assert_eq!(pass.render_target_handles, vec![Some(ResourceHandle::OUTPUT)]);
    assert!(manager.diagnostics().is_empty());

    // A repeated name overwrites the earlier variable at its original position
    let names: Vec<&str> = pass.variables.all().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Time", "Color"]);
    let time = &pass.variables.all()[0];
    assert_eq!(time.source(), VariableSource::Constant);
    assert_eq!(time.float_value(0, 0), 2.0);

    let states: Vec<_> = pass
        .items
        .iter()
        .filter_map(|item| match &item.kind {
            ItemKind::RenderState(state) => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(states.len(), 3);
    assert!(states[0].blend);
    assert!(states[1].depth_test);
    assert_eq!(states[1].stencil_front.depth_fail, StencilOp::Replace);
    assert_eq!(states[2].cull_face, Face::Front);

    let Some(SceneObject::RenderTarget { target, .. }) = manager.registry().object("Scene") else {
        panic!("render target was not created");
    };
    assert_eq!(target.size, RenderTargetSize::Ratio([0.5, 0.5]));
    assert_eq!(target.clear_color, [1.0, 128.0 / 255.0, 0.0, 0.0]);
    assert_eq!(manager.registry().pixel_size("Scene"), Some([400, 300]));

    let settings = &manager.project().settings;
    assert_eq!(settings[0], SettingEntry::ClearColor([1.0, 0.0, 0.0, 1.0]));
    assert!(matches!(settings[2], SettingEntry::Other(_)));
}

#[test]
fn test_bindings_resolve_regardless_of_declaration_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline>
                <pass name="Blur"><rendertexture name="Blurred"/></pass>
                <pass name="Scene"><rendertexture name="Color"/><rendertexture name="Ghost"/></pass>
            </pipeline>
            <objects>
                <object type="rendertexture" name="Color" fsize="256,256">
                    <bind slot="1" name="Blur"/>
                </object>
                <object type="texture" path="noise.png">
                    <bind slot="0" name="Blur"/>
                    <bind slot="0" name="Nowhere"/>
                </object>
                <object type="rendertexture" name="Blurred" rsize="1,1"/>
            </objects>
        </project>"#,
    );

    let manager = open(&file);
    let registry = manager.registry();
    assert_eq!(registry.bind_list("Blur"), vec!["noise.png".to_string(), "Color".to_string()]);
    assert!(registry.bind_list("Nowhere").is_empty());

    let blur = &manager.project().passes[0];
    assert_eq!(blur.render_target_handles, vec![registry.handle("Blurred")]);
    let scene = &manager.project().passes[1];
    assert_eq!(scene.render_target_handles, vec![registry.handle("Color"), None]);
}

#[test]
fn test_unsupported_version_leaves_project_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.sprj", br#"<project version="2"><pipeline><pass name="Kept"/></pipeline></project>"#);
    let future = write(dir.path(), "future.sprj", br#"<project version="3"><pipeline><pass name="New"/></pipeline></project>"#);
    let broken = write(dir.path(), "broken.sprj", b"<project version=\"2\"><pipeline>");

    let mut manager = open(&good);
    let diagnostics_before = manager.diagnostics().clone();

    assert!(matches!(manager.open(&future), Err(ProjectError::UnsupportedSchemaVersion(3))));
    let err = manager.open(&broken).unwrap_err();
    assert!(err.is_document_parse_error());

    assert_eq!(manager.project().passes.len(), 1);
    assert_eq!(manager.project().passes[0].name, "Kept");
    assert_eq!(manager.paths().file(), Some(good.as_path()));
    assert_eq!(manager.diagnostics(), &diagnostics_before);
}

#[test]
fn test_diagnostics_for_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "models/empty.obj", b"");
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline>
                <pass name="Models">
                    <shader type="vs" path="missing.vert" entry="main"/>
                    <shader type="ps" path="missing.frag" entry="main"/>
                    <items>
                        <item name="Gone" type="model"><filepath>models/gone.obj</filepath></item>
                        <item name="Empty" type="model"><filepath>models/empty.obj</filepath></item>
                        <item name="EmptyAgain" type="model"><filepath>models/empty.obj</filepath></item>
                    </items>
                </pass>
            </pipeline>
            <objects>
                <object type="rendertexture" name="Bad" fsize="wide"/>
            </objects>
        </project>"#,
    );

    let mut manager = open(&file);
    let diagnostics = manager.diagnostics();
    assert_eq!(diagnostics.of_kind(DiagnosticKind::MissingResourceFile).count(), 3);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::ModelLoadFailure).count(), 2);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::InvalidValue).count(), 1);

    let messages: Vec<String> = diagnostics.iter().map(|d| d.message.clone()).collect();
    assert_eq!(messages[0], "vertex shader does not exist.");
    assert_eq!(messages[1], "pixel shader does not exist.");
    assert!(diagnostics.iter().take(5).all(|d| d.owner == "Models"));

    // The failed model is loaded once and cached as a failure
    assert_eq!(manager.models().len(), 1);
    assert_eq!(manager.registry().pixel_size("Bad"), Some([800, 600]));

    manager.clear_diagnostics();
    assert!(manager.diagnostics().is_empty());
}

#[test]
fn test_buffer_side_car_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let data: Vec<u8> = (0..64).collect();
    write(dir.path(), "buffers/Lights.buf", &data);
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline><pass name="Lit"/></pipeline>
            <objects>
                <object type="buffer" name="Lights" size="64" format="vec4;vec4"><bind slot="2" name="Lit"/></object>
                <object type="buffer" name="Empty" size="16" format="float"/>
            </objects>
        </project>"#,
    );

    let manager = open(&file);
    let Some(SceneObject::Buffer { buffer, .. }) = manager.registry().object("Lights") else {
        panic!("buffer was not created");
    };
    assert_eq!(buffer.size(), 64);
    assert_eq!(&buffer.data[..], &data[..]);
    assert_eq!(manager.registry().uniform_bind_list("Lit"), vec!["Lights".to_string()]);
    assert!(manager.registry().bind_list("Lit").is_empty());

    let Some(SceneObject::Buffer { buffer, .. }) = manager.registry().object("Empty") else {
        panic!("buffer was not created");
    };
    assert_eq!(&buffer.data[..], &[0u8; 16][..]);
}

#[test]
fn test_system_variable_type_mismatch_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "project.sprj",
        br#"<project version="2">
            <pipeline>
                <pass name="Vars">
                    <variables>
                        <variable type="float4x4" name="VP" system="ViewProjection"/>
                        <variable type="float2" name="Wrong" system="Time"><row><value>1</value><value>2</value></row></variable>
                        <variable type="double" name="Odd"/>
                    </variables>
                </pass>
            </pipeline>
        </project>"#,
    );

    let manager = open(&file);
    let variables = &manager.project().passes[0].variables;
    assert_eq!(variables.find("VP").unwrap().source(), VariableSource::System(SystemVariable::ViewProjection));
    let wrong = variables.find("Wrong").unwrap();
    assert_eq!(wrong.source(), VariableSource::Constant);
    assert_eq!(wrong.float_value(1, 0), 2.0);
    assert_eq!(variables.find("Odd").unwrap().value_type, ValueType::Float1);
}

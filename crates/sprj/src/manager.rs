//! Open/save facade
//!
//! `ProjectManager` owns the live project together with the object registry,
//! the model cache and the diagnostics of the last load. Opening a project
//! reads it into scratch state first and only replaces the live state once the
//! whole document has been read, so a failed open leaves the previous project
//! untouched.

use crate::codec::{self, ParsedProject, ReadServices};
use crate::config::CodecConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{ProjectError, Result};
use crate::mesh::{FileMeshLoader, GeometryFactory, MeshLoader, ModelCache, NullGeometryFactory};
use crate::model::{ItemKind, Project, ShaderStageKind};
use crate::paths::ProjectPaths;
use crate::registry::{MemoryRegistry, ObjectRegistry};
use crate::resolver;
use std::path::{Path, PathBuf};

/// A shader file to copy while saving to a new location
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShaderCopy {
    from: PathBuf,
    to: String,
}

/// Owner of the open project and everything loaded with it
pub struct ProjectManager<R: ObjectRegistry = MemoryRegistry> {
    config: CodecConfig,
    project: Project,
    registry: R,
    models: ModelCache,
    diagnostics: Diagnostics,
    geometry: Box<dyn GeometryFactory>,
    meshes: Box<dyn MeshLoader>,
}

impl ProjectManager<MemoryRegistry> {
    /// Creates a manager with an in-memory registry and headless mesh collaborators
    pub fn headless(config: CodecConfig) -> Self {
        Self::new(config, MemoryRegistry::default(), Box::new(NullGeometryFactory::default()), Box::new(FileMeshLoader))
    }
}

impl<R: ObjectRegistry> ProjectManager<R> {
    /// Creates a manager with an empty, unsaved project
    pub fn new(config: CodecConfig, registry: R, geometry: Box<dyn GeometryFactory>, meshes: Box<dyn MeshLoader>) -> Self {
        Self {
            config,
            project: Project::new(ProjectPaths::unsaved()),
            registry,
            models: ModelCache::new(),
            diagnostics: Diagnostics::new(),
            geometry,
            meshes,
        }
    }

    /// Opens a project file, replacing the current project on success
    ///
    /// # Arguments
    /// * `path` - Path to the project document
    ///
    /// # Returns
    /// An error if the file cannot be read, is malformed or declares an
    /// unsupported version; the previously open project is then unchanged
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        tracing::info!("Opening project {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| ProjectError::io(path, e))?;
        let root = codec::parse_document(&bytes)?;
        let services = ReadServices { geometry: self.geometry.as_mut(), meshes: self.meshes.as_ref() };
        let parsed = codec::read_document(&root, ProjectPaths::for_file(path), services)?;

        self.commit(parsed);
        tracing::info!(passes = self.project.passes.len(), diagnostics = self.diagnostics.len(), "Opened project {}", path.display());
        Ok(())
    }

    /// Opens the configured default template without remembering its path
    ///
    /// A later `save` fails with `NoProjectFile` so the template cannot be overwritten.
    pub fn open_template(&mut self) -> Result<()> {
        let file = self.config.template_file();
        self.open(&file)?;
        self.project.paths.forget_file();
        Ok(())
    }

    fn commit(&mut self, parsed: ParsedProject) {
        let ParsedProject { mut project, creations, bindings, models, diagnostics } = parsed;
        resolver::commit(&mut self.registry, &mut project, &creations, &bindings);
        self.project = project;
        self.models = models;
        self.diagnostics = diagnostics;
    }

    /// Saves the project to the file it was opened from
    pub fn save(&self) -> Result<()> {
        self.write_project(&self.project)
    }

    /// Saves the project to a new file and makes that file the current one
    ///
    /// Shader and model paths are re-expressed relative to the new location.
    /// With `copy_shaders`, every pass's shader files are copied into
    /// `shaders/` next to the new file and the document points at the copies.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P, copy_shaders: bool) -> Result<()> {
        let target = ProjectPaths::for_file(path.as_ref());
        tracing::info!("Saving project as {}", path.as_ref().display());

        let (relocated, copies) = self.relocate(&target, copy_shaders);
        for copy in &copies {
            let destination = target.to_absolute(&copy.to);
            let result = destination.parent().map_or(Ok(()), std::fs::create_dir_all).and_then(|_| std::fs::copy(&copy.from, &destination));
            if let Err(err) = result {
                tracing::warn!("Failed to copy shader {} to {}: {err}", copy.from.display(), destination.display());
            }
        }

        self.write_project(&relocated)?;
        let source = std::mem::replace(&mut self.project, relocated).paths;
        self.models.rekey(|path| source.rebase(path, &target));
        Ok(())
    }

    /// Clones the project with every stored path made relative to `target`
    fn relocate(&self, target: &ProjectPaths, copy_shaders: bool) -> (Project, Vec<ShaderCopy>) {
        let source = &self.project.paths;
        let mut project = self.project.clone();
        project.paths = target.clone();
        let mut copies = Vec::new();

        for pass in &mut project.passes {
            for kind in [ShaderStageKind::Vertex, ShaderStageKind::Pixel, ShaderStageKind::Geometry] {
                let copy = copy_shaders && (kind != ShaderStageKind::Geometry || pass.geometry_used);
                let name = pass.name.clone();
                let stage = pass.stage_mut(kind);
                if stage.path.is_empty() {
                    continue;
                }

                if copy {
                    let to = format!("shaders/{name}{}.{}", kind.file_suffix(), self.config.copied_shader_extension(&stage.path));
                    copies.push(ShaderCopy { from: source.to_absolute(&stage.path), to: to.clone() });
                    stage.path = to;
                } else {
                    stage.path = source.rebase(&stage.path, target);
                }
            }

            for item in &mut pass.items {
                if let ItemKind::Model(model) = &mut item.kind {
                    model.path = source.rebase(&model.path, target);
                }
            }
        }

        (project, copies)
    }

    fn write_project(&self, project: &Project) -> Result<()> {
        let Some(file) = project.paths.file() else {
            return Err(ProjectError::NoProjectFile);
        };

        let written = codec::write_document(project, &self.registry);
        let bytes = codec::document_to_bytes(&written.root, self.config.pretty)?;

        // Side-cars first; the document must not name a buffer file that is missing
        for (relative, data) in &written.side_cars {
            project.paths.save_project_file(relative, data)?;
        }

        if let Some(parent) = file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
        }
        std::fs::write(file, bytes).map_err(|e| ProjectError::io(file, e))?;

        tracing::info!(objects = self.registry.objects().len(), "Saved project {}", file.display());
        Ok(())
    }

    /// Resets the project directory to the current directory without a file
    pub fn reset_project_directory(&mut self) {
        self.project.paths = ProjectPaths::unsaved();
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.project.paths
    }

    /// Models loaded by the last successful open
    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    /// Diagnostics of the last successful open
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    pub fn load_project_file(&self, relative: &str) -> Result<String> {
        self.project.paths.load_project_file(relative)
    }

    pub fn load_project_file_bytes(&self, relative: &str) -> Result<Vec<u8>> {
        self.project.paths.load_project_file_bytes(relative)
    }

    pub fn save_project_file(&self, relative: &str, data: &[u8]) -> Result<()> {
        self.project.paths.save_project_file(relative, data)
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.project.paths.file_exists(relative)
    }

    pub fn to_absolute(&self, relative: &str) -> PathBuf {
        self.project.paths.to_absolute(relative)
    }

    pub fn to_project_relative<P: AsRef<Path>>(&self, path: P) -> String {
        self.project.paths.to_project_relative(path)
    }
}

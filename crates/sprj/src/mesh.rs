//! Mesh collaborators and the model cache
//!
//! Geometry generation and model-file decoding happen outside this crate. The
//! reader reaches them through `GeometryFactory` and `MeshLoader`, and shares
//! loaded models between items through a `ModelCache` that lives as long as
//! the project it was filled for.

use crate::model::{GeometryItem, GeometryShape};
use crate::paths::normalize_generic;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Opaque handle to a generated mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct MeshHandle(pub u32);

/// Builds meshes for geometry items
pub trait GeometryFactory {
    fn create_cube(&mut self, width: f32, height: f32, depth: f32) -> MeshHandle;
    fn create_circle(&mut self, radius_x: f32, radius_y: f32) -> MeshHandle;
    fn create_plane(&mut self, width: f32, height: f32) -> MeshHandle;
    fn create_sphere(&mut self, radius: f32) -> MeshHandle;
    fn create_triangle(&mut self, size: f32) -> MeshHandle;

    /// Builds the mesh for a geometry item from its shape and size
    ///
    /// Rectangles are unit planes; their size is applied through the transform.
    fn create(&mut self, item: &GeometryItem) -> MeshHandle {
        let [width, height, depth] = item.size;
        match item.shape {
            GeometryShape::Cube => self.create_cube(width, height, depth),
            GeometryShape::Circle => self.create_circle(width, height),
            GeometryShape::Plane => self.create_plane(width, height),
            GeometryShape::Rectangle => self.create_plane(1.0, 1.0),
            GeometryShape::Sphere => self.create_sphere(width),
            GeometryShape::Triangle => self.create_triangle(width),
        }
    }
}

/// Geometry factory that only hands out sequential handles
///
/// Every request is recorded as `(shape, arguments)` for inspection.
#[derive(Debug, Default)]
pub struct NullGeometryFactory {
    pub requests: Vec<(&'static str, Vec<f32>)>,
}

impl NullGeometryFactory {
    fn record(&mut self, shape: &'static str, args: Vec<f32>) -> MeshHandle {
        self.requests.push((shape, args));
        MeshHandle(self.requests.len() as u32)
    }
}

impl GeometryFactory for NullGeometryFactory {
    fn create_cube(&mut self, width: f32, height: f32, depth: f32) -> MeshHandle {
        self.record("cube", vec![width, height, depth])
    }

    fn create_circle(&mut self, radius_x: f32, radius_y: f32) -> MeshHandle {
        self.record("circle", vec![radius_x, radius_y])
    }

    fn create_plane(&mut self, width: f32, height: f32) -> MeshHandle {
        self.record("plane", vec![width, height])
    }

    fn create_sphere(&mut self, radius: f32) -> MeshHandle {
        self.record("sphere", vec![radius])
    }

    fn create_triangle(&mut self, size: f32) -> MeshHandle {
        self.record("triangle", vec![size])
    }
}

/// A model file loaded by a `MeshLoader`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMesh {
    /// Project-relative path the mesh was loaded from
    pub path: String,
    /// Loader-specific mesh payload
    pub data: Bytes,
}

/// Errors reported by mesh loaders
#[derive(Error, Debug)]
pub enum MeshLoadError {
    #[error("Failed to read model '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model '{}' is empty", .0.display())]
    Empty(PathBuf),

    #[error("Unsupported model '{}': {reason}", path.display())]
    Unsupported { path: PathBuf, reason: String },
}

/// Loads model files into meshes
pub trait MeshLoader {
    /// Loads the model at `path` (absolute); `relative` is its project-relative name
    fn load(&self, path: &Path, relative: &str) -> Result<LoadedMesh, MeshLoadError>;
}

/// Mesh loader that keeps the raw file bytes without decoding them
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMeshLoader;

impl MeshLoader for FileMeshLoader {
    fn load(&self, path: &Path, relative: &str) -> Result<LoadedMesh, MeshLoadError> {
        let data = std::fs::read(path).map_err(|source| MeshLoadError::Io { path: path.to_path_buf(), source })?;
        if data.is_empty() {
            return Err(MeshLoadError::Empty(path.to_path_buf()));
        }
        Ok(LoadedMesh { path: relative.to_string(), data: Bytes::from(data) })
    }
}

/// Deduplicated loaded models, keyed by normalized project-relative path
///
/// Failures are cached too, so each distinct path is loaded at most once.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: HashMap<String, Option<Arc<LoadedMesh>>>,
    order: Vec<String>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mesh for `relative`, loading it on first use
    ///
    /// # Arguments
    /// * `relative` - Project-relative model path (cache key)
    /// * `absolute` - Path handed to the loader
    /// * `loader` - Loader used on a cache miss
    ///
    /// # Returns
    /// The shared mesh, or the load error on the first failed attempt (later
    /// attempts for the same path return `Ok(None)` without retrying)
    pub fn get_or_load(&mut self, relative: &str, absolute: &Path, loader: &dyn MeshLoader) -> Result<Option<Arc<LoadedMesh>>, MeshLoadError> {
        let key = normalize_generic(relative);
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }

        self.order.push(key.clone());
        match loader.load(absolute, &key) {
            Ok(mesh) => {
                let mesh = Arc::new(mesh);
                self.entries.insert(key, Some(mesh.clone()));
                Ok(Some(mesh))
            }
            Err(err) => {
                self.entries.insert(key, None);
                Err(err)
            }
        }
    }

    /// Looks up a previously loaded mesh without loading
    pub fn get(&self, relative: &str) -> Option<Arc<LoadedMesh>> {
        self.entries.get(&normalize_generic(relative)).cloned().flatten()
    }

    /// Paths seen so far, in first-use order
    pub fn paths(&self) -> &[String] {
        &self.order
    }

    /// Re-keys every entry after the project's stored paths were rewritten
    ///
    /// `rekey` maps an old key to the path now stored in the project.
    pub fn rekey<F: Fn(&str) -> String>(&mut self, rekey: F) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries.into_iter().map(|(key, mesh)| (normalize_generic(&rekey(&key)), mesh)).collect();
        for key in &mut self.order {
            *key = normalize_generic(&rekey(key));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

//! Object registry interface
//!
//! The registry owns every scene object and the per-pass binding tables. The
//! document reader requests creations through it and the binding resolver
//! commits bindings through it; the writer reads a snapshot of it back.
//! `MemoryRegistry` is the in-process implementation used by the tools and
//! tests; a rendering backend provides its own implementation backed by GPU
//! resources.

use crate::model::{BufferObject, CubemapFaces, RenderTarget, SceneObject};
use serde::Serialize;
use std::collections::HashMap;

/// Opaque handle to a registry resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceHandle(pub u32);

impl ResourceHandle {
    /// Handle of the renderer's built-in output target
    pub const OUTPUT: ResourceHandle = ResourceHandle(u32::MAX);
}

/// Creation, lookup and binding of named scene objects
///
/// Every `create_*` call is idempotent: creating a name that already exists
/// returns the existing handle and leaves the object unchanged.
pub trait ObjectRegistry {
    /// Removes every object and binding
    fn clear(&mut self);

    fn create_texture(&mut self, path: &str) -> ResourceHandle;

    fn create_cubemap(&mut self, name: &str, faces: &CubemapFaces) -> ResourceHandle;

    fn create_render_target(&mut self, name: &str, target: &RenderTarget) -> ResourceHandle;

    /// Sets the pixel size of a render target
    fn resize(&mut self, name: &str, size: [u32; 2]);

    fn create_audio(&mut self, path: &str) -> ResourceHandle;

    fn create_buffer(&mut self, name: &str, buffer: &BufferObject) -> ResourceHandle;

    /// Looks up the handle of a named object
    fn handle(&self, name: &str) -> Option<ResourceHandle>;

    fn contains(&self, name: &str) -> bool {
        self.handle(name).is_some()
    }

    /// Handle of the built-in output target ("default target")
    fn output_target(&self) -> ResourceHandle {
        ResourceHandle::OUTPUT
    }

    /// Last render size, used to size ratio render targets
    fn output_size(&self) -> [u32; 2];

    /// Appends a texture-like object to a pass's texture binding table
    ///
    /// # Returns
    /// `false` if the object does not exist or is already bound to the pass
    fn bind(&mut self, name: &str, pass: &str) -> bool;

    /// Appends a buffer object to a pass's uniform binding table
    fn bind_uniform(&mut self, name: &str, pass: &str) -> bool;

    /// Snapshot of every object in creation order
    fn objects(&self) -> Vec<SceneObject>;

    /// Names bound to a pass's texture table, in slot order
    fn bind_list(&self, pass: &str) -> Vec<String>;

    /// Names bound to a pass's uniform table, in slot order
    fn uniform_bind_list(&self, pass: &str) -> Vec<String>;
}

/// Output size assumed before anything has been rendered
pub const DEFAULT_OUTPUT_SIZE: [u32; 2] = [800, 600];

#[derive(Debug, Clone)]
struct Entry {
    handle: ResourceHandle,
    object: SceneObject,
    pixel_size: Option<[u32; 2]>,
}

/// In-memory object registry
///
/// Handles are allocated sequentially starting at 1.
#[derive(Debug, Clone)]
pub struct MemoryRegistry {
    entries: Vec<Entry>,
    binds: HashMap<String, Vec<String>>,
    uniform_binds: HashMap<String, Vec<String>>,
    output_size: [u32; 2],
    next_handle: u32,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_SIZE)
    }
}

impl MemoryRegistry {
    pub fn new(output_size: [u32; 2]) -> Self {
        Self {
            entries: Vec::new(),
            binds: HashMap::new(),
            uniform_binds: HashMap::new(),
            output_size,
            next_handle: 1,
        }
    }

    /// Changes the output size; ratio render targets are not resized automatically
    pub fn set_output_size(&mut self, size: [u32; 2]) {
        self.output_size = size;
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.entries.iter().find(|e| e.object.name() == name).map(|e| &e.object)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.entries.iter_mut().find(|e| e.object.name() == name).map(|e| &mut e.object)
    }

    /// Pixel size of a render target, once it has been sized
    pub fn pixel_size(&self, name: &str) -> Option<[u32; 2]> {
        self.entries.iter().find(|e| e.object.name() == name).and_then(|e| e.pixel_size)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, object: SceneObject) -> ResourceHandle {
        if let Some(handle) = self.handle(object.name()) {
            return handle;
        }

        let handle = ResourceHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry { handle, object, pixel_size: None });
        handle
    }

    fn bind_into(table: &mut HashMap<String, Vec<String>>, name: &str, pass: &str) -> bool {
        let list = table.entry(pass.to_string()).or_default();
        if list.iter().any(|bound| bound == name) {
            return false;
        }
        list.push(name.to_string());
        true
    }
}

impl ObjectRegistry for MemoryRegistry {
    fn clear(&mut self) {
        self.entries.clear();
        self.binds.clear();
        self.uniform_binds.clear();
        self.next_handle = 1;
    }

    fn create_texture(&mut self, path: &str) -> ResourceHandle {
        self.insert(SceneObject::Texture { path: path.to_string() })
    }

    fn create_cubemap(&mut self, name: &str, faces: &CubemapFaces) -> ResourceHandle {
        self.insert(SceneObject::Cubemap { name: name.to_string(), faces: faces.clone() })
    }

    fn create_render_target(&mut self, name: &str, target: &RenderTarget) -> ResourceHandle {
        self.insert(SceneObject::RenderTarget { name: name.to_string(), target: target.clone() })
    }

    fn resize(&mut self, name: &str, size: [u32; 2]) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.object.name() == name) {
            entry.pixel_size = Some(size);
        }
    }

    fn create_audio(&mut self, path: &str) -> ResourceHandle {
        self.insert(SceneObject::Audio { path: path.to_string() })
    }

    fn create_buffer(&mut self, name: &str, buffer: &BufferObject) -> ResourceHandle {
        self.insert(SceneObject::Buffer { name: name.to_string(), buffer: buffer.clone() })
    }

    fn handle(&self, name: &str) -> Option<ResourceHandle> {
        self.entries.iter().find(|e| e.object.name() == name).map(|e| e.handle)
    }

    fn output_size(&self) -> [u32; 2] {
        self.output_size
    }

    fn bind(&mut self, name: &str, pass: &str) -> bool {
        let bindable = self.object(name).is_some_and(|object| !object.is_uniform());
        bindable && Self::bind_into(&mut self.binds, name, pass)
    }

    fn bind_uniform(&mut self, name: &str, pass: &str) -> bool {
        let bindable = self.object(name).is_some_and(SceneObject::is_uniform);
        bindable && Self::bind_into(&mut self.uniform_binds, name, pass)
    }

    fn objects(&self) -> Vec<SceneObject> {
        self.entries.iter().map(|e| e.object.clone()).collect()
    }

    fn bind_list(&self, pass: &str) -> Vec<String> {
        self.binds.get(pass).cloned().unwrap_or_default()
    }

    fn uniform_bind_list(&self, pass: &str) -> Vec<String> {
        self.uniform_binds.get(pass).cloned().unwrap_or_default()
    }
}

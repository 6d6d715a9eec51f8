//! Binding resolver
//!
//! A document lists bindings as `(object, pass, slot)` triples on each object,
//! and an object may be bound before its own definition has been read. The
//! reader therefore only records names in per-pass slot tables. `commit` then
//! creates every object first, binds every recorded slot second and finally
//! resolves each pass's render-target references to handles.

use crate::model::{Project, RenderTargetRef, SceneObject};
use crate::registry::{ObjectRegistry, ResourceHandle};

/// Highest slot index (exclusive) a document may bind to
pub const MAX_BINDING_SLOTS: usize = 1024;

/// Dense slot index -> object name table of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<Option<String>>,
}

impl SlotTable {
    /// Stores `name` at `slot`, growing the table and leaving new lower slots unbound
    ///
    /// # Returns
    /// `false` if `slot` is not below `MAX_BINDING_SLOTS`
    pub fn assign(&mut self, slot: usize, name: &str) -> bool {
        if slot >= MAX_BINDING_SLOTS {
            return false;
        }
        if self.slots.len() <= slot {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(name.to_string());
        true
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bound names in slot order, skipping empty slots
    pub fn bound(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(Option::as_deref)
    }
}

/// Slot tables recorded while reading, keyed by pass name in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingBindings {
    textures: Vec<(String, SlotTable)>,
    uniforms: Vec<(String, SlotTable)>,
}

impl PendingBindings {
    /// Records a texture-like binding (texture, cubemap, render target or audio)
    pub fn record_texture(&mut self, pass: &str, slot: usize, name: &str) -> bool {
        Self::table_mut(&mut self.textures, pass).assign(slot, name)
    }

    /// Records a uniform-buffer binding
    pub fn record_uniform(&mut self, pass: &str, slot: usize, name: &str) -> bool {
        Self::table_mut(&mut self.uniforms, pass).assign(slot, name)
    }

    pub fn textures(&self, pass: &str) -> Option<&SlotTable> {
        Self::table(&self.textures, pass)
    }

    pub fn uniforms(&self, pass: &str) -> Option<&SlotTable> {
        Self::table(&self.uniforms, pass)
    }

    /// Every pass name that has a recorded binding
    pub fn passes(&self) -> Vec<&str> {
        let mut passes: Vec<&str> = Vec::new();
        for (pass, _) in self.textures.iter().chain(&self.uniforms) {
            if !passes.contains(&pass.as_str()) {
                passes.push(pass);
            }
        }
        passes
    }

    fn table<'a>(tables: &'a [(String, SlotTable)], pass: &str) -> Option<&'a SlotTable> {
        tables.iter().find(|(name, _)| name == pass).map(|(_, table)| table)
    }

    fn table_mut<'a>(tables: &'a mut Vec<(String, SlotTable)>, pass: &str) -> &'a mut SlotTable {
        let index = match tables.iter().position(|(name, _)| name == pass) {
            Some(index) => index,
            None => {
                tables.push((pass.to_string(), SlotTable::default()));
                tables.len() - 1
            }
        };
        &mut tables[index].1
    }
}

/// Creates every requested object and sizes render targets
///
/// Ratio-sized render targets are sized against the registry's current output size.
pub fn create_objects(registry: &mut dyn ObjectRegistry, creations: &[SceneObject]) {
    for object in creations {
        match object {
            SceneObject::Texture { path } => {
                registry.create_texture(path);
            }
            SceneObject::Cubemap { name, faces } => {
                registry.create_cubemap(name, faces);
            }
            SceneObject::RenderTarget { name, target } => {
                registry.create_render_target(name, target);
                let size = target.size.calculate(registry.output_size());
                registry.resize(name, size);
            }
            SceneObject::Audio { path } => {
                registry.create_audio(path);
            }
            SceneObject::Buffer { name, buffer } => {
                registry.create_buffer(name, buffer);
            }
        }
    }
}

/// Binds every recorded slot, skipping empty ones
///
/// Passes are visited in project order, each binding its texture table before
/// its uniform-buffer table. Bindings naming a pass that does not exist are
/// dropped.
pub fn bind_pending(registry: &mut dyn ObjectRegistry, project: &Project, bindings: &PendingBindings) {
    for pass in bindings.passes() {
        if project.pass(pass).is_none() {
            tracing::debug!("Dropping bindings for unknown pass '{pass}'");
        }
    }

    for pass in &project.passes {
        if let Some(table) = bindings.textures(&pass.name) {
            for name in table.bound() {
                if !registry.bind(name, &pass.name) {
                    tracing::debug!("Could not bind '{name}' to pass '{}'", pass.name);
                }
            }
        }
        if let Some(table) = bindings.uniforms(&pass.name) {
            for name in table.bound() {
                if !registry.bind_uniform(name, &pass.name) {
                    tracing::debug!("Could not bind buffer '{name}' to pass '{}'", pass.name);
                }
            }
        }
    }
}

/// Resolves every pass's render-target references to registry handles
///
/// A pass without references renders to the output target. Names the registry
/// does not know resolve to `None`.
pub fn resolve_render_targets(registry: &dyn ObjectRegistry, project: &mut Project) {
    for pass in &mut project.passes {
        if pass.render_targets.is_empty() {
            pass.render_target_handles = vec![Some(registry.output_target())];
            continue;
        }

        pass.render_target_handles = pass
            .render_targets
            .iter()
            .map(|target| match target {
                RenderTargetRef::Default => Some(registry.output_target()),
                RenderTargetRef::Named(name) => {
                    let handle: Option<ResourceHandle> = registry.handle(name);
                    if handle.is_none() {
                        tracing::warn!("Pass '{}' renders to unknown target '{name}'", pass.name);
                    }
                    handle
                }
            })
            .collect();
    }
}

/// Replaces the registry's contents with a parsed project's objects and bindings
pub fn commit(registry: &mut dyn ObjectRegistry, project: &mut Project, creations: &[SceneObject], bindings: &PendingBindings) {
    registry.clear();
    create_objects(registry, creations);
    bind_pending(registry, project, bindings);
    resolve_render_targets(registry, project);
}

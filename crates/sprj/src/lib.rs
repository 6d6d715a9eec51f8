//! Shader project persistence
//!
//! This crate reads and writes shader-pipeline project documents. It parses
//! both the legacy v1 layout and the current v2 layout into one in-memory
//! model, resolves object bindings independently of declaration order, and
//! writes the model back as v2. Rendering back ends plug in through the
//! `ObjectRegistry`, `GeometryFactory` and `MeshLoader` traits.

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod manager;
pub mod mesh;
pub mod model;
pub mod paths;
pub mod registry;
pub mod render_state;
pub mod resolver;
pub mod variables;

pub use config::CodecConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{ProjectError, Result};
pub use manager::ProjectManager;
pub use mesh::{FileMeshLoader, GeometryFactory, MeshLoader, ModelCache, NullGeometryFactory};
pub use model::Project;
pub use paths::ProjectPaths;
pub use registry::{MemoryRegistry, ObjectRegistry, ResourceHandle};
pub use variables::{ShaderVariable, VariableStore};

//! In-memory pipeline model
//!
//! This module provides the project tree that the document readers produce and
//! the writer and binding resolver consume: passes with their items, variables
//! and macros, the scene objects passes bind by name, and the UI settings
//! entries saved alongside the pipeline.

mod objects;
mod pipeline;
mod settings;

pub use objects::*;
pub use pipeline::*;
pub use settings::*;

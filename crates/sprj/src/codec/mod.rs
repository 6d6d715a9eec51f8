//! Project document codec
//!
//! Projects are XML documents rooted at `<project version="N">`. Version 1 is
//! the legacy layout and is only read; version 2 is both read and written.
//! Reading never touches live state: it yields a `ParsedProject` holding the
//! new model plus the object creations and slot bindings the binding resolver
//! applies when the project is committed.

mod reader;
mod values;
mod writer;
mod xml;

pub use reader::{ParsedProject, ReadServices};
pub use writer::{WrittenDocument, write_document};

use crate::error::{ProjectError, Result};
use crate::paths::ProjectPaths;
use reader::Reader;
use xmltree::{Element, EmitterConfig};

/// Schema version produced by the writer
pub const SCHEMA_VERSION: i64 = 2;

/// Project-relative path of a buffer's side-car file
pub fn buffer_file(name: &str) -> String {
    format!("buffers/{name}.buf")
}

/// Parses document bytes into an element tree
pub fn parse_document(bytes: &[u8]) -> Result<Element> {
    Ok(Element::parse(bytes)?)
}

/// Returns the schema version declared by a `<project>` root
///
/// A missing `version` attribute means version 1; a value that is not an
/// integer is reported as version 0.
pub fn schema_version(root: &Element) -> Result<i64> {
    if root.name != "project" {
        return Err(ProjectError::UnexpectedRoot(root.name.clone()));
    }
    Ok(xml::attr(root, "version").map_or(1, |version| version.trim().parse().unwrap_or(0)))
}

/// Reads a project document into a fresh, uncommitted model
///
/// # Arguments
/// * `root` - The parsed document
/// * `paths` - Location of the project file; relative paths resolve against its root
/// * `services` - Geometry factory and mesh loader used to build items
///
/// # Returns
/// The parsed project, or `UnsupportedSchemaVersion` before anything is read
pub fn read_document(root: &Element, paths: ProjectPaths, services: ReadServices<'_>) -> Result<ParsedProject> {
    let version = schema_version(root)?;
    let mut reader = Reader::new(paths, services);
    match version {
        1 => reader.read_v1(root),
        2 => reader.read_v2(root),
        other => return Err(ProjectError::UnsupportedSchemaVersion(other)),
    }
    Ok(reader.finish())
}

/// Serializes a document tree
pub fn document_to_bytes(root: &Element, pretty: bool) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    root.write_with_config(&mut bytes, EmitterConfig::new().perform_indent(pretty))?;
    Ok(bytes)
}

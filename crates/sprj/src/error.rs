//! Error types
//!
//! Fatal project errors abort an open or save. They are always raised before
//! the live project, registry, model cache or diagnostics list is touched.
//! Recoverable problems (missing shader files, models that fail to load) are
//! reported as `Diagnostic`s instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or saving a project
#[derive(Error, Debug)]
pub enum ProjectError {
    /// A project, side-car or configuration file could not be read or written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML
    #[error("Malformed project document: {0}")]
    DocumentParse(#[from] xmltree::ParseError),

    /// The document root is not a `<project>` element
    #[error("Expected a <project> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// The document declares a schema version this reader does not understand
    #[error("Unsupported project schema version {0}")]
    UnsupportedSchemaVersion(i64),

    /// The document could not be serialized
    #[error("Failed to write project document: {0}")]
    DocumentWrite(#[from] xmltree::Error),

    /// `save` was called on a project without a file (e.g. a template)
    #[error("Project has no file to save to")]
    NoProjectFile,

    /// A configuration file is not valid YAML for `CodecConfig`
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_norway::Error),
}

impl ProjectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Returns true for malformed-document errors
    pub fn is_document_parse_error(&self) -> bool {
        matches!(self, Self::DocumentParse(_) | Self::UnexpectedRoot(_))
    }
}

/// Alias for `Result<T, ProjectError>`.
pub type Result<T> = std::result::Result<T, ProjectError>;

//! Non-fatal load diagnostics

use serde::Serialize;
use std::fmt;

/// Kind of a recoverable problem found while reading a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A shader source or model file referenced by the project is missing
    MissingResourceFile,
    /// The mesh loader failed on a model item
    ModelLoadFailure,
    /// A value was malformed and replaced by its default
    InvalidValue,
}

/// One recoverable problem, attributed to the pass that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the owning pass (or object)
    pub owner: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.owner, self.message)
    }
}

/// Ordered, clearable list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, owner: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic { kind, owner: owner.into(), message: message.into() };
        tracing::debug!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics of one kind, in order
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

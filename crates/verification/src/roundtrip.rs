//! Save/reload round trip
//!
//! Loads a project, saves it into a scratch directory and loads the copy
//! again, then compares both loads.

use crate::compare::{CompareResult, compare_projects, compare_registries};
use sprj::{CodecConfig, ProjectError, ProjectManager};
use std::path::Path;
use thiserror::Error;

/// Errors that keep a round trip from completing
#[derive(Error, Debug)]
pub enum RoundTripError {
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Outcome of one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub project: CompareResult,
    pub registry: CompareResult,
    /// Diagnostics raised by the original load and by the reload
    pub diagnostics: [usize; 2],
}

impl RoundTripReport {
    pub fn is_match(&self) -> bool {
        self.project.is_match() && self.registry.is_match()
    }
}

/// Runs a save/reload round trip on a project file
///
/// The copy is written without copying shaders, so its shader and model paths
/// point back at the original files.
pub fn round_trip<P: AsRef<Path>>(path: P, config: &CodecConfig) -> Result<RoundTripReport, RoundTripError> {
    let path = path.as_ref();
    let scratch = tempfile::tempdir().map_err(RoundTripError::Scratch)?;
    let file_name = path.file_name().unwrap_or(std::ffi::OsStr::new("project.sprj"));
    let copy = scratch.path().join(file_name);

    let mut original = ProjectManager::headless(config.clone());
    original.open(path)?;
    let expected = original.project().clone();
    original.save_as(&copy, false)?;
    tracing::debug!("Saved round-trip copy to {}", copy.display());

    let mut reloaded = ProjectManager::headless(config.clone());
    reloaded.open(&copy)?;

    Ok(RoundTripReport {
        project: compare_projects(&expected, reloaded.project()),
        registry: compare_registries(original.registry(), reloaded.registry(), &expected.passes),
        diagnostics: [original.diagnostics().len(), reloaded.diagnostics().len()],
    })
}

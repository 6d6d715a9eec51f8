//! Project comparison utilities for verification
//!
//! This module provides functions for comparing a project and its registry
//! against a reloaded copy to verify that saving loses nothing.

use sprj::model::{ItemKind, Project, ShaderPass, ShaderStageKind};
use sprj::{ObjectRegistry, ProjectPaths};

/// Result of comparing two projects or registries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareResult {
    /// Both sides match
    Match,
    /// The projects have a different number of passes
    PassCountMismatch { expected: usize, actual: usize },
    /// A pass differs; each flag tells whether that part matched
    PassMismatch {
        pass: String,
        stages_matched: bool,
        targets_matched: bool,
        variables_matched: bool,
        macros_matched: bool,
        items_matched: bool,
        item_values_matched: bool,
    },
    /// The settings lists differ
    SettingsMismatch,
    /// The registries hold different objects (names in creation order)
    ObjectMismatch { expected: Vec<String>, actual: Vec<String> },
    /// A pass's texture or uniform-buffer bind list differs
    BindingMismatch { pass: String, expected: Vec<String>, actual: Vec<String> },
}

impl CompareResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Expresses a stored path relative to `base`, after resolving it against `own`
fn resolved(path: &str, own: &ProjectPaths, base: &ProjectPaths) -> String {
    if path.is_empty() { String::new() } else { base.to_project_relative(own.to_absolute(path)) }
}

/// Copies a pass with every file path re-expressed against `base` and meshes dropped
///
/// Mesh handles depend on the factory that produced them, so only the
/// presence of a loaded model is kept.
fn normalized(pass: &ShaderPass, own: &ProjectPaths, base: &ProjectPaths) -> (ShaderPass, Vec<bool>) {
    let mut pass = pass.clone();
    for kind in [ShaderStageKind::Vertex, ShaderStageKind::Pixel, ShaderStageKind::Geometry] {
        let stage = pass.stage_mut(kind);
        stage.path = resolved(&stage.path, own, base);
    }

    let mut loaded = Vec::new();
    for item in &mut pass.items {
        match &mut item.kind {
            ItemKind::Geometry(geometry) => geometry.mesh = None,
            ItemKind::Model(model) => {
                model.path = resolved(&model.path, own, base);
                loaded.push(model.mesh.take().is_some());
            }
            ItemKind::RenderState(_) => {}
        }
    }
    (pass, loaded)
}

/// Compares two projects pass by pass
///
/// File paths are compared by the file they point at, so a copy saved to a
/// different directory matches its source.
///
/// # Arguments
/// * `expected` - The project as originally loaded
/// * `actual` - The project after a save and reload
///
/// # Returns
/// The first difference found, or `CompareResult::Match`
pub fn compare_projects(expected: &Project, actual: &Project) -> CompareResult {
    if expected.passes.len() != actual.passes.len() {
        return CompareResult::PassCountMismatch { expected: expected.passes.len(), actual: actual.passes.len() };
    }

    let base = &expected.paths;
    for (expected_pass, actual_pass) in expected.passes.iter().zip(&actual.passes) {
        let (lhs, lhs_loaded) = normalized(expected_pass, &expected.paths, base);
        let (rhs, rhs_loaded) = normalized(actual_pass, &actual.paths, base);

        let stages_matched = lhs.name == rhs.name && lhs.vertex == rhs.vertex && lhs.pixel == rhs.pixel && lhs.geometry == rhs.geometry && lhs.geometry_used == rhs.geometry_used;
        let targets_matched = lhs.render_targets == rhs.render_targets && lhs.render_target_handles == rhs.render_target_handles;
        let variables_matched = lhs.variables == rhs.variables;
        let macros_matched = lhs.macros == rhs.macros;
        let items_matched = lhs.items == rhs.items && lhs_loaded == rhs_loaded;
        // Overrides of removed items are not saved
        let kept: Vec<_> = lhs.item_values.iter().filter(|value| value.item.is_some()).collect();
        let item_values_matched = kept == rhs.item_values.iter().collect::<Vec<_>>();

        if !(stages_matched && targets_matched && variables_matched && macros_matched && items_matched && item_values_matched && lhs.collapsed == rhs.collapsed) {
            return CompareResult::PassMismatch {
                pass: expected_pass.name.clone(),
                stages_matched,
                targets_matched,
                variables_matched,
                macros_matched,
                items_matched,
                item_values_matched,
            };
        }
    }

    if expected.settings != actual.settings {
        return CompareResult::SettingsMismatch;
    }

    CompareResult::Match
}

/// Compares the objects and per-pass bind lists of two registries
///
/// # Arguments
/// * `expected` - Registry of the original load
/// * `actual` - Registry after a save and reload
/// * `passes` - Passes whose bind lists are compared
pub fn compare_registries(expected: &dyn ObjectRegistry, actual: &dyn ObjectRegistry, passes: &[ShaderPass]) -> CompareResult {
    let expected_objects = expected.objects();
    let actual_objects = actual.objects();
    if expected_objects != actual_objects {
        return CompareResult::ObjectMismatch {
            expected: expected_objects.iter().map(|object| object.name().to_string()).collect(),
            actual: actual_objects.iter().map(|object| object.name().to_string()).collect(),
        };
    }

    for pass in passes {
        for (lhs, rhs) in [
            (expected.bind_list(&pass.name), actual.bind_list(&pass.name)),
            (expected.uniform_bind_list(&pass.name), actual.uniform_bind_list(&pass.name)),
        ] {
            if lhs != rhs {
                return CompareResult::BindingMismatch { pass: pass.name.clone(), expected: lhs, actual: rhs };
            }
        }
    }

    CompareResult::Match
}

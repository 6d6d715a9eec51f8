//! Project-relative path handling
//!
//! Every path stored in a project is relative to the directory of the project
//! file and uses forward slashes. `ProjectPaths` converts between those stored
//! paths and real filesystem paths, and reads or writes auxiliary files next to
//! the project.

use crate::error::{ProjectError, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Replaces backslashes with forward slashes
pub fn to_generic(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lexically normalizes a stored path into its generic form
///
/// Drops `.` components and duplicate separators, and resolves `..` against
/// the preceding component.
pub fn normalize_generic(path: &str) -> String {
    to_generic(&normalize(Path::new(&to_generic(path))).to_string_lossy())
}

/// Location of the open project file and its root directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
    file: Option<PathBuf>,
    root: PathBuf,
}

impl ProjectPaths {
    /// Paths for a project file; the root is the file's directory
    pub fn for_file<P: AsRef<Path>>(file: P) -> Self {
        let file = file.as_ref().to_path_buf();
        let root = file.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { file: Some(file), root }
    }

    /// Paths for an unsaved project rooted at the current directory
    pub fn unsaved() -> Self {
        Self { file: None, root: std::env::current_dir().unwrap_or_default() }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drops the file path while keeping the root
    pub fn forget_file(&mut self) {
        self.file = None;
    }

    /// Resolves a stored path against the project root
    pub fn to_absolute(&self, relative: &str) -> PathBuf {
        let path = Path::new(relative);
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }

    /// Expresses a filesystem path relative to the project root
    ///
    /// Paths on a different root (e.g. another drive) are returned as-is.
    pub fn to_project_relative<P: AsRef<Path>>(&self, path: P) -> String {
        let target = normalize(&absolutize(path.as_ref()));
        let base = normalize(&absolutize(&self.root));
        let relative = relative_to(&target, &base).unwrap_or(target);
        to_generic(&relative.to_string_lossy())
    }

    /// Re-expresses a path stored relative to this root relative to another root
    pub fn rebase(&self, relative: &str, new_paths: &ProjectPaths) -> String {
        if relative.is_empty() {
            return String::new();
        }
        new_paths.to_project_relative(self.to_absolute(relative))
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        !relative.is_empty() && self.to_absolute(relative).is_file()
    }

    /// Reads a project file as text
    pub fn load_project_file(&self, relative: &str) -> Result<String> {
        let path = self.to_absolute(relative);
        std::fs::read_to_string(&path).map_err(|e| ProjectError::io(path, e))
    }

    /// Reads a project file as raw bytes
    pub fn load_project_file_bytes(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.to_absolute(relative);
        std::fs::read(&path).map_err(|e| ProjectError::io(path, e))
    }

    /// Writes a project file, creating missing parent directories
    pub fn save_project_file(&self, relative: &str, data: &[u8]) -> Result<()> {
        let path = self.to_absolute(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
        }
        std::fs::write(&path, data).map_err(|e| ProjectError::io(path, e))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    let path = if path.as_os_str().is_empty() { Path::new(".") } else { path };
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically removes `.` and resolves `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_none() || !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();

    // Check that both paths share a root
    if target.first() != base.first() {
        return None;
    }

    let common = target.iter().zip(base.iter()).take_while(|(a, b)| a == b).count();
    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_file_directory() {
        let paths = ProjectPaths::for_file("/work/demo/project.sprj");
        assert_eq!(paths.root(), Path::new("/work/demo"));
        assert_eq!(paths.file(), Some(Path::new("/work/demo/project.sprj")));
        assert_eq!(paths.to_absolute("shaders/a.glsl"), PathBuf::from("/work/demo/shaders/a.glsl"));
    }

    #[test]
    fn test_project_relative() {
        let paths = ProjectPaths::for_file("/work/demo/project.sprj");
        assert_eq!(paths.to_project_relative("/work/demo/shaders/a.glsl"), "shaders/a.glsl");
        assert_eq!(paths.to_project_relative("/work/other/b.png"), "../other/b.png");
        assert_eq!(paths.to_project_relative("/work/demo/./x/../c.obj"), "c.obj");
    }

    #[test]
    fn test_rebase() {
        let old = ProjectPaths::for_file("/work/demo/project.sprj");
        let new = ProjectPaths::for_file("/work/demo/copy/project.sprj");
        assert_eq!(old.rebase("shaders/a.glsl", &new), "../shaders/a.glsl");
        assert_eq!(old.rebase("", &new), "");
    }

    #[test]
    fn test_generic_paths() {
        assert_eq!(to_generic("shaders\\sub\\a.hlsl"), "shaders/sub/a.hlsl");
        assert_eq!(normalize_generic("models/./a.obj"), "models/a.obj");
        assert_eq!(normalize_generic("x/../models//a.obj"), "models/a.obj");
        assert_eq!(normalize_generic("./models\\a.obj"), "models/a.obj");
        assert_eq!(normalize_generic("../../shared/a.obj"), "../../shared/a.obj");
    }

    #[test]
    fn test_project_file_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::for_file(dir.path().join("project.sprj"));

        assert!(!paths.file_exists("buffers/Data.buf"));
        paths.save_project_file("buffers/Data.buf", &[1, 2, 3]).unwrap();
        assert!(paths.file_exists("buffers/Data.buf"));
        assert_eq!(paths.load_project_file_bytes("buffers/Data.buf").unwrap(), vec![1, 2, 3]);
        assert!(matches!(paths.load_project_file("missing.txt"), Err(ProjectError::Io { .. })));
    }
}

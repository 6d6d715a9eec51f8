//! Codec configuration
//!
//! Settings that influence how projects are opened and saved, loaded from a
//! YAML file. Every field has a default, so an empty file (or no file at all)
//! is a valid configuration.

use crate::error::{ProjectError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options for opening and saving projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// File extensions treated as HLSL when shader files are copied
    ///
    /// The first entry is the extension given to copied HLSL files.
    pub hlsl_extensions: Vec<String>,
    /// Directory holding project templates
    pub templates_dir: PathBuf,
    /// Template opened by `ProjectManager::open_template`
    pub default_template: String,
    /// Indent the written project document
    pub pretty: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            hlsl_extensions: vec!["hlsl".to_string()],
            templates_dir: PathBuf::from("templates"),
            default_template: "GLSL".to_string(),
            pretty: true,
        }
    }
}

impl CodecConfig {
    /// Parses a configuration from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml_content)?)
    }

    /// Parses a configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Returns true if `path` has one of the configured HLSL extensions
    pub fn is_hlsl(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.hlsl_extensions.iter().any(|hlsl| hlsl.eq_ignore_ascii_case(ext)))
    }

    /// Extension given to a copied shader file
    pub fn copied_shader_extension(&self, path: &str) -> &str {
        match self.hlsl_extensions.first() {
            Some(first) if self.is_hlsl(path) => first,
            _ => "glsl",
        }
    }

    /// Path of the default template's project file
    pub fn template_file(&self) -> PathBuf {
        self.templates_dir.join(&self.default_template).join("template.sprj")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
hlsl_extensions: ["hlsl", "fx"]
pretty: false
"#;
        let config = CodecConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.hlsl_extensions, vec!["hlsl", "fx"]);
        assert!(!config.pretty);
        assert_eq!(config.default_template, "GLSL");
        assert_eq!(config.template_file(), PathBuf::from("templates").join("GLSL").join("template.sprj"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(CodecConfig::from_yaml("{}").unwrap(), CodecConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(CodecConfig::from_yaml("pretty: [1, 2"), Err(ProjectError::Config(_))));
    }

    #[test]
    fn test_copied_shader_extension() {
        let config = CodecConfig { hlsl_extensions: vec!["hlsl".into(), "fx".into()], ..Default::default() };
        assert_eq!(config.copied_shader_extension("shaders/a.FX"), "hlsl");
        assert_eq!(config.copied_shader_extension("shaders/a.glsl"), "glsl");
        assert_eq!(config.copied_shader_extension("shaders/a.vert"), "glsl");
    }
}

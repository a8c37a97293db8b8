//! Configuration parsing and validation
//!
//! This module handles loading and validating LinkLang project files.
//!
//! # Configuration Files
//!
//! - `linklang.yaml` - Project root configuration
//! - `<sources>/*.chain` - Chain programs compiled by the CLI

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name looked up when a directory is given to [`Config::load`]
pub const CONFIG_FILE: &str = "linklang.yaml";

/// Root project configuration from `linklang.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory holding `.chain` sources, relative to the project root
    #[serde(default = "default_sources")]
    pub sources: String,

    /// Directory receiving generated modules, relative to the project root
    #[serde(default = "default_output")]
    pub output: String,

    /// Runtime the generated code targets
    #[serde(default)]
    pub target: TargetConfig,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_sources() -> String {
    "chains".to_string()
}

fn default_output() -> String {
    "dist".to_string()
}

/// Runtime target settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    /// Module specifier the generated import statement points at
    #[serde(default = "default_runtime_module")]
    pub runtime_module: String,

    /// Name of the asynchronous pipeline invocation method
    #[serde(default = "default_invoke_method")]
    pub invoke_method: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            runtime_module: default_runtime_module(),
            invoke_method: default_invoke_method(),
        }
    }
}

/// Default runtime module specifier
pub fn default_runtime_module() -> String {
    "../dist/tinychain.esm.js".to_string()
}

/// Default pipeline invocation method
pub fn default_invoke_method() -> String {
    "async_invoke".to_string()
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Base path of the project
    pub base_path: PathBuf,
}

impl Config {
    /// Load configuration from a directory or a `linklang.yaml` path
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-project")?;
    /// println!("Project: {}", config.project.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join(CONFIG_FILE), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project = Self::parse(&contents)?;
        tracing::debug!(project = %project.name, path = %config_path.display(), "loaded configuration");

        Ok(Self { project, base_path })
    }

    /// Parse and validate project YAML
    pub fn parse(yaml: &str) -> Result<ProjectConfig> {
        let project: ProjectConfig = serde_yaml::from_str(yaml)?;

        if project.target.runtime_module.trim().is_empty() {
            return Err(Error::ConfigInvalid {
                message: "target.runtime_module must not be empty".to_string(),
            });
        }
        if project.target.invoke_method.trim().is_empty() {
            return Err(Error::ConfigInvalid {
                message: "target.invoke_method must not be empty".to_string(),
            });
        }

        Ok(project)
    }

    /// Absolute-ish path of the sources directory
    pub fn sources_dir(&self) -> PathBuf {
        self.base_path.join(&self.project.sources)
    }

    /// Absolute-ish path of the output directory
    pub fn output_dir(&self) -> PathBuf {
        self.base_path.join(&self.project.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse("name: test-project\n").unwrap();
        assert_eq!(config.name, "test-project");
        assert_eq!(config.version, "0.1.0");
        assert_eq!(config.sources, "chains");
        assert_eq!(config.output, "dist");
        assert_eq!(config.target, TargetConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
name: assistant
version: "1.2.0"
sources: src/chains
output: build
target:
  runtime_module: "tinychain"
  invoke_method: invoke
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.version, "1.2.0");
        assert_eq!(config.sources, "src/chains");
        assert_eq!(config.target.runtime_module, "tinychain");
        assert_eq!(config.target.invoke_method, "invoke");
    }

    #[test]
    fn test_empty_runtime_module_is_invalid() {
        let yaml = "name: x\ntarget:\n  runtime_module: \"\"\n";
        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let err = Config::parse("version: \"1.0\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "name: demo\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.sources_dir(), dir.path().join("chains"));
        assert_eq!(config.output_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "name: demo\nsources: programs\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_path, dir.path());
        assert_eq!(config.sources_dir(), dir.path().join("programs"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }
}

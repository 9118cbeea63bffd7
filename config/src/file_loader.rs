//! # Configuration File Loading
//!
//! Reads a TOML or YAML file into a [`ConfigLayer`]. The format follows the
//! file extension. Fields the file leaves out stay unset so the environment
//! and defaults still apply to them.

use crate::layer::ConfigLayer;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigFileError::FileNotFound(path.to_path_buf()),
        _ => ConfigFileError::Read {
            path: path.to_path_buf(),
            source
        }
    })
}

/// Load a configuration layer from a TOML file.
pub fn load_from_toml(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    Ok(toml::from_str(&read(path)?)?)
}

/// Load a configuration layer from a YAML file.
///
/// An empty document is an empty layer.
pub fn load_from_yaml(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let contents = read(path)?;
    if contents.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    Ok(serde_yaml::from_str(&contents)?)
}

/// Load a configuration layer from file with auto-detection.
///
/// # M-CANONICAL-DOCS
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml`: YAML format
/// - `.yml`: YAML format
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_file;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let layer = load_from_file(Path::new("taskpilot.toml"))?;
///     println!("Retries set by file: {:?}", layer.retry.max_retries);
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `ConfigFileError` for:
/// - Missing file, or any other read failure with its `io::Error` kept as source
/// - Missing or unsupported extension
/// - Parse errors for the detected format
pub fn load_from_file(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string()))
    }
}

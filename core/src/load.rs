//! Loading declaration trees from JSON or YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! name: app
//! version: "1.2.0"
//! options:
//!   - name: help
//!     shortName: h
//!     type: boolean
//! subcommands:
//!   - name: deploy
//!     aliases: [d]
//!     options:
//!       - name: env
//!         type: string
//!         choices: [dev, staging]
//!     arguments:
//!       - name: target
//!         type: string
//!         required: true
//! ```

use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

use crate::CommandNode;

/// Errors that can occur while loading a declaration tree.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is not `.json`, `.yaml` or `.yml`.
    #[error("unsupported declaration format: {0}")]
    UnsupportedFormat(String),
}

/// Loads a declaration tree, choosing the format by file extension.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for unknown extensions,
/// [`LoadError::IoError`] if the file cannot be read, and a JSON or YAML
/// error if parsing fails.
pub fn load_tree(path: impl AsRef<Path>) -> Result<CommandNode, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        "yaml" | "yml" => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            Ok(serde_yaml::from_reader(reader)?)
        }
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn from_json_str(input: &str) -> Result<CommandNode, LoadError> {
    Ok(serde_json::from_str(input)?)
}

pub fn from_yaml_str(input: &str) -> Result<CommandNode, LoadError> {
    Ok(serde_yaml::from_str(input)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{OptionKind, Value};

    fn sample_yaml() -> &'static str {
        r#"
name: app
version: "1.2.0"
options:
  - name: help
    shortName: h
    type: boolean
subcommands:
  - name: deploy
    aliases: [d]
    options:
      - name: env
        type: string
        choices: [dev, staging]
        default: dev
      - name: tag
        type: array
    arguments:
      - name: target
        type: string
        required: true
"#
    }

    #[test]
    fn test_from_yaml_str_complete() {
        let root = from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(root.name, "app");
        assert_eq!(root.version.as_deref(), Some("1.2.0"));
        assert!(root.options[0].is_boolean());

        let deploy = root.find_subcommand("d").unwrap();
        assert_eq!(deploy.options.len(), 2);
        assert_eq!(deploy.options[0].default_value(), Some(Value::from("dev")));
        assert!(matches!(deploy.options[1].kind, OptionKind::Array { .. }));
        assert!(deploy.arguments[0].required);
        assert!(deploy.execute.is_none());
    }

    #[test]
    fn test_from_json_str_minimal() {
        let root = from_json_str(r#"{"name": "tool"}"#).unwrap();
        assert_eq!(root.name, "tool");
        assert!(root.options.is_empty());
        assert!(root.subcommands.is_empty());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = from_json_str(r#"{"name": "tool", "options": [{"name": "n", "type": "number"}]}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::JsonError(_)));
    }

    #[test]
    fn test_load_tree_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("tree.yml");
        std::fs::File::create(&yaml_path)
            .unwrap()
            .write_all(sample_yaml().as_bytes())
            .unwrap();
        assert_eq!(load_tree(&yaml_path).unwrap().name, "app");

        let root = from_yaml_str(sample_yaml()).unwrap();
        let json_path = dir.path().join("tree.json");
        std::fs::write(&json_path, serde_json::to_string_pretty(&root).unwrap()).unwrap();
        let reloaded = load_tree(&json_path).unwrap();
        assert_eq!(reloaded.subcommands[0].options, root.subcommands[0].options);

        let toml_path = dir.path().join("tree.toml");
        std::fs::write(&toml_path, "name = 'app'").unwrap();
        assert!(matches!(
            load_tree(&toml_path),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_tree_missing_file() {
        let err = load_tree("/nonexistent/tree.json").unwrap_err();
        assert!(matches!(err, LoadError::IoError(_)));
    }
}

//! Structured document parsing for TOML and JSON files.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Document formats understood by the loaders, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl Format {
    /// Extensions searched, in lookup order.
    pub const ALL: [Self; 2] = [Self::Toml, Self::Json];

    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }

    /// Detect the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

/// Load a TOML config file, returning the type's empty form when the file
/// does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        // Return empty config for missing files by deserializing empty TOML
        return toml::from_str("").context("Failed to create empty config");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Parse `content` in the given format.
///
/// Returns the parser's message on failure so callers can wrap it in their
/// own typed error.
///
/// # Errors
///
/// Returns the parser message if `content` is not a valid document of type `T`.
pub fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: Format,
) -> std::result::Result<T, String> {
    match format {
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    struct Sample {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            Format::from_path(&PathBuf::from("shell.toml")),
            Some(Format::Toml)
        );
        assert_eq!(
            Format::from_path(&PathBuf::from("shell.json")),
            Some(Format::Json)
        );
        assert_eq!(Format::from_path(&PathBuf::from("shell.yaml")), None);
        assert_eq!(Format::from_path(&PathBuf::from("shell")), None);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sample: Sample = load_config(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"dev\"\n").unwrap();
        let sample: Sample = load_config(&path).unwrap();
        assert_eq!(sample.name, "dev");
    }

    #[test]
    fn load_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = [").unwrap();
        let result: Result<Sample> = load_config(&path);
        assert!(result.is_err());
    }

    #[test]
    fn parse_json_document() {
        let sample: Sample = parse_document(r#"{"name": "dev"}"#, Format::Json).unwrap();
        assert_eq!(sample.name, "dev");
    }

    #[test]
    fn parse_error_carries_message() {
        let err = parse_document::<Sample>("{", Format::Json).unwrap_err();
        assert!(!err.is_empty());
    }
}

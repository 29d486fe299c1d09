//! Generic TOML configuration loading.
//!
//! Crates define their own `serde`-deserializable config structs and use
//! [`load_toml_str`] / [`load_toml_path`] to read them, so that parse and I/O
//! failures surface as one [`ConfigError`] type.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::env::MissingEnvVarError;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config text is not valid TOML for the target type.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds values the application cannot use.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parse a config value of type `T` from a TOML string.
pub fn load_toml_str<T: DeserializeOwned>(text: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Read a TOML file from disk and parse it into `T`.
pub fn load_toml_path<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_toml_str(&text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        retries: u32,
    }

    #[test]
    fn parses_from_str() {
        let s: Sample = load_toml_str("name = \"demo\"\nretries = 3").unwrap();
        assert_eq!(
            s,
            Sample {
                name: "demo".into(),
                retries: 3
            }
        );
    }

    #[test]
    fn parse_error_is_reported() {
        let err = load_toml_str::<Sample>("retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"").unwrap();

        let s: Sample = load_toml_path(file.path()).unwrap();
        assert_eq!(s.name, "from-file");
        assert_eq!(s.retries, 0);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_toml_path::<Sample>(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}

//! Configuration loading from disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{PartialConfig, ProxyConfig, DEFAULT_CONFIG_FILE};
use crate::config::validation::{validate, ValidationError};

/// Template written by `cors-proxy init`.
pub const CONFIG_TEMPLATE: &str = r#"# Port to listen on
port = 8000

# Upstream the proxy forwards every request to
target = "http://example.com"

# Log one line per proxied request
logger = true

# Upstream timeout in milliseconds
timeout = 30000
"#;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML config file into a configuration layer.
pub fn load_file_config(path: &Path) -> Result<PartialConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config file layer.
///
/// An explicitly requested file must exist. Without one, `proxy.toml` in
/// `dir` is used when present and otherwise contributes nothing.
pub fn load_layer(explicit: Option<&Path>, dir: &Path) -> Result<PartialConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_file_config(path);
    }

    let default_path = dir.join(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        tracing::debug!(path = %default_path.display(), "Using config file");
        load_file_config(&default_path)
    } else {
        Ok(PartialConfig::default())
    }
}

/// Merge the command-line layer over the file layer and validate.
pub fn resolve(cli: PartialConfig, file: PartialConfig) -> Result<ProxyConfig, ConfigError> {
    let merged = cli.over(file);
    validate(&merged).map_err(ConfigError::Validation)
}

/// Write [`CONFIG_TEMPLATE`] to `path`, refusing to overwrite.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => ConfigError::AlreadyExists(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

    file.write_all(CONFIG_TEMPLATE.as_bytes())
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_a_valid_config() {
        let layer: PartialConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let config = resolve(PartialConfig::default(), layer).unwrap();
        assert_eq!(config.listen_port, 8000);
        assert_eq!(config.target.as_str(), "http://example.com/");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        write_template(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        let err = write_template(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[test]
    fn default_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let layer = load_layer(None, dir.path()).unwrap();
        assert_eq!(layer, PartialConfig::default());
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = load_layer(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "port = 9001\ntarget = \"http://file.test\"\ntimeout = 500\n",
        )
        .unwrap();

        let file = load_layer(None, dir.path()).unwrap();
        let cli = PartialConfig {
            target: Some("https://cli.test".into()),
            ..Default::default()
        };
        let config = resolve(cli, file).unwrap();

        assert_eq!(config.target.as_str(), "https://cli.test/");
        assert_eq!(config.listen_port, 9001);
        assert_eq!(config.request_timeout.as_millis(), 500);
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "prot = 8000\n").unwrap();
        assert!(matches!(load_file_config(&path), Err(ConfigError::Parse { .. })));
    }
}

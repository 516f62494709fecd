//! Configuration file support for plotboard.
//!
//! Settings are loaded from `~/.config/plotboard/config.toml`: the network
//! binding for the request transport, the default page size, and the font
//! alias tables used when recording text calls. If no config file exists,
//! sensible defaults are used automatically.
//!
//! The loaded [`ServerConfig`] is an immutable snapshot: it is read once at
//! startup and shared by reference afterwards.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration, deserialized from the TOML file.
///
/// # Example TOML
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8288
///
/// [device]
/// default_width = 720.0
/// default_height = 576.0
///
/// [device.user_aliases]
/// "Arial" = "Liberation Sans"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    /// Network binding for the request transport
    #[serde(default)]
    pub server: ServerSection,

    /// Page defaults and font alias tables
    #[serde(default)]
    pub device: DeviceSection,
}

/// `[server]` section: where the request transport binds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// Interface to bind, loopback by default
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind, 0 = pick an ephemeral port
    #[serde(default)]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
        }
    }
}

/// `[device]` section: page defaults and font aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSection {
    /// Default page width in user units
    #[serde(default = "default_width")]
    pub default_width: f64,
    /// Default page height in user units
    #[serde(default = "default_height")]
    pub default_height: f64,
    /// System-wide font family aliases (applied after user aliases)
    #[serde(default)]
    pub system_aliases: HashMap<String, String>,
    /// User font family aliases (take precedence)
    #[serde(default)]
    pub user_aliases: HashMap<String, String>,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            default_height: default_height(),
            system_aliases: HashMap::new(),
            user_aliases: HashMap::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_width() -> f64 {
    720.0
}

fn default_height() -> f64 {
    576.0
}

impl ServerConfig {
    /// Loads the configuration from the default location.
    ///
    /// A missing file is not an error: defaults apply. A present but
    /// malformed file is an error, so typos don't silently revert settings.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("no config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                debug!("no config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Default config file location under the user config directory.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plotboard").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = ServerConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 0);
        assert_eq!(config.device.default_width, 720.0);
        assert_eq!(config.device.default_height, 576.0);
        assert!(config.device.user_aliases.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8288").unwrap();
        let config = ServerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 8288);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.device.default_width, 720.0);
    }

    #[test]
    fn alias_tables_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[device.user_aliases]\n\"Arial\" = \"Liberation Sans\"\n\
             [device.system_aliases]\n\"serif\" = \"DejaVu Serif\""
        )
        .unwrap();
        let config = ServerConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config.device.user_aliases.get("Arial").map(String::as_str),
            Some("Liberation Sans")
        );
        assert_eq!(
            config.device.system_aliases.get("serif").map(String::as_str),
            Some("DejaVu Serif")
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(ServerConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        assert!(ServerConfig::load_from(Path::new("/nonexistent/plotboard.toml")).is_err());
    }
}

//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ConfigOverrides`] (the binary's argument
//! parser reads both); this module layers them over the TOML file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::human_time::parse_duration;
use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_JWT_EXPIRY: &str = "1h";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://songrate.db?mode=rwc";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name looked up in the working directory when no path is given
pub const LOCAL_CONFIG_FILE: &str = "songrate.toml";

/// Contents of the optional TOML config file
///
/// Every field is optional; missing fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub jwt_private_key: Option<String>,
    pub jwt_expiry: Option<String>,
    pub database_url: Option<String>,
    pub catalog_url: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Values taken from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub jwt_private_key: Option<String>,
    pub jwt_expiry: Option<String>,
    pub database_url: Option<String>,
    pub catalog_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// HMAC secret used to sign and verify access tokens
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    pub database_url: String,
    /// Catalog search endpoint; enrichment is disabled when unset
    pub catalog_url: Option<String>,
    pub log_level: String,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry", &self.jwt_expiry)
            .field("database_url", &self.database_url)
            .field("catalog_url", &self.catalog_url)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ServerConfig {
    /// Merge overrides over the TOML file and compiled defaults.
    ///
    /// Fails when no signing secret is configured anywhere: the server must not
    /// start without one.
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let jwt_secret = non_blank(overrides.jwt_private_key)
            .or_else(|| non_blank(file.jwt_private_key))
            .ok_or_else(|| {
                Error::Config(
                    "No JWT_PRIVATE_KEY found. Set it with one of:\n\
                     1. Command line: --jwt-secret <key>\n\
                     2. Environment: JWT_PRIVATE_KEY=<key>\n\
                     3. TOML config: jwt_private_key = \"<key>\""
                        .to_string(),
                )
            })?;

        let expiry_text = non_blank(overrides.jwt_expiry)
            .or_else(|| non_blank(file.jwt_expiry))
            .unwrap_or_else(|| DEFAULT_JWT_EXPIRY.to_string());
        let jwt_expiry = parse_duration(&expiry_text)?;

        Ok(Self {
            host: non_blank(overrides.host)
                .or_else(|| non_blank(file.host))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            jwt_secret,
            jwt_expiry,
            database_url: non_blank(overrides.database_url)
                .or_else(|| non_blank(file.database_url))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            catalog_url: non_blank(overrides.catalog_url).or_else(|| non_blank(file.catalog_url)),
            log_level: non_blank(overrides.log_level)
                .or_else(|| non_blank(file.log_level))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Load the TOML config file.
///
/// An explicitly requested file must exist. Without one, `./songrate.toml` and
/// then `<config dir>/songrate/config.toml` are tried; finding neither is not
/// an error and yields an empty config.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading config file: {}", path.display());
        return TomlConfig::load(path);
    }

    match default_config_candidates().into_iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading config file: {}", path.display());
            TomlConfig::load(&path)
        }
        None => {
            debug!("No config file found, using environment and defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Default config file locations, in lookup order
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("songrate").join("config.toml"));
    }
    candidates
}

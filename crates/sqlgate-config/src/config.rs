use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

pub const CONFIG_ENV: &str = "SQLGATE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "sqlgate.toml";
pub const DEFAULT_CONNECTION: &str = "default";
pub const MEMORY_PATH: &str = ":memory:";

/// Application's configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Connection used when a command names none.
    /// Default: "default"
    pub default_connection: String,

    /// Databases to open at startup.
    pub connections: Vec<ConnectionConfig>,

    /// Defaults for paginated listings.
    pub pagination: PaginationConfig,
}

/// One named database.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub name: String,

    /// Database file. Omitted or ":memory:" opens a private in-memory database.
    pub path: Option<PathBuf>,

    /// Switch the journal to write-ahead logging on open.
    /// Default: false
    #[serde(default)]
    pub wal: bool,

    /// Open without write access.
    /// Default: false
    #[serde(default)]
    pub read_only: bool,
}

impl ConnectionConfig {
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            wal: false,
            read_only: false,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        match &self.path {
            None => true,
            Some(path) => path.as_os_str() == MEMORY_PATH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Default: 10
    pub per_page: u64,

    /// Width of the page-number window. Values of 3 or less are ignored.
    /// Default: 7
    pub max_pages: u64,

    /// Link template; `{number}` is replaced by the page number.
    /// Default: "?page={number}"
    pub url_pattern: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: 10,
            max_pages: 7,
            url_pattern: "?page={number}".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_connection: DEFAULT_CONNECTION.to_string(),
            connections: vec![ConnectionConfig::in_memory(DEFAULT_CONNECTION)],
            pagination: PaginationConfig::default(),
        }
    }
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

/// Resolves the configuration file location.
///
/// An explicit path wins, then `SQLGATE_CONFIG`, then `./sqlgate.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_ENV) {
        Ok(path_str) if !path_str.is_empty() => PathBuf::from(path_str),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Loads the configuration and stores it for [`get_config`].
pub fn init(explicit: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path(explicit))?;
    let mut global_config = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global_config = Some(config);
    Ok(())
}

/// The configuration stored by [`init`], or the default one.
pub fn get_config() -> Config {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_default()
}

impl Config {
    /// Reads and validates the file at `path`. A missing file yields the
    /// default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates connection names and pagination defaults.
    ///
    /// A file without any connection gets the in-memory default one.
    pub fn resolve(&mut self) -> Result<()> {
        if self.connections.is_empty() {
            self.connections
                .push(ConnectionConfig::in_memory(self.default_connection.clone()));
        }

        let mut seen = HashSet::new();
        for conn in &self.connections {
            if conn.name.trim().is_empty() {
                return Err(ConfigError::EmptyConnectionName);
            }
            if !seen.insert(conn.name.as_str()) {
                return Err(ConfigError::DuplicateConnection(conn.name.clone()));
            }
            if conn.is_in_memory() && (conn.wal || conn.read_only) {
                warn!(
                    "connection '{}' is in-memory; wal and read_only are ignored",
                    conn.name
                );
            }
        }

        if !seen.contains(self.default_connection.as_str()) {
            return Err(ConfigError::UnknownDefaultConnection(
                self.default_connection.clone(),
            ));
        }

        if self.pagination.per_page == 0 {
            return Err(ConfigError::InvalidPerPage);
        }
        if self.pagination.max_pages <= 3 {
            warn!(
                "pagination.max_pages = {} is too small and will be ignored",
                self.pagination.max_pages
            );
        }

        Ok(())
    }

    pub fn get_connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.iter().find(|c| c.name == name)
    }

    pub fn default_connection(&self) -> Result<&ConnectionConfig> {
        self.get_connection(&self.default_connection)
            .ok_or_else(|| ConfigError::UnknownDefaultConnection(self.default_connection.clone()))
    }
}

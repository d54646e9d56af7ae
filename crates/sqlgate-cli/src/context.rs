use sqlgate_config::config::{get_config, Config};
use sqlgate_db::{ConnectionRegistry, Crud, DbError, Gateway, OpenOptions, Table};
use tracing::trace;

use crate::error::CliResult;

/// Everything a command needs: the loaded configuration, the opened
/// connections and the output mode.
pub struct AppContext {
    pub config: Config,
    pub registry: ConnectionRegistry,
    pub connection: String,
    pub json: bool,
}

impl AppContext {
    /// Opens every configured connection into `registry`.
    ///
    /// `connection` overrides the configured default and must name one of
    /// the configured connections.
    pub fn new(
        config: Config,
        registry: ConnectionRegistry,
        connection: Option<String>,
        json: bool,
    ) -> CliResult<Self> {
        open_connections(&config, &registry)?;

        let connection = connection.unwrap_or_else(|| config.default_connection.clone());
        if !registry.has(&connection) {
            return Err(DbError::ConnectionNotFound(connection).into());
        }

        Ok(Self {
            config,
            registry,
            connection,
            json,
        })
    }

    /// Builds the context from the configuration stored by
    /// [`sqlgate_config::config::init`].
    pub fn from_global(
        registry: ConnectionRegistry,
        connection: Option<String>,
        json: bool,
    ) -> CliResult<Self> {
        Self::new(get_config(), registry, connection, json)
    }

    pub fn crud(&self) -> Crud {
        Crud::new(self.registry.clone(), self.connection.as_str())
    }

    pub fn gateway(&self, table: &str, primary_key: &str) -> Gateway {
        let table = Table::new(table)
            .with_name(table)
            .with_primary_key(primary_key)
            .with_connection(self.connection.as_str());
        Gateway::with_registry(self.registry.clone(), table)
    }
}

pub fn open_connections(config: &Config, registry: &ConnectionRegistry) -> CliResult<()> {
    for conn in &config.connections {
        match conn.path.as_deref() {
            Some(path) if !conn.is_in_memory() => {
                let options = OpenOptions {
                    wal: conn.wal,
                    read_only: conn.read_only,
                };
                registry.open(&conn.name, path, options)?;
            }
            _ => {
                registry.open_in_memory(&conn.name)?;
            }
        }
        trace!(connection = %conn.name, "registered connection");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use sqlgate_config::config::{ConnectionConfig, CONFIG};

    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_default_connection_is_selected() {
        let ctx =
            AppContext::new(Config::default(), ConnectionRegistry::new(), None, false).unwrap();
        assert_eq!(ctx.connection, "default");
        assert_eq!(ctx.registry.names(), vec!["default".to_string()]);
        assert_eq!(ctx.crud().name(), "default");
    }

    #[test]
    #[serial]
    fn test_from_global_reads_stored_config() {
        let mut config = Config::default();
        config.connections.push(ConnectionConfig::in_memory("stored"));
        config.pagination.per_page = 4;
        *CONFIG.write().unwrap() = Some(config);

        let ctx =
            AppContext::from_global(ConnectionRegistry::new(), Some("stored".into()), false)
                .unwrap();
        assert_eq!(ctx.connection, "stored");
        assert_eq!(ctx.config.pagination.per_page, 4);

        *CONFIG.write().unwrap() = None;
        let ctx = AppContext::from_global(ConnectionRegistry::new(), None, false).unwrap();
        assert_eq!(ctx.config, Config::default());
    }

    #[test]
    fn test_unknown_connection_override() {
        let result = AppContext::new(
            Config::default(),
            ConnectionRegistry::new(),
            Some("missing".into()),
            false,
        );
        assert!(matches!(
            result,
            Err(CliError::Db(DbError::ConnectionNotFound(name))) if name == "missing"
        ));
    }

    #[test]
    fn test_opens_file_connections() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.connections.push(ConnectionConfig {
            name: "disk".into(),
            path: Some(dir.path().join("disk.db")),
            wal: true,
            read_only: false,
        });

        let registry = ConnectionRegistry::new();
        open_connections(&config, &registry).unwrap();

        assert!(registry.has("disk"));
        assert!(dir.path().join("disk.db").exists());
    }
}

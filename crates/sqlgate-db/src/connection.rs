//! Named connection registry.
//!
//! Connections are registered under string identifiers and looked up by name
//! whenever a statement is executed. Handles are shared: the registry keeps a
//! clone of the `Arc`, the caller keeps theirs.
//!
//! A [`ConnectionRegistry`] can be passed around explicitly, or the
//! process-wide instance can be used through [`ConnectionRegistry::global`]
//! and the free functions [`register`], [`get`] and [`has`].
//!
//! # Example
//!
//! ```
//! use sqlgate_db::connection::{ConnectionRegistry, DEFAULT_CONNECTION};
//!
//! let registry = ConnectionRegistry::new();
//! registry.open_in_memory(DEFAULT_CONNECTION).unwrap();
//!
//! assert!(registry.has(DEFAULT_CONNECTION));
//! assert!(registry.get("reporting").is_err());
//! ```

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, LazyLock, Mutex, PoisonError, RwLock},
};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, trace};

use crate::error::{DbError, Result};

/// Name used when no connection name is given.
pub const DEFAULT_CONNECTION: &str = "default";

/// A shared database handle.
pub type Handle = Arc<Mutex<Connection>>;

static GLOBAL: LazyLock<ConnectionRegistry> = LazyLock::new(ConnectionRegistry::new);

/// Options used when opening a SQLite database file.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Switch the journal to WAL mode after opening.
    pub wal: bool,
    /// Open the file read-only.
    pub read_only: bool,
}

/// A mapping from connection names to shared handles.
///
/// Cloning the registry is cheap and yields a view of the same map.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    handles: Arc<RwLock<HashMap<String, Handle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> ConnectionRegistry {
        GLOBAL.clone()
    }

    /// Stores `handle` under `name`, replacing any previous handle.
    pub fn register(&self, handle: Handle, name: &str) {
        let mut handles = self.handles.write().unwrap_or_else(PoisonError::into_inner);
        if handles.insert(name.to_string(), handle).is_some() {
            trace!(connection = name, "replaced registered connection");
        } else {
            trace!(connection = name, "registered connection");
        }
    }

    /// Returns the handle registered under `name`.
    ///
    /// # Errors
    ///
    /// [`DbError::ConnectionNotFound`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Handle> {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::ConnectionNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Removes and returns the handle registered under `name`.
    pub fn remove(&self, name: &str) -> Option<Handle> {
        self.handles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Drops every registered handle.
    pub fn clear(&self) {
        self.handles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Opens a SQLite database file and registers it under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the journal mode
    /// cannot be changed.
    pub fn open<P: AsRef<Path>>(&self, name: &str, path: P, options: OpenOptions) -> Result<Handle> {
        let path = path.as_ref();
        let conn = if options.read_only {
            Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?
        } else {
            Connection::open(path)?
        };

        if options.wal && !options.read_only {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!(connection = name, journal_mode = %mode, "switched journal mode");
        }

        debug!(connection = name, path = %path.display(), "opened database");
        let handle = Arc::new(Mutex::new(conn));
        self.register(handle.clone(), name);
        Ok(handle)
    }

    /// Opens a fresh in-memory database and registers it under `name`.
    pub fn open_in_memory(&self, name: &str) -> Result<Handle> {
        let handle = Arc::new(Mutex::new(Connection::open_in_memory()?));
        self.register(handle.clone(), name);
        Ok(handle)
    }
}

/// Registers `handle` in the process-wide registry.
pub fn register(handle: Handle, name: &str) {
    GLOBAL.register(handle, name);
}

/// Looks up `name` in the process-wide registry.
pub fn get(name: &str) -> Result<Handle> {
    GLOBAL.get(name)
}

/// Checks whether `name` exists in the process-wide registry.
pub fn has(name: &str) -> bool {
    GLOBAL.has(name)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn memory_handle() -> Handle {
        Arc::new(Mutex::new(Connection::open_in_memory().unwrap()))
    }

    #[test]
    fn test_get_unregistered() {
        let registry = ConnectionRegistry::new();
        let err = registry.get("x").unwrap_err();
        assert!(matches!(err, DbError::ConnectionNotFound(name) if name == "x"));
    }

    #[test]
    fn test_get_returns_registered_handle() {
        let registry = ConnectionRegistry::new();
        let handle = memory_handle();
        registry.register(handle.clone(), "x");

        assert!(registry.has("x"));
        assert!(Arc::ptr_eq(&registry.get("x").unwrap(), &handle));
    }

    #[test]
    fn test_register_replaces() {
        let registry = ConnectionRegistry::new();
        let first = memory_handle();
        let second = memory_handle();
        registry.register(first.clone(), "x");
        registry.register(second.clone(), "x");

        let current = registry.get("x").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert!(!Arc::ptr_eq(&current, &first));
        assert_eq!(registry.names(), vec!["x".to_string()]);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ConnectionRegistry::new();
        let view = registry.clone();
        registry.open_in_memory("a").unwrap();

        assert!(view.has("a"));
        assert!(view.remove("a").is_some());
        assert!(!registry.has("a"));
    }

    #[test]
    fn test_has_never_fails() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.has(""));
        assert!(!registry.has(DEFAULT_CONNECTION));
    }

    #[test]
    fn test_open_file_with_wal_and_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let registry = ConnectionRegistry::new();

        let writer = registry
            .open(
                "rw",
                &path,
                OpenOptions {
                    wal: true,
                    read_only: false,
                },
            )
            .unwrap();
        {
            let conn = writer.lock().unwrap();
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap();
            assert_eq!(mode.to_lowercase(), "wal");
            conn.execute("CREATE TABLE t (x INTEGER)", []).unwrap();
        }

        let reader = registry
            .open(
                "ro",
                &path,
                OpenOptions {
                    wal: false,
                    read_only: true,
                },
            )
            .unwrap();
        let err = reader
            .lock()
            .unwrap()
            .execute("INSERT INTO t VALUES (1)", []);
        assert!(err.is_err());
        assert_eq!(registry.names(), vec!["ro".to_string(), "rw".to_string()]);
    }

    #[test]
    #[serial]
    fn test_global_registry() {
        let handle = memory_handle();
        register(handle.clone(), "connection_tests");

        assert!(has("connection_tests"));
        assert!(Arc::ptr_eq(&get("connection_tests").unwrap(), &handle));
        assert!(ConnectionRegistry::global().remove("connection_tests").is_some());
        assert!(get("connection_tests").is_err());
    }
}

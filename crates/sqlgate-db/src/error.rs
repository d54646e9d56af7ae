//! Error types for sqlgate-db.

use miette::Diagnostic;
use thiserror::Error;

/// Database error type for sqlgate-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Connection not found: '{0}'")]
    #[diagnostic(
        code(sqlgate_db::connection_not_found),
        help("Register a connection under this name before using it")
    )]
    ConnectionNotFound(String),

    #[error("Invalid arguments: {0}")]
    #[diagnostic(code(sqlgate_db::invalid_arguments))]
    InvalidArguments(String),

    #[error("Pager has not been initialized")]
    #[diagnostic(
        code(sqlgate_db::pager_not_initialized),
        help("Construct a pager or call `paginate` first")
    )]
    PagerNotInitialized,

    #[error("Table is not configured for '{0}'")]
    #[diagnostic(
        code(sqlgate_db::table_not_configured),
        help("Give the table an identifier or an explicit table name")
    )]
    TableNotConfigured(String),

    #[error("Connection '{0}' is poisoned")]
    #[diagnostic(
        code(sqlgate_db::lock_poisoned),
        help("A previous statement panicked while holding the connection")
    )]
    LockPoisoned(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(sqlgate_db::driver))]
    Driver(#[from] rusqlite::Error),
}

/// Result type alias for sqlgate-db operations.
pub type Result<T> = std::result::Result<T, DbError>;

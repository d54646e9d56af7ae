use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(sqlgate_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(sqlgate_config::toml_deserialize),
        help("Check your sqlgate.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Duplicate connection name: {0}")]
    #[diagnostic(
        code(sqlgate_config::duplicate_connection),
        help("Each connection must have a unique name")
    )]
    DuplicateConnection(String),

    #[error("Connection name cannot be empty")]
    #[diagnostic(
        code(sqlgate_config::empty_connection_name),
        help("Give every [[connections]] entry a name")
    )]
    EmptyConnectionName,

    #[error("Unknown default connection: {0}")]
    #[diagnostic(
        code(sqlgate_config::unknown_default_connection),
        help("Ensure default_connection references a configured connection")
    )]
    UnknownDefaultConnection(String),

    #[error("per_page must be greater than zero")]
    #[diagnostic(
        code(sqlgate_config::invalid_per_page),
        help("Set pagination.per_page to a positive number")
    )]
    InvalidPerPage,

    #[error("IO error: {0}")]
    #[diagnostic(code(sqlgate_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

use miette::Diagnostic;
use sqlgate_config::error::ConfigError;
use sqlgate_db::DbError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("Invalid assignment: {0}")]
    #[diagnostic(
        code(sqlgate::invalid_assignment),
        help("Pass column values as COLUMN=VALUE")
    )]
    InvalidAssignment(String),

    #[error(transparent)]
    #[diagnostic(code(sqlgate::json))]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;

//! Small clause-level types shared by the statement builder and the executor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which statement a [`super::Statement`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Select => "select",
            Mode::Insert => "insert",
            Mode::Update => "update",
            Mode::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// SQL flavour used for the upsert clause.
///
/// Everything else the builder renders is dialect-neutral text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `ON DUPLICATE KEY UPDATE`
    #[default]
    MySql,
    /// `ON CONFLICT DO UPDATE SET`
    Sqlite,
}

impl Dialect {
    pub(crate) fn upsert_keyword(self) -> &'static str {
        match self {
            Dialect::MySql => " ON DUPLICATE KEY UPDATE ",
            Dialect::Sqlite => " ON CONFLICT DO UPDATE SET ",
        }
    }
}

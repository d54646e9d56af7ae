//! Statement execution against a named connection.

use rusqlite::{types::Value, Connection, ToSql};
use tracing::debug;

use crate::{
    connection::{ConnectionRegistry, DEFAULT_CONNECTION},
    error::{DbError, Result},
    query::{ColumnValues, Dialect, Statement},
    traits::FromRow,
};

/// Which rows an update or delete touches.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditions {
    /// Rendered as `WHERE c1=? AND c2=?` with the map's values bound.
    Columns(ColumnValues),
    /// A literal clause, including its `WHERE`, and the values for its
    /// placeholders.
    Raw { clause: String, params: Vec<Value> },
}

impl Conditions {
    pub fn raw(clause: impl Into<String>, params: Vec<Value>) -> Self {
        Conditions::Raw {
            clause: clause.into(),
            params,
        }
    }

    /// Matches every row.
    pub fn all() -> Self {
        Conditions::raw("", vec![])
    }
}

impl From<ColumnValues> for Conditions {
    fn from(values: ColumnValues) -> Self {
        Conditions::Columns(values)
    }
}

impl From<&str> for Conditions {
    fn from(clause: &str) -> Self {
        Conditions::raw(clause, vec![])
    }
}

/// Runs statements on the connection registered under one name.
///
/// The handle is looked up on every call, so a connection registered after
/// the executor was created is picked up, and an unregistered name fails
/// with [`DbError::ConnectionNotFound`] at execution time.
#[derive(Clone)]
pub struct Crud {
    registry: ConnectionRegistry,
    connection: String,
}

impl Crud {
    pub fn new(registry: ConnectionRegistry, connection: impl Into<String>) -> Self {
        Self {
            registry,
            connection: connection.into(),
        }
    }

    /// An executor on the process-wide registry.
    pub fn connection(name: impl Into<String>) -> Self {
        Self::new(ConnectionRegistry::global(), name)
    }

    pub fn name(&self) -> &str {
        &self.connection
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let handle = self.registry.get(&self.connection)?;
        let conn = handle
            .lock()
            .map_err(|_| DbError::LockPoisoned(self.connection.clone()))?;
        Ok(f(&conn)?)
    }

    /// Runs a query and maps every row.
    pub fn query<E: FromRow>(&self, sql: &str, params: &[Value]) -> Result<Vec<E>> {
        debug!(connection = %self.connection, sql, params = params.len(), "query");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let params_ref = bind_refs(params);
            let rows = stmt.query_map(params_ref.as_slice(), E::from_row)?;
            rows.collect()
        })
    }

    /// Runs a query and maps the first row, if any.
    pub fn query_row<E: FromRow>(&self, sql: &str, params: &[Value]) -> Result<Option<E>> {
        debug!(connection = %self.connection, sql, params = params.len(), "query row");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let params_ref = bind_refs(params);
            let mut rows = stmt.query(params_ref.as_slice())?;
            let record = match rows.next()? {
                Some(row) => Some(E::from_row(row)?),
                None => None,
            };
            Ok(record)
        })
    }

    /// Runs a query and returns the first column of the first row, if any.
    pub fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        debug!(connection = %self.connection, sql, params = params.len(), "query scalar");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let params_ref = bind_refs(params);
            let mut rows = stmt.query(params_ref.as_slice())?;
            let value = match rows.next()? {
                Some(row) => Some(row.get::<_, Value>(0)?),
                None => None,
            };
            Ok(value)
        })
    }

    /// Runs a statement and returns the number of affected rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(connection = %self.connection, sql, params = params.len(), "execute");
        self.with_conn(|conn| {
            let params_ref = bind_refs(params);
            conn.execute(sql, params_ref.as_slice())
        })
    }

    /// Renders and runs a built statement.
    pub fn execute_statement(&self, statement: Statement) -> Result<usize> {
        let (sql, params) = statement.into_parts();
        self.execute(&sql, &params)
    }

    /// Inserts one row. A non-empty `on_duplicate` map adds the upsert clause.
    pub fn insert(
        &self,
        table: &str,
        values: &ColumnValues,
        on_duplicate: &ColumnValues,
        dialect: Dialect,
    ) -> Result<usize> {
        let mut statement = Statement::new();
        statement.dialect(dialect).from(table).insert(values);
        if !on_duplicate.is_empty() {
            statement.on_duplicate_key_update(on_duplicate);
        }
        self.execute_statement(statement)
    }

    /// Updates the rows matched by `conditions`.
    pub fn update(
        &self,
        table: &str,
        values: &ColumnValues,
        conditions: impl Into<Conditions>,
    ) -> Result<usize> {
        let mut statement = Statement::new();
        statement.from(table).update(values);
        self.execute_with(statement, conditions.into())
    }

    /// Deletes the rows matched by `conditions`.
    pub fn delete(&self, table: &str, conditions: impl Into<Conditions>) -> Result<usize> {
        let mut statement = Statement::new();
        statement.from(table).delete();
        self.execute_with(statement, conditions.into())
    }

    /// Returns the rowid of the most recent successful insert on this
    /// connection.
    pub fn last_insert_id(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.last_insert_rowid()))
    }

    fn execute_with(&self, mut statement: Statement, conditions: Conditions) -> Result<usize> {
        match conditions {
            Conditions::Columns(values) => {
                if !values.is_empty() {
                    statement
                        .filter(&values.condition_list())
                        .bind_all(values.into_iter().map(|(_, v)| v));
                }
                self.execute_statement(statement)
            }
            Conditions::Raw { clause, params } => {
                let (mut sql, mut bound) = statement.into_parts();
                if !clause.trim().is_empty() {
                    sql.push(' ');
                    sql.push_str(clause.trim());
                }
                bound.extend(params);
                self.execute(&sql, &bound)
            }
        }
    }
}

impl Default for Crud {
    fn default() -> Self {
        Self::connection(DEFAULT_CONNECTION)
    }
}

fn bind_refs(params: &[Value]) -> Vec<&dyn ToSql> {
    params.iter().map(|v| v as &dyn ToSql).collect()
}

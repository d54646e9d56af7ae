//! Per-table gateways.
//!
//! A [`Table`] describes one table: its name (or the identifier it is derived
//! from), primary key, connection name and upsert dialect. A [`Gateway`] runs
//! the common statement shapes against it and keeps the small amount of
//! per-table state those shapes need: a one-shot select-list override and the
//! pager of the last [`Gateway::paginate`] call.

use rusqlite::types::Value;
use tracing::debug;

use crate::{
    connection::{ConnectionRegistry, DEFAULT_CONNECTION},
    crud::{Conditions, Crud},
    error::{DbError, Result},
    pager::{Pager, DEFAULT_PER_PAGE, DEFAULT_URL_PATTERN},
    query::{ColumnValues, Dialect},
    traits::FromRow,
};

/// Describes the table a [`Gateway`] works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    identifier: String,
    name: Option<String>,
    primary_key: String,
    connection: String,
    dialect: Dialect,
}

impl Table {
    /// A table known by `identifier`, e.g. a model name such as `"Post"`.
    ///
    /// Unless [`Table::with_name`] is used, the table name is the last
    /// `::`-separated segment of the identifier, lower-cased.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            primary_key: "id".to_string(),
            connection: DEFAULT_CONNECTION.to_string(),
            dialect: Dialect::Sqlite,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = connection.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Resolves the table name.
    ///
    /// # Errors
    ///
    /// [`DbError::TableNotConfigured`] if neither an explicit name nor a
    /// usable identifier is set.
    pub fn name(&self) -> Result<String> {
        let name = match &self.name {
            Some(name) => name.trim().to_string(),
            None => self
                .identifier
                .rsplit("::")
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
        };

        if name.is_empty() {
            return Err(DbError::TableNotConfigured(self.identifier.clone()));
        }
        Ok(name)
    }
}

/// Rows an update or delete targets through a [`Gateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Primary-key equality, rendered as `WHERE <pk>=?` with the key bound.
    Key(i64),
    /// A literal clause such as `WHERE views < ?`.
    Clause(String),
}

impl From<i64> for Target {
    fn from(key: i64) -> Self {
        Target::Key(key)
    }
}

impl From<i32> for Target {
    fn from(key: i32) -> Self {
        Target::Key(key.into())
    }
}

impl From<u32> for Target {
    fn from(key: u32) -> Self {
        Target::Key(key.into())
    }
}

/// Strings that parse as an `i64` are treated as primary keys. Any other
/// numeric text, such as `"1.5"` or `"1e3"`, is not a key and is used as a
/// literal clause.
impl From<&str> for Target {
    fn from(clause: &str) -> Self {
        match clause.trim().parse::<i64>() {
            Ok(key) => Target::Key(key),
            Err(_) => Target::Clause(clause.to_string()),
        }
    }
}

impl From<String> for Target {
    fn from(clause: String) -> Self {
        Target::from(clause.as_str())
    }
}

/// Options for [`Gateway::paginate`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    pub per_page: u64,
    /// Supplied by the caller, e.g. from a request's query string.
    pub current_page: u64,
    pub url_pattern: String,
    /// Applied through [`Pager::set_max_pages`] when set.
    pub max_pages: Option<u64>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            current_page: 1,
            url_pattern: DEFAULT_URL_PATTERN.to_string(),
            max_pages: None,
        }
    }
}

impl PageOptions {
    pub fn page(mut self, current_page: u64) -> Self {
        self.current_page = current_page;
        self
    }

    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn url_pattern(mut self, url_pattern: impl Into<String>) -> Self {
        self.url_pattern = url_pattern.into();
        self
    }

    pub fn max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Runs common statements against one table.
///
/// Filter arguments are literal SQL tails (`WHERE ...`, `ORDER BY ...`)
/// appended after `SELECT <columns> FROM <table>`; their `?` markers are bound
/// from the accompanying parameter slice.
///
/// # Example
///
/// ```
/// use sqlgate_db::{ColumnValues, ConnectionRegistry, Gateway, Record, Table};
///
/// let registry = ConnectionRegistry::new();
/// let handle = registry.open_in_memory("default").unwrap();
/// handle
///     .lock()
///     .unwrap()
///     .execute_batch("CREATE TABLE post (id INTEGER PRIMARY KEY, title TEXT)")
///     .unwrap();
///
/// let mut posts = Gateway::with_registry(registry, Table::new("Post"));
/// posts
///     .insert(&ColumnValues::new().set("title", "hello".to_string()), &ColumnValues::new())
///     .unwrap();
///
/// let rows: Vec<Record> = posts.select("title").get("", &[]).unwrap();
/// assert_eq!(rows.len(), 1);
/// ```
pub struct Gateway {
    table: Table,
    crud: Crud,
    resolved: Option<String>,
    select: String,
    pager: Option<Pager>,
}

impl Gateway {
    /// A gateway on the process-wide registry.
    pub fn new(table: Table) -> Self {
        Self::with_registry(ConnectionRegistry::global(), table)
    }

    pub fn with_registry(registry: ConnectionRegistry, table: Table) -> Self {
        let crud = Crud::new(registry, table.connection());
        Self {
            table,
            crud,
            resolved: None,
            select: "*".to_string(),
            pager: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Resolves and caches the table name on first use.
    fn boot(&mut self) -> Result<String> {
        if let Some(name) = &self.resolved {
            return Ok(name.clone());
        }
        let name = self.table.name()?;
        debug!(identifier = self.table.identifier(), table = %name, "resolved table name");
        self.resolved = Some(name.clone());
        Ok(name)
    }

    /// Overrides the select list for the next `get`, `first` or `column`.
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.select = columns.to_string();
        self
    }

    /// Builds the select statement and resets the select-list override.
    fn select_sql(&mut self, filter: &str) -> Result<String> {
        let select = std::mem::replace(&mut self.select, "*".to_string());
        let table = self.boot()?;
        Ok(format!("SELECT {select} FROM {table} {filter}")
            .trim_end()
            .to_string())
    }

    /// Returns every matching row.
    pub fn get<E: FromRow>(&mut self, filter: &str, params: &[Value]) -> Result<Vec<E>> {
        let sql = self.select_sql(filter)?;
        self.crud.query(&sql, params)
    }

    /// Same as [`Gateway::get`].
    pub fn all<E: FromRow>(&mut self, filter: &str, params: &[Value]) -> Result<Vec<E>> {
        self.get(filter, params)
    }

    /// Returns the first matching row.
    pub fn first<E: FromRow>(&mut self, filter: &str, params: &[Value]) -> Result<Option<E>> {
        let sql = self.select_sql(filter)?;
        self.crud.query_row(&sql, params)
    }

    /// Returns the first column of the first matching row.
    pub fn column(&mut self, filter: &str, params: &[Value]) -> Result<Option<Value>> {
        let sql = self.select_sql(filter)?;
        self.crud.query_scalar(&sql, params)
    }

    /// Counts the matching rows. The select-list override is left alone.
    pub fn count(&mut self, filter: &str, params: &[Value]) -> Result<u64> {
        let select = std::mem::replace(&mut self.select, "count(*)".to_string());
        let count = self.column(filter, params);
        self.select = select;

        match count? {
            Some(Value::Integer(n)) => Ok(u64::try_from(n).unwrap_or_default()),
            _ => Ok(0),
        }
    }

    /// Inserts one row; a non-empty `on_duplicate` map turns it into an upsert.
    pub fn insert(&mut self, values: &ColumnValues, on_duplicate: &ColumnValues) -> Result<usize> {
        let table = self.boot()?;
        self.crud
            .insert(&table, values, on_duplicate, self.table.dialect())
    }

    /// Updates the targeted rows.
    ///
    /// A [`Target::Key`] becomes `WHERE <pk>=?` with the key appended to
    /// `params`.
    pub fn update(
        &mut self,
        values: &ColumnValues,
        target: impl Into<Target>,
        params: &[Value],
    ) -> Result<usize> {
        let table = self.boot()?;
        let conditions = self.conditions(target.into(), params);
        self.crud.update(&table, values, conditions)
    }

    /// Deletes the targeted rows, with the same target rules as
    /// [`Gateway::update`].
    pub fn delete(&mut self, target: impl Into<Target>, params: &[Value]) -> Result<usize> {
        let table = self.boot()?;
        let conditions = self.conditions(target.into(), params);
        self.crud.delete(&table, conditions)
    }

    fn conditions(&self, target: Target, params: &[Value]) -> Conditions {
        let mut params = params.to_vec();
        match target {
            Target::Key(key) => {
                params.push(Value::Integer(key));
                Conditions::raw(format!("WHERE {}=?", self.table.primary_key()), params)
            }
            Target::Clause(clause) => Conditions::raw(clause, params),
        }
    }

    /// Rowid of the last insert on this table's connection.
    pub fn last_insert_id(&self) -> Result<i64> {
        self.crud.last_insert_id()
    }

    /// Returns one page of matching rows and remembers the pager.
    ///
    /// The total is counted with the same filter, and the pager's
    /// `LIMIT offset,count` is appended to it for the row query. A pending
    /// select-list override applies to the row query.
    pub fn paginate<E: FromRow>(
        &mut self,
        options: &PageOptions,
        filter: &str,
        params: &[Value],
    ) -> Result<Vec<E>> {
        let total = self.count(filter, params)?;

        let mut pager = Pager::new(
            total,
            options.per_page,
            options.current_page,
            options.url_pattern.as_str(),
        );
        if let Some(max_pages) = options.max_pages {
            pager.set_max_pages(max_pages);
        }

        let filter = format!("{filter} LIMIT {}", pager.limit());
        debug!(
            total,
            page = pager.current_page(),
            pages = pager.total_pages(),
            "paginating"
        );
        self.pager = Some(pager);
        self.get(&filter, params)
    }

    /// The pager of the last [`Gateway::paginate`] call.
    ///
    /// # Errors
    ///
    /// [`DbError::PagerNotInitialized`] if `paginate` was never called.
    pub fn pagination(&self) -> Result<&Pager> {
        self.pager.as_ref().ok_or(DbError::PagerNotInitialized)
    }
}

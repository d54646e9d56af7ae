//! The fluent statement builder.

use std::fmt;

use rusqlite::types::Value;

use crate::{
    error::{DbError, Result},
    query::{
        clause::{Dialect, Mode},
        columns::Payload,
    },
};

/// Accumulates SQL fragments and renders one statement plus its parameters.
///
/// Every method mutates the builder and hands it back, so calls chain. The
/// [`Mode`] set by the last of `insert`/`update`/`delete` (select otherwise)
/// decides which fragments end up in [`Statement::build`]; the rest are kept
/// but not rendered.
///
/// Rendering is textual. Fragments are not validated or escaped, and a
/// literal fragment with its own `?` markers needs its values supplied through
/// [`Statement::bind`].
///
/// # Example
///
/// ```
/// use sqlgate_db::{ColumnValues, Statement};
///
/// let sql = Statement::new()
///     .table("posts", "*")
///     .filter("is_featured=1")
///     .order_by("id DESC")
///     .limit(10)
///     .build();
/// assert_eq!(sql, "SELECT * FROM posts WHERE is_featured=1 ORDER BY id DESC LIMIT 10");
///
/// let mut insert = Statement::new();
/// insert
///     .from("posts")
///     .insert(ColumnValues::new().set("title", "foo".to_string()));
/// assert_eq!(insert.build(), "INSERT INTO posts (title) VALUES (?)");
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    select: String,
    source: Option<String>,
    joins: String,
    filter: Option<String>,
    having: Option<String>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<String>,
    insert: Option<String>,
    update: Option<String>,
    delete: Option<String>,
    mode: Mode,
    dialect: Dialect,
    params: Vec<Value>,
}

impl Default for Statement {
    fn default() -> Self {
        Self {
            select: "SELECT *".to_string(),
            source: None,
            joins: String::new(),
            filter: None,
            having: None,
            group_by: None,
            order_by: None,
            limit: None,
            insert: None,
            update: None,
            delete: None,
            mode: Mode::Select,
            dialect: Dialect::default(),
            params: Vec::new(),
        }
    }
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dialect used by [`Statement::on_duplicate_key_update`].
    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Sets the select list, `*` when called with `"*"`.
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.select = format!("SELECT {columns}");
        self
    }

    /// Sets the source table. Insert, update and delete target this table.
    pub fn from(&mut self, source: &str) -> &mut Self {
        self.source = Some(source.to_string());
        self
    }

    /// `select(columns)` followed by `from(source)`.
    pub fn table(&mut self, source: &str, columns: &str) -> &mut Self {
        self.select(columns).from(source)
    }

    /// Appends `clause` to the WHERE fragment, seeding the keyword on first use.
    ///
    /// Subsequent calls append raw text, so connectives are the caller's:
    /// `.filter("a=1").filter("AND b=2")`.
    pub fn filter(&mut self, clause: &str) -> &mut Self {
        append(seed(&mut self.filter, "WHERE "), clause);
        self
    }

    /// Seeds the WHERE keyword and hands the builder to `compose`.
    ///
    /// The closure runs immediately and can call [`Statement::filter`] and
    /// [`Statement::bind`] to build the clause.
    pub fn filter_with<F: FnOnce(&mut Self)>(&mut self, compose: F) -> &mut Self {
        seed(&mut self.filter, "WHERE ");
        compose(self);
        self
    }

    /// Same contract as [`Statement::filter`] for the HAVING fragment.
    pub fn having(&mut self, clause: &str) -> &mut Self {
        append(seed(&mut self.having, "HAVING "), clause);
        self
    }

    /// Same contract as [`Statement::filter_with`] for the HAVING fragment.
    pub fn having_with<F: FnOnce(&mut Self)>(&mut self, compose: F) -> &mut Self {
        seed(&mut self.having, "HAVING ");
        compose(self);
        self
    }

    /// Appends a join from one or two arguments.
    ///
    /// `["posts"]` is an inner join, `["left", "users"]` uses the given kind
    /// upper-cased.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArguments`] for any other number of arguments.
    pub fn join(&mut self, args: &[&str]) -> Result<&mut Self> {
        match args {
            [target] => Ok(self.join_kind("INNER", target)),
            [kind, target] => Ok(self.join_kind(kind, target)),
            _ => Err(DbError::InvalidArguments(format!(
                "join takes 1 or 2 arguments, got {}",
                args.len()
            ))),
        }
    }

    /// Appends `<KIND> JOIN <target>`.
    pub fn join_kind(&mut self, kind: &str, target: &str) -> &mut Self {
        self.joins
            .push_str(&format!("{} JOIN {} ", kind.to_uppercase(), target));
        self
    }

    pub fn inner_join(&mut self, target: &str) -> &mut Self {
        self.join_kind("INNER", target)
    }

    pub fn left_join(&mut self, target: &str) -> &mut Self {
        self.join_kind("LEFT", target)
    }

    /// Replaces the ORDER BY fragment.
    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        self.order_by = Some(format!("ORDER BY {clause}"));
        self
    }

    /// Replaces the GROUP BY fragment.
    pub fn group_by(&mut self, clause: &str) -> &mut Self {
        self.group_by = Some(format!("GROUP BY {clause}"));
        self
    }

    /// Replaces the LIMIT fragment. Accepts a bound (`10`) or `"offset,count"`.
    pub fn limit(&mut self, limit: impl fmt::Display) -> &mut Self {
        self.limit = Some(format!("LIMIT {limit}"));
        self
    }

    /// Switches to insert mode against the source table.
    ///
    /// A column map renders `(c1,c2) VALUES (?,?)` and binds its values; a
    /// literal fragment is appended as is.
    pub fn insert(&mut self, payload: impl Into<Payload>) -> &mut Self {
        self.mode = Mode::Insert;
        let mut fragment = format!("INSERT INTO {} ", self.target());
        match payload.into() {
            Payload::Columns(values) => {
                fragment.push_str(&values.insert_list());
                self.params.extend(values.into_iter().map(|(_, v)| v));
            }
            Payload::Raw(raw) => fragment.push_str(&raw),
        }
        self.insert = Some(fragment);
        self
    }

    /// Appends the upsert clause to the insert fragment.
    ///
    /// A column map renders `c1=?,c2=?` and binds its values.
    pub fn on_duplicate_key_update(&mut self, payload: impl Into<Payload>) -> &mut Self {
        let keyword = self.dialect.upsert_keyword();
        let rendered = match payload.into() {
            Payload::Columns(values) => {
                let list = values.assignment_list();
                self.params.extend(values.into_iter().map(|(_, v)| v));
                list
            }
            Payload::Raw(raw) => raw,
        };

        let fragment = self.insert.get_or_insert_with(String::new);
        fragment.push_str(keyword);
        fragment.push_str(&rendered);
        self
    }

    /// Switches to update mode against the source table.
    pub fn update(&mut self, payload: impl Into<Payload>) -> &mut Self {
        self.mode = Mode::Update;
        let mut fragment = format!("UPDATE {} SET ", self.target());
        match payload.into() {
            Payload::Columns(values) => {
                fragment.push_str(&values.assignment_list());
                self.params.extend(values.into_iter().map(|(_, v)| v));
            }
            Payload::Raw(raw) => fragment.push_str(&raw),
        }
        self.update = Some(fragment);
        self
    }

    /// Switches to delete mode against the source table.
    pub fn delete(&mut self) -> &mut Self {
        self.mode = Mode::Delete;
        self.delete = Some(format!("DELETE FROM {} ", self.target()));
        self
    }

    /// Appends a positional parameter.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.params.push(value.into());
        self
    }

    /// Appends positional parameters in order.
    pub fn bind_all<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Renders the statement text for the current mode.
    pub fn build(&self) -> String {
        let from = self.source.as_ref().map(|s| format!("FROM {s}"));
        let parts: Vec<Option<&str>> = match self.mode {
            Mode::Select => vec![
                Some(self.select.as_str()),
                from.as_deref(),
                Some(self.joins.as_str()),
                self.filter.as_deref(),
                self.having.as_deref(),
                self.group_by.as_deref(),
                self.order_by.as_deref(),
                self.limit.as_deref(),
            ],
            Mode::Insert => vec![self.insert.as_deref()],
            Mode::Update => vec![
                self.update.as_deref(),
                self.filter.as_deref(),
                self.order_by.as_deref(),
                self.limit.as_deref(),
            ],
            Mode::Delete => vec![
                self.delete.as_deref(),
                self.filter.as_deref(),
                self.order_by.as_deref(),
                self.limit.as_deref(),
            ],
        };

        let joined = parts
            .into_iter()
            .map(|part| part.unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        squash_spaces(&joined)
    }

    /// Renders the statement and returns it with its parameters.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let sql = self.build();
        (sql, self.params)
    }

    fn target(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

fn seed<'a>(slot: &'a mut Option<String>, keyword: &str) -> &'a mut String {
    slot.get_or_insert_with(|| keyword.to_string())
}

fn append(fragment: &mut String, clause: &str) {
    fragment.push(' ');
    fragment.push_str(clause);
}

/// Collapses runs of spaces into one and trims the ends.
pub(crate) fn squash_spaces(sql: &str) -> String {
    sql.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

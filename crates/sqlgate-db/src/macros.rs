//! Macros for declaring tables and building value lists.

/// Defines a module describing one database table.
///
/// The generated module holds `TABLE`, `PRIMARY_KEY` and `CONNECTION`
/// constants, one `&str` constant per listed column, a `table()` descriptor
/// and a `gateway()` constructor on the process-wide registry.
///
/// `primary_key` defaults to `"id"` and `connection` to `"default"`.
///
/// # Syntax
///
/// ```ignore
/// define_table!(
///     posts {
///         table: "posts",
///         primary_key: "post_id",
///         connection: "blog",
///         columns: {
///             ID => "post_id",
///             TITLE => "title"
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod posts {
///     pub const TABLE: &str = "posts";
///     pub const PRIMARY_KEY: &str = "post_id";
///     pub const CONNECTION: &str = "blog";
///     pub const ID: &str = "post_id";
///     pub const TITLE: &str = "title";
///
///     pub fn table() -> sqlgate_db::Table { ... }
///     pub fn gateway() -> sqlgate_db::Gateway { ... }
/// }
/// ```
#[macro_export]
macro_rules! define_table {
    (@or $value:literal, $default:literal) => {
        $value
    };
    (@or , $default:literal) => {
        $default
    };
    (
        $module:ident {
            table: $table:literal
            $(, primary_key: $pk:literal)?
            $(, connection: $conn:literal)?
            $(, columns: {
                $($col_name:ident => $db_col:literal),* $(,)?
            })?
            $(,)?
        }
    ) => {
        pub mod $module {
            pub const TABLE: &str = $table;
            pub const PRIMARY_KEY: &str = $crate::define_table!(@or $($pk)?, "id");
            pub const CONNECTION: &str = $crate::define_table!(@or $($conn)?, "default");

            $($(
                pub const $col_name: &str = $db_col;
            )*)?

            pub fn table() -> $crate::Table {
                $crate::Table::new(stringify!($module))
                    .with_name(TABLE)
                    .with_primary_key(PRIMARY_KEY)
                    .with_connection(CONNECTION)
            }

            pub fn gateway() -> $crate::Gateway {
                $crate::Gateway::new(table())
            }
        }
    };
}

/// Builds a `Vec<Value>` of positional parameters.
///
/// ```
/// use sqlgate_db::{values, Value};
///
/// let params = values![1, "news".to_string(), 2.5];
/// assert_eq!(params[0], Value::Integer(1));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::Value::from($value)),*]
    };
}

/// Builds a [`ColumnValues`](crate::ColumnValues) map in the order given.
///
/// ```
/// use sqlgate_db::columns;
///
/// let map = columns! { "title" => "foo".to_string(), "views" => 3 };
/// assert_eq!(map.insert_list(), "(title,views) VALUES (?,?)");
/// ```
#[macro_export]
macro_rules! columns {
    ($($column:expr => $value:expr),* $(,)?) => {
        $crate::ColumnValues::new()$(.set($column, $value))*
    };
}

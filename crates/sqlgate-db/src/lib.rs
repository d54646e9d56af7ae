//! A small SQL helper layer over SQLite.
//!
//! - [`connection`]: named connection registry.
//! - [`query`]: fluent statement builder producing SQL text and parameters.
//! - [`crud`]: statement execution against a named connection.
//! - [`gateway`]: per-table gateway for common statements and paging.
//! - [`pager`]: offset pagination and page-number windows.

pub mod connection;
pub mod crud;
pub mod error;
pub mod gateway;
pub mod macros;
pub mod pager;
pub mod query;
pub mod traits;

pub use connection::{ConnectionRegistry, Handle, OpenOptions, DEFAULT_CONNECTION};
pub use crud::{Conditions, Crud};
pub use error::{DbError, Result};
pub use gateway::{Gateway, PageOptions, Table, Target};
pub use pager::{PageLink, PageNumber, Pager};
pub use query::*;
pub use rusqlite::types::Value;
pub use traits::{FromRow, Record};

#[cfg(test)]
mod tests {
    use rusqlite::Row;
    use serial_test::serial;

    use super::*;

    #[derive(Debug, Clone)]
    struct Article {
        pub id: i64,
        pub title: String,
        pub body: String,
        pub author: Option<String>,
    }

    impl FromRow for Article {
        fn from_row(row: &Row) -> rusqlite::Result<Self> {
            Ok(Self {
                id: row.get("id")?,
                title: row.get("title")?,
                body: row.get("body")?,
                author: row.get("author")?,
            })
        }
    }

    define_table!(
        articles {
            table: "articles",
            connection: "lib_tests",
            columns: {
                ID => "id",
                TITLE => "title",
                BODY => "body",
                AUTHOR => "author"
            }
        }
    );

    define_table!(
        authors {
            table: "authors",
            primary_key: "author_id"
        }
    );

    fn setup_db() -> Handle {
        let handle = ConnectionRegistry::global()
            .open_in_memory(articles::CONNECTION)
            .unwrap();

        handle
            .lock()
            .unwrap()
            .execute(
                "CREATE TABLE articles (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    body TEXT NOT NULL,
                    author TEXT
                )",
                [],
            )
            .unwrap();

        handle
    }

    #[test]
    fn test_define_table_constants() {
        assert_eq!(articles::TABLE, "articles");
        assert_eq!(articles::PRIMARY_KEY, "id");
        assert_eq!(articles::CONNECTION, "lib_tests");
        assert_eq!(articles::TITLE, "title");

        assert_eq!(authors::PRIMARY_KEY, "author_id");
        assert_eq!(authors::CONNECTION, DEFAULT_CONNECTION);
        assert_eq!(authors::table().identifier(), "authors");
        assert_eq!(authors::table().name().unwrap(), "authors");
    }

    #[test]
    #[serial]
    fn test_insert_and_fetch() {
        setup_db();
        let mut gateway = articles::gateway();

        gateway
            .insert(
                &columns! {
                    articles::TITLE => "Hello".to_string(),
                    articles::BODY => "First post".to_string(),
                    articles::AUTHOR => Some("ana".to_string()),
                },
                &ColumnValues::new(),
            )
            .unwrap();
        let id = gateway.last_insert_id().unwrap();
        assert!(id > 0);

        let article: Article = gateway
            .first(&format!("WHERE {}=?", articles::ID), &values![id])
            .unwrap()
            .unwrap();

        assert_eq!(article.id, id);
        assert_eq!(article.title, "Hello");
        assert_eq!(article.body, "First post");
        assert_eq!(article.author, Some("ana".into()));
    }

    #[test]
    #[serial]
    fn test_builder_statement_through_crud() {
        setup_db();
        let crud = Crud::connection(articles::CONNECTION);

        let mut insert = Statement::new();
        insert.from(articles::TABLE).insert(columns! {
            "title" => "Draft".to_string(),
            "body" => "...".to_string(),
        });
        assert_eq!(crud.execute_statement(insert).unwrap(), 1);

        let mut select = Statement::new();
        select
            .table(articles::TABLE, "id, title, body, author")
            .filter("title LIKE ?")
            .bind("Dra%".to_string())
            .order_by("id DESC")
            .limit(1);
        let (sql, params) = select.into_parts();

        let found: Vec<Article> = crud.query(&sql, &params).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Draft");
        assert_eq!(found[0].author, None);
    }
}

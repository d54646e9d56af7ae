use nu_ansi_term::Color::{Blue, Green};
use serde_json::json;
use sqlgate_db::{ColumnValues, PageOptions, Pager, Record, Target};
use tracing::info;

use crate::{
    context::AppContext,
    error::CliResult,
    output::{page_window, records_table},
    utils::{parse_assignment, parse_values, Colored},
};

/// What `rows` should list.
pub struct RowsQuery {
    pub table: String,
    pub filter: Option<String>,
    pub params: Vec<String>,
    pub page: u64,
    pub per_page: Option<u64>,
    pub select: Option<String>,
}

pub fn list_rows(ctx: &AppContext, query: &RowsQuery) -> CliResult<(Vec<Record>, Pager)> {
    let pagination = &ctx.config.pagination;
    let options = PageOptions::default()
        .page(query.page)
        .per_page(query.per_page.unwrap_or(pagination.per_page))
        .url_pattern(pagination.url_pattern.clone())
        .max_pages(pagination.max_pages);

    let mut gateway = ctx.gateway(&query.table, "id");
    if let Some(columns) = query.select.as_deref() {
        gateway.select(columns);
    }

    let params = parse_values(&query.params);
    let filter = query.filter.as_deref().unwrap_or_default();
    let records: Vec<Record> = gateway.paginate(&options, filter, &params)?;
    let pager = gateway.pagination()?.clone();

    if ctx.json {
        let output = json!({
            "rows": records,
            "pagination": pager,
            "pages": pager.pages(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok((records, pager));
    }

    match records_table(&records, Some(&query.table)) {
        Some(table) => info!("\n{table}"),
        None => info!("No rows on page {}", pager.current_page()),
    }
    info!(
        "Page {} of {} ({} rows)",
        Colored(Blue, pager.current_page()),
        Colored(Blue, pager.total_pages()),
        Colored(Green, pager.total_items())
    );
    let window = page_window(&pager);
    if !window.is_empty() {
        info!("{window}");
    }

    Ok((records, pager))
}

pub fn insert_row(
    ctx: &AppContext,
    table: &str,
    values: &[String],
    on_duplicate: &[String],
) -> CliResult<usize> {
    let values = to_columns(values)?;
    let on_duplicate = to_columns(on_duplicate)?;

    let mut gateway = ctx.gateway(table, "id");
    let affected = gateway.insert(&values, &on_duplicate)?;
    let id = gateway.last_insert_id()?;

    if ctx.json {
        let output = json!({ "affected": affected, "lastInsertId": id });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        info!("Inserted into {} (id {})", Colored(Blue, table), Colored(Green, id));
    }

    Ok(affected)
}

/// Deletes by primary key when `target` is an integer, otherwise treats it
/// as a literal clause.
pub fn delete_rows(
    ctx: &AppContext,
    table: &str,
    target: &str,
    primary_key: &str,
) -> CliResult<usize> {
    let mut gateway = ctx.gateway(table, primary_key);
    let affected = gateway.delete(Target::from(target), &[])?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&json!({ "affected": affected }))?);
    } else {
        info!("Deleted {} row(s) from {}", affected, Colored(Blue, table));
    }

    Ok(affected)
}

fn to_columns(assignments: &[String]) -> CliResult<ColumnValues> {
    let mut columns = ColumnValues::new();
    for raw in assignments {
        let (column, value) = parse_assignment(raw)?;
        columns.insert(column, value);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use sqlgate_config::config::Config;
    use sqlgate_db::{ConnectionRegistry, Value};

    use super::*;
    use crate::query::run_exec;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn context() -> AppContext {
        let ctx =
            AppContext::new(Config::default(), ConnectionRegistry::new(), None, false).unwrap();
        run_exec(
            &ctx,
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT UNIQUE, views INTEGER)",
            &[],
        )
        .unwrap();
        for i in 1..=25 {
            insert_row(
                &ctx,
                "posts",
                &[format!("title=post {i}"), format!("views={}", i * 10)],
                &[],
            )
            .unwrap();
        }
        ctx
    }

    fn rows(page: u64, filter: Option<&str>, params: &[&str]) -> RowsQuery {
        RowsQuery {
            table: "posts".into(),
            filter: filter.map(String::from),
            params: strings(params),
            page,
            per_page: None,
            select: None,
        }
    }

    #[test]
    #[serial]
    fn test_list_rows_pages() {
        let ctx = context();

        let (records, pager) = list_rows(&ctx, &rows(3, Some("ORDER BY id"), &[])).unwrap();
        assert_eq!(pager.total_items(), 25);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].get("id"), Some(&Value::Integer(21)));
    }

    #[test]
    #[serial]
    fn test_list_rows_with_filter_and_select() {
        let ctx = context();

        let mut query = rows(1, Some("WHERE views > ? ORDER BY views DESC"), &["200"]);
        query.select = Some("title".into());
        query.per_page = Some(2);

        let (records, pager) = list_rows(&ctx, &query).unwrap();
        assert_eq!(pager.total_items(), 5);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].columns(), ["title".to_string()]);
        assert_eq!(records[0].get("title"), Some(&Value::Text("post 25".into())));
    }

    #[test]
    #[serial]
    fn test_insert_upsert_and_delete() {
        let ctx = context();

        insert_row(
            &ctx,
            "posts",
            &strings(&["title=post 1", "views=0"]),
            &strings(&["views=999"]),
        )
        .unwrap();
        let (records, _) =
            list_rows(&ctx, &rows(1, Some("WHERE title = ?"), &["post 1"])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("views"), Some(&Value::Integer(999)));

        assert_eq!(delete_rows(&ctx, "posts", "1", "id").unwrap(), 1);
        assert_eq!(delete_rows(&ctx, "posts", "WHERE views > 200", "id").unwrap(), 5);

        let (_, pager) = list_rows(&ctx, &rows(1, None, &[])).unwrap();
        assert_eq!(pager.total_items(), 19);
    }

    #[test]
    fn test_invalid_assignment() {
        let ctx =
            AppContext::new(Config::default(), ConnectionRegistry::new(), None, false).unwrap();
        assert!(insert_row(&ctx, "posts", &strings(&["title"]), &[]).is_err());
    }
}

use serde_json::json;
use sqlgate_db::Record;
use tracing::{debug, info};

use crate::{
    context::AppContext,
    error::CliResult,
    output::records_table,
    utils::parse_values,
};

pub fn run_query(ctx: &AppContext, sql: &str, params: &[String]) -> CliResult<Vec<Record>> {
    let params = parse_values(params);
    debug!(connection = %ctx.connection, sql, "running query");

    let records: Vec<Record> = ctx.crud().query(sql, &params)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(records);
    }

    match records_table(&records, None) {
        Some(table) => info!("\n{table}"),
        None => info!("No rows returned"),
    }
    info!("{} row(s)", records.len());

    Ok(records)
}

pub fn run_exec(ctx: &AppContext, sql: &str, params: &[String]) -> CliResult<usize> {
    let params = parse_values(params);
    debug!(connection = %ctx.connection, sql, "running statement");

    let crud = ctx.crud();
    let affected = crud.execute(sql, &params)?;
    let last_insert_id = crud.last_insert_id()?;

    if ctx.json {
        let output = json!({ "affected": affected, "lastInsertId": last_insert_id });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        info!("{affected} row(s) affected");
    }

    Ok(affected)
}

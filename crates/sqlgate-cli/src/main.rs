use clap::Parser;
use cli::{Args, Commands};
use connections::display_connections;
use context::AppContext;
use error::CliResult;
use logging::setup_logging;
use query::{run_exec, run_query};
use sqlgate_config::config;
use sqlgate_db::ConnectionRegistry;
use table::{delete_rows, insert_row, list_rows, RowsQuery};
use tracing::debug;
use utils::COLOR;

mod cli;
mod connections;
mod context;
mod error;
mod logging;
mod output;
mod query;
mod table;
mod utils;

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *color = false;
    }

    config::init(args.config.as_deref())?;

    let ctx = AppContext::from_global(
        ConnectionRegistry::global(),
        args.connection.clone(),
        args.json,
    )?;
    debug!(
        connections = ctx.config.connections.len(),
        default = %ctx.config.default_connection,
        "configuration loaded"
    );

    match args.command {
        Commands::Query { sql, params } => {
            run_query(&ctx, &sql, &params)?;
        }
        Commands::Exec { sql, params } => {
            run_exec(&ctx, &sql, &params)?;
        }
        Commands::Rows {
            table,
            filter,
            params,
            page,
            per_page,
            select,
        } => {
            let query = RowsQuery {
                table,
                filter,
                params,
                page,
                per_page,
                select,
            };
            list_rows(&ctx, &query)?;
        }
        Commands::Insert {
            table,
            values,
            on_duplicate,
        } => {
            insert_row(&ctx, &table, &values, &on_duplicate)?;
        }
        Commands::Delete {
            table,
            target,
            primary_key,
        } => {
            delete_rows(&ctx, &table, &target, &primary_key)?;
        }
        Commands::Connections => display_connections(&ctx)?,
    }

    Ok(())
}

fn main() {
    // Install miette's fancy error handler for beautiful error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

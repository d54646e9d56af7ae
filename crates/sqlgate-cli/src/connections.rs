use nu_ansi_term::Color::{Blue, Green, Red, Yellow};
use serde::Serialize;
use sqlgate_config::config::MEMORY_PATH;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::{
    context::AppContext,
    error::CliResult,
    utils::{term_width, Colored},
};

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub name: String,
    pub path: String,
    pub wal: bool,
    pub read_only: bool,
    pub default: bool,
    pub open: bool,
}

pub fn connection_statuses(ctx: &AppContext) -> Vec<ConnectionStatus> {
    ctx.config
        .connections
        .iter()
        .map(|conn| ConnectionStatus {
            name: conn.name.clone(),
            path: match &conn.path {
                Some(path) if !conn.is_in_memory() => path.display().to_string(),
                _ => MEMORY_PATH.to_string(),
            },
            wal: conn.wal,
            read_only: conn.read_only,
            default: conn.name == ctx.config.default_connection,
            open: ctx.registry.has(&conn.name),
        })
        .collect()
}

pub fn display_connections(ctx: &AppContext) -> CliResult<()> {
    let statuses = connection_statuses(ctx);

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Name", "Path", "Options", "Status"].map(String::from));

    for status in &statuses {
        let name = if status.default {
            format!("{} {}", Colored(Blue, &status.name), Colored(Yellow, "(default)"))
        } else {
            format!("{}", Colored(Blue, &status.name))
        };

        let mut options = Vec::new();
        if status.wal {
            options.push("wal");
        }
        if status.read_only {
            options.push("read-only");
        }

        let state = if status.open {
            format!("{}", Colored(Green, "open"))
        } else {
            format!("{}", Colored(Red, "closed"))
        };

        builder.push_record([name, status.path.clone(), options.join(", "), state]);
    }

    let table = builder
        .build()
        .with(Panel::header("Connections"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlgate_config::config::{Config, ConnectionConfig};
    use sqlgate_db::ConnectionRegistry;

    use super::*;

    #[test]
    fn test_connection_statuses() {
        let mut config = Config::default();
        config.connections.push(ConnectionConfig::in_memory("scratch"));

        let ctx = AppContext::new(config, ConnectionRegistry::new(), None, false).unwrap();
        let statuses = connection_statuses(&ctx);

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "default");
        assert!(statuses[0].default);
        assert_eq!(statuses[0].path, MEMORY_PATH);
        assert!(statuses[1].open);
        assert!(!statuses[1].default);
    }
}

use nu_ansi_term::Color::{Cyan, Green};
use sqlgate_db::{traits::value_to_string, PageNumber, Pager, Record};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};

use crate::utils::{term_width, Colored};

/// Renders rows as a rounded table, or `None` when there are no rows.
pub fn records_table(records: &[Record], title: Option<&str>) -> Option<String> {
    let first = records.first()?;

    let mut builder = Builder::new();
    builder.push_record(
        first
            .columns()
            .iter()
            .map(|c| format!("{}", Colored(Cyan, c))),
    );
    for record in records {
        builder.push_record(record.values().iter().map(value_to_string));
    }

    let mut table = builder.build();
    if let Some(title) = title {
        table.with(Panel::header(title));
    }
    let table = table
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    Some(table)
}

/// One line of page numbers, e.g. `1 ... 4 [5] 6 ... 10`.
pub fn page_window(pager: &Pager) -> String {
    pager
        .pages()
        .iter()
        .map(|link| match link.number {
            PageNumber::Page(n) if link.is_current => format!("{}", Colored(Green, format!("[{n}]"))),
            ref number => number.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

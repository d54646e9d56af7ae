//! The statement builder.
//!
//! [`Statement`] accumulates SQL fragments (select list, source, joins,
//! filter, having, grouping, ordering, limit, or an insert/update/delete
//! payload) and renders one statement string plus the ordered list of values
//! bound to its `?` placeholders.
//!
//! # Submodules
//!
//! - [`clause`]: statement mode and upsert dialect.
//! - [`columns`]: ordered column-value maps and the lists rendered from them.
//! - [`statement`]: implementation of [`Statement`].

pub mod clause;
pub mod columns;
pub mod statement;

pub use clause::{Dialect, Mode};
pub use columns::{ColumnValues, Payload};
pub use statement::Statement;

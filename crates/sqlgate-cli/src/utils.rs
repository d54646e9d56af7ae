use std::{
    fmt::Display,
    sync::{LazyLock, PoisonError, RwLock},
};

use nu_ansi_term::Color;
use sqlgate_db::Value;

use crate::error::{CliError, CliResult};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Parses a command-line parameter into a bound value.
///
/// `null` (any case) is NULL, integers and decimals become numbers, and
/// everything else is text.
pub fn parse_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Integer(n);
    }
    let numeric = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && raw.chars().any(|c| c.is_ascii_digit());
    if numeric {
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Real(f);
        }
    }
    Value::Text(raw.to_string())
}

pub fn parse_values<S: AsRef<str>>(raw: &[S]) -> Vec<Value> {
    raw.iter().map(|r| parse_value(r.as_ref())).collect()
}

/// Splits `COLUMN=VALUE` at the first `=`.
pub fn parse_assignment(raw: &str) -> CliResult<(String, Value)> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidAssignment(raw.to_string()))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::InvalidAssignment(raw.to_string()));
    }
    Ok((column.to_string(), parse_value(value)))
}

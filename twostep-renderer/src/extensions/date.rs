//! `Date` helpers: date formatting with chrono `strftime` patterns.

use std::collections::HashMap;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tera::{Tera, Value};

use super::{optional_str, Extension};

/// Pattern used when `format_date` gets no `format`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DateExtension;

impl Extension for DateExtension {
    fn name(&self) -> &'static str {
        "Date_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_filter("format_date", format_date_filter);
        tera.register_function("now", now_fn);
    }

    fn functions(&self) -> &'static [&'static str] {
        &["now"]
    }

    fn filters(&self) -> &'static [&'static str] {
        &["format_date"]
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, or Unix seconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        }
        _ => None,
    }
}

fn format_with(dt: &DateTime<Utc>, pattern: &str, helper: &str) -> tera::Result<String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(tera::Error::msg(format!("{helper}: invalid format \"{pattern}\"")));
    }
    Ok(dt.format(pattern).to_string())
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let dt = parse_date(value)
        .ok_or_else(|| tera::Error::msg(format!("format_date: cannot read {value} as a date")))?;
    let pattern = optional_str(args, "format", "format_date")?;
    let pattern = pattern.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
    format_with(&dt, pattern, "format_date").map(Value::String)
}

fn now_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let now = Utc::now();
    match optional_str(args, "format", "now")? {
        Some(pattern) => format_with(&now, &pattern, "now").map(Value::String),
        None => Ok(Value::String(now.to_rfc3339())),
    }
}

//! Cell text formatting and overflow handling

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Display, Write};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tabula_core::config::{Overflow, TableSettings};
use tabula_core::PropertyValue;

/// Appended by [`Overflow::Ellipsis`]
pub const ELLIPSIS: &str = "...";

/// Text for one cell
///
/// Missing properties render as empty text. With list style enabled, the
/// first column of a data row is prefixed with the bullet, except for list
/// values which already carry one per item.
pub fn cell_text(value: Option<&PropertyValue>, settings: &TableSettings, first_column: bool) -> String {
    let text = value.map(|v| format_value(v, settings)).unwrap_or_default();
    let is_list = matches!(value, Some(PropertyValue::List(_)));
    if first_column && settings.enable_list_style && !is_list && !settings.list_style_type.is_empty() {
        let mut prefixed = settings.list_style_type.clone();
        prefixed.push_str(&text);
        return prefixed;
    }
    text
}

/// Render a value as display text
pub fn format_value(value: &PropertyValue, settings: &TableSettings) -> String {
    match value {
        PropertyValue::Text(text) | PropertyValue::Raw(text) => text.clone(),
        PropertyValue::Number(n) => n.to_string(),
        PropertyValue::Date(date) => format_date(date, &settings.date_format),
        PropertyValue::DateTime(stamp) => {
            format_datetime(stamp, settings.utc_offset_minutes, &settings.datetime_format)
        }
        PropertyValue::Boolean(true) => String::from("Y"),
        PropertyValue::Boolean(false) => String::from("N"),
        PropertyValue::List(items) => format_list(items, settings),
        PropertyValue::Empty => String::new(),
    }
}

fn format_list(items: &[String], settings: &TableSettings) -> String {
    if settings.enable_list_style {
        items
            .iter()
            .map(|item| {
                let mut entry = settings.list_style_type.clone();
                entry.push_str(item);
                entry
            })
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        items.join(", ")
    }
}

/// Format with a strftime template, falling back to the ISO form when the
/// template is invalid
fn strftime(formatted: impl Display, fallback: impl Display) -> String {
    let mut out = String::new();
    if write!(out, "{}", formatted).is_err() {
        out.clear();
        let _ = write!(out, "{}", fallback);
    }
    out
}

pub fn format_date(date: &NaiveDate, template: &str) -> String {
    strftime(date.format(template), date)
}

/// Shift a UTC timestamp by the configured offset, then format it
pub fn format_datetime(stamp: &NaiveDateTime, offset_minutes: i32, template: &str) -> String {
    let local = stamp
        .checked_add_signed(TimeDelta::minutes(i64::from(offset_minutes)))
        .unwrap_or(*stamp);
    strftime(local.format(template), local)
}

/// Fit `text` into `width` units according to the overflow policy
///
/// Characters are dropped from the end, never splitting a UTF-8 sequence,
/// until the text plus suffix fits. An ellipsis that alone is wider than
/// the column is still returned.
pub fn fit_text(text: &str, width: i32, overflow: Overflow, measure: impl Fn(&str) -> i32) -> String {
    if text.is_empty() || measure(text) <= width {
        return text.to_string();
    }
    let suffix = match overflow {
        Overflow::Ellipsis => ELLIPSIS,
        Overflow::Clip => "",
    };

    let mut result = text.to_string();
    let mut candidate = String::with_capacity(text.len() + suffix.len());
    while result.pop().is_some() {
        candidate.clear();
        candidate.push_str(&result);
        candidate.push_str(suffix);
        if measure(&candidate) <= width {
            return candidate;
        }
    }
    suffix.to_string()
}

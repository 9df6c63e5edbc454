//! Per-property decoding
//!
//! A property object looks like `{"id": "..", "type": "<tag>", "<tag>": ...}`.
//! The member named by the tag is decoded into a [`PropertyValue`].

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::value::RawValue;
use tabula_core::error::ParseFailure;
use tabula_core::{PropertyType, PropertyValue};

use crate::response::classify;

pub const ID: &str = "ID";
pub const CREATED_TIME: &str = "Created Time";
pub const LAST_EDITED_TIME: &str = "Last Edited Time";
pub const ARCHIVED: &str = "Archived";
pub const IN_TRASH: &str = "In Trash";

/// Page-level fields exposed as properties
pub const PSEUDO_PROPERTIES: [&str; 5] = [ID, CREATED_TIME, LAST_EDITED_TIME, ARCHIVED, IN_TRASH];

/// Check if a name refers to a page-level field rather than a property
pub fn is_pseudo(name: &str) -> bool {
    PSEUDO_PROPERTIES.contains(&name)
}

#[derive(Deserialize)]
struct TextSegment {
    #[serde(default)]
    plain_text: String,
}

#[derive(Deserialize)]
struct SelectOption {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct DateRange {
    #[serde(default)]
    start: Option<String>,
}

fn decode<'a, T: Deserialize<'a>>(raw: &'a RawValue) -> Result<T, ParseFailure> {
    serde_json::from_str(raw.get()).map_err(classify)
}

/// Decode one property object
pub fn decode_property(raw: &RawValue) -> Result<(PropertyType, PropertyValue), ParseFailure> {
    let members: BTreeMap<String, &RawValue> = decode(raw)?;
    let tag: String = match members.get("type") {
        Some(tag) => decode(tag)?,
        None => return Err(ParseFailure::Schema),
    };
    let kind = PropertyType::from_tag(&tag);
    let member = match members.get(tag.as_str()) {
        Some(member) => *member,
        None => return Ok((kind, PropertyValue::Empty)),
    };

    let value = match kind {
        PropertyType::Title | PropertyType::RichText => {
            let segments: Option<Vec<TextSegment>> = decode(member)?;
            let text = segments
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.plain_text)
                .collect::<String>();
            PropertyValue::Text(text)
        }
        PropertyType::Number => match decode::<Option<f64>>(member)? {
            Some(n) => PropertyValue::Number(n),
            None => PropertyValue::Empty,
        },
        PropertyType::Date => match decode::<Option<DateRange>>(member)? {
            Some(DateRange { start: Some(start) }) => parse_date(&start),
            _ => PropertyValue::Empty,
        },
        PropertyType::Checkbox => {
            PropertyValue::Boolean(decode::<Option<bool>>(member)?.unwrap_or(false))
        }
        PropertyType::Select | PropertyType::Status => {
            match decode::<Option<SelectOption>>(member)? {
                Some(option) => PropertyValue::Text(option.name),
                None => PropertyValue::Empty,
            }
        }
        PropertyType::MultiSelect => {
            let options: Option<Vec<SelectOption>> = decode(member)?;
            PropertyValue::List(
                options
                    .unwrap_or_default()
                    .into_iter()
                    .map(|o| o.name)
                    .collect(),
            )
        }
        PropertyType::Email | PropertyType::PhoneNumber | PropertyType::Url => {
            match decode::<Option<String>>(member)? {
                Some(text) => PropertyValue::Text(text),
                None => PropertyValue::Empty,
            }
        }
        PropertyType::CreatedTime | PropertyType::LastEditedTime => {
            match decode::<Option<String>>(member)? {
                Some(stamp) => parse_timestamp(&stamp),
                None => PropertyValue::Empty,
            }
        }
        PropertyType::Unknown => PropertyValue::Raw(member.get().to_string()),
    };
    Ok((kind, value))
}

/// A `date` start: either a calendar date or a full timestamp
pub fn parse_date(text: &str) -> PropertyValue {
    if text.len() == 10 {
        match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(date) => PropertyValue::Date(date),
            Err(_) => PropertyValue::Raw(text.to_string()),
        }
    } else {
        parse_timestamp(text)
    }
}

/// An RFC 3339 timestamp, normalized to UTC
///
/// Unparseable text is kept as raw text rather than failing the page.
pub fn parse_timestamp(text: &str) -> PropertyValue {
    match DateTime::parse_from_rfc3339(text) {
        Ok(stamp) => PropertyValue::DateTime(stamp.naive_utc()),
        Err(_) => PropertyValue::Raw(text.to_string()),
    }
}

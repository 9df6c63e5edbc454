//! Response parsing
//!
//! The body has already been read into a bounded buffer by the client; the
//! parser never sees a truncated-by-capacity body. Property objects are kept
//! as borrowed raw JSON until projection decides whether they are decoded.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::value::RawValue;
use tabula_core::config::PropertyFilter;
use tabula_core::error::ParseFailure;
use tabula_core::{Cursor, ParsedPage, PropertyValue, Row};
use xxhash_rust::xxh32::Xxh32;

use crate::property::{
    decode_property, parse_timestamp, ARCHIVED, CREATED_TIME, ID, IN_TRASH, LAST_EDITED_TIME,
    PSEUDO_PROPERTIES,
};

#[derive(Deserialize)]
struct QueryResponse<'a> {
    #[serde(borrow)]
    results: Vec<RawPage<'a>>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct RawPage<'a> {
    id: String,
    #[serde(default)]
    created_time: Option<String>,
    #[serde(default)]
    last_edited_time: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    in_trash: bool,
    #[serde(borrow, default)]
    properties: BTreeMap<String, &'a RawValue>,
}

impl RawPage<'_> {
    fn pseudo_value(&self, name: &str) -> PropertyValue {
        let stamp = |value: &Option<String>| match value {
            Some(text) => parse_timestamp(text),
            None => PropertyValue::Empty,
        };
        match name {
            ID => PropertyValue::Text(self.id.clone()),
            CREATED_TIME => stamp(&self.created_time),
            LAST_EDITED_TIME => stamp(&self.last_edited_time),
            ARCHIVED => PropertyValue::Boolean(self.archived),
            IN_TRASH => PropertyValue::Boolean(self.in_trash),
            _ => PropertyValue::Empty,
        }
    }
}

/// Map a JSON error to a parse failure class
pub(crate) fn classify(err: serde_json::Error) -> ParseFailure {
    match err.classify() {
        Category::Io | Category::Syntax => ParseFailure::Syntax,
        Category::Eof => ParseFailure::UnexpectedEof,
        Category::Data => ParseFailure::Schema,
    }
}

/// Parse a complete response body into a page
///
/// Only properties named in `filters` are decoded (all of them when
/// `filters` is empty), but every property name is reported as available.
pub fn parse_page(body: &[u8], filters: &[PropertyFilter]) -> Result<ParsedPage, ParseFailure> {
    let response: QueryResponse<'_> = serde_json::from_slice(body).map_err(classify)?;
    let wanted = |name: &str| filters.is_empty() || filters.iter().any(|f| f.name == name);

    let mut hasher = Xxh32::new(0);
    let mut available = BTreeSet::new();
    let mut rows = Vec::with_capacity(response.results.len());

    for page in response.results {
        hasher.update(page.id.as_bytes());
        hasher.update(page.last_edited_time.as_deref().unwrap_or("").as_bytes());

        let mut row = Row::new(page.id.clone());
        for name in PSEUDO_PROPERTIES {
            if wanted(name) {
                row.set(name, page.pseudo_value(name));
            }
            available.insert(name.to_string());
        }

        for (name, raw) in page.properties {
            if wanted(&name) {
                let (_, value) = decode_property(raw)?;
                row.set(name.clone(), value);
            }
            available.insert(name);
        }
        rows.push(row);
    }

    let next_cursor = if response.has_more {
        response.next_cursor.map(Cursor::from)
    } else {
        None
    };

    Ok(ParsedPage {
        rows,
        has_more: response.has_more,
        next_cursor,
        fingerprint: hasher.digest(),
        available_properties: available,
    })
}

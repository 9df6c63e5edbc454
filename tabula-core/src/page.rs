//! Page model
//!
//! A `PageModel` is built once from a fully parsed response and never mutated
//! afterwards. The renderer reaches it only through [`SharedPage`], which
//! swaps whole pages under a blocking mutex.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;

use chrono::{NaiveDate, NaiveDateTime};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::pagination::Cursor;

/// Property type as declared by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyType {
    Title,
    RichText,
    Number,
    Date,
    Checkbox,
    Select,
    MultiSelect,
    Status,
    Email,
    PhoneNumber,
    Url,
    CreatedTime,
    LastEditedTime,
    /// Any type this client does not decode (formula, rollup, people, ...)
    Unknown,
}

impl PropertyType {
    /// Map the API's `type` tag to a property type
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "title" => PropertyType::Title,
            "rich_text" => PropertyType::RichText,
            "number" => PropertyType::Number,
            "date" => PropertyType::Date,
            "checkbox" => PropertyType::Checkbox,
            "select" => PropertyType::Select,
            "multi_select" => PropertyType::MultiSelect,
            "status" => PropertyType::Status,
            "email" => PropertyType::Email,
            "phone_number" => PropertyType::PhoneNumber,
            "url" => PropertyType::Url,
            "created_time" => PropertyType::CreatedTime,
            "last_edited_time" => PropertyType::LastEditedTime,
            _ => PropertyType::Unknown,
        }
    }

    /// The API's `type` tag for this property type
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyType::Title => "title",
            PropertyType::RichText => "rich_text",
            PropertyType::Number => "number",
            PropertyType::Date => "date",
            PropertyType::Checkbox => "checkbox",
            PropertyType::Select => "select",
            PropertyType::MultiSelect => "multi_select",
            PropertyType::Status => "status",
            PropertyType::Email => "email",
            PropertyType::PhoneNumber => "phone_number",
            PropertyType::Url => "url",
            PropertyType::CreatedTime => "created_time",
            PropertyType::LastEditedTime => "last_edited_time",
            PropertyType::Unknown => "unknown",
        }
    }
}

/// One cell value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Timestamp in UTC
    DateTime(NaiveDateTime),
    Boolean(bool),
    List(Vec<String>),
    /// Undecoded property, kept as its JSON text
    Raw(String),
    /// Property present but null
    Empty,
}

impl PropertyValue {
    /// Check if the value renders as nothing
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Text(s) | PropertyValue::Raw(s) => s.is_empty(),
            PropertyValue::List(items) => items.is_empty(),
            PropertyValue::Empty => true,
            _ => false,
        }
    }
}

/// One database row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Page id of the row
    pub id: String,
    /// Cells by property name
    pub cells: BTreeMap<String, PropertyValue>,
}

impl Row {
    /// Create an empty row
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Get a cell by property name
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.cells.get(name)
    }

    /// Set a cell, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.cells.insert(name.into(), value);
    }
}

/// Output of a successful parse, before it becomes a published page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPage {
    /// Rows in response order
    pub rows: Vec<Row>,
    /// More pages follow this one
    pub has_more: bool,
    /// Cursor for the following page, present only when `has_more`
    pub next_cursor: Option<Cursor>,
    /// Hash of row ids and last-edited times
    pub fingerprint: u32,
    /// Every property name seen, before projection
    pub available_properties: BTreeSet<String>,
}

/// Immutable snapshot of one displayed page
#[derive(Debug, Clone, PartialEq)]
pub struct PageModel {
    rows: Vec<Row>,
    page_index: usize,
    fingerprint: u32,
    available_properties: Vec<String>,
}

impl PageModel {
    /// Build a page model
    pub fn new(
        rows: Vec<Row>,
        page_index: usize,
        fingerprint: u32,
        available_properties: Vec<String>,
    ) -> Self {
        Self {
            rows,
            page_index,
            fingerprint,
            available_properties,
        }
    }

    /// Rows in display order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Zero-based page index this page was fetched at
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Property names known when this page was published, sorted
    pub fn available_properties(&self) -> &[String] {
        &self.available_properties
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the page has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Handle through which the fetch pipeline publishes pages to renderers
///
/// Readers always observe either the previous or the new complete page.
pub struct SharedPage<M: RawMutex> {
    inner: Mutex<M, RefCell<Option<Arc<PageModel>>>>,
}

impl<M: RawMutex> SharedPage<M> {
    /// Create an empty handle (no page loaded)
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Replace the current page
    pub fn publish(&self, page: Arc<PageModel>) {
        self.inner.lock(|cell| {
            cell.replace(Some(page));
        });
    }

    /// Get the current page, if one has been published
    pub fn snapshot(&self) -> Option<Arc<PageModel>> {
        self.inner.lock(|cell| cell.borrow().clone())
    }
}

impl<M: RawMutex> Default for SharedPage<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_property_type_tags_roundtrip() {
        for tag in ["title", "rich_text", "number", "date", "multi_select", "url"] {
            assert_eq!(PropertyType::from_tag(tag).tag(), tag);
        }
        assert_eq!(PropertyType::from_tag("formula"), PropertyType::Unknown);
    }

    #[test]
    fn test_empty_values() {
        assert!(PropertyValue::Empty.is_empty());
        assert!(PropertyValue::Text(String::new()).is_empty());
        assert!(PropertyValue::List(Vec::new()).is_empty());
        assert!(!PropertyValue::Boolean(false).is_empty());
        assert!(!PropertyValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_row_cells() {
        let mut row = Row::new("abc");
        row.set("Name", PropertyValue::Text("Tea".into()));
        row.set("Name", PropertyValue::Text("Coffee".into()));
        assert_eq!(row.get("Name"), Some(&PropertyValue::Text("Coffee".into())));
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn test_shared_page_swaps_whole_pages() {
        let shared: SharedPage<NoopRawMutex> = SharedPage::new();
        assert!(shared.snapshot().is_none());

        let first = Arc::new(PageModel::new(vec![Row::new("a")], 0, 1, Vec::new()));
        shared.publish(first.clone());
        let held = shared.snapshot().unwrap();

        let second = Arc::new(PageModel::new(vec![Row::new("b"), Row::new("c")], 1, 2, Vec::new()));
        shared.publish(second);

        // A reader holding the old snapshot still sees the old page intact
        assert_eq!(held.len(), 1);
        assert_eq!(held.rows()[0].id, "a");
        assert_eq!(shared.snapshot().unwrap().len(), 2);
    }
}

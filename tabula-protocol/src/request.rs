//! Query request construction
//!
//! The body template (configured query plus property-filter clauses) is built
//! once at setup. Each fetch only adds `start_cursor`.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{json, Map, Value};
use tabula_core::config::{DatabaseSettings, PropertyFilter};
use tabula_core::{ConfigError, Cursor, PropertyType};

use crate::property::is_pseudo;

/// Database endpoint prefix
pub const API_BASE: &str = "https://api.notion.com/v1/databases";

/// API version header value
pub const NOTION_VERSION: &str = "2022-06-28";

/// The one request shape this client issues
#[derive(Debug, Clone)]
pub struct QueryRequest {
    url: String,
    authorization: String,
    template: Map<String, Value>,
}

impl QueryRequest {
    /// Build the request template from bound settings
    ///
    /// Fails if the query text is not a JSON object.
    pub fn new(settings: &DatabaseSettings) -> Result<Self, ConfigError> {
        let mut template = if settings.query.is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(&settings.query) {
                Ok(Value::Object(map)) => map,
                _ => return Err(ConfigError::InvalidQuery),
            }
        };

        let clauses: Vec<Value> = settings
            .property_filters
            .iter()
            .filter(|f| !is_pseudo(&f.name))
            .map(filter_clause)
            .collect();

        if !clauses.is_empty() {
            let mut all = Vec::with_capacity(clauses.len() + 1);
            if let Some(existing) = template.remove("filter") {
                all.push(existing);
            }
            all.extend(clauses);
            template.insert("filter".to_string(), json!({ "and": all }));
        }

        Ok(Self {
            url: format!("{}/{}/query", API_BASE, settings.database_id),
            authorization: format!("Bearer {}", settings.api_key),
            template,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers as (name, value) pairs
    pub fn headers(&self) -> [(&str, &str); 3] {
        [
            ("Authorization", self.authorization.as_str()),
            ("Notion-Version", NOTION_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    /// Serialize the body for one fetch
    pub fn body(&self, cursor: Option<&Cursor>) -> Vec<u8> {
        let mut body = self.template.clone();
        if let Some(cursor) = cursor {
            body.insert(
                "start_cursor".to_string(),
                Value::String(cursor.as_str().to_string()),
            );
        }
        Value::Object(body).to_string().into_bytes()
    }
}

/// Server-side predicate requiring a value for one property
fn filter_clause(filter: &PropertyFilter) -> Value {
    let condition = match filter.kind {
        PropertyType::Checkbox => json!({ "equals": true }),
        _ => json!({ "is_not_empty": true }),
    };
    let mut clause = Map::new();
    clause.insert("property".to_string(), Value::String(filter.name.clone()));
    clause.insert(filter.kind.tag().to_string(), condition);
    Value::Object(clause)
}

//! Database query configuration

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::Deserialize;

use super::templatable::Templatable;
use crate::error::ConfigError;
use crate::page::PropertyType;

/// Maximum property filters per database
pub const MAX_PROPERTY_FILTERS: usize = 16;

/// Default parse buffer capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 20 * 1024;

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 5_000;

/// Default overall transfer timeout
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// Default deadline for connect + transfer + parse
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u32 = 15_000;

/// Default refresh interval
pub const DEFAULT_POLLING_INTERVAL_MS: u32 = 60_000;

/// Database configuration as written by the user
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DatabaseConfig {
    /// Integration token sent as `Authorization: Bearer`
    pub api_key: Templatable<String>,
    /// Database id
    pub database_id: Templatable<String>,
    /// Query body as a JSON object; empty means `{}`
    pub query: Templatable<String>,
    /// Properties to show and require, as `name` or `name:type`
    pub property_filters: heapless::Vec<String, MAX_PROPERTY_FILTERS>,
    /// Parse buffer capacity in bytes
    pub buffer_size: Templatable<usize>,
    pub connect_timeout_ms: Templatable<u32>,
    pub timeout_ms: Templatable<u32>,
    pub watchdog_timeout_ms: Templatable<u32>,
    /// Verify the server certificate; on unless explicitly disabled
    pub verify_tls: Templatable<bool>,
    pub polling_interval_ms: Templatable<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            api_key: Templatable::default(),
            database_id: Templatable::default(),
            query: Templatable::default(),
            property_filters: heapless::Vec::new(),
            buffer_size: Templatable::Static(DEFAULT_BUFFER_SIZE),
            connect_timeout_ms: Templatable::Static(DEFAULT_CONNECT_TIMEOUT_MS),
            timeout_ms: Templatable::Static(DEFAULT_TIMEOUT_MS),
            watchdog_timeout_ms: Templatable::Static(DEFAULT_WATCHDOG_TIMEOUT_MS),
            verify_tls: Templatable::Static(true),
            polling_interval_ms: Templatable::Static(DEFAULT_POLLING_INTERVAL_MS),
        }
    }
}

impl DatabaseConfig {
    /// Create a config with default limits
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_key: Templatable::Static(api_key.into()),
            database_id: Templatable::Static(database_id.into()),
            ..Self::default()
        }
    }

    /// Add a property filter (`name` or `name:type`)
    pub fn add_property_filter(&mut self, spec: &str) -> Result<(), ConfigError> {
        self.property_filters
            .push(String::from(spec))
            .map_err(|_| ConfigError::TooManyItems)
    }

    /// Evaluate every field once and validate the result
    pub fn bind(&self) -> Result<DatabaseSettings, ConfigError> {
        let api_key = self.api_key.value();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let database_id = self.database_id.value();
        if database_id.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseId);
        }

        let query = self.query.value();
        let trimmed = query.trim();
        if !trimmed.is_empty() && !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            return Err(ConfigError::InvalidQuery);
        }

        let buffer_size = self.buffer_size.value();
        let connect_timeout_ms = self.connect_timeout_ms.value();
        let timeout_ms = self.timeout_ms.value();
        let watchdog_timeout_ms = self.watchdog_timeout_ms.value();
        let polling_interval_ms = self.polling_interval_ms.value();
        if buffer_size == 0
            || connect_timeout_ms == 0
            || timeout_ms == 0
            || watchdog_timeout_ms == 0
            || polling_interval_ms == 0
        {
            return Err(ConfigError::InvalidLimit);
        }

        let property_filters = self
            .property_filters
            .iter()
            .map(|spec| PropertyFilter::parse(spec))
            .collect();

        Ok(DatabaseSettings {
            api_key,
            database_id,
            query: String::from(trimmed),
            property_filters,
            buffer_size,
            connect_timeout_ms,
            timeout_ms,
            watchdog_timeout_ms,
            verify_tls: self.verify_tls.value(),
            polling_interval_ms,
        })
    }
}

/// Bound database settings, fixed for the lifetime of the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub api_key: String,
    pub database_id: String,
    /// Trimmed query object text, possibly empty
    pub query: String,
    pub property_filters: Vec<PropertyFilter>,
    pub buffer_size: usize,
    pub connect_timeout_ms: u32,
    pub timeout_ms: u32,
    pub watchdog_timeout_ms: u32,
    pub verify_tls: bool,
    pub polling_interval_ms: u32,
}

/// A property that rows must have a value for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    /// Property name
    pub name: String,
    /// Property type, selecting the server-side predicate
    pub kind: PropertyType,
}

impl PropertyFilter {
    /// Parse `name` or `name:type`
    ///
    /// The suffix only counts when it names a known property type, so
    /// property names containing `:` still work.
    pub fn parse(spec: &str) -> Self {
        if let Some((name, tag)) = spec.rsplit_once(':') {
            let kind = PropertyType::from_tag(tag.trim());
            if kind != PropertyType::Unknown {
                return Self {
                    name: String::from(name.trim()),
                    kind,
                };
            }
        }
        Self {
            name: String::from(spec.trim()),
            kind: PropertyType::RichText,
        }
    }
}

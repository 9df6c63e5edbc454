//! Table view configuration

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::Deserialize;

use super::templatable::Templatable;
use crate::error::ConfigError;

/// Maximum configured columns
pub const MAX_COLUMNS: usize = 12;

/// Default row height in display units
pub const DEFAULT_LINE_HEIGHT: u16 = 40;

/// Default bullet placed before list items and first-column cells
pub const DEFAULT_LIST_STYLE: &str = "• ";

/// Default date template
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default date-time template
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// What to do with cell text wider than its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Overflow {
    /// Truncate and append `...`
    #[default]
    Ellipsis,
    /// Hard cut, no indicator
    Clip,
}

/// Table view configuration as written by the user
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableViewConfig {
    /// Property names to show, in column order; empty shows every property
    pub columns: heapless::Vec<String, MAX_COLUMNS>,
    /// Explicit widths by column position; 0 or missing means shared
    pub column_widths: heapless::Vec<u16, MAX_COLUMNS>,
    pub line_height: Templatable<u16>,
    pub title: Templatable<String>,
    pub enable_title: Templatable<bool>,
    pub invert_title_color: Templatable<bool>,
    pub enable_header: Templatable<bool>,
    pub invert_header_color: Templatable<bool>,
    pub enable_grid_line: Templatable<bool>,
    pub enable_list_style: Templatable<bool>,
    pub list_style_type: Templatable<String>,
    pub overflow: Templatable<Overflow>,
    pub date_format: Templatable<String>,
    pub datetime_format: Templatable<String>,
    /// Offset applied to UTC timestamps before formatting
    pub utc_offset_minutes: Templatable<i32>,
}

impl Default for TableViewConfig {
    fn default() -> Self {
        Self {
            columns: heapless::Vec::new(),
            column_widths: heapless::Vec::new(),
            line_height: Templatable::Static(DEFAULT_LINE_HEIGHT),
            title: Templatable::default(),
            enable_title: Templatable::Static(false),
            invert_title_color: Templatable::Static(true),
            enable_header: Templatable::Static(true),
            invert_header_color: Templatable::Static(true),
            enable_grid_line: Templatable::Static(true),
            enable_list_style: Templatable::Static(false),
            list_style_type: Templatable::Static(String::from(DEFAULT_LIST_STYLE)),
            overflow: Templatable::Static(Overflow::Ellipsis),
            date_format: Templatable::Static(String::from(DEFAULT_DATE_FORMAT)),
            datetime_format: Templatable::Static(String::from(DEFAULT_DATETIME_FORMAT)),
            utc_offset_minutes: Templatable::Static(0),
        }
    }
}

impl TableViewConfig {
    /// Append a column, optionally with an explicit width
    pub fn add_column(&mut self, name: &str, width: Option<u16>) -> Result<(), ConfigError> {
        let position = self.columns.len();
        self.columns
            .push(String::from(name))
            .map_err(|_| ConfigError::TooManyItems)?;
        if let Some(width) = width {
            while self.column_widths.len() < position {
                self.column_widths
                    .push(0)
                    .map_err(|_| ConfigError::TooManyItems)?;
            }
            self.column_widths
                .push(width)
                .map_err(|_| ConfigError::TooManyItems)?;
        }
        Ok(())
    }

    /// Evaluate every field once and validate the result
    pub fn bind(&self) -> Result<TableSettings, ConfigError> {
        let line_height = self.line_height.value();
        if line_height == 0 {
            return Err(ConfigError::InvalidLineHeight);
        }

        Ok(TableSettings {
            columns: self.columns.iter().cloned().collect(),
            column_widths: self.column_widths.iter().copied().collect(),
            line_height,
            title: self.title.value(),
            enable_title: self.enable_title.value(),
            invert_title_color: self.invert_title_color.value(),
            enable_header: self.enable_header.value(),
            invert_header_color: self.invert_header_color.value(),
            enable_grid_line: self.enable_grid_line.value(),
            enable_list_style: self.enable_list_style.value(),
            list_style_type: self.list_style_type.value(),
            overflow: self.overflow.value(),
            date_format: self.date_format.value(),
            datetime_format: self.datetime_format.value(),
            utc_offset_minutes: self.utc_offset_minutes.value(),
        })
    }
}

/// Bound table settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSettings {
    pub columns: Vec<String>,
    pub column_widths: Vec<u16>,
    pub line_height: u16,
    pub title: String,
    pub enable_title: bool,
    pub invert_title_color: bool,
    pub enable_header: bool,
    pub invert_header_color: bool,
    pub enable_grid_line: bool,
    pub enable_list_style: bool,
    pub list_style_type: String,
    pub overflow: Overflow,
    pub date_format: String,
    pub datetime_format: String,
    pub utc_offset_minutes: i32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            column_widths: Vec::new(),
            line_height: DEFAULT_LINE_HEIGHT,
            title: String::new(),
            enable_title: false,
            invert_title_color: true,
            enable_header: true,
            invert_header_color: true,
            enable_grid_line: true,
            enable_list_style: false,
            list_style_type: String::from(DEFAULT_LIST_STYLE),
            overflow: Overflow::Ellipsis,
            date_format: String::from(DEFAULT_DATE_FORMAT),
            datetime_format: String::from(DEFAULT_DATETIME_FORMAT),
            utc_offset_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bound_defaults() {
        let bound = TableViewConfig::default().bind().unwrap();
        assert_eq!(bound, TableSettings::default());
        assert_eq!(bound.line_height, 40);
        assert!(bound.enable_header);
        assert!(bound.invert_header_color);
        assert!(!bound.enable_title);
        assert!(bound.enable_grid_line);
        assert_eq!(bound.list_style_type, "• ");
        assert_eq!(bound.overflow, Overflow::Ellipsis);
    }

    #[test]
    fn test_zero_line_height_rejected() {
        let config = TableViewConfig {
            line_height: Templatable::Static(0),
            ..TableViewConfig::default()
        };
        assert_eq!(config.bind(), Err(ConfigError::InvalidLineHeight));

        let config = TableViewConfig {
            line_height: Templatable::provider(|| 0),
            ..TableViewConfig::default()
        };
        assert_eq!(config.bind(), Err(ConfigError::InvalidLineHeight));
    }

    #[test]
    fn test_add_column_keeps_widths_positional() {
        let mut config = TableViewConfig::default();
        config.add_column("Name", None).unwrap();
        config.add_column("Date", Some(120)).unwrap();
        config.add_column("Tags", None).unwrap();

        let bound = config.bind().unwrap();
        assert_eq!(bound.columns, ["Name", "Date", "Tags"]);
        assert_eq!(bound.column_widths, [0, 120]);
    }

    #[test]
    fn test_too_many_columns() {
        let mut config = TableViewConfig::default();
        for _ in 0..MAX_COLUMNS {
            config.add_column("c", None).unwrap();
        }
        assert_eq!(config.add_column("c", None), Err(ConfigError::TooManyItems));
    }

    #[test]
    fn test_title_provider() {
        let config = TableViewConfig {
            title: Templatable::provider(|| String::from("Tasks")),
            enable_title: true.into(),
            ..TableViewConfig::default()
        };
        assert_eq!(config.bind().unwrap().title, "Tasks");
    }

    #[test]
    fn test_style_providers() {
        let config = TableViewConfig {
            line_height: Templatable::provider(|| 24),
            enable_header: Templatable::provider(|| false),
            enable_list_style: Templatable::provider(|| true),
            list_style_type: Templatable::provider(|| String::from("- ")),
            overflow: Templatable::provider(|| Overflow::Clip),
            date_format: Templatable::provider(|| String::from("%d/%m")),
            ..TableViewConfig::default()
        };
        let bound = config.bind().unwrap();
        assert_eq!(bound.line_height, 24);
        assert!(!bound.enable_header);
        assert!(bound.enable_list_style);
        assert_eq!(bound.list_style_type, "- ");
        assert_eq!(bound.overflow, Overflow::Clip);
        assert_eq!(bound.date_format, "%d/%m");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_from_toml() {
        let config: TableViewConfig = toml::from_str(
            r#"
            columns = ["Name", "Date"]
            column_widths = [100]
            overflow = "CLIP"
            enable_list_style = true
            "#,
        )
        .unwrap();
        let bound = config.bind().unwrap();
        assert_eq!(bound.overflow, Overflow::Clip);
        assert_eq!(bound.column_widths, [100]);
        assert!(bound.enable_list_style);
        assert_eq!(bound.line_height, 40);
    }
}

//! Table renderer
//!
//! A `TableView` is bound to one shared page at construction and redraws the
//! whole table from the current snapshot on every call to [`TableView::draw`].
//! Grid, title and header are drawn whether or not a page is loaded.

use alloc::string::String;
use alloc::vec::Vec;

use embassy_sync::blocking_mutex::raw::RawMutex;
use tabula_core::config::TableSettings;
use tabula_core::{PageModel, SharedPage};

use crate::backend::{Canvas, Color, DisplayError, Rect, TextAlign};
use crate::format::{cell_text, fit_text};
use crate::layout::{column_widths, row_capacity};

/// Horizontal inset of cell text from the column edge
pub const CELL_INSET: i32 = 2;

/// Table view over one database's pages
pub struct TableView<'a, M: RawMutex> {
    source: &'a SharedPage<M>,
    settings: TableSettings,
}

impl<'a, M: RawMutex> TableView<'a, M> {
    /// Bind a view to its page source
    pub fn new(source: &'a SharedPage<M>, settings: TableSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Columns to show: the configured ones, else every known property
    pub fn columns(&self, page: Option<&PageModel>) -> Vec<String> {
        if !self.settings.columns.is_empty() {
            return self.settings.columns.clone();
        }
        page.map(|p| p.available_properties().to_vec())
            .unwrap_or_default()
    }

    fn title_enabled(&self) -> bool {
        self.settings.enable_title && !self.settings.title.is_empty()
    }

    /// Data rows that fit in `area`
    pub fn row_capacity(&self, area: Rect, has_columns: bool) -> usize {
        row_capacity(
            area.height,
            self.settings.line_height,
            self.title_enabled(),
            self.settings.enable_header && has_columns,
        )
    }

    /// Draw the table into `area`
    pub fn draw<C: Canvas>(&self, canvas: &mut C, area: Rect) -> Result<(), DisplayError> {
        let page = self.source.snapshot();
        let columns = self.columns(page.as_deref());
        let widths = column_widths(columns.len(), &self.settings.column_widths, area.width);
        let lh = i32::from(self.settings.line_height);
        let grid = self.settings.enable_grid_line;
        let mut y = area.y;

        if grid {
            canvas.line(area.x, y, area.right(), y, Color::On)?;
        }

        if self.title_enabled() {
            let fg = if self.settings.invert_title_color {
                canvas.filled_rect(area.x, y, area.width, lh, Color::On)?;
                Color::Off
            } else {
                Color::On
            };
            canvas.text(
                area.x + area.width / 2,
                y + lh / 2,
                TextAlign::Center,
                fg,
                &self.settings.title,
            )?;
            y += lh;
            if grid {
                canvas.line(area.x, y, area.right(), y, Color::On)?;
            }
        }

        if self.settings.enable_header && !columns.is_empty() {
            let fg = if self.settings.invert_header_color {
                canvas.filled_rect(area.x, y, area.width, lh, Color::On)?;
                Color::Off
            } else {
                Color::On
            };
            self.draw_row(canvas, area, y, &columns, &widths, fg)?;
            y += lh;
        }

        if let Some(page) = &page {
            let capacity = self.row_capacity(area, !columns.is_empty());
            for row in page.rows().iter().take(capacity) {
                let texts: Vec<String> = columns
                    .iter()
                    .enumerate()
                    .map(|(i, name)| cell_text(row.get(name), &self.settings, i == 0))
                    .collect();
                self.draw_row(canvas, area, y, &texts, &widths, Color::On)?;
                y += lh;
            }
        }

        if grid {
            canvas.line(area.x, area.y, area.x, y, Color::On)?;
            canvas.line(area.right() - 1, area.y, area.right() - 1, y, Color::On)?;
        }
        Ok(())
    }

    /// Draw one line of cells with its separators and bottom rule
    ///
    /// `fg` only colors the text; grid lines are always drawn `On`.
    fn draw_row<C: Canvas>(
        &self,
        canvas: &mut C,
        area: Rect,
        y: i32,
        texts: &[String],
        widths: &[i32],
        fg: Color,
    ) -> Result<(), DisplayError> {
        let lh = i32::from(self.settings.line_height);
        let last = texts.len().saturating_sub(1);
        let mut x = area.x;

        for (i, (text, width)) in texts.iter().zip(widths).enumerate() {
            if *width == 0 {
                continue;
            }
            let shown = fit_text(text, width - CELL_INSET, self.settings.overflow, |s| {
                canvas.text_width(s)
            });
            if !shown.is_empty() {
                canvas.text(x + CELL_INSET, y + lh / 2, TextAlign::CenterLeft, fg, &shown)?;
            }
            x += width;
            if self.settings.enable_grid_line && i < last {
                let gx = x.min(area.right());
                canvas.line(gx, y, gx, y + lh, Color::On)?;
            }
        }

        if self.settings.enable_grid_line {
            canvas.line(area.x, y + lh, area.right(), y + lh, Color::On)?;
        }
        Ok(())
    }
}

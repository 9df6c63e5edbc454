//! Display backend trait
//!
//! Defines the drawing primitives the table renderer needs. Coordinates are
//! in display units (pixels on most panels) with the origin at the top left.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
}

/// Two-tone drawing color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Foreground
    On,
    /// Background
    Off,
}

/// Text anchor relative to the given point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextAlign {
    /// Left edge, vertically centered
    CenterLeft,
    /// Horizontally and vertically centered
    Center,
}

/// Drawing area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// Canvas trait
///
/// Provides a hardware-agnostic interface for the primitives a table needs.
/// Implementations wrap a display driver and its font.
pub trait Canvas {
    /// Draw a straight line between two points
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color)
        -> Result<(), DisplayError>;

    /// Fill a rectangle
    fn filled_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), DisplayError>;

    /// Draw text anchored at a point
    fn text(
        &mut self,
        x: i32,
        y: i32,
        align: TextAlign,
        color: Color,
        text: &str,
    ) -> Result<(), DisplayError>;

    /// Rendered width of `text` in the canvas font
    fn text_width(&self, text: &str) -> i32;
}

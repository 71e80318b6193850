//! Drawing surfaces.
//!
//! The report engine never talks to the PDF writer directly. It draws through
//! [`DrawingSurface`], a small set of primitives in millimetres with the
//! origin at the top-left corner of the page and y growing downwards.
//!
//! Two implementations exist:
//!
//! - [`PdfSurface`] converts every call into PDF content-stream operators.
//! - [`RecordingSurface`] only records the calls, which lets tests observe
//!   exactly what was drawn and where.
//!
//! Both measure and wrap text with the same Helvetica metrics, so a layout
//! computed against one is identical on the other.

mod pdf;
mod recording;

pub use pdf::PdfSurface;
pub use recording::{DrawOp, RecordingSurface};

use crate::error::Result;
use crate::writer::{FontManager, FontStyle};
use serde::Serialize;
use std::path::Path;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Line pitch of multi-line text, as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Pure black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// A neutral gray.
    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Multiply every channel by `factor`, truncating like a canvas color would.
    pub fn scale(self, factor: f64) -> Rgb {
        let s = |c: u8| (f64::from(c) * factor).clamp(0.0, 255.0) as u8;
        Rgb(s(self.0), s(self.1), s(self.2))
    }

    /// Channels as fractions in 0.0..=1.0.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintMode {
    /// Fill only
    Fill,
    /// Outline only
    Stroke,
    /// Fill, then outline
    FillStroke,
}

/// Horizontal anchoring of text relative to the x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// x is the left edge
    #[default]
    Left,
    /// x is the centre
    Center,
    /// x is the right edge
    Right,
}

/// Options for [`DrawingSurface::text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Horizontal alignment
    pub align: TextAlign,
    /// Re-wrap every line to this width (mm) before drawing
    pub max_width: Option<f64>,
}

impl TextOptions {
    /// Centred text.
    pub fn center() -> Self {
        Self {
            align: TextAlign::Center,
            max_width: None,
        }
    }

    /// Right-aligned text.
    pub fn right() -> Self {
        Self {
            align: TextAlign::Right,
            max_width: None,
        }
    }

    /// Left-aligned text wrapped to `width`.
    pub fn wrapped(width: f64) -> Self {
        Self {
            align: TextAlign::Left,
            max_width: Some(width),
        }
    }
}

/// Primitive drawing operations consumed by the report engine.
///
/// All geometry is in millimetres, measured from the top-left corner of the
/// current page. A freshly created surface already has one page.
pub trait DrawingSurface {
    /// Color used by fills.
    fn set_fill_color(&mut self, color: Rgb);
    /// Color used by outlines and lines.
    fn set_draw_color(&mut self, color: Rgb);
    /// Color used by text.
    fn set_text_color(&mut self, color: Rgb);
    /// Helvetica style and size (points) for subsequent text.
    fn set_font(&mut self, style: FontStyle, size: f64);
    /// Line width (mm) for subsequent outlines.
    fn set_line_width(&mut self, width: f64);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Paint a rectangle with rounded corners.
    fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, mode: PaintMode);
    /// Draw a straight line.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Draw lines of text; the first baseline sits at `y`, later ones follow
    /// at [`LINE_HEIGHT_FACTOR`] times the font size.
    fn text(&mut self, lines: &[String], x: f64, y: f64, options: TextOptions);
    /// Width (mm) of `text` in the current font.
    fn measure_text_width(&self, text: &str) -> f64;
    /// Wrap `text` into lines no wider than `width` mm in the current font.
    fn wrap_text_to_width(&self, text: &str, width: f64) -> Vec<String>;

    /// Place a PNG bitmap scaled into the given box.
    fn add_image(&mut self, png: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()>;

    /// Append a page and make it current.
    fn add_page(&mut self);
    /// Make an existing page (0-based) current.
    fn set_page(&mut self, index: usize) -> Result<()>;
    /// Page width in mm.
    fn page_width(&self) -> f64;
    /// Page height in mm.
    fn page_height(&self) -> f64;
    /// Index (0-based) of the current page.
    fn current_page_index(&self) -> usize;
    /// Number of pages.
    fn total_page_count(&self) -> usize;

    /// Write the finished artifact to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Draw a single string.
    fn text_line(&mut self, text: &str, x: f64, y: f64, options: TextOptions) {
        self.text(&[text.to_string()], x, y, options);
    }
}

/// Text state and metrics shared by both surfaces.
#[derive(Debug, Clone)]
pub(crate) struct TextState {
    fonts: FontManager,
    pub(crate) style: FontStyle,
    pub(crate) size: f64,
}

impl TextState {
    pub(crate) fn new() -> Self {
        Self {
            fonts: FontManager::new(),
            style: FontStyle::Normal,
            size: 16.0,
        }
    }

    pub(crate) fn width_mm(&self, text: &str) -> f64 {
        f64::from(self.fonts.text_width(text, self.style, self.size as f32)) / PT_PER_MM
    }

    pub(crate) fn wrap_mm(&self, text: &str, width: f64) -> Vec<String> {
        self.fonts
            .wrap_text(text, self.style, self.size as f32, (width * PT_PER_MM) as f32)
    }

    /// Distance between baselines, in mm.
    pub(crate) fn line_pitch(&self) -> f64 {
        self.size * LINE_HEIGHT_FACTOR / PT_PER_MM
    }

    /// Apply `max_width` re-wrapping to a block of lines.
    pub(crate) fn layout_lines(&self, lines: &[String], max_width: Option<f64>) -> Vec<String> {
        match max_width {
            Some(width) => lines.iter().flat_map(|l| self.wrap_mm(l, width)).collect(),
            None => lines.to_vec(),
        }
    }

    /// Left edge of a line for the given anchor.
    pub(crate) fn aligned_x(&self, line: &str, x: f64, align: TextAlign) -> f64 {
        match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.width_mm(line) / 2.0,
            TextAlign::Right => x - self.width_mm(line),
        }
    }
}

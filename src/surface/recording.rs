//! A [`DrawingSurface`] that records calls instead of rendering them.

use super::{DrawingSurface, PaintMode, Rgb, TextAlign, TextOptions, TextState};
use crate::error::{Error, Result};
use crate::writer::FontStyle;
use serde::Serialize;
use std::path::Path;

/// One recorded primitive, with the drawing state it was issued under.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Filled rectangle
    FillRect {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    /// Outlined rectangle
    StrokeRect {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    /// Rounded rectangle
    RoundedRect {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        mode: PaintMode,
        fill: Rgb,
        stroke: Rgb,
        line_width: f64,
    },
    /// Straight line
    Line {
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
    },
    /// One line of text; `x` is the anchor given by the caller
    Text {
        page: usize,
        text: String,
        x: f64,
        y: f64,
        align: TextAlign,
        style: FontStyle,
        size: f64,
        color: Rgb,
    },
    /// Placed bitmap
    Image {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// A page was appended
    AddPage { page: usize },
}

impl DrawOp {
    /// Page the operation was drawn on.
    pub fn page(&self) -> usize {
        match self {
            DrawOp::FillRect { page, .. }
            | DrawOp::StrokeRect { page, .. }
            | DrawOp::RoundedRect { page, .. }
            | DrawOp::Line { page, .. }
            | DrawOp::Text { page, .. }
            | DrawOp::Image { page, .. }
            | DrawOp::AddPage { page } => *page,
        }
    }

    /// Text content, for text operations.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Records every drawing call for later inspection.
///
/// Text is measured and wrapped with the same metrics as
/// [`PdfSurface`](super::PdfSurface), so layouts match exactly. Images are
/// accepted without decoding.
#[derive(Debug)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    page_width: f64,
    page_height: f64,
    current_page: usize,
    page_count: usize,
    fill_color: Rgb,
    draw_color: Rgb,
    text_color: Rgb,
    line_width: f64,
    text: TextState,
}

impl RecordingSurface {
    /// Create a surface with one page of the given size (mm).
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            ops: Vec::new(),
            page_width,
            page_height,
            current_page: 0,
            page_count: 1,
            fill_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            text_color: Rgb::BLACK,
            line_width: 0.2,
            text: TextState::new(),
        }
    }

    /// Create an A4 portrait surface.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    /// All recorded operations in call order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Every text line drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops.iter().filter_map(DrawOp::text).collect()
    }

    /// Whether any text line equals `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.ops.iter().any(|op| op.text() == Some(needle))
    }

    /// Text operations whose content equals `needle`.
    pub fn find_text(&self, needle: &str) -> Vec<&DrawOp> {
        self.ops.iter().filter(|op| op.text() == Some(needle)).collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_font(&mut self, style: FontStyle, size: f64) {
        self.text.style = style;
        self.text.size = size;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::FillRect {
            page: self.current_page,
            x,
            y,
            width,
            height,
            color: self.fill_color,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::StrokeRect {
            page: self.current_page,
            x,
            y,
            width,
            height,
            color: self.draw_color,
        });
    }

    fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, mode: PaintMode) {
        self.ops.push(DrawOp::RoundedRect {
            page: self.current_page,
            x,
            y,
            width,
            height,
            radius,
            mode,
            fill: self.fill_color,
            stroke: self.draw_color,
            line_width: self.line_width,
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line {
            page: self.current_page,
            x1,
            y1,
            x2,
            y2,
            color: self.draw_color,
        });
    }

    fn text(&mut self, lines: &[String], x: f64, y: f64, options: TextOptions) {
        let pitch = self.text.line_pitch();
        for (i, line) in self
            .text
            .layout_lines(lines, options.max_width)
            .into_iter()
            .enumerate()
        {
            self.ops.push(DrawOp::Text {
                page: self.current_page,
                text: line,
                x,
                y: y + i as f64 * pitch,
                align: options.align,
                style: self.text.style,
                size: self.text.size,
                color: self.text_color,
            });
        }
    }

    fn measure_text_width(&self, text: &str) -> f64 {
        self.text.width_mm(text)
    }

    fn wrap_text_to_width(&self, text: &str, width: f64) -> Vec<String> {
        self.text.wrap_mm(text, width)
    }

    fn add_image(&mut self, _png: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.ops.push(DrawOp::Image {
            page: self.current_page,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn add_page(&mut self) {
        self.current_page = self.page_count;
        self.page_count += 1;
        self.ops.push(DrawOp::AddPage {
            page: self.current_page,
        });
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        if index >= self.page_count {
            return Err(Error::Surface(format!("page index {} out of range", index)));
        }
        self.current_page = index;
        Ok(())
    }

    fn page_width(&self) -> f64 {
        self.page_width
    }

    fn page_height(&self) -> f64 {
        self.page_height
    }

    fn current_page_index(&self) -> usize {
        self.current_page
    }

    fn total_page_count(&self) -> usize {
        self.page_count
    }

    /// Writes the operation log as JSON.
    fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.ops)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_state_with_ops() {
        let mut surface = RecordingSurface::a4();
        surface.set_fill_color(Rgb(250, 250, 250));
        surface.fill_rect(15.0, 20.0, 180.0, 8.0);

        assert_eq!(
            surface.ops()[0],
            DrawOp::FillRect {
                page: 0,
                x: 15.0,
                y: 20.0,
                width: 180.0,
                height: 8.0,
                color: Rgb(250, 250, 250),
            }
        );
    }

    #[test]
    fn test_multiline_text_advances_by_line_pitch() {
        let mut surface = RecordingSurface::a4();
        surface.set_font(FontStyle::Normal, 12.0);
        surface.text(&["one".into(), "two".into()], 15.0, 50.0, TextOptions::default());

        let ys: Vec<f64> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(ys.len(), 2);
        assert!((ys[1] - ys[0] - 12.0 * 1.15 * 25.4 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_width_rewraps() {
        let mut surface = RecordingSurface::a4();
        surface.set_font(FontStyle::Normal, 8.0);
        surface.text(
            &["a fairly long sentence that cannot fit".into()],
            0.0,
            0.0,
            TextOptions::wrapped(15.0),
        );
        assert!(surface.texts().len() > 1);
    }

    #[test]
    fn test_pages() {
        let mut surface = RecordingSurface::a4();
        surface.add_page();
        surface.add_page();
        assert_eq!(surface.total_page_count(), 3);
        assert_eq!(surface.current_page_index(), 2);
        surface.set_page(0).unwrap();
        surface.line(0.0, 0.0, 1.0, 1.0);
        assert_eq!(surface.ops().last().map(DrawOp::page), Some(0));
        assert!(surface.set_page(3).is_err());
    }

    #[test]
    fn test_save_writes_json_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ops.json");
        let mut surface = RecordingSurface::a4();
        surface.text_line("hello", 1.0, 2.0, TextOptions::center());
        surface.save(&path).unwrap();

        let log: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(log[0]["op"], "text");
        assert_eq!(log[0]["text"], "hello");
        assert_eq!(log[0]["align"], "center");
    }
}

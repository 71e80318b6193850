//! [`DrawingSurface`] backed by the PDF writer.

use super::{DrawingSurface, PaintMode, Rgb, TextOptions, TextState, PT_PER_MM};
use crate::error::Result;
use crate::writer::{ContentStreamBuilder, FontStyle, ImageData, PdfWriter, PdfWriterConfig};
use std::path::Path;

/// Draws into a PDF document.
///
/// Converts top-down millimetre coordinates into the bottom-up point space
/// of PDF: `x_pt = x * k`, `y_pt = (page_height - y) * k` with
/// `k = 72 / 25.4`.
#[derive(Debug)]
pub struct PdfSurface {
    writer: PdfWriter,
    page_width: f64,
    page_height: f64,
    current_page: usize,
    fill_color: Rgb,
    draw_color: Rgb,
    text_color: Rgb,
    line_width: f64,
    text: TextState,
}

impl PdfSurface {
    /// Create a surface with one empty page of the given size (mm).
    pub fn new(page_width: f64, page_height: f64, config: PdfWriterConfig) -> Self {
        let mut writer = PdfWriter::with_config(config);
        let current_page = writer.add_page(page_width * PT_PER_MM, page_height * PT_PER_MM);
        Self {
            writer,
            page_width,
            page_height,
            current_page,
            fill_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            text_color: Rgb::BLACK,
            line_width: 0.2,
            text: TextState::new(),
        }
    }

    /// Create an A4 portrait surface.
    pub fn a4(config: PdfWriterConfig) -> Self {
        Self::new(210.0, 297.0, config)
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.writer.to_bytes()
    }

    fn content(&mut self) -> Option<&mut ContentStreamBuilder> {
        match self.writer.page_content(self.current_page) {
            Ok(content) => Some(content),
            Err(e) => {
                log::error!("drawing on a missing page: {}", e);
                None
            },
        }
    }

    fn pt(v: f64) -> f32 {
        (v * PT_PER_MM) as f32
    }

    /// Lower-left corner of a top-down box, in points.
    fn corner(&self, x: f64, y: f64, height: f64) -> (f32, f32) {
        (Self::pt(x), Self::pt(self.page_height - y - height))
    }

    fn paint(&mut self, mode: PaintMode, path: impl FnOnce(&mut ContentStreamBuilder)) {
        let (fr, fg, fb) = self.fill_color.to_unit();
        let (sr, sg, sb) = self.draw_color.to_unit();
        let line_width = Self::pt(self.line_width);
        if let Some(content) = self.content() {
            content.end_text();
            match mode {
                PaintMode::Fill => {
                    content.set_fill_color(fr, fg, fb);
                    path(content);
                    content.fill();
                },
                PaintMode::Stroke => {
                    content
                        .set_stroke_color(sr, sg, sb)
                        .set_line_width(line_width);
                    path(content);
                    content.stroke();
                },
                PaintMode::FillStroke => {
                    content
                        .set_fill_color(fr, fg, fb)
                        .set_stroke_color(sr, sg, sb)
                        .set_line_width(line_width);
                    path(content);
                    content.fill_stroke();
                },
            }
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, mode: PaintMode) {
        let (px, py) = self.corner(x, y, height);
        let (pw, ph) = (Self::pt(width), Self::pt(height));
        self.paint(mode, |content| {
            content.rect(px, py, pw, ph);
        });
    }
}

impl DrawingSurface for PdfSurface {
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
        self.rect(x, y, width, height, PaintMode::Fill);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.rect(x, y, width, height, PaintMode::Stroke);
    }

    fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, mode: PaintMode) {
        let (px, py) = self.corner(x, y, height);
        let (pw, ph, pr) = (Self::pt(width), Self::pt(height), Self::pt(radius));
        self.paint(mode, |content| {
            content.rounded_rect(px, py, pw, ph, pr);
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let start = (Self::pt(x1), Self::pt(self.page_height - y1));
        let end = (Self::pt(x2), Self::pt(self.page_height - y2));
        self.paint(PaintMode::Stroke, |content| {
            content.move_to(start.0, start.1).line_to(end.0, end.1);
        });
    }

    fn text(&mut self, lines: &[String], x: f64, y: f64, options: TextOptions) {
        let lines = self.text.layout_lines(lines, options.max_width);
        let pitch = self.text.line_pitch();
        let placed: Vec<(String, f32, f32)> = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let left = self.text.aligned_x(&line, x, options.align);
                let baseline = y + i as f64 * pitch;
                (line, Self::pt(left), Self::pt(self.page_height - baseline))
            })
            .collect();

        let resource = self.text.style.resource_name();
        let size = self.text.size as f32;
        let (r, g, b) = self.text_color.to_unit();
        if let Some(content) = self.content() {
            content.begin_text().set_fill_color(r, g, b).set_font(&resource, size);
            for (line, px, py) in &placed {
                content.text(line, *px, *py);
            }
            content.end_text();
        }
    }

    fn measure_text_width(&self, text: &str) -> f64 {
        self.text.width_mm(text)
    }

    fn wrap_text_to_width(&self, text: &str, width: f64) -> Vec<String> {
        self.text.wrap_mm(text, width)
    }

    fn add_image(&mut self, png: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let image = ImageData::from_png(png)?;
        let name = self.writer.add_image(self.current_page, image)?;
        let (px, py) = self.corner(x, y, height);
        let (pw, ph) = (Self::pt(width), Self::pt(height));
        self.writer
            .page_content(self.current_page)?
            .draw_image(&name, px, py, pw, ph);
        Ok(())
    }

    fn add_page(&mut self) {
        self.current_page = self
            .writer
            .add_page(self.page_width * PT_PER_MM, self.page_height * PT_PER_MM);
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        self.writer.page_content(index)?;
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
        self.writer.page_count()
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.writer.save(path)
    }
}

//! Table layout and pagination.
//!
//! The [`LayoutEngine`] turns same-shaped rows into column widths and row
//! heights; [`RenderContext`] owns the page cursor and decides page breaks
//! while a section is drawn.
//!
//! Column widths are estimated from character counts rather than measured
//! widths, then clamped to a per-table band and normalised so that they
//! always add up to the available width. Row heights come from real text
//! wrapping on the surface, so a cell's wrapped text always fits.

use super::model::{CellValue, Row};
use super::text::{sanitize_text, shorten};
use crate::surface::{DrawingSurface, Rgb, TextOptions};
use crate::writer::FontStyle;

/// Header band height (mm).
pub const HEADER_HEIGHT: f64 = 10.0;
/// Gap between header band and first row (mm).
pub const HEADER_GAP: f64 = 2.0;
/// Gap after every row (mm).
pub const ROW_GAP: f64 = 1.0;
/// Smallest row height (mm).
pub const MIN_ROW_HEIGHT: f64 = 8.0;
/// Vertical padding added to the wrapped lines of a row (mm).
pub const ROW_PADDING: f64 = 3.0;
/// Horizontal padding on each side of a cell (mm).
pub const CELL_PADDING: f64 = 2.0;
/// Narrowest text box inside a cell (mm).
pub const MIN_CELL_TEXT_WIDTH: f64 = 5.0;
/// Space reserved before a section title (mm).
pub const SECTION_RESERVE: f64 = 30.0;

/// Padding added to every column width estimate (mm).
const ESTIMATE_PADDING: f64 = 8.0;

/// Accent used for section titles and table headers.
pub const ACCENT: Rgb = Rgb(33, 150, 243);
/// Body text color.
pub const INK: Rgb = Rgb(33, 33, 33);
/// Table grid color.
pub const GRID: Rgb = Rgb::gray(224);

/// Fixed page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
    /// Margin on all four sides
    pub margin: f64,
}

impl PageGeometry {
    /// A4 portrait with a 15 mm margin.
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 15.0,
    };

    /// Width between the side margins.
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y that content may reach.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin
    }

    /// Usable height of one page.
    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Where the next primitive will be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    /// Current page (0-based)
    pub page_index: usize,
    /// Vertical offset from the top edge (mm)
    pub y: f64,
}

/// Drawing surface plus the cursor of one composition.
///
/// Every drawing step borrows the context mutably, so the cursor can only be
/// advanced by one step at a time.
pub struct RenderContext<'a> {
    /// Target surface
    pub surface: &'a mut dyn DrawingSurface,
    /// Shared cursor
    pub cursor: PageCursor,
    /// Page geometry
    pub geometry: PageGeometry,
    page_breaks: usize,
}

impl<'a> RenderContext<'a> {
    /// Start at the top margin of the surface's current page.
    pub fn new(surface: &'a mut dyn DrawingSurface, geometry: PageGeometry) -> Self {
        let page_index = surface.current_page_index();
        Self {
            surface,
            cursor: PageCursor {
                page_index,
                y: geometry.margin,
            },
            geometry,
            page_breaks: 0,
        }
    }

    /// Current vertical offset.
    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    /// Move the cursor down by `dy`.
    pub fn advance(&mut self, dy: f64) {
        self.cursor.y += dy;
    }

    /// Left content edge.
    pub fn left(&self) -> f64 {
        self.geometry.margin
    }

    /// Width between the margins.
    pub fn content_width(&self) -> f64 {
        self.geometry.content_width()
    }

    /// Number of page breaks taken so far.
    pub fn page_breaks(&self) -> usize {
        self.page_breaks
    }

    /// Append a page and move the cursor to its top margin.
    pub fn new_page(&mut self) {
        self.surface.add_page();
        self.cursor = PageCursor {
            page_index: self.surface.current_page_index(),
            y: self.geometry.margin,
        };
        self.page_breaks += 1;
    }

    /// Break the page if a block of `height` does not fit above the bottom
    /// margin. Returns whether a page was added.
    ///
    /// A cursor that already sits at the top margin never breaks: a block
    /// taller than a whole page is drawn from the top and overflows.
    pub fn check_new_page(&mut self, height: f64) -> bool {
        self.check_new_page_reserving(height, 0.0)
    }

    /// Like [`check_new_page`](Self::check_new_page), keeping an extra
    /// `reserve` free above the bottom margin.
    pub fn check_new_page_reserving(&mut self, height: f64, reserve: f64) -> bool {
        let limit = self.geometry.bottom_limit() - reserve;
        if self.cursor.y + height > limit && self.cursor.y > self.geometry.margin {
            log::debug!(
                "page break on page {} at y={:.2} for block of {:.2}mm",
                self.cursor.page_index,
                self.cursor.y,
                height
            );
            self.new_page();
            return true;
        }
        false
    }

    /// Fill a band of `height` at `y` with a vertical gradient drawn as
    /// flat strips.
    pub fn gradient_band(&mut self, y: f64, height: f64) {
        let steps = GRADIENT_STEPS;
        let strip = height / steps as f64;
        let (x, width) = (self.left(), self.content_width());
        for i in 0..steps {
            let ratio = i as f64 / steps as f64;
            self.surface.set_fill_color(lerp_rgb(GRADIENT_TOP, GRADIENT_BOTTOM, ratio));
            self.surface.fill_rect(x, y + i as f64 * strip, width, strip);
        }
    }
}

/// Strips per gradient band.
pub const GRADIENT_STEPS: usize = 20;
/// Gradient color at the top of a band.
pub const GRADIENT_TOP: Rgb = Rgb(30, 58, 138);
/// Gradient color at the bottom of a band.
pub const GRADIENT_BOTTOM: Rgb = Rgb(20, 45, 110);

/// Interpolate between two colors, rounding each channel.
pub fn lerp_rgb(from: Rgb, to: Rgb, ratio: f64) -> Rgb {
    let channel = |a: u8, b: u8| {
        let a = f64::from(a);
        (a + (f64::from(b) - a) * ratio).round().clamp(0.0, 255.0) as u8
    };
    Rgb(channel(from.0, to.0), channel(from.1, to.1), channel(from.2, to.2))
}

/// Font and sizing parameters of one table kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    /// Body font size (pt)
    pub font_size: f64,
    /// Header font size (pt)
    pub header_font_size: f64,
    /// Distance between wrapped lines (mm)
    pub line_height: f64,
    /// Narrowest column estimate (mm)
    pub min_column_width: f64,
    /// Widest column estimate (mm)
    pub max_column_width: f64,
    /// Width per character for columns without a special role (mm)
    pub char_width: f64,
}

impl TableStyle {
    /// Aggregated results: larger text, fewer and wider columns.
    pub const SUMMARY: TableStyle = TableStyle {
        font_size: 8.0,
        header_font_size: 8.0,
        line_height: 4.5,
        min_column_width: 20.0,
        max_column_width: 60.0,
        char_width: 0.5,
    };

    /// Per-response rows: smaller text, more and narrower columns.
    pub const DETAILED: TableStyle = TableStyle {
        font_size: 7.0,
        header_font_size: 8.0,
        line_height: 4.0,
        min_column_width: 12.0,
        max_column_width: 40.0,
        char_width: 0.4,
    };
}

/// One sized column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Header text
    pub name: String,
    /// Final width (mm)
    pub width: f64,
    /// Whether values are shortened as identifiers
    pub is_id_like: bool,
}

/// Placement of one drawn row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowExtent {
    /// Page the row was drawn on
    pub page: usize,
    /// Top edge (mm)
    pub top: f64,
    /// Row height (mm)
    pub height: f64,
}

impl RowExtent {
    /// Bottom edge (mm).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Measured layout of a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableLayout {
    /// Columns in header order
    pub columns: Vec<ColumnSpec>,
    /// Row heights (mm)
    pub row_heights: Vec<f64>,
    /// Where each row ended up; empty until drawn
    pub row_extents: Vec<RowExtent>,
}

impl TableLayout {
    /// Column widths in header order.
    pub fn column_widths(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.width).collect()
    }
}

/// Width per character for a column, from its header.
pub fn char_width_for(header: &str, default: f64) -> f64 {
    let lower = header.to_lowercase();
    if lower.contains("participant id") || (lower.contains("selected") && lower.contains("option")) {
        0.4
    } else if lower.contains("name") {
        0.45
    } else if lower.contains('#') {
        0.6
    } else {
        default
    }
}

/// Whether a cell is shown as a shortened identifier.
pub fn is_id_like(header: &str, cell: &str) -> bool {
    header.to_lowercase().contains("id") || (cell.contains('-') && cell.chars().count() > 20)
}

/// Text shown for a cell.
pub fn display_text(header: &str, cell: Option<&CellValue>) -> String {
    let raw = cell.map(CellValue::to_string).unwrap_or_default();
    let text = sanitize_text(&raw, "");
    if is_id_like(header, &text) {
        shorten(&text)
    } else {
        text
    }
}

/// Width of the text box inside a column.
pub fn cell_text_width(column_width: f64) -> f64 {
    (column_width - 2.0 * CELL_PADDING).max(MIN_CELL_TEXT_WIDTH)
}

/// Stateless table measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    /// Size the columns of a table.
    ///
    /// `cells` holds the display text of every row in header order. The
    /// returned widths always sum to `available`.
    pub fn column_widths(
        headers: &[String],
        cells: &[Vec<String>],
        style: &TableStyle,
        available: f64,
    ) -> Vec<ColumnSpec> {
        let mut columns: Vec<ColumnSpec> = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = cells
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|text| text.chars().count())
                    .fold(header.chars().count(), usize::max);
                let estimate = longest as f64 * char_width_for(header, style.char_width) + ESTIMATE_PADDING;
                let sampled = cells
                    .iter()
                    .filter_map(|row| row.get(col))
                    .find(|text| !text.is_empty())
                    .map(String::as_str)
                    .unwrap_or("");
                ColumnSpec {
                    name: header.clone(),
                    width: estimate.clamp(style.min_column_width, style.max_column_width),
                    is_id_like: is_id_like(header, sampled),
                }
            })
            .collect();

        let total: f64 = columns.iter().map(|c| c.width).sum();
        if total <= 0.0 {
            return columns;
        }
        if total > available {
            let factor = available / total;
            for column in &mut columns {
                column.width *= factor;
            }
        } else {
            let extra = available - total;
            for column in &mut columns {
                column.width += extra * (column.width / total);
            }
        }
        columns
    }

    /// Height of a row whose cells wrap inside `widths`.
    ///
    /// Uses the surface's current font; callers set the body font first.
    pub fn row_height(
        surface: &dyn DrawingSurface,
        cells: &[String],
        widths: &[f64],
        style: &TableStyle,
    ) -> f64 {
        let lines = cells
            .iter()
            .zip(widths)
            .map(|(text, width)| surface.wrap_text_to_width(text, cell_text_width(*width)).len())
            .fold(1, usize::max);
        (lines as f64 * style.line_height + ROW_PADDING).max(MIN_ROW_HEIGHT)
    }

    /// Measure a table without drawing it.
    ///
    /// Returns `None` when there is nothing to lay out: no rows, or a first
    /// row without columns.
    pub fn measure(
        surface: &mut dyn DrawingSurface,
        rows: &[Row],
        style: &TableStyle,
        available: f64,
    ) -> Option<(TableLayout, Vec<Vec<String>>)> {
        let first = rows.first()?;
        if first.is_empty() {
            return None;
        }
        let headers: Vec<String> = first.keys().cloned().collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| headers.iter().map(|h| display_text(h, row.get(h))).collect())
            .collect();

        let columns = Self::column_widths(&headers, &cells, style, available);
        let widths: Vec<f64> = columns.iter().map(|c| c.width).collect();
        surface.set_font(FontStyle::Normal, style.font_size);
        let row_heights = cells
            .iter()
            .map(|row| Self::row_height(&*surface, row, &widths, style))
            .collect();

        Some((
            TableLayout {
                columns,
                row_heights,
                row_extents: Vec::new(),
            },
            cells,
        ))
    }
}

/// Draw a titled table section and advance the cursor past it.
///
/// The section is skipped entirely (nothing drawn, cursor untouched) when
/// there are no rows or the first row has no columns. Page breaks are
/// checked before the title, before the header band and before every row.
pub fn draw_section(
    ctx: &mut RenderContext<'_>,
    title: &str,
    rows: &[Row],
    style: &TableStyle,
    trailing_gap: f64,
) -> Option<TableLayout> {
    let available = ctx.content_width();
    let Some((mut layout, cells)) = LayoutEngine::measure(&mut *ctx.surface, rows, style, available) else {
        log::debug!("skipping empty section {:?}", title);
        return None;
    };

    ctx.check_new_page(SECTION_RESERVE);
    ctx.advance(5.0);
    ctx.surface.set_font(FontStyle::Bold, 14.0);
    ctx.surface.set_text_color(ACCENT);
    ctx.surface.text_line(title, ctx.left(), ctx.y(), TextOptions::default());
    ctx.advance(10.0);

    ctx.check_new_page(HEADER_HEIGHT + HEADER_GAP);
    draw_header(ctx, &layout.columns, style);
    ctx.advance(HEADER_HEIGHT + HEADER_GAP);

    ctx.surface.set_line_width(0.2);
    for (index, (row, height)) in cells.iter().zip(layout.row_heights.clone()).enumerate() {
        ctx.check_new_page(height);
        layout.row_extents.push(RowExtent {
            page: ctx.cursor.page_index,
            top: ctx.y(),
            height,
        });
        draw_row(ctx, index, row, &layout.columns, height, style);
        ctx.advance(height + ROW_GAP);
    }

    ctx.advance(trailing_gap);
    log::debug!(
        "section {:?}: {} columns, {} rows",
        title,
        layout.columns.len(),
        layout.row_heights.len()
    );
    Some(layout)
}

fn draw_header(ctx: &mut RenderContext<'_>, columns: &[ColumnSpec], style: &TableStyle) {
    let (x, y, width) = (ctx.left(), ctx.y(), ctx.content_width());
    ctx.surface.set_fill_color(ACCENT);
    ctx.surface.set_draw_color(ACCENT);
    ctx.surface.fill_rect(x, y, width, HEADER_HEIGHT);
    ctx.surface.stroke_rect(x, y, width, HEADER_HEIGHT);

    ctx.surface.set_text_color(Rgb::WHITE);
    ctx.surface.set_font(FontStyle::Bold, style.header_font_size);
    let mut column_x = x;
    for column in columns {
        let lines = ctx
            .surface
            .wrap_text_to_width(&column.name, cell_text_width(column.width));
        ctx.surface
            .text(&lines, column_x + CELL_PADDING, y + 6.5, TextOptions::default());
        column_x += column.width;
    }
}

fn draw_row(
    ctx: &mut RenderContext<'_>,
    index: usize,
    cells: &[String],
    columns: &[ColumnSpec],
    height: f64,
    style: &TableStyle,
) {
    let (x, y, width) = (ctx.left(), ctx.y(), ctx.content_width());
    let shade = if index % 2 == 0 { 250 } else { 255 };
    ctx.surface.set_fill_color(Rgb::gray(shade));
    ctx.surface.fill_rect(x, y, width, height);
    ctx.surface.set_draw_color(GRID);
    ctx.surface.stroke_rect(x, y, width, height);

    let mut separator = x;
    for column in columns.iter().take(columns.len().saturating_sub(1)) {
        separator += column.width;
        ctx.surface.line(separator, y, separator, y + height);
    }

    ctx.surface.set_font(FontStyle::Normal, style.font_size);
    ctx.surface.set_text_color(INK);
    let mut column_x = x;
    for (text, column) in cells.iter().zip(columns) {
        let lines = ctx.surface.wrap_text_to_width(text, cell_text_width(column.width));
        let block = lines.len() as f64 * style.line_height;
        let first_baseline = y + height / 2.0 - block / 2.0 + style.line_height;
        // one call per line keeps the pitch at the table's line height
        for (i, line) in lines.iter().enumerate() {
            ctx.surface.text_line(
                line,
                column_x + CELL_PADDING,
                first_baseline + i as f64 * style.line_height,
                TextOptions::default(),
            );
        }
        column_x += column.width;
    }
}

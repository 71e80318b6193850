//! Integration tests for table measurement and pagination.
//!
//! Column widths must always fill the content width, rows must be tall
//! enough for their wrapped text, and no row may cross the bottom margin
//! unless it could not fit on any page.

use proptest::prelude::*;
use slide_report::report::{
    cell_text_width, draw_section, LayoutEngine, PageGeometry, RenderContext, Row, TableStyle,
    ROW_PADDING,
};
use slide_report::row;
use slide_report::surface::{DrawingSurface, RecordingSurface};
use slide_report::writer::FontStyle;

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,14}"
}

fn cell_text() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 0..12).prop_map(|words| words.join(" "))
}

fn table(max_cols: usize, max_rows: usize) -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
    (1..=max_cols).prop_flat_map(move |cols| {
        (
            prop::collection::vec(word(), cols),
            prop::collection::vec(prop::collection::vec(cell_text(), cols), 0..max_rows),
        )
    })
}

fn rows_from(headers: &[String], cells: &[Vec<String>]) -> Vec<Row> {
    cells
        .iter()
        .map(|values| {
            let mut row = Row::new();
            for (header, value) in headers.iter().zip(values) {
                row.insert(header.clone(), value.as_str().into());
            }
            row
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_column_widths_sum_to_available(
        (headers, cells) in table(8, 6),
        available in 20.0f64..400.0,
        detailed in any::<bool>(),
    ) {
        let style = if detailed { TableStyle::DETAILED } else { TableStyle::SUMMARY };
        let columns = LayoutEngine::column_widths(&headers, &cells, &style, available);
        let total: f64 = columns.iter().map(|c| c.width).sum();
        prop_assert_eq!(columns.len(), headers.len());
        prop_assert!((total - available).abs() < 1e-6, "sum {} != {}", total, available);
        prop_assert!(columns.iter().all(|c| c.width > 0.0));
    }

    #[test]
    fn prop_row_height_fits_wrapped_text(
        (headers, cells) in table(6, 5),
        detailed in any::<bool>(),
    ) {
        let style = if detailed { TableStyle::DETAILED } else { TableStyle::SUMMARY };
        let rows = rows_from(&headers, &cells);
        // duplicate headers collapse into one column
        prop_assume!(rows.first().map_or(false, |r| r.len() == headers.len()));

        let mut surface = RecordingSurface::a4();
        let (layout, display) = LayoutEngine::measure(&mut surface, &rows, &style, 180.0).unwrap();
        surface.set_font(FontStyle::Normal, style.font_size);

        for (row, height) in display.iter().zip(&layout.row_heights) {
            for (text, column) in row.iter().zip(&layout.columns) {
                let lines = surface.wrap_text_to_width(text, cell_text_width(column.width)).len();
                prop_assert!(*height >= lines as f64 * style.line_height + ROW_PADDING - 1e-9);
            }
        }
    }

    #[test]
    fn prop_rows_never_cross_bottom_margin(
        (headers, cells) in table(4, 40),
        start in 0.0f64..250.0,
    ) {
        let rows = rows_from(&headers, &cells);
        prop_assume!(rows.first().map_or(false, |r| r.len() == headers.len()));

        let geometry = PageGeometry::A4;
        let mut surface = RecordingSurface::a4();
        let mut ctx = RenderContext::new(&mut surface, geometry);
        ctx.advance(start);
        let layout = draw_section(&mut ctx, "Summary", &rows, &TableStyle::SUMMARY, 10.0).unwrap();

        for extent in &layout.row_extents {
            if extent.height <= geometry.usable_height() {
                prop_assert!(extent.bottom() <= geometry.bottom_limit() + 1e-9);
            }
            prop_assert!(extent.top >= geometry.margin);
        }
    }
}

#[test]
fn test_long_table_spreads_over_pages() {
    let rows: Vec<Row> = (0..60)
        .map(|i| row! { "#" => i as i64, "Participant Name" => format!("Participant number {}", i), "Response" => "A fairly long free-text answer that wraps over more than one line in the table" })
        .collect();
    let mut surface = RecordingSurface::a4();
    let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
    let layout = draw_section(&mut ctx, "Detailed Responses", &rows, &TableStyle::DETAILED, 10.0).unwrap();

    assert_eq!(layout.row_extents.len(), 60);
    assert!(ctx.page_breaks() >= 1);
    let last_page = layout.row_extents.last().unwrap().page;
    assert!(last_page >= 1);
    // rows are laid out top to bottom within each page
    for pair in layout.row_extents.windows(2) {
        if pair[0].page == pair[1].page {
            assert!(pair[1].top >= pair[0].bottom());
        } else {
            assert_eq!(pair[1].top, PageGeometry::A4.margin);
        }
    }
}

#[test]
fn test_oversized_row_overflows_from_top() {
    let essay = vec!["word"; 4000].join(" ");
    let rows = vec![row! { "Response" => essay }];
    let mut surface = RecordingSurface::a4();
    let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
    ctx.advance(100.0);
    let layout = draw_section(&mut ctx, "Detailed Responses", &rows, &TableStyle::DETAILED, 10.0).unwrap();

    let extent = layout.row_extents[0];
    assert!(extent.height > PageGeometry::A4.usable_height());
    assert_eq!(extent.page, 1);
    assert_eq!(extent.top, PageGeometry::A4.margin);
}

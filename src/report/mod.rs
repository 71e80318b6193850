//! Report composition.
//!
//! Turns formatted slide results into a paginated document:
//!
//! ```text
//! ReportRequest (units of FormattedSlideData)
//!     ↓ order_units      leaderboards follow their quiz
//!     ↓ PageComposer     title band, per-unit blocks, footers
//!         ├─ draw_section    tables measured by LayoutEngine
//!         ├─ ChartRenderer   bar charts from extract_dataset
//!         └─ ImageEmbedder   join-code QR images
//!     ↓
//! DrawingSurface (PDF or recording)
//! ```
//!
//! ## Example
//!
//! ```
//! use slide_report::config::ReportConfig;
//! use slide_report::report::{render_report_pdf, FormattedSlideData, ReportRequest, ReportUnit, SlideType};
//! use slide_report::row;
//!
//! let data = FormattedSlideData::new(SlideType::MultipleChoice, "Favourite colour?")
//!     .with_summary(vec![row! { "Option" => "Red", "Votes" => 3i64 }])
//!     .with_total_responses(3);
//! let request = ReportRequest {
//!     title: "Team Sync".into(),
//!     output_name: None,
//!     units: vec![ReportUnit::new(data)],
//! };
//! let pdf = render_report_pdf(&request, &ReportConfig::default()).unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

mod chart;
mod composer;
mod dataset;
mod embed;
mod layout;
mod model;
mod ordering;
mod text;

pub use chart::{
    BarGeometry, ChartDataset, ChartLayout, ChartOptions, ChartRenderer, BAR_SPACING, HIGHLIGHT,
    LABEL_BAND, MAX_BAR_WIDTH, VALUE_BAND,
};
pub use composer::{
    render_report_pdf, save_report_pdf, CompositionSummary, PageComposer, UnitLayout, UnitStage,
    NO_QUESTION, NO_RESPONSES,
};
pub use dataset::{chart_title, extract_dataset, info_line, is_compact_info};
pub use embed::{join_url, EmbedPlacement, ImageEmbedder, CAPTION, QR_BLOCK_HEIGHT, QR_SIZE, SUB_CAPTION};
pub use layout::{
    cell_text_width, char_width_for, display_text, draw_section, is_id_like, ColumnSpec,
    LayoutEngine, PageCursor, PageGeometry, RenderContext, RowExtent, TableLayout, TableStyle,
    ACCENT, HEADER_GAP, HEADER_HEIGHT, INK, MIN_ROW_HEIGHT, ROW_GAP, ROW_PADDING,
};
pub use model::{
    format_number, CellValue, FormattedSlideData, ReportRequest, ReportUnit, Row, SlideMetadata,
    SlideType,
};
pub use ordering::{order_slides, order_units, OrderEntry, SlideId, SlideKind};
pub use text::{sanitize_text, sanitize_title, shorten_id, DEFAULT_TITLE};

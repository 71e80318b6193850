//! Multi-unit report composition.
//!
//! [`PageComposer::compose`] draws a title band, then every unit in turn,
//! and finally stamps a footer on every page. One composition owns one
//! [`RenderContext`]; units never overlap because each step borrows the
//! context mutably.
//!
//! Per unit the composer walks through the [`UnitStage`]s in order. Stages
//! whose content is missing are skipped; page breaks may happen inside any
//! stage.

use super::chart::{ChartLayout, ChartOptions, ChartRenderer};
use super::dataset::{chart_title, extract_dataset, info_line, is_compact_info};
use super::embed::{EmbedPlacement, ImageEmbedder};
use super::layout::{draw_section, RenderContext, TableLayout, TableStyle, ACCENT, INK};
use super::model::{FormattedSlideData, ReportRequest, ReportUnit, SlideType};
use super::text::{sanitize_text, sanitize_title, DEFAULT_TITLE};
use crate::config::{ExportTier, ReportConfig};
use crate::error::Result;
use crate::surface::{DrawingSurface, PaintMode, PdfSurface, Rgb, TextOptions};
use crate::writer::FontStyle;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Shown when a unit has no question text.
pub const NO_QUESTION: &str = "(no question text)";
/// Shown when a chart-only unit has nothing else to show.
pub const NO_RESPONSES: &str = "No responses collected for this slide.";

const MUTED: Rgb = Rgb::gray(66);
const FOOTER_GRAY: Rgb = Rgb::gray(128);

/// Progress of one unit through the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStage {
    /// Header band and question drawn
    HeaderDrawn,
    /// Metadata box (or type line) drawn
    MetadataDrawn,
    /// Summary table drawn
    SummaryDrawn,
    /// Detailed table drawn
    DetailedDrawn,
    /// Bar chart drawn
    ChartDrawn,
    /// Join code placed
    CodeEmbedded,
    /// Unit finished
    UnitComplete,
}

/// What was drawn for one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitLayout {
    /// Page the unit starts on
    pub start_page: usize,
    /// Stages reached, in order
    pub stages: Vec<UnitStage>,
    /// Summary table
    pub summary: Option<TableLayout>,
    /// Detailed table
    pub detailed: Option<TableLayout>,
    /// Chart
    pub chart: Option<ChartLayout>,
    /// Join code
    pub code: Option<EmbedPlacement>,
}

impl UnitLayout {
    fn reach(&mut self, stage: UnitStage) {
        log::trace!("unit stage {:?}", stage);
        self.stages.push(stage);
    }
}

/// Result of a composition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionSummary {
    /// Pages in the document
    pub page_count: usize,
    /// One entry per unit, in drawing order
    pub units: Vec<UnitLayout>,
}

impl CompositionSummary {
    /// Every drawn table, in drawing order.
    pub fn tables(&self) -> impl Iterator<Item = &TableLayout> {
        self.units
            .iter()
            .flat_map(|u| u.summary.iter().chain(u.detailed.iter()))
    }
}

/// Lays out report units onto a [`DrawingSurface`].
#[derive(Debug, Clone)]
pub struct PageComposer {
    config: ReportConfig,
    generated_at: Option<NaiveDateTime>,
    embedder: ImageEmbedder,
}

impl PageComposer {
    /// Create a composer.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated_at: None,
            embedder: ImageEmbedder::new(),
        }
    }

    /// Fix the "Generated on" timestamp instead of reading the clock.
    pub fn with_generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn generated_on(&self) -> String {
        let at = self
            .generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }

    /// Draw the whole report onto `surface`.
    ///
    /// The surface must be fresh: composition starts on its current page.
    pub fn compose(
        &self,
        surface: &mut dyn DrawingSurface,
        title: &str,
        units: &[ReportUnit],
    ) -> Result<CompositionSummary> {
        self.config.validate()?;
        let title = sanitize_title(title);
        log::info!(
            "composing {:?}: {} units, {:?} tier",
            title,
            units.len(),
            self.config.tier
        );

        let mut ctx = RenderContext::new(surface, self.config.geometry());
        self.draw_title_band(&mut ctx, &title);

        let mut layouts = Vec::with_capacity(units.len());
        for (position, unit) in units.iter().enumerate() {
            if position > 0 {
                ctx.new_page();
            }
            let number = unit.slide_index.unwrap_or(position) + 1;
            let layout = match self.config.tier {
                ExportTier::Full => self.draw_full_unit(&mut ctx, &title, number, &unit.data),
                ExportTier::ChartOnly => self.draw_chart_only_unit(&mut ctx, number, &unit.data),
            };
            layouts.push(layout);
        }

        self.stamp_footers(ctx.surface)?;
        let page_count = ctx.surface.total_page_count();
        log::info!("composed {} pages ({} page breaks)", page_count, ctx.page_breaks());
        Ok(CompositionSummary {
            page_count,
            units: layouts,
        })
    }

    fn draw_title_band(&self, ctx: &mut RenderContext<'_>, title: &str) {
        const BAND: f64 = 40.0;
        let y = ctx.y();
        let center = ctx.geometry.width / 2.0;
        ctx.gradient_band(y, BAND);
        ctx.surface.set_text_color(Rgb::WHITE);
        ctx.surface.set_font(FontStyle::Bold, 24.0);
        let generated = format!("Generated on: {}", self.generated_on());

        match self.config.tier {
            ExportTier::Full => {
                ctx.surface
                    .text_line("Presentation Result Report", center, y + 15.0, TextOptions::center());
                ctx.surface.set_font(FontStyle::Normal, 14.0);
                ctx.surface.text_line(
                    "Detailed Analysis of All Responses Collected",
                    center,
                    y + 25.0,
                    TextOptions::center(),
                );
                ctx.surface.set_font(FontStyle::Normal, 11.0);
                ctx.surface.text_line(&generated, center, y + 32.0, TextOptions::center());
            },
            ExportTier::ChartOnly => {
                let mut lines: Vec<String> = ctx
                    .surface
                    .wrap_text_to_width(title, ctx.content_width() - 20.0)
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                if lines.is_empty() {
                    lines.push(DEFAULT_TITLE.to_string());
                }
                let heading_y = y + 12.0;
                for (i, line) in lines.iter().enumerate() {
                    ctx.surface
                        .text_line(line, center, heading_y + i as f64 * 7.0, TextOptions::center());
                }
                let next_y = heading_y + lines.len() as f64 * 7.0 + 3.0;
                ctx.surface.set_font(FontStyle::Normal, 14.0);
                ctx.surface
                    .text_line("Visual Summary Report", center, next_y, TextOptions::center());
                ctx.surface.set_font(FontStyle::Normal, 11.0);
                ctx.surface.text_line(&generated, center, next_y + 7.0, TextOptions::center());
                ctx.surface.set_font(FontStyle::Italic, 9.0);
                ctx.surface.text_line(
                    "Pro Plan - Visualization Only",
                    center,
                    next_y + 14.0,
                    TextOptions::center(),
                );
            },
        }
        ctx.advance(BAND + 20.0);
    }

    fn question_text(data: &FormattedSlideData) -> String {
        let question = sanitize_text(&data.question, NO_QUESTION);
        if question == NO_QUESTION {
            log::warn!("{} unit has no question text", data.slide_type);
        }
        question
    }

    fn draw_question(
        ctx: &mut RenderContext<'_>,
        question: &str,
        label_size: f64,
        label_gap: f64,
        pitch: f64,
    ) {
        ctx.surface.set_text_color(INK);
        ctx.surface.set_font(FontStyle::Bold, label_size);
        ctx.surface.text_line("Question:", ctx.left(), ctx.y(), TextOptions::default());
        ctx.advance(label_gap);

        ctx.surface.set_font(FontStyle::Normal, 12.0);
        let lines = ctx.surface.wrap_text_to_width(question, ctx.content_width());
        ctx.surface.text(&lines, ctx.left(), ctx.y(), TextOptions::default());
        ctx.advance(lines.len() as f64 * pitch + 8.0);
    }

    fn draw_full_unit(
        &self,
        ctx: &mut RenderContext<'_>,
        title: &str,
        number: usize,
        data: &FormattedSlideData,
    ) -> UnitLayout {
        let mut layout = UnitLayout {
            start_page: ctx.cursor.page_index,
            ..UnitLayout::default()
        };
        let (left, width) = (ctx.left(), ctx.content_width());

        const HEADER: f64 = 25.0;
        ctx.check_new_page(HEADER + 50.0);
        let y = ctx.y();
        ctx.gradient_band(y, HEADER);
        ctx.surface.set_text_color(Rgb::WHITE);
        ctx.surface.set_font(FontStyle::Bold, 18.0);
        ctx.surface.text_line(
            &format!("{} - Slide {}", title, number),
            left + 5.0,
            y + 12.0,
            TextOptions::default(),
        );
        ctx.surface.set_font(FontStyle::Normal, 10.0);
        ctx.surface.text_line(
            &data.slide_type.badge(),
            left + width - 5.0,
            y + 12.0,
            TextOptions::right(),
        );
        ctx.advance(HEADER + 10.0);
        Self::draw_question(ctx, &Self::question_text(data), 16.0, 7.0, 6.0);
        layout.reach(UnitStage::HeaderDrawn);

        ctx.check_new_page(25.0);
        let y = ctx.y();
        ctx.surface.set_fill_color(Rgb(240, 248, 255));
        ctx.surface.set_draw_color(ACCENT);
        ctx.surface.set_line_width(0.2);
        ctx.surface.rounded_rect(left, y, width, 15.0, 3.0, PaintMode::FillStroke);
        ctx.surface.set_font(FontStyle::Bold, 10.0);
        ctx.surface.set_text_color(ACCENT);
        ctx.surface
            .text_line("Export Information", left + 5.0, y + 7.0, TextOptions::default());
        ctx.surface.set_font(FontStyle::Normal, 10.0);
        ctx.surface.set_text_color(MUTED);
        let timestamp = sanitize_text(&data.timestamp, "N/A");
        ctx.surface.text_line(
            &format!("Exported: {}", timestamp),
            left + 5.0,
            y + 12.0,
            TextOptions::default(),
        );
        ctx.surface.text_line(
            &format!("Total Responses: {}", data.metadata.total_responses),
            left + width / 2.0,
            y + 12.0,
            TextOptions::default(),
        );
        ctx.advance(25.0);
        layout.reach(UnitStage::MetadataDrawn);

        let summary_title = match data.slide_type {
            SlideType::Leaderboard => "LEADERBOARD",
            SlideType::Instruction => "INSTRUCTIONS",
            _ => "Summary",
        };
        layout.summary = draw_section(ctx, summary_title, &data.summary, &TableStyle::SUMMARY, 10.0);
        if layout.summary.is_some() {
            layout.reach(UnitStage::SummaryDrawn);
        }

        // the join code sits directly under the last table
        let detailed_gap = if data.slide_type.carries_join_code() { 0.0 } else { 10.0 };
        layout.detailed = draw_section(
            ctx,
            "Detailed Responses",
            &data.detailed,
            &TableStyle::DETAILED,
            detailed_gap,
        );
        if layout.detailed.is_some() {
            layout.reach(UnitStage::DetailedDrawn);
        }

        if !data.summary.is_empty() || !data.detailed.is_empty() {
            let dataset = extract_dataset(data, ExportTier::Full);
            if !dataset.is_empty() {
                const BOX: f64 = 50.0;
                ctx.check_new_page(5.0 + 8.0 + BOX);
                ctx.advance(5.0);
                ctx.surface.set_font(FontStyle::Bold, 12.0);
                ctx.surface.set_text_color(INK);
                ctx.surface
                    .text_line("Response Visualization", left, ctx.y(), TextOptions::default());
                ctx.advance(8.0);

                let y = ctx.y();
                ctx.surface.set_fill_color(Rgb::gray(250));
                ctx.surface.set_draw_color(Rgb::gray(224));
                ctx.surface.set_line_width(0.2);
                ctx.surface.rounded_rect(left, y, width, BOX, 3.0, PaintMode::FillStroke);
                let chart = ChartRenderer::draw(
                    &mut *ctx.surface,
                    &dataset,
                    left + 5.0,
                    y + 5.0,
                    width - 10.0,
                    BOX - 10.0,
                    &ChartOptions::default(),
                );
                ctx.cursor.y = chart.bottom + 10.0;
                layout.chart = Some(chart);
                layout.reach(UnitStage::ChartDrawn);
            }
        }

        if data.slide_type.carries_join_code() {
            match data.metadata.access_code.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => {
                    layout.code = self
                        .embedder
                        .embed_join_code(ctx, &self.config.join_origin, code);
                    if layout.code.is_some() {
                        layout.reach(UnitStage::CodeEmbedded);
                    }
                },
                _ => log::debug!("instruction unit {} has no access code", number),
            }
        }

        layout.reach(UnitStage::UnitComplete);
        layout
    }

    fn draw_chart_only_unit(
        &self,
        ctx: &mut RenderContext<'_>,
        number: usize,
        data: &FormattedSlideData,
    ) -> UnitLayout {
        let mut layout = UnitLayout {
            start_page: ctx.cursor.page_index,
            ..UnitLayout::default()
        };
        let (left, width) = (ctx.left(), ctx.content_width());

        const HEADER: f64 = 20.0;
        ctx.check_new_page(HEADER + 100.0);
        let y = ctx.y();
        ctx.gradient_band(y, HEADER);
        ctx.surface.set_text_color(Rgb::WHITE);
        ctx.surface.set_font(FontStyle::Bold, 14.0);
        ctx.surface.text_line(
            &format!("[Slide {}]", number),
            left + 5.0,
            y + 12.0,
            TextOptions::default(),
        );
        ctx.advance(HEADER + 15.0);
        Self::draw_question(ctx, &Self::question_text(data), 14.0, 6.0, 5.0);
        layout.reach(UnitStage::HeaderDrawn);

        ctx.surface.set_font(FontStyle::Normal, 11.0);
        ctx.surface.text_line(
            &format!("Type: {}", data.slide_type.badge()),
            left,
            ctx.y(),
            TextOptions::default(),
        );
        ctx.advance(6.0);
        ctx.surface.text_line(
            &format!("Total Responses: {}", data.metadata.total_responses),
            left,
            ctx.y(),
            TextOptions::default(),
        );
        ctx.advance(12.0);
        layout.reach(UnitStage::MetadataDrawn);

        let dataset = extract_dataset(data, ExportTier::ChartOnly);
        let info = info_line(data);
        let has_chart = !dataset.is_empty();

        if has_chart {
            const BOX: f64 = 70.0;
            ctx.check_new_page(8.0 + 10.0 + BOX);
            ctx.advance(8.0);
            ctx.surface.set_font(FontStyle::Bold, 12.0);
            ctx.surface.set_text_color(INK);
            ctx.surface
                .text_line(chart_title(data.slide_type), left, ctx.y(), TextOptions::default());
            ctx.advance(10.0);

            let y = ctx.y();
            ctx.surface.set_fill_color(Rgb::gray(250));
            ctx.surface.set_draw_color(Rgb::gray(224));
            ctx.surface.set_line_width(0.5);
            ctx.surface.rounded_rect(left, y, width, BOX, 2.0, PaintMode::FillStroke);
            let chart = ChartRenderer::draw(
                &mut *ctx.surface,
                &dataset,
                left + 8.0,
                y + 8.0,
                width - 16.0,
                BOX - 16.0,
                &ChartOptions::default(),
            );
            ctx.cursor.y = chart.bottom + 8.0 + 8.0;
            layout.chart = Some(chart);
            layout.reach(UnitStage::ChartDrawn);

            if let Some(text) = info.as_deref().filter(|_| is_compact_info(data.slide_type)) {
                ctx.surface.set_font(FontStyle::Normal, 10.0);
                ctx.surface.set_text_color(MUTED);
                ctx.surface.text_line(text, left, ctx.y(), TextOptions::default());
                ctx.advance(8.0);
            }
        }

        match info.as_deref() {
            Some(text) if !(has_chart && is_compact_info(data.slide_type)) => {
                ctx.check_new_page(30.0);
                ctx.advance(8.0);
                if !has_chart {
                    let paragraphs = text.split('\n').count() as f64;
                    let height = (paragraphs * 6.0 + 10.0).min(40.0);
                    ctx.surface.set_fill_color(Rgb::gray(250));
                    ctx.surface.set_draw_color(Rgb::gray(224));
                    ctx.surface.set_line_width(0.5);
                    ctx.surface
                        .rounded_rect(left, ctx.y(), width, height, 2.0, PaintMode::FillStroke);
                    ctx.advance(5.0);
                }
                ctx.surface.set_font(FontStyle::Normal, 10.0);
                ctx.surface.set_text_color(MUTED);
                let lines = ctx.surface.wrap_text_to_width(text, width - 10.0);
                let indent = if has_chart { 0.0 } else { 5.0 };
                ctx.surface
                    .text(&lines, left + indent, ctx.y(), TextOptions::default());
                ctx.advance(lines.len() as f64 * 5.0 + indent);
            },
            Some(_) => {},
            None if !has_chart && data.metadata.total_responses == 0 => {
                ctx.check_new_page(20.0);
                ctx.advance(5.0);
                ctx.surface.set_font(FontStyle::Italic, 10.0);
                ctx.surface.set_text_color(FOOTER_GRAY);
                ctx.surface.text_line(NO_RESPONSES, left, ctx.y(), TextOptions::default());
                ctx.advance(10.0);
            },
            None => {},
        }

        layout.reach(UnitStage::UnitComplete);
        layout
    }

    fn stamp_footers(&self, surface: &mut dyn DrawingSurface) -> Result<()> {
        let total = surface.total_page_count();
        let (center, baseline) = (surface.page_width() / 2.0, surface.page_height() - 10.0);
        for index in 0..total {
            surface.set_page(index)?;
            surface.set_font(FontStyle::Italic, 8.0);
            surface.set_text_color(FOOTER_GRAY);
            surface.text_line(
                &format!("Page {} of {} | Generated by {}", index + 1, total, self.config.branding),
                center,
                baseline,
                TextOptions::center(),
            );
        }
        Ok(())
    }
}

/// Render a request to PDF bytes.
pub fn render_report_pdf(request: &ReportRequest, config: &ReportConfig) -> Result<Vec<u8>> {
    let surface = compose_pdf(request, config)?;
    surface.to_bytes()
}

/// Render a request and save it as `<dir>/<outputName or "export">.pdf`.
pub fn save_report_pdf(request: &ReportRequest, config: &ReportConfig, dir: &Path) -> Result<PathBuf> {
    let surface = compose_pdf(request, config)?;
    let path = dir.join(request.file_name());
    surface.save(&path)?;
    log::info!("saved {}", path.display());
    Ok(path)
}

fn compose_pdf(request: &ReportRequest, config: &ReportConfig) -> Result<PdfSurface> {
    config.validate()?;
    let title = sanitize_title(&request.title);
    let mut surface = PdfSurface::new(
        config.page_width,
        config.page_height,
        config.pdf_writer_config(&title),
    );
    PageComposer::new(config.clone()).compose(&mut surface, &title, &request.units)?;
    Ok(surface)
}

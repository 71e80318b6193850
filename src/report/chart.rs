//! Bar charts drawn from rectangles, lines and text.

use super::layout::INK;
use super::model::format_number;
use super::text::shorten_id;
use crate::surface::{DrawingSurface, PaintMode, Rgb, TextOptions};
use crate::writer::FontStyle;
use std::collections::BTreeSet;

/// Fill used for highlighted bars.
pub const HIGHLIGHT: Rgb = Rgb(16, 185, 129);
/// Fill used when a dataset has no palette.
pub const FALLBACK_BAR: Rgb = Rgb(59, 130, 246);

/// Horizontal gap between bars (mm).
pub const BAR_SPACING: f64 = 3.0;
/// Widest bar (mm).
pub const MAX_BAR_WIDTH: f64 = 20.0;
/// Space reserved under the plot for category labels (mm).
pub const LABEL_BAND: f64 = 15.0;
/// Space reserved above the plot for value labels (mm).
pub const VALUE_BAND: f64 = 8.0;

/// Labels and values of one chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartDataset {
    labels: Vec<String>,
    values: Vec<f64>,
    highlight: BTreeSet<usize>,
    palette: Vec<Rgb>,
}

impl ChartDataset {
    /// Build from `(label, value)` pairs; labels and values always pair up.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (labels, values) = pairs.into_iter().map(|(l, v)| (l.into(), v)).unzip();
        Self {
            labels,
            values,
            highlight: BTreeSet::new(),
            palette: Vec::new(),
        }
    }

    /// Set the bar colors, cycled by index.
    pub fn with_palette(mut self, palette: Vec<Rgb>) -> Self {
        self.palette = palette;
        self
    }

    /// Flag a bar for the highlight color. Out-of-range indices are ignored.
    pub fn with_highlight(mut self, index: usize) -> Self {
        if index < self.labels.len() {
            self.highlight.insert(index);
        }
        self
    }

    /// Category labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Bar values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Highlighted indices.
    pub fn highlight(&self) -> &BTreeSet<usize> {
        &self.highlight
    }

    /// Bar colors.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Fill of the bar at `index`.
    pub fn bar_color(&self, index: usize) -> Rgb {
        if self.highlight.contains(&index) {
            HIGHLIGHT
        } else if self.palette.is_empty() {
            FALLBACK_BAR
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Value mapped to the full plot height, if larger than every value
    pub max_value: Option<f64>,
    /// Print values above bars
    pub show_values: bool,
    /// Print category labels under bars
    pub show_labels: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            max_value: None,
            show_values: true,
            show_labels: true,
        }
    }
}

/// Geometry of one drawn bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Fill
    pub color: Rgb,
}

/// What [`ChartRenderer::draw`] produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartLayout {
    /// Bars in dataset order
    pub bars: Vec<BarGeometry>,
    /// Top of the plot area
    pub plot_top: f64,
    /// Height of the plot area
    pub plot_height: f64,
    /// y immediately below the chart
    pub bottom: f64,
}

/// Draws [`ChartDataset`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl ChartRenderer {
    /// Draw `dataset` into the box at `(x, y)` of `width` by `height`.
    ///
    /// Bar heights are `value / max(values, max_value, 1)` of the plot
    /// height. An empty dataset draws nothing and returns `y` as the bottom.
    pub fn draw(
        surface: &mut dyn DrawingSurface,
        dataset: &ChartDataset,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        options: &ChartOptions,
    ) -> ChartLayout {
        if dataset.is_empty() {
            return ChartLayout {
                bottom: y,
                ..ChartLayout::default()
            };
        }

        let count = dataset.len();
        let label_band = if options.show_labels { LABEL_BAND } else { 0.0 };
        let value_band = if options.show_values { VALUE_BAND } else { 0.0 };
        let plot_height = (height - label_band - value_band).max(0.0);
        let plot_top = y + value_band;
        // gaps shrink once they would take more than half the width
        let spacing = BAR_SPACING.min(width / (2 * count) as f64).max(0.0);
        let available = width - spacing * (count - 1) as f64;
        let bar_width = (available / count as f64).clamp(0.0, MAX_BAR_WIDTH);
        let scale_max = dataset
            .values
            .iter()
            .copied()
            .chain(options.max_value)
            .fold(1.0, f64::max);

        let mut bars = Vec::with_capacity(count);
        let mut bar_x = x;
        for (index, (&value, label)) in dataset.values.iter().zip(&dataset.labels).enumerate() {
            let bar_height = (value.max(0.0) / scale_max) * plot_height;
            let bar_y = plot_top + plot_height - bar_height;
            let color = dataset.bar_color(index);

            surface.set_fill_color(color);
            surface.rounded_rect(bar_x, bar_y, bar_width, bar_height, 1.0, PaintMode::Fill);
            surface.set_draw_color(color.scale(0.7));
            surface.set_line_width(0.5);
            surface.rounded_rect(bar_x, bar_y, bar_width, bar_height, 1.0, PaintMode::Stroke);

            let center = bar_x + bar_width / 2.0;
            if options.show_values && value > 0.0 {
                surface.set_font(FontStyle::Bold, 8.0);
                surface.set_text_color(INK);
                surface.text_line(&format_number(value), center, bar_y - 1.0, TextOptions::center());
            }

            if options.show_labels {
                surface.set_font(FontStyle::Normal, 7.0);
                surface.set_text_color(INK);
                let lines = surface.wrap_text_to_width(&shorten_id(label, 15), bar_width);
                for (i, line) in lines.iter().enumerate() {
                    surface.text_line(
                        line,
                        center,
                        plot_top + plot_height + 5.0 + i as f64 * 4.0,
                        TextOptions::center(),
                    );
                }
            }

            bars.push(BarGeometry {
                x: bar_x,
                y: bar_y,
                width: bar_width,
                height: bar_height,
                color,
            });
            bar_x += bar_width + spacing;
        }

        log::debug!("chart: {} bars, scale max {}", count, scale_max);
        ChartLayout {
            bars,
            plot_top,
            plot_height,
            bottom: y + height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};

    #[test]
    fn test_dataset_pairs_stay_aligned() {
        let dataset = ChartDataset::from_pairs(vec![("Red", 3.0), ("Blue", 7.0)]);
        assert_eq!(dataset.labels(), &["Red".to_string(), "Blue".to_string()]);
        assert_eq!(dataset.values(), &[3.0, 7.0]);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_highlight_out_of_range_ignored() {
        let dataset = ChartDataset::from_pairs(vec![("a", 1.0)]).with_highlight(4);
        assert!(dataset.highlight().is_empty());
    }

    #[test]
    fn test_palette_cycles() {
        let dataset = ChartDataset::from_pairs(vec![("a", 1.0), ("b", 1.0), ("c", 1.0)])
            .with_palette(vec![Rgb(1, 1, 1), Rgb(2, 2, 2)]);
        assert_eq!(dataset.bar_color(2), Rgb(1, 1, 1));
        assert_eq!(ChartDataset::default().bar_color(0), FALLBACK_BAR);
    }

    #[test]
    fn test_empty_dataset_draws_nothing() {
        let mut surface = RecordingSurface::a4();
        let layout = ChartRenderer::draw(&mut surface, &ChartDataset::default(), 10.0, 50.0, 100.0, 40.0, &ChartOptions::default());
        assert_eq!(layout.bottom, 50.0);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_bar_width_is_capped() {
        let mut surface = RecordingSurface::a4();
        let dataset = ChartDataset::from_pairs(vec![("only", 4.0)]);
        let layout = ChartRenderer::draw(&mut surface, &dataset, 0.0, 0.0, 170.0, 40.0, &ChartOptions::default());
        assert_eq!(layout.bars[0].width, MAX_BAR_WIDTH);
        assert_eq!(layout.bottom, 40.0);
    }

    #[test]
    fn test_negative_values_clamp_to_zero_height() {
        let mut surface = RecordingSurface::a4();
        let dataset = ChartDataset::from_pairs(vec![("neg", -5.0), ("pos", 2.0)]);
        let layout = ChartRenderer::draw(&mut surface, &dataset, 0.0, 0.0, 100.0, 40.0, &ChartOptions::default());
        assert_eq!(layout.bars[0].height, 0.0);
        assert!(!surface.has_text("-5"));
    }

    #[test]
    fn test_value_labels_only_for_nonzero() {
        let mut surface = RecordingSurface::a4();
        let dataset = ChartDataset::from_pairs(vec![("zero", 0.0), ("two", 2.5)]);
        ChartRenderer::draw(&mut surface, &dataset, 0.0, 0.0, 100.0, 40.0, &ChartOptions::default());
        assert!(surface.has_text("2.5"));
        assert!(!surface.has_text("0"));
        assert!(surface.has_text("zero"));
    }

    #[test]
    fn test_border_uses_darkened_fill() {
        let mut surface = RecordingSurface::a4();
        let dataset = ChartDataset::from_pairs(vec![("a", 1.0)]).with_palette(vec![Rgb(100, 200, 50)]);
        ChartRenderer::draw(&mut surface, &dataset, 0.0, 0.0, 100.0, 40.0, &ChartOptions::default());
        let stroke = surface.ops().iter().find_map(|op| match op {
            DrawOp::RoundedRect {
                mode: PaintMode::Stroke,
                stroke,
                line_width,
                ..
            } => Some((*stroke, *line_width)),
            _ => None,
        });
        assert_eq!(stroke, Some((Rgb(70, 140, 35), 0.5)));
    }
}

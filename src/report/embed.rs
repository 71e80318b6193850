//! Join-code QR placement.

use super::layout::{RenderContext, INK};
use crate::surface::{PaintMode, Rgb, TextOptions};
use crate::writer::{BarcodeGenerator, FontStyle, ImageData, QrCodeOptions, QrErrorCorrection};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Height the QR block needs, caption to sub-caption (mm).
pub const QR_BLOCK_HEIGHT: f64 = 61.0;
/// Space kept free for the footer below the QR block (mm).
pub const FOOTER_GUTTER: f64 = 15.0;
/// Printed QR size (mm).
pub const QR_SIZE: f64 = 25.0;
/// Caption above the code.
pub const CAPTION: &str = "Scan this QR code to join";
/// Caption below the code.
pub const SUB_CAPTION: &str = "with your mobile device to join the presentation";

/// Link encoded into the QR code: `<origin>/join/<base64(code)>`.
pub fn join_url(origin: &str, access_code: &str) -> String {
    format!(
        "{}/join/{}",
        origin.trim_end_matches('/'),
        STANDARD.encode(access_code.as_bytes())
    )
}

/// Where a code was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedPlacement {
    /// Page of the code
    pub page: usize,
    /// Left edge of the code image
    pub x: f64,
    /// Top edge of the code image
    pub y: f64,
    /// Edge length of the code image
    pub size: f64,
}

/// Generates QR bitmaps and places them with their captions.
#[derive(Debug, Clone)]
pub struct ImageEmbedder {
    options: QrCodeOptions,
}

impl Default for ImageEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEmbedder {
    /// 200 px codes, level H, one module of quiet zone.
    pub fn new() -> Self {
        Self {
            options: QrCodeOptions::new()
                .size(200)
                .error_correction(QrErrorCorrection::High)
                .quiet_zone(1),
        }
    }

    /// Generate the join code for `access_code` and place it below the
    /// cursor. Failures are logged and leave the document untouched.
    pub fn embed_join_code(
        &self,
        ctx: &mut RenderContext<'_>,
        origin: &str,
        access_code: &str,
    ) -> Option<EmbedPlacement> {
        let url = join_url(origin, access_code);
        match BarcodeGenerator::generate_qr(&url, &self.options) {
            Ok(png) => self.place(ctx, &png),
            Err(e) => {
                log::warn!("could not generate join code for {}: {}", url, e);
                None
            },
        }
    }

    /// Place an already encoded PNG with its captions.
    ///
    /// The block moves to a new page when it would cut into the footer
    /// gutter. Undecodable images are skipped before anything is drawn.
    pub fn place(&self, ctx: &mut RenderContext<'_>, png: &[u8]) -> Option<EmbedPlacement> {
        if let Err(e) = ImageData::from_png(png) {
            log::warn!("skipping join code image: {}", e);
            return None;
        }

        ctx.check_new_page_reserving(QR_BLOCK_HEIGHT, FOOTER_GUTTER);
        let center = ctx.geometry.width / 2.0;

        ctx.advance(3.0);
        ctx.surface.set_font(FontStyle::Bold, 10.0);
        ctx.surface.set_text_color(INK);
        ctx.surface.text_line(CAPTION, center, ctx.y(), TextOptions::center());
        ctx.advance(6.0);

        let (x, y) = (center - QR_SIZE / 2.0, ctx.y());
        ctx.surface.set_fill_color(Rgb::WHITE);
        ctx.surface.set_draw_color(Rgb::gray(200));
        ctx.surface.set_line_width(0.5);
        ctx.surface
            .rounded_rect(x - 2.0, y - 2.0, QR_SIZE + 4.0, QR_SIZE + 4.0, 2.0, PaintMode::FillStroke);
        if let Err(e) = ctx.surface.add_image(png, x, y, QR_SIZE, QR_SIZE) {
            log::warn!("could not place join code image: {}", e);
        }
        ctx.advance(QR_SIZE + 6.0);

        ctx.surface.set_font(FontStyle::Normal, 8.0);
        ctx.surface.set_text_color(Rgb::gray(66));
        ctx.surface.text_line(SUB_CAPTION, center, ctx.y(), TextOptions::center());
        ctx.advance(5.0);

        Some(EmbedPlacement {
            page: ctx.cursor.page_index,
            x,
            y,
            size: QR_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PageGeometry;
    use crate::surface::RecordingSurface;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://inavora.com", "ABC123"), "https://inavora.com/join/QUJDMTIz");
        assert_eq!(join_url("http://localhost/", "ab"), "http://localhost/join/YWI=");
    }

    #[test]
    fn test_place_below_cursor() {
        let mut surface = RecordingSurface::a4();
        let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
        ctx.advance(85.0);
        let placement = ImageEmbedder::new().place(&mut ctx, &tiny_png()).unwrap();

        assert_eq!(placement.page, 0);
        assert_eq!(placement.x, 92.5);
        assert_eq!(placement.y, 15.0 + 85.0 + 3.0 + 6.0);
        assert_eq!(ctx.y(), placement.y + 31.0 + 5.0);
        assert!(surface.has_text(CAPTION));
        assert!(surface.has_text(SUB_CAPTION));
    }

    #[test]
    fn test_place_breaks_page_near_footer() {
        let mut surface = RecordingSurface::a4();
        let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
        // 215 + 61 = 276 > 297 - 15 - 15
        ctx.advance(200.0);
        let placement = ImageEmbedder::new().place(&mut ctx, &tiny_png()).unwrap();
        assert_eq!(placement.page, 1);
        assert_eq!(placement.y, 15.0 + 9.0);
    }

    #[test]
    fn test_bad_image_is_skipped() {
        let mut surface = RecordingSurface::a4();
        let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
        assert!(ImageEmbedder::new().place(&mut ctx, b"nope").is_none());
        assert_eq!(ctx.y(), 15.0);
        assert!(surface.ops().is_empty());
    }

    #[cfg(feature = "barcodes")]
    #[test]
    fn test_embed_join_code_draws_image() {
        use crate::surface::DrawOp;

        let mut surface = RecordingSurface::a4();
        let mut ctx = RenderContext::new(&mut surface, PageGeometry::A4);
        assert!(ImageEmbedder::new()
            .embed_join_code(&mut ctx, "https://inavora.com", "ABC123")
            .is_some());
        assert!(surface
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Image { width, .. } if *width == QR_SIZE)));
    }
}

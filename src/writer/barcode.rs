//! QR code generation for PDF documents.
//!
//! Codes are rasterized to PNG so they can be placed like any other image.
//! Generation needs the `barcodes` feature (on by default); without it every
//! call fails with [`Error::Barcode`] and callers are expected to skip the
//! code.
//!
//! ## Example
//!
//! ```ignore
//! use slide_report::writer::barcode::{BarcodeGenerator, QrCodeOptions, QrErrorCorrection};
//!
//! let qr_png = BarcodeGenerator::generate_qr(
//!     "https://example.com/join/QUJDMTIz",
//!     &QrCodeOptions::default()
//!         .size(200)
//!         .error_correction(QrErrorCorrection::High),
//! )?;
//! ```

use crate::error::{Error, Result};

/// QR code error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorCorrection {
    /// Low (~7% correction capability)
    Low,
    /// Medium (~15% correction capability)
    #[default]
    Medium,
    /// Quartile (~25% correction capability)
    Quartile,
    /// High (~30% correction capability)
    High,
}

/// Options for QR code generation.
#[derive(Debug, Clone)]
pub struct QrCodeOptions {
    /// Size of the QR code in pixels (width = height)
    pub size: u32,
    /// Error correction level
    pub error_correction: QrErrorCorrection,
    /// Quiet zone (border) in modules
    pub quiet_zone: u32,
    /// Foreground color (RGBA)
    pub foreground: [u8; 4],
    /// Background color (RGBA)
    pub background: [u8; 4],
}

impl Default for QrCodeOptions {
    fn default() -> Self {
        Self {
            size: 200,
            error_correction: QrErrorCorrection::Medium,
            quiet_zone: 4,
            foreground: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
        }
    }
}

impl QrCodeOptions {
    /// Create new QR code options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size in pixels.
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set the error correction level.
    pub fn error_correction(mut self, level: QrErrorCorrection) -> Self {
        self.error_correction = level;
        self
    }

    /// Set the quiet zone (border) in modules.
    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }
}

/// QR code rasterizer.
pub struct BarcodeGenerator;

#[cfg(feature = "barcodes")]
impl BarcodeGenerator {
    /// Generate a QR code as PNG bytes.
    pub fn generate_qr(data: &str, options: &QrCodeOptions) -> Result<Vec<u8>> {
        use qrcode::{EcLevel, QrCode};

        let ec_level = match options.error_correction {
            QrErrorCorrection::Low => EcLevel::L,
            QrErrorCorrection::Medium => EcLevel::M,
            QrErrorCorrection::Quartile => EcLevel::Q,
            QrErrorCorrection::High => EcLevel::H,
        };

        let code = QrCode::with_error_correction_level(data, ec_level)
            .map_err(|e| Error::Barcode(format!("QR code encoding error: {}", e)))?;

        let qr_width = code.width();
        let module_count = qr_width + (options.quiet_zone as usize * 2);

        // Whole pixels per module, then scale to the exact requested size.
        let module_size = (options.size as usize / module_count).max(1);
        let actual_size = module_count * module_size;

        let mut img = image::RgbaImage::from_pixel(
            actual_size as u32,
            actual_size as u32,
            image::Rgba(options.background),
        );

        let quiet_px = options.quiet_zone as usize * module_size;
        for (y, row) in code.to_colors().chunks(qr_width).enumerate() {
            for (x, &module) in row.iter().enumerate() {
                if module != qrcode::Color::Dark {
                    continue;
                }
                let start_x = quiet_px + x * module_size;
                let start_y = quiet_px + y * module_size;
                for dy in 0..module_size {
                    for dx in 0..module_size {
                        img.put_pixel(
                            (start_x + dx) as u32,
                            (start_y + dy) as u32,
                            image::Rgba(options.foreground),
                        );
                    }
                }
            }
        }

        let final_img = if actual_size != options.size as usize {
            image::DynamicImage::ImageRgba8(img).resize_exact(
                options.size,
                options.size,
                image::imageops::FilterType::Nearest,
            )
        } else {
            image::DynamicImage::ImageRgba8(img)
        };

        let mut buf = Vec::new();
        final_img
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| Error::Barcode(format!("PNG encoding error: {}", e)))?;

        Ok(buf)
    }
}

#[cfg(not(feature = "barcodes"))]
impl BarcodeGenerator {
    /// Generate a QR code (requires `barcodes` feature).
    pub fn generate_qr(_data: &str, _options: &QrCodeOptions) -> Result<Vec<u8>> {
        Err(Error::Barcode("QR code generation requires the 'barcodes' feature".to_string()))
    }
}

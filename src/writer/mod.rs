//! PDF writing module for generating PDF files.
//!
//! Low-level building blocks used by the PDF drawing surface.
//!
//! ## Architecture
//!
//! ```text
//! drawing calls (points, bottom-up)
//!     ↓
//! [ContentStreamBuilder] (operators → content stream bytes)
//!     ↓
//! [PdfWriter] (pages, Helvetica fonts, image XObjects)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! [FontManager] supplies the glyph metrics used to measure and wrap text
//! before it is placed, [ImageData] turns PNG bytes into XObjects and
//! [barcode] rasterizes QR codes.
//!
//! ## Example
//!
//! ```ignore
//! use slide_report::writer::PdfWriter;
//!
//! let mut writer = PdfWriter::new();
//! let page = writer.add_a4_page();
//! writer
//!     .page_content(page)?
//!     .begin_text()
//!     .set_font("Helvetica", 12.0)
//!     .text("Hello, World!", 72.0, 720.0)
//!     .end_text();
//! let bytes = writer.to_bytes()?;
//! ```

pub mod barcode;
mod content_stream;
mod font_manager;
mod image_handler;
mod object_serializer;
mod pdf_writer;

pub use barcode::{BarcodeGenerator, QrCodeOptions, QrErrorCorrection};
pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{encode_win_ansi, FontInfo, FontManager, FontStyle};
pub use image_handler::{ColorSpace, ImageData};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{PdfWriter, PdfWriterConfig};

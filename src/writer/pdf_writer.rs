//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.

use super::content_stream::ContentStreamBuilder;
use super::font_manager::{encode_win_ansi, FontStyle};
use super::image_handler::ImageData;
use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            subject: None,
            creator: Some(crate::NAME.to_string()),
            compress: false,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the creator application.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, page content streams are compressed with FlateDecode.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Internal page data.
#[derive(Debug)]
struct PageData {
    width: f64,
    height: f64,
    content_builder: ContentStreamBuilder,
    /// Indices into the writer's image list
    images: Vec<usize>,
}

/// PDF document writer.
///
/// Pages are created up front and their content streams stay open for
/// drawing until the document is serialized, so earlier pages can be
/// revisited (page footers are stamped this way).
#[derive(Debug)]
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PageData>,
    images: Vec<ImageData>,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Writer configuration.
    pub fn config(&self) -> &PdfWriterConfig {
        &self.config
    }

    /// Add a page with the given dimensions in points and return its index.
    pub fn add_page(&mut self, width: f64, height: f64) -> usize {
        self.pages.push(PageData {
            width,
            height,
            content_builder: ContentStreamBuilder::new(),
            images: Vec::new(),
        });
        self.pages.len() - 1
    }

    /// Add an A4 sized page (210mm x 297mm).
    pub fn add_a4_page(&mut self) -> usize {
        self.add_page(210.0 * 72.0 / 25.4, 297.0 * 72.0 / 25.4)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Content stream of a page.
    pub fn page_content(&mut self, page_index: usize) -> Result<&mut ContentStreamBuilder> {
        self.pages
            .get_mut(page_index)
            .map(|page| &mut page.content_builder)
            .ok_or_else(|| Error::Surface(format!("page index {} out of range", page_index)))
    }

    /// Register an image on a page and return its XObject resource name.
    pub fn add_image(&mut self, page_index: usize, image: ImageData) -> Result<String> {
        let image_index = self.images.len();
        let page = self
            .pages
            .get_mut(page_index)
            .ok_or_else(|| Error::Surface(format!("page index {} out of range", page_index)))?;
        page.images.push(image_index);
        self.images.push(image);
        Ok(image_resource_name(image_index))
    }

    /// Build the complete PDF document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();
        let mut objects: Vec<(u32, Object)> = Vec::new();
        let mut next_obj_id = 1u32;
        let mut alloc = || {
            let id = next_obj_id;
            next_obj_id += 1;
            id
        };

        let catalog_id = alloc();
        let pages_id = alloc();

        // Fonts
        let mut font_resources = HashMap::new();
        for style in FontStyle::ALL {
            let font_id = alloc();
            objects.push((
                font_id,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type1")),
                    ("BaseFont", ObjectSerializer::name(style.base_font())),
                    ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
                ]),
            ));
            font_resources.insert(style.resource_name(), ObjectSerializer::reference(font_id, 0));
        }

        // Image XObjects, each followed by its soft mask
        let mut image_refs = Vec::with_capacity(self.images.len());
        for image in &self.images {
            let image_id = alloc();
            let mut dict = image.build_xobject_dict();
            if let (Some(mask_dict), Some(mask_data)) =
                (image.build_soft_mask_dict(), image.soft_mask.as_ref())
            {
                let mask_id = alloc();
                dict.insert("SMask".to_string(), ObjectSerializer::reference(mask_id, 0));
                objects.push((mask_id, Object::stream(mask_dict, mask_data.clone())));
            }
            objects.push((image_id, Object::stream(dict, image.data.clone())));
            image_refs.push(ObjectRef::new(image_id, 0));
        }

        // Pages
        let mut page_refs = Vec::with_capacity(self.pages.len());
        for page_data in &self.pages {
            let page_id = alloc();
            let content_id = alloc();

            let mut content = page_data.content_builder.clone();
            content.end_text();
            let raw_content = content.build()?;

            let mut content_dict = HashMap::new();
            let content_bytes = if self.config.compress {
                match compress_data(&raw_content) {
                    Ok(compressed) => {
                        content_dict
                            .insert("Filter".to_string(), ObjectSerializer::name("FlateDecode"));
                        compressed
                    },
                    Err(e) => {
                        log::warn!("content stream compression failed, writing raw: {}", e);
                        raw_content
                    },
                }
            } else {
                raw_content
            };

            let mut resources = vec![("Font", Object::Dictionary(font_resources.clone()))];
            if !page_data.images.is_empty() {
                let xobjects = page_data
                    .images
                    .iter()
                    .filter_map(|&i| {
                        image_refs
                            .get(i)
                            .map(|r| (image_resource_name(i), Object::Reference(*r)))
                    })
                    .collect();
                resources.push(("XObject", Object::Dictionary(xobjects)));
            }

            let page_obj = ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Page")),
                ("Parent", ObjectSerializer::reference(pages_id, 0)),
                (
                    "MediaBox",
                    ObjectSerializer::rect(
                        0.0,
                        0.0,
                        page_data.width,
                        page_data.height,
                    ),
                ),
                ("Contents", ObjectSerializer::reference(content_id, 0)),
                ("Resources", ObjectSerializer::dict(resources)),
            ]);

            page_refs.push(ObjectSerializer::reference(page_id, 0));
            objects.push((page_id, page_obj));
            objects.push((content_id, Object::stream(content_dict, content_bytes)));
        }

        objects.push((
            pages_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Pages")),
                ("Kids", Object::Array(page_refs)),
                ("Count", ObjectSerializer::integer(self.pages.len() as i64)),
            ]),
        ));
        objects.push((
            catalog_id,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Catalog")),
                ("Pages", ObjectSerializer::reference(pages_id, 0)),
            ]),
        ));

        let info_id = alloc();
        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", Object::String(encode_win_ansi(title))));
        }
        if let Some(author) = &self.config.author {
            info_entries.push(("Author", Object::String(encode_win_ansi(author))));
        }
        if let Some(subject) = &self.config.subject {
            info_entries.push(("Subject", Object::String(encode_win_ansi(subject))));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", Object::String(encode_win_ansi(creator))));
        }
        objects.push((info_id, ObjectSerializer::dict(info_entries)));

        objects.sort_by_key(|(id, _)| *id);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_offsets = Vec::with_capacity(objects.len());
        for (id, obj) in &objects {
            xref_offsets.push(output.len());
            output.extend_from_slice(&serializer.serialize_indirect(*id, 0, obj)?);
        }

        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", objects.len() + 1)?;
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(objects.len() as i64 + 1)),
            ("Root", ObjectSerializer::reference(catalog_id, 0)),
            ("Info", ObjectSerializer::reference(info_id, 0)),
        ]);

        writeln!(output, "trailer")?;
        output.extend_from_slice(&serializer.serialize(&trailer)?);
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        Ok(output)
    }

    /// Save the PDF to a file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn image_resource_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

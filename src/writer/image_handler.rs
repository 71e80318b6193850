//! Image handling for PDF generation.
//!
//! Following ISO 32000-1:2008 section 8.9, images are represented as XObjects. PNG input is
//! decoded to raw samples and re-compressed with FlateDecode; an alpha
//! channel, when present, becomes a separate DeviceGray soft mask.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{Error, Result};
use crate::object::Object;

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
}

impl ColorSpace {
    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// Image data ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space
    pub color_space: ColorSpace,
    /// Flate-compressed samples
    pub data: Vec<u8>,
    /// Flate-compressed alpha channel
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Decode a PNG image.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        use image::GenericImageView;

        if data.len() < 8 || &data[0..8] != b"\x89PNG\r\n\x1a\n" {
            return Err(Error::Image("not a PNG image".to_string()));
        }

        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| Error::Image(format!("failed to decode PNG: {}", e)))?;
        let (width, height) = img.dimensions();
        let pixel_count = (width as usize) * (height as usize);

        let (color_space, pixels, alpha) = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => {
                (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
            },
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity(pixel_count);
                let mut alpha_channel = Vec::with_capacity(pixel_count);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha_channel.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha_channel))
            },
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity(pixel_count * 3);
                let mut alpha_channel = Vec::with_capacity(pixel_count);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha_channel.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha_channel))
            },
            _ => (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None),
        };

        // A fully opaque alpha channel adds nothing.
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 255));

        Ok(Self {
            width,
            height,
            color_space,
            data: compress_image_data(&pixels)?,
            soft_mask: alpha.map(|a| compress_image_data(&a)).transpose()?,
        })
    }

    /// Build the PDF Image XObject dictionary.
    pub fn build_xobject_dict(&self) -> HashMap<String, Object> {
        let mut dict = image_dict(self.width, self.height, self.color_space);
        dict.insert("Length".to_string(), Object::Integer(self.data.len() as i64));
        dict
    }

    /// Build a soft mask (alpha channel) XObject dictionary.
    pub fn build_soft_mask_dict(&self) -> Option<HashMap<String, Object>> {
        self.soft_mask.as_ref().map(|mask_data| {
            let mut dict = image_dict(self.width, self.height, ColorSpace::DeviceGray);
            dict.insert("Length".to_string(), Object::Integer(mask_data.len() as i64));
            dict
        })
    }
}

fn image_dict(width: u32, height: u32, color_space: ColorSpace) -> HashMap<String, Object> {
    let mut dict = HashMap::new();
    dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
    dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
    dict.insert("Width".to_string(), Object::Integer(width as i64));
    dict.insert("Height".to_string(), Object::Integer(height as i64));
    dict.insert("ColorSpace".to_string(), Object::Name(color_space.pdf_name().to_string()));
    dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
    dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
    dict
}

/// Compress raw samples with Flate.
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::Image(format!("compression error: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Error::Image(format!("compression error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_color_space() {
        assert_eq!(ColorSpace::DeviceGray.components(), 1);
        assert_eq!(ColorSpace::DeviceRGB.components(), 3);
        assert_eq!(ColorSpace::DeviceRGB.pdf_name(), "DeviceRGB");
    }

    #[test]
    fn test_rgba_png_gets_soft_mask() {
        let mut img = image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        let data = ImageData::from_png(&png_bytes(image::DynamicImage::ImageRgba8(img))).unwrap();

        assert_eq!((data.width, data.height), (4, 3));
        assert_eq!(data.color_space, ColorSpace::DeviceRGB);
        assert!(data.soft_mask.is_some());

        let dict = data.build_xobject_dict();
        assert_eq!(dict.get("Width"), Some(&Object::Integer(4)));
        assert_eq!(dict.get("Filter"), Some(&Object::Name("FlateDecode".into())));
        assert!(!dict.contains_key("DecodeParms"));

        let mask = data.build_soft_mask_dict().unwrap();
        assert_eq!(mask.get("ColorSpace"), Some(&Object::Name("DeviceGray".into())));
    }

    #[test]
    fn test_opaque_png_has_no_soft_mask() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        let data = ImageData::from_png(&png_bytes(image::DynamicImage::ImageRgba8(img))).unwrap();
        assert!(data.soft_mask.is_none());
        assert!(data.build_soft_mask_dict().is_none());
    }

    #[test]
    fn test_samples_decompress_to_raw_pixels() {
        use std::io::Read;

        let img = image::GrayImage::from_pixel(3, 2, image::Luma([7]));
        let data = ImageData::from_png(&png_bytes(image::DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(data.color_space, ColorSpace::DeviceGray);

        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(&data.data[..])
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw, vec![7u8; 6]);
    }

    #[test]
    fn test_rejects_non_png() {
        let err = ImageData::from_png(b"GIF89a....").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}

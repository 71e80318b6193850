//! Configuration for report rendering.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use slide_report::config::{ExportTier, ReportConfig};
//!
//! let config = ReportConfig::from_json_str(r#"{"tier": "chartOnly", "branding": "Acme"}"#).unwrap();
//! assert_eq!(config.tier, ExportTier::ChartOnly);
//! assert_eq!(config.margin, 15.0);
//! ```

use crate::error::{Error, Result};
use crate::report::PageGeometry;
use crate::writer::PdfWriterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// How much of each unit goes into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportTier {
    /// Tables, chart and join code
    #[default]
    Full,
    /// Chart and a short info line; no tables
    ChartOnly,
}

impl FromStr for ExportTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(ExportTier::Full),
            "chartonly" | "chart-only" | "chart_only" => Ok(ExportTier::ChartOnly),
            other => Err(Error::Config(format!("unknown export tier: {}", other))),
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Page width (mm)
    pub page_width: f64,
    /// Page height (mm)
    pub page_height: f64,
    /// Margin on every side (mm)
    pub margin: f64,
    /// Export tier
    pub tier: ExportTier,
    /// Name printed in the footer
    pub branding: String,
    /// Origin of join links encoded in QR codes
    pub join_origin: String,
    /// Compress content streams
    pub compress: bool,
    /// Document title stored in the PDF metadata
    pub title: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportConfig {
    /// Create a configuration with the defaults: A4, 15 mm margin, full tier.
    pub fn new() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            tier: ExportTier::Full,
            branding: "Inavora".to_string(),
            join_origin: "https://inavora.com".to_string(),
            compress: false,
            title: None,
        }
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the export tier.
    pub fn with_tier(mut self, tier: ExportTier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the footer branding.
    pub fn with_branding(mut self, branding: impl Into<String>) -> Self {
        self.branding = branding.into();
        self
    }

    /// Set the origin used for join links.
    pub fn with_join_origin(mut self, origin: impl Into<String>) -> Self {
        self.join_origin = origin.into();
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the document metadata title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set page size and margin (mm).
    pub fn with_page(mut self, width: f64, height: f64, margin: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self.margin = margin;
        self
    }

    /// Width between the side margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Page geometry used by the layout code.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.page_width,
            height: self.page_height,
            margin: self.margin,
        }
    }

    /// Reject geometry that leaves nothing to draw on.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.page_width, self.page_height, self.margin]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(Error::Config(format!(
                "page size must be positive, got {}x{}",
                self.page_width, self.page_height
            )));
        }
        if self.margin < 0.0 {
            return Err(Error::Config(format!("margin must not be negative, got {}", self.margin)));
        }
        if self.content_width() <= 0.0 || self.page_height - 2.0 * self.margin <= 0.0 {
            return Err(Error::Config(format!(
                "margin {} leaves no content area on a {}x{} page",
                self.margin, self.page_width, self.page_height
            )));
        }
        Ok(())
    }

    /// Settings for the PDF writer.
    pub fn pdf_writer_config(&self, title: &str) -> PdfWriterConfig {
        let config = PdfWriterConfig::default()
            .with_title(self.title.clone().unwrap_or_else(|| title.to_string()))
            .with_subject("Presentation results")
            .with_compress(self.compress);
        if self.branding.is_empty() {
            config
        } else {
            config.with_author(self.branding.clone())
        }
    }
}

//! Error types for report generation.
//!
//! Only a handful of these are fatal to a composition: building the drawing
//! surface and serializing or saving the final document. Everything else is
//! caught, logged and replaced with a fallback by the composer.

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while composing or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input or configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Barcode / QR code generation error
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// Font lookup or metrics error
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input data that cannot be rendered
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Drawing surface failure (page index out of range, serialization)
    #[error("Surface error: {0}")]
    Surface(String),
}

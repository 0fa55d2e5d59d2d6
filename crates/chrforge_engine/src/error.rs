//! Unified error types for chrforge_engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Project File Errors ===
    #[error("File too short to be valid")]
    FileTooShort,

    #[error("Invalid file ID or magic number mismatch")]
    IdMismatch,

    #[error("File is from a newer version ({version}) of the editor")]
    UnsupportedVersion { version: u8 },

    #[error("Data out of bounds at offset {offset}")]
    OutOfBounds { offset: usize },

    // === CHR Conversion Errors ===
    #[error("Image size {width}x{height} is not a multiple of the tile edge")]
    ImageDimensions { width: u32, height: u32 },

    #[error("Unsupported image bit depth: {bits}")]
    UnsupportedBitDepth { bits: u8 },

    #[error("Invalid PNG data: {message}")]
    InvalidPng { message: String },

    // === External Errors ===
    #[error("PNG decoding error: {0}")]
    PngDecoding(#[from] png::DecodingError),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create an error for malformed PNG payloads
    pub fn invalid_png(msg: impl Into<String>) -> Self {
        Self::InvalidPng { message: msg.into() }
    }

    pub fn out_of_bounds(offset: usize) -> Self {
        Self::OutOfBounds { offset }
    }
}

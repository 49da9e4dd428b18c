//! Error types for easel_raster

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading fonts or writing images
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("failed to read font {path}: {source}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font data")]
    InvalidFontData,

    #[error("font size must be positive and finite, got {0}")]
    InvalidFontSize(f32),

    #[error("no usable system font found")]
    NoSystemFont,

    #[error("text surface {width}x{height} exceeds the {limit} pixel limit")]
    SurfaceTooLarge { width: f32, height: f32, limit: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;

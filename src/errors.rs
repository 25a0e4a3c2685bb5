//! Error types for raster access and sampling

use std::fmt;
use std::io;

/// Errors raised while reading, sampling or writing rasters
#[derive(Debug)]
pub enum RasterError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Sample format / bit depth combination we cannot decode
    UnsupportedSampleFormat { format: u16, bits: u16 },
    /// Image dimensions not found
    MissingDimensions,
    /// The dataset could not be opened
    OpenFailure { path: String, reason: String },
    /// Writing band data failed
    WriteFailure(String),
    /// A buffer or raster size does not match the dataset
    SizeMismatch { what: &'static str, expected: usize, actual: usize },
    /// Pixel indices outside the raster
    PixelOutOfRange { px: i64, py: i64, width: usize, height: usize },
    /// Band index not present in the dataset (bands are 1-based)
    BandNotFound(usize),
    /// No usable affine geotransform
    MissingGeoTransform,
    /// Invalid configuration
    ConfigError(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::IoError(e) => write!(f, "I/O error: {}", e),
            RasterError::InvalidHeader => write!(f, "Invalid TIFF header"),
            RasterError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            RasterError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            RasterError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            RasterError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            RasterError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            RasterError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            RasterError::UnsupportedSampleFormat { format, bits } => {
                write!(f, "Unsupported sample format {} with {} bits per sample", format, bits)
            },
            RasterError::MissingDimensions => write!(f, "Image dimensions not found"),
            RasterError::OpenFailure { path, reason } => write!(f, "Unable to open {}: {}", path, reason),
            RasterError::WriteFailure(msg) => write!(f, "Error when updating raster band: {}", msg),
            RasterError::SizeMismatch { what, expected, actual } => {
                write!(f, "{} size mismatch: expected {}, got {}", what, expected, actual)
            },
            RasterError::PixelOutOfRange { px, py, width, height } => {
                write!(f, "Pixel ({}, {}) outside raster of {}x{}", px, py, width, height)
            },
            RasterError::BandNotFound(index) => write!(f, "Raster band {} not found", index),
            RasterError::MissingGeoTransform => write!(f, "Dataset has no usable geotransform"),
            RasterError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            RasterError::GenericError(msg) => write!(f, "Raster error: {}", msg),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RasterError {
    fn from(error: io::Error) -> Self {
        RasterError::IoError(error)
    }
}

impl From<String> for RasterError {
    fn from(msg: String) -> Self {
        RasterError::GenericError(msg)
    }
}

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;

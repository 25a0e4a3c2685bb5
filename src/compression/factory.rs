//! Factory for creating compression handlers

use crate::errors::{RasterError, RasterResult};
use crate::tiff::constants::compression;
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Handler for a TIFF compression code
    pub fn create_handler(code: u16) -> RasterResult<Box<dyn CompressionHandler>> {
        match code {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::DEFLATE | compression::DEFLATE_OLD => Ok(Box::new(AdobeDeflateHandler::new())),
            compression::ZSTD => Ok(Box::new(ZstdHandler::new())),
            _ => Err(RasterError::UnsupportedCompression(code as u64))
        }
    }

    /// Handler for a configuration name such as "deflate"
    pub fn handler_by_name(name: &str) -> RasterResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler::new())),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            _ => Err(RasterError::ConfigError(format!("Unknown compression type: {}", name)))
        }
    }
}

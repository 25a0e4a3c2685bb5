//! Compression handler trait definition

use log::warn;

use crate::errors::{RasterError, RasterResult};

/// Strategy trait for handling different compression methods
pub trait CompressionHandler: Send + Sync {
    /// Decompress a strip or tile payload
    fn decompress(&self, data: &[u8]) -> RasterResult<Vec<u8>>;

    /// Compress a strip payload
    fn compress(&self, data: &[u8]) -> RasterResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the TIFF compression code
    fn code(&self) -> u16;

    /// Decompress and check the result holds `expected_len` bytes
    ///
    /// A short payload is an error; trailing bytes past `expected_len` are
    /// dropped with a warning.
    fn decompress_exact(&self, data: &[u8], expected_len: usize) -> RasterResult<Vec<u8>> {
        let mut decoded = self.decompress(data)?;
        if decoded.len() < expected_len {
            return Err(RasterError::GenericError(format!(
                "{} payload decoded to {} bytes, expected {}", self.name(), decoded.len(), expected_len)));
        }
        if decoded.len() > expected_len {
            warn!("{} payload decoded to {} bytes, expected {}", self.name(), decoded.len(), expected_len);
            decoded.truncate(expected_len);
        }
        Ok(decoded)
    }
}

//! Raster dataset abstraction
//!
//! The sampler only needs a handful of capabilities from a dataset: its
//! geotransform, its size and access to its bands. `GeoTiffDataset` backs
//! them with a file on disk, `MemDataset` with plain vectors.

mod geotiff;
mod memory;

pub use geotiff::{GeoTiffBand, GeoTiffDataset, write_geotiff};
pub use memory::{MemBand, MemDataset};

use crate::errors::RasterResult;

/// One band of a raster dataset
pub trait RasterBand {
    /// No-data sentinel, `None` when the band declares none
    fn no_data_value(&self) -> Option<f64>;

    /// `(width, height)` in pixels
    fn size(&self) -> (usize, usize);

    /// Reads a single cell
    fn read_pixel(&mut self, px: usize, py: usize) -> RasterResult<f32>;

    /// Reads the whole band, row-major
    fn read_band(&mut self) -> RasterResult<Vec<f32>>;

    /// Replaces the whole band with `buffer` (`width * height` values)
    fn write(&mut self, buffer: &[f32], width: usize, height: usize) -> RasterResult<()>;
}

/// A georeferenced raster dataset
pub trait RasterDataset {
    /// `[originX, pixelWidth, rotX, originY, rotY, pixelHeight]`
    fn geo_transform(&self) -> RasterResult<[f64; 6]>;

    /// `(width, height)` in pixels
    fn raster_size(&self) -> (usize, usize);

    fn raster_count(&self) -> usize;

    /// Band by 1-based index
    fn rasterband(&mut self, index: usize) -> RasterResult<&mut dyn RasterBand>;
}

/// Opens a GeoTIFF dataset
pub fn open(path: &str) -> RasterResult<GeoTiffDataset> {
    GeoTiffDataset::open(path)
}

/// Checks a buffer against the size a band expects
pub(crate) fn check_buffer(buffer: &[f32], width: usize, height: usize,
                           expected: (usize, usize)) -> RasterResult<()> {
    use crate::errors::RasterError;

    if (width, height) != expected {
        return Err(RasterError::SizeMismatch {
            what: "band dimensions",
            expected: expected.0 * expected.1,
            actual: width * height,
        });
    }
    if buffer.len() != width * height {
        return Err(RasterError::SizeMismatch {
            what: "band buffer",
            expected: width * height,
            actual: buffer.len(),
        });
    }
    Ok(())
}

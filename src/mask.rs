//! Coverage masks
//!
//! A mask holds one value per cell, row-major; zero marks a cell as not
//! covered. Masks are usually derived from another raster of the same
//! size, with every cell that has data counting as covered.

use log::info;

use crate::dataset::{GeoTiffDataset, RasterDataset};
use crate::errors::{RasterError, RasterResult};
use crate::sampler::sanitize;

/// 1.0 where `data` holds a value, 0.0 where it holds `no_data` or NaN
pub fn coverage_from_band(data: &[f32], no_data: Option<f64>) -> Vec<f32> {
    data.iter()
        .map(|value| if sanitize(*value, no_data).is_nan() { 0.0 } else { 1.0 })
        .collect()
}

/// Loads a coverage mask from a raster that must be `width` x `height`
pub fn load_mask(path: &str, width: usize, height: usize) -> RasterResult<Vec<f32>> {
    let mut dataset = GeoTiffDataset::open(path)?;

    let size = dataset.raster_size();
    if size != (width, height) {
        return Err(RasterError::SizeMismatch {
            what: "mask raster",
            expected: width * height,
            actual: size.0 * size.1,
        });
    }

    let band = dataset.rasterband(1)?;
    let no_data = band.no_data_value();
    let mask = coverage_from_band(&band.read_band()?, no_data);

    info!("Mask {}: {} of {} cells covered", path, covered_cells(&mask), mask.len());
    Ok(mask)
}

/// Number of covered cells
pub fn covered_cells(mask: &[f32]) -> usize {
    mask.iter().filter(|m| **m != 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_from_band() {
        let mask = coverage_from_band(&[1.0, -9999.0, 0.0, f32::NAN], Some(-9999.0));
        assert_eq!(mask, vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(covered_cells(&mask), 2);
    }

    #[test]
    fn test_coverage_without_no_data() {
        let mask = coverage_from_band(&[-9999.0, 3.0], None);
        assert_eq!(mask, vec![1.0, 1.0]);
    }
}

//! In-memory raster dataset

use log::debug;

use crate::errors::{RasterError, RasterResult};
use super::{check_buffer, RasterBand, RasterDataset};

/// Single band held in memory
#[derive(Debug, Clone)]
pub struct MemBand {
    width: usize,
    height: usize,
    no_data: Option<f64>,
    data: Vec<f32>,
    fail_writes: bool,
}

impl RasterBand for MemBand {
    fn no_data_value(&self) -> Option<f64> {
        self.no_data
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn read_pixel(&mut self, px: usize, py: usize) -> RasterResult<f32> {
        if px >= self.width || py >= self.height {
            return Err(RasterError::PixelOutOfRange {
                px: px as i64, py: py as i64, width: self.width, height: self.height,
            });
        }
        Ok(self.data[px + py * self.width])
    }

    fn read_band(&mut self) -> RasterResult<Vec<f32>> {
        Ok(self.data.clone())
    }

    fn write(&mut self, buffer: &[f32], width: usize, height: usize) -> RasterResult<()> {
        if self.fail_writes {
            return Err(RasterError::GenericError("band is read-only".to_string()));
        }
        check_buffer(buffer, width, height, (self.width, self.height))?;

        debug!("Writing {} values to in-memory band", buffer.len());
        self.data.copy_from_slice(buffer);
        Ok(())
    }
}

/// Single-band dataset held in memory
#[derive(Debug, Clone)]
pub struct MemDataset {
    geotransform: Option<[f64; 6]>,
    band: MemBand,
}

impl MemDataset {
    /// A zero-filled `width` x `height` dataset
    pub fn new(width: usize, height: usize, geotransform: [f64; 6]) -> Self {
        MemDataset {
            geotransform: Some(geotransform),
            band: MemBand {
                width,
                height,
                no_data: None,
                data: vec![0.0; width * height],
                fail_writes: false,
            },
        }
    }

    /// A dataset that reports no geotransform
    pub fn without_geotransform(width: usize, height: usize) -> Self {
        let mut dataset = Self::new(width, height, [0.0; 6]);
        dataset.geotransform = None;
        dataset
    }

    pub fn with_no_data(mut self, no_data: f64) -> Self {
        self.band.no_data = Some(no_data);
        self
    }

    /// Replaces the band values; `data` must hold `width * height` values
    pub fn with_data(mut self, data: Vec<f32>) -> RasterResult<Self> {
        let (width, height) = (self.band.width, self.band.height);
        check_buffer(&data, width, height, (width, height))?;
        self.band.data = data;
        Ok(self)
    }

    /// Makes every subsequent band write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.band.fail_writes = fail;
    }

    /// Current band values
    pub fn data(&self) -> &[f32] {
        &self.band.data
    }
}

impl RasterDataset for MemDataset {
    fn geo_transform(&self) -> RasterResult<[f64; 6]> {
        self.geotransform.ok_or(RasterError::MissingGeoTransform)
    }

    fn raster_size(&self) -> (usize, usize) {
        (self.band.width, self.band.height)
    }

    fn raster_count(&self) -> usize {
        1
    }

    fn rasterband(&mut self, index: usize) -> RasterResult<&mut dyn RasterBand> {
        match index {
            1 => Ok(&mut self.band),
            _ => Err(RasterError::BandNotFound(index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_access_is_one_based() {
        let mut dataset = MemDataset::new(2, 2, [0.0, 1.0, 0.0, 2.0, 0.0, -1.0]);
        assert!(dataset.rasterband(1).is_ok());
        assert!(matches!(dataset.rasterband(0), Err(RasterError::BandNotFound(0))));
        assert!(matches!(dataset.rasterband(2), Err(RasterError::BandNotFound(2))));
    }

    #[test]
    fn test_write_validates_size() {
        let mut dataset = MemDataset::new(2, 2, [0.0, 1.0, 0.0, 2.0, 0.0, -1.0]);
        let band = dataset.rasterband(1).unwrap();

        assert!(band.write(&[1.0, 2.0, 3.0], 3, 1).is_err());
        assert!(band.write(&[1.0, 2.0, 3.0], 2, 2).is_err());
        band.write(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(band.read_pixel(1, 1).unwrap(), 4.0);
        assert!(band.read_pixel(2, 0).is_err());
    }

    #[test]
    fn test_injected_write_failure() {
        let mut dataset = MemDataset::new(1, 1, [0.0, 1.0, 0.0, 1.0, 0.0, -1.0]);
        dataset.fail_writes(true);
        assert!(dataset.rasterband(1).unwrap().write(&[1.0], 1, 1).is_err());
    }
}

//! Coordinate-based raster sampling
//!
//! `RasterSampler` owns a single-band dataset and answers "what is the
//! value at world position (x, y)?" for a mesh generator. Values come from
//! an in-memory buffer when one has been set, otherwise straight from the
//! band. Cells equal to the band's no-data value, and cells whose mask entry
//! is zero, read as NaN.

use log::{debug, info, warn};

use crate::config::{SamplerOptions, WindowAggregate};
use crate::coordinate::{GeoTransform, PixelWindow};
use crate::dataset::{GeoTiffDataset, RasterDataset};
use crate::errors::{RasterError, RasterResult};

/// Samples a single-band raster by world coordinates
pub struct RasterSampler<D: RasterDataset> {
    dataset: D,
    geotransform: GeoTransform,
    width: usize,
    height: usize,
    no_data: Option<f64>,
    mask: Option<Vec<f32>>,
    data: Option<Vec<f32>>,
    options: SamplerOptions,
}

impl RasterSampler<GeoTiffDataset> {
    /// Opens a GeoTIFF and wraps it in a sampler
    pub fn open(path: &str) -> RasterResult<Self> {
        RasterSampler::new(GeoTiffDataset::open(path)?)
    }
}

impl<D: RasterDataset> RasterSampler<D> {
    /// Wraps `dataset`, reading its geotransform and band 1 no-data value
    pub fn new(dataset: D) -> RasterResult<Self> {
        Self::with_options(dataset, SamplerOptions::default())
    }

    pub fn with_options(mut dataset: D, options: SamplerOptions) -> RasterResult<Self> {
        let (geotransform, no_data) = Self::read_dataset_info(&mut dataset)?;
        let (width, height) = dataset.raster_size();
        info!("Sampler over {}x{} raster, geotransform {}, no-data {:?}", width, height, geotransform, no_data);

        Ok(RasterSampler {
            dataset,
            geotransform,
            width,
            height,
            no_data,
            mask: None,
            data: None,
            options,
        })
    }

    fn read_dataset_info(dataset: &mut D) -> RasterResult<(GeoTransform, Option<f64>)> {
        let geotransform = GeoTransform::new(dataset.geo_transform()?)?;
        let no_data = dataset.rasterband(1)?.no_data_value();
        Ok((geotransform, no_data))
    }

    /// Replaces the dataset and re-reads its geotransform and no-data value
    ///
    /// A mask or buffer whose size no longer matches the raster is dropped.
    /// Returns the previous dataset.
    pub fn set_dataset(&mut self, mut dataset: D) -> RasterResult<D> {
        let (geotransform, no_data) = Self::read_dataset_info(&mut dataset)?;
        let (width, height) = dataset.raster_size();
        let cells = width * height;

        if self.mask.as_ref().map(|m| m.len() != cells).unwrap_or(false) {
            warn!("Dropping mask: raster size changed to {}x{}", width, height);
            self.mask = None;
        }
        if self.data.as_ref().map(|d| d.len() != cells).unwrap_or(false) {
            warn!("Dropping band buffer: raster size changed to {}x{}", width, height);
            self.data = None;
        }

        self.geotransform = geotransform;
        self.no_data = no_data;
        self.width = width;
        self.height = height;
        Ok(std::mem::replace(&mut self.dataset, dataset))
    }

    /// Installs a coverage mask, one value per cell; 0 means not covered
    pub fn set_mask(&mut self, mask: Vec<f32>) -> RasterResult<()> {
        let cells = self.width * self.height;
        if mask.len() != cells {
            return Err(RasterError::SizeMismatch { what: "mask", expected: cells, actual: mask.len() });
        }

        debug!("Installing mask with {} covered cells", mask.iter().filter(|m| **m != 0.0).count());
        self.mask = Some(mask);
        Ok(())
    }

    pub fn clear_mask(&mut self) {
        self.mask = None;
    }

    /// Writes `buffer` to band 1 and keeps it for subsequent lookups
    ///
    /// The previous buffer is only replaced once the write succeeded.
    pub fn set_band(&mut self, buffer: Vec<f32>, width: usize, height: usize) -> RasterResult<()> {
        if (width, height) != (self.width, self.height) {
            return Err(RasterError::SizeMismatch {
                what: "band dimensions",
                expected: self.width * self.height,
                actual: width * height,
            });
        }
        if buffer.len() != width * height {
            return Err(RasterError::SizeMismatch { what: "band buffer", expected: width * height, actual: buffer.len() });
        }

        self.dataset.rasterband(1)?
            .write(&buffer, width, height)
            .map_err(|e| RasterError::WriteFailure(e.to_string()))?;

        info!("Band overwritten with {}x{} values", width, height);
        self.data = Some(buffer);
        Ok(())
    }

    /// Reads the whole band into the lookup buffer
    pub fn load_band(&mut self) -> RasterResult<()> {
        if self.data.is_none() {
            let values = self.dataset.rasterband(1)?.read_band()?;
            let cells = self.width * self.height;
            if values.len() != cells {
                return Err(RasterError::SizeMismatch { what: "band buffer", expected: cells, actual: values.len() });
            }
            self.data = Some(values);
        }
        Ok(())
    }

    /// World to pixel indices
    ///
    /// Indices are truncated toward zero. An index exactly one past the last
    /// row or column, or exactly -1, is pulled back onto the raster (unless
    /// edge clamping is disabled); anything further out is returned as is.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let (px, py) = self.geotransform.world_to_pixel_raw(x, y);

        if !self.options.edge_clamp {
            return (px, py);
        }

        (clamp_edge(px, self.width), clamp_edge(py, self.height))
    }

    /// Value at world position (x, y); NaN for no-data or masked cells
    pub fn lookup(&mut self, x: f64, y: f64) -> RasterResult<f64> {
        let (px, py) = self.world_to_pixel(x, y);
        self.pixel_lookup(px, py)
    }

    /// Value of cell (px, py); NaN for no-data or masked cells
    pub fn pixel_lookup(&mut self, px: i64, py: i64) -> RasterResult<f64> {
        let index = self.index_of(px, py)?;

        if self.is_masked(index) {
            return Ok(f64::NAN);
        }

        let raw = match &self.data {
            Some(data) => data[index],
            None => self.dataset.rasterband(1)?.read_pixel(px as usize, py as usize)?,
        };

        Ok(sanitize(raw, self.no_data))
    }

    /// Like `lookup`, but a no-data cell takes the mean of its valid
    /// 8-neighbours (NaN when none is valid)
    ///
    /// Masked cells stay NaN.
    pub fn lookup_with_fallback(&mut self, x: f64, y: f64) -> RasterResult<f64> {
        let (px, py) = self.world_to_pixel(x, y);
        let value = self.pixel_lookup(px, py)?;
        if !value.is_nan() || self.is_masked(self.index_of(px, py)?) {
            return Ok(value);
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for (dx, dy) in NEIGHBOURS {
            let (nx, ny) = (px + dx, py + dy);
            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }

            let neighbour = self.pixel_lookup(nx, ny)?;
            if !neighbour.is_nan() {
                sum += neighbour;
                count += 1;
            }
        }

        debug!("Cell ({}, {}) has no value, {} valid neighbours", px, py, count);
        Ok(if count == 0 { f64::NAN } else { sum / count as f64 })
    }

    /// Mean of the valid cells of `window` clipped to the raster, NaN if none
    pub fn window_mean(&mut self, window: &PixelWindow) -> RasterResult<f64> {
        let values = self.window_values(window)?;
        if values.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Most frequent valid value of `window` clipped to the raster
    ///
    /// Ties go to the smallest value; NaN when the window has no valid cell.
    pub fn window_mode(&mut self, window: &PixelWindow) -> RasterResult<f64> {
        let mut values = self.window_values(window)?;
        values.sort_by(|a, b| a.total_cmp(b));

        let mut best = f64::NAN;
        let mut best_count = 0usize;
        let mut start = 0;
        while start < values.len() {
            let run = values[start..].iter().take_while(|v| **v == values[start]).count();
            if run > best_count {
                best = values[start];
                best_count = run;
            }
            start += run;
        }
        Ok(best)
    }

    /// Window statistic selected by the sampler options
    pub fn window_aggregate(&mut self, window: &PixelWindow) -> RasterResult<f64> {
        match self.options.aggregate {
            WindowAggregate::Mean => self.window_mean(window),
            WindowAggregate::Mode => self.window_mode(window),
        }
    }

    fn window_values(&mut self, window: &PixelWindow) -> RasterResult<Vec<f64>> {
        let clipped = match window.clip(self.width, self.height) {
            Some(clipped) => clipped,
            None => return Ok(Vec::new()),
        };

        self.load_band()?;

        let mut values = Vec::with_capacity((clipped.width * clipped.height) as usize);
        for py in clipped.y..clipped.end_y() {
            for px in clipped.x..clipped.end_x() {
                let value = self.pixel_lookup(px, py)?;
                if !value.is_nan() {
                    values.push(value);
                }
            }
        }
        debug!("Window {:?} has {} valid cells", clipped, values.len());
        Ok(values)
    }

    fn is_masked(&self, index: usize) -> bool {
        self.mask.as_ref().map(|mask| mask[index] == 0.0).unwrap_or(false)
    }

    fn index_of(&self, px: i64, py: i64) -> RasterResult<usize> {
        if px < 0 || py < 0 || px >= self.width as i64 || py >= self.height as i64 {
            return Err(RasterError::PixelOutOfRange { px, py, width: self.width, height: self.height });
        }
        Ok(px as usize + py as usize * self.width)
    }

    pub fn geotransform(&self) -> &GeoTransform {
        &self.geotransform
    }

    pub fn raster_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn no_data_value(&self) -> Option<f64> {
        self.no_data
    }

    pub fn options(&self) -> SamplerOptions {
        self.options
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut D {
        &mut self.dataset
    }

    /// Releases the sampler, handing back the dataset
    pub fn into_dataset(self) -> D {
        self.dataset
    }
}

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Pulls an index that is exactly one step off the raster back onto it
fn clamp_edge(index: i64, dimension: usize) -> i64 {
    let dimension = dimension as i64;
    if index == dimension {
        dimension - 1
    } else if index == -1 {
        0
    } else {
        index
    }
}

/// Raw cell value as f64, or NaN when it equals the no-data value
///
/// The comparison is exact in f64; a no-data value that f32 cannot hold
/// never matches a stored sample.
pub fn sanitize(raw: f32, no_data: Option<f64>) -> f64 {
    let value = raw as f64;
    match no_data {
        Some(nd) if value == nd => f64::NAN,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemDataset;

    const UNIT_GT: [f64; 6] = [0.0, 1.0, 0.0, 10.0, 0.0, -1.0];

    fn sampler(width: usize, height: usize) -> RasterSampler<MemDataset> {
        let data: Vec<f32> = (0..width * height).map(|v| v as f32).collect();
        let dataset = MemDataset::new(width, height, UNIT_GT)
            .with_no_data(-9999.0)
            .with_data(data)
            .unwrap();
        RasterSampler::new(dataset).unwrap()
    }

    #[test]
    fn test_world_to_pixel_example() {
        assert_eq!(sampler(10, 10).world_to_pixel(4.5, 5.5), (4, 4));
    }

    #[test]
    fn test_points_inside_extent_map_inside_raster() {
        let s = sampler(10, 10);
        for i in 0..100 {
            let x = (i % 10) as f64 + 0.25;
            let y = 10.0 - (i / 10) as f64 - 0.75;
            let (px, py) = s.world_to_pixel(x, y);
            assert!((0..10).contains(&px) && (0..10).contains(&py), "({}, {}) -> ({}, {})", x, y, px, py);
        }
    }

    #[test]
    fn test_edge_indices_are_clamped() {
        let s = sampler(10, 10);
        // raw px 10 -> 9, raw py 10 -> 9
        assert_eq!(s.world_to_pixel(10.0, 0.0), (9, 9));
        // raw -1 -> 0
        assert_eq!(s.world_to_pixel(-1.5, 11.5), (0, 0));
        // further out is left alone
        assert_eq!(s.world_to_pixel(11.0, 12.5), (11, -2));
    }

    #[test]
    fn test_edge_clamp_can_be_disabled() {
        let dataset = MemDataset::new(10, 10, UNIT_GT);
        let options = SamplerOptions { edge_clamp: false, ..SamplerOptions::default() };
        let s = RasterSampler::with_options(dataset, options).unwrap();
        assert_eq!(s.world_to_pixel(10.0, 0.0), (10, 10));
    }

    #[test]
    fn test_lookup_returns_stored_value() {
        let mut s = sampler(10, 10);
        assert_eq!(s.lookup(4.5, 5.5).unwrap(), 44.0);
        assert_eq!(s.pixel_lookup(9, 9).unwrap(), 99.0);
        // one past the corner reads the corner cell
        assert_eq!(s.lookup(10.0, 0.0).unwrap(), 99.0);
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let mut s = sampler(10, 10);
        assert!(matches!(s.pixel_lookup(10, 0), Err(RasterError::PixelOutOfRange { px: 10, py: 0, .. })));
        assert!(matches!(s.lookup(25.0, 5.0), Err(RasterError::PixelOutOfRange { .. })));
    }

    #[test]
    fn test_mask_zero_gives_nan() {
        let mut s = sampler(10, 10);
        let mut buffer = vec![1.0f32; 100];
        buffer[3 + 3 * 10] = 123.45;
        s.set_band(buffer, 10, 10).unwrap();

        let mut mask = vec![1.0f32; 100];
        mask[3 + 3 * 10] = 0.0;
        s.set_mask(mask).unwrap();

        assert!(s.pixel_lookup(3, 3).unwrap().is_nan());
        assert_eq!(s.pixel_lookup(4, 3).unwrap(), 1.0);

        s.clear_mask();
        assert_eq!(s.pixel_lookup(3, 3).unwrap(), 123.45f32 as f64);
    }

    #[test]
    fn test_no_data_gives_nan_regardless_of_mask() {
        let mut s = sampler(4, 4);
        let mut buffer = vec![2.0f32; 16];
        buffer[5] = -9999.0;
        s.set_band(buffer, 4, 4).unwrap();
        s.set_mask(vec![1.0; 16]).unwrap();

        assert!(s.pixel_lookup(1, 1).unwrap().is_nan());
        assert_eq!(s.pixel_lookup(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_set_band_is_visible_to_lookups() {
        let mut s = sampler(3, 2);
        let buffer = vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5];
        s.set_band(buffer.clone(), 3, 2).unwrap();

        for (i, expected) in buffer.iter().enumerate() {
            assert_eq!(s.pixel_lookup((i % 3) as i64, (i / 3) as i64).unwrap(), *expected as f64);
        }
        assert_eq!(s.dataset().data(), buffer.as_slice());
    }

    #[test]
    fn test_set_band_rejects_wrong_size() {
        let mut s = sampler(3, 2);
        assert!(matches!(s.set_band(vec![0.0; 6], 2, 3), Err(RasterError::SizeMismatch { .. })));
        assert!(matches!(s.set_band(vec![0.0; 5], 3, 2), Err(RasterError::SizeMismatch { .. })));
    }

    #[test]
    fn test_failed_write_keeps_previous_buffer() {
        let mut s = sampler(2, 2);
        s.set_band(vec![7.0; 4], 2, 2).unwrap();
        s.dataset_mut().fail_writes(true);

        assert!(matches!(s.set_band(vec![8.0; 4], 2, 2), Err(RasterError::WriteFailure(_))));
        assert_eq!(s.pixel_lookup(0, 0).unwrap(), 7.0);
    }

    #[test]
    fn test_mask_size_is_checked() {
        let mut s = sampler(3, 3);
        assert!(matches!(s.set_mask(vec![1.0; 8]), Err(RasterError::SizeMismatch { expected: 9, actual: 8, .. })));
    }

    #[test]
    fn test_missing_no_data_never_matches() {
        let dataset = MemDataset::new(2, 1, UNIT_GT).with_data(vec![-9999.0, 0.0]).unwrap();
        let mut s = RasterSampler::new(dataset).unwrap();
        assert_eq!(s.no_data_value(), None);
        assert_eq!(s.pixel_lookup(0, 0).unwrap(), -9999.0);
    }

    #[test]
    fn test_missing_geotransform_is_rejected() {
        let result = RasterSampler::new(MemDataset::without_geotransform(2, 2));
        assert!(matches!(result, Err(RasterError::MissingGeoTransform)));
    }

    #[test]
    fn test_fallback_averages_valid_neighbours() {
        let mut s = sampler(3, 3);
        s.set_band(vec![
            1.0, 2.0, 3.0,
            4.0, -9999.0, -9999.0,
            7.0, 8.0, 9.0,
        ], 3, 3).unwrap();

        // centre cell (1, 1) sits at world (1.5, 8.5)
        assert!(s.lookup(1.5, 8.5).unwrap().is_nan());
        let value = s.lookup_with_fallback(1.5, 8.5).unwrap();
        assert!((value - 34.0 / 7.0).abs() < 1e-9);

        // valid cells are returned untouched
        assert_eq!(s.lookup_with_fallback(0.5, 9.5).unwrap(), 1.0);
    }

    #[test]
    fn test_fallback_skips_masked_cells() {
        let mut s = sampler(3, 3);
        s.set_band(vec![5.0; 9], 3, 3).unwrap();
        let mut mask = vec![1.0; 9];
        mask[4] = 0.0;
        s.set_mask(mask).unwrap();

        assert!(s.lookup_with_fallback(1.5, 8.5).unwrap().is_nan());
    }

    #[test]
    fn test_fallback_without_valid_neighbours_is_nan() {
        let dataset = MemDataset::new(2, 2, UNIT_GT).with_no_data(0.0);
        let mut s = RasterSampler::new(dataset).unwrap();
        assert!(s.lookup_with_fallback(0.5, 9.5).unwrap().is_nan());
    }

    #[test]
    fn test_window_mean_skips_invalid_cells() {
        let mut s = sampler(4, 4);
        let mut mask = vec![1.0; 16];
        mask[0] = 0.0;
        s.set_mask(mask).unwrap();

        // cells 0, 1, 4, 5 with cell 0 masked
        let mean = s.window_mean(&PixelWindow::new(-1, -1, 3, 3)).unwrap();
        assert!((mean - 10.0 / 3.0).abs() < 1e-9);
        assert!(s.window_mean(&PixelWindow::new(10, 10, 2, 2)).unwrap().is_nan());
    }

    #[test]
    fn test_window_mode_prefers_smallest_on_ties() {
        let mut s = sampler(4, 2);
        s.set_band(vec![
            3.0, 3.0, 1.0, 1.0,
            -9999.0, -9999.0, -9999.0, 2.0,
        ], 4, 2).unwrap();

        // no-data is the most frequent raw value but never counts
        assert_eq!(s.window_mode(&PixelWindow::new(0, 0, 4, 2)).unwrap(), 1.0);
        assert_eq!(s.window_mode(&PixelWindow::new(0, 0, 2, 2)).unwrap(), 3.0);
        assert_eq!(s.window_mode(&PixelWindow::new(3, 0, 5, 5)).unwrap(), 1.0);
        assert!(s.window_mode(&PixelWindow::new(0, 1, 3, 1)).unwrap().is_nan());
        assert!(s.window_mode(&PixelWindow::new(-5, -5, 2, 2)).unwrap().is_nan());
    }

    #[test]
    fn test_window_aggregate_follows_options() {
        let buffer = vec![4.0, 4.0, 1.0, 7.0];
        let dataset = MemDataset::new(2, 2, UNIT_GT).with_data(buffer).unwrap();
        let options = SamplerOptions { aggregate: WindowAggregate::Mode, ..SamplerOptions::default() };
        let mut s = RasterSampler::with_options(dataset, options).unwrap();

        let window = PixelWindow::new(0, 0, 2, 2);
        assert_eq!(s.window_aggregate(&window).unwrap(), 4.0);
        assert_eq!(s.window_mean(&window).unwrap(), 4.0);

        s.set_band(vec![2.0, 2.0, 5.0, 9.0], 2, 2).unwrap();
        assert_eq!(s.window_aggregate(&window).unwrap(), 2.0);
        assert_eq!(s.window_mean(&window).unwrap(), 4.5);
    }

    #[test]
    fn test_lookup_without_buffer_reads_band() {
        let dataset = MemDataset::new(2, 2, UNIT_GT).with_data(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut s = RasterSampler::new(dataset).unwrap();
        assert_eq!(s.pixel_lookup(1, 1).unwrap(), 4.0);
        s.load_band().unwrap();
        assert_eq!(s.pixel_lookup(0, 1).unwrap(), 3.0);
    }

    #[test]
    fn test_set_dataset_drops_mismatched_state() {
        let mut s = sampler(2, 2);
        s.set_mask(vec![1.0; 4]).unwrap();
        s.set_band(vec![5.0; 4], 2, 2).unwrap();

        let bigger = MemDataset::new(3, 3, [100.0, 2.0, 0.0, 50.0, 0.0, -2.0]).with_no_data(1.0);
        let previous = s.set_dataset(bigger).unwrap();

        assert_eq!(previous.raster_size(), (2, 2));
        assert_eq!(s.raster_size(), (3, 3));
        assert_eq!(s.no_data_value(), Some(1.0));
        assert_eq!(s.world_to_pixel(103.0, 47.0), (1, 1));
        assert_eq!(s.pixel_lookup(2, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_sanitize() {
        assert!(sanitize(-9999.0, Some(-9999.0)).is_nan());
        assert_eq!(sanitize(1.5, Some(-9999.0)), 1.5);
        assert_eq!(sanitize(1.5, None), 1.5);
    }

    #[test]
    fn test_no_data_comparison_is_exact() {
        assert_eq!(sanitize(1.0, Some(1.00000001)), 1.0);
        assert!(sanitize(f32::MIN, Some(f32::MIN as f64)).is_nan());

        let dataset = MemDataset::new(1, 1, UNIT_GT)
            .with_no_data(1.00000001)
            .with_data(vec![1.0])
            .unwrap();
        let mut s = RasterSampler::new(dataset).unwrap();
        assert_eq!(s.pixel_lookup(0, 0).unwrap(), 1.0);
    }
}

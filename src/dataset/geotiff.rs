//! GeoTIFF-backed raster dataset
//!
//! The directory and georeferencing are read when the dataset is opened;
//! band data is decoded on first access and kept in memory. Writes replace
//! the in-memory band and are persisted by `flush` or `save_as`.

use std::fs::File;
use std::io::BufReader;
use log::{debug, info, warn};

use crate::band;
use crate::config::OutputConfig;
use crate::errors::{RasterError, RasterResult};
use crate::tiff::builder::GeoTiffBuilder;
use crate::tiff::geokeys::GeoReference;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::writer::TiffWriter;
use super::{check_buffer, RasterBand, RasterDataset};

/// The single band of a `GeoTiffDataset`
pub struct GeoTiffBand {
    path: String,
    tiff_reader: TiffReader,
    ifd: IFD,
    width: usize,
    height: usize,
    no_data: Option<f64>,
    data: Option<Vec<f32>>,
    dirty: bool,
    show_progress: bool,
}

impl GeoTiffBand {
    /// Decodes the band from disk unless it is already in memory
    fn ensure_loaded(&mut self) -> RasterResult<&[f32]> {
        if self.data.is_none() {
            info!("Decoding band of {} ({}x{})", self.path, self.width, self.height);
            let file = File::open(&self.path)?;
            let mut stream = BufReader::with_capacity(1024 * 1024, file);
            let values = band::read_band(&self.tiff_reader, &mut stream, &self.ifd, self.show_progress)?;
            self.data = Some(values);
        }

        Ok(self.data.as_deref().unwrap_or(&[]))
    }

    /// Whether the band holds writes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Drop for GeoTiffBand {
    fn drop(&mut self) {
        if self.dirty {
            warn!("Discarding band changes never written back to {}", self.path);
        }
    }
}

impl RasterBand for GeoTiffBand {
    fn no_data_value(&self) -> Option<f64> {
        self.no_data
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn read_pixel(&mut self, px: usize, py: usize) -> RasterResult<f32> {
        let (width, height) = (self.width, self.height);
        if px >= width || py >= height {
            return Err(RasterError::PixelOutOfRange { px: px as i64, py: py as i64, width, height });
        }

        let data = self.ensure_loaded()?;
        Ok(data[px + py * width])
    }

    fn read_band(&mut self) -> RasterResult<Vec<f32>> {
        Ok(self.ensure_loaded()?.to_vec())
    }

    fn write(&mut self, buffer: &[f32], width: usize, height: usize) -> RasterResult<()> {
        check_buffer(buffer, width, height, (self.width, self.height))?;

        debug!("Replacing band of {} with {} values", self.path, buffer.len());
        self.data = Some(buffer.to_vec());
        self.dirty = true;
        Ok(())
    }
}

/// Single-band dataset backed by a GeoTIFF file
pub struct GeoTiffDataset {
    path: String,
    geo: GeoReference,
    band: GeoTiffBand,
    is_big_tiff: bool,
}

impl GeoTiffDataset {
    /// Opens `path`; any problem is reported as `OpenFailure`
    pub fn open(path: &str) -> RasterResult<Self> {
        Self::open_inner(path).map_err(|e| match e {
            RasterError::OpenFailure { .. } => e,
            other => RasterError::OpenFailure { path: path.to_string(), reason: other.to_string() },
        })
    }

    fn open_inner(path: &str) -> RasterResult<Self> {
        info!("Opening raster {}", path);
        let file = File::open(path)?;
        let mut stream = BufReader::with_capacity(1024 * 1024, file);

        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut stream)?;
        let ifd = tiff.main_ifd().cloned().ok_or(RasterError::InvalidHeader)?;

        let (width, height) = ifd.get_dimensions().ok_or(RasterError::MissingDimensions)?;
        let samples = ifd.get_samples_per_pixel();
        if samples != 1 {
            return Err(RasterError::GenericError(format!(
                "Expected a single-band raster, found {} samples per pixel", samples)));
        }

        // fail now on sample formats or codecs we cannot decode later
        band::decoder_for(&tiff_reader, &mut stream, &ifd)?;

        let geo = GeoReference::read(&tiff_reader, &mut stream, &ifd)?;
        info!("Opened {}: {}x{}, {} IFD(s), no-data {:?}", path, width, height, tiff.ifd_count(), geo.no_data);

        Ok(GeoTiffDataset {
            path: path.to_string(),
            band: GeoTiffBand {
                path: path.to_string(),
                tiff_reader,
                ifd,
                width: width as usize,
                height: height as usize,
                no_data: geo.no_data,
                data: None,
                dirty: false,
                show_progress: false,
            },
            geo,
            is_big_tiff: tiff.is_big_tiff,
        })
    }

    /// Shows a progress bar while the band is decoded
    pub fn with_progress(mut self, show: bool) -> Self {
        self.band.show_progress = show;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    pub fn geo_reference(&self) -> &GeoReference {
        &self.geo
    }

    /// Writes pending band changes back to the file the dataset was opened from
    pub fn flush(&mut self, output: &OutputConfig) -> RasterResult<()> {
        if !self.band.is_dirty() {
            debug!("No pending writes for {}", self.path);
            return Ok(());
        }

        let path = self.path.clone();
        self.save_as(&path, output)
    }

    /// Writes the dataset, including any pending band changes, to `path`
    pub fn save_as(&mut self, path: &str, output: &OutputConfig) -> RasterResult<()> {
        let (width, height) = (self.band.width, self.band.height);
        let data = self.band.ensure_loaded()?;

        write_geotiff(path, data, width, height, &self.geo, output)?;

        if path == self.path {
            self.band.dirty = false;
        }
        Ok(())
    }
}

impl RasterDataset for GeoTiffDataset {
    fn geo_transform(&self) -> RasterResult<[f64; 6]> {
        self.geo.require_geotransform()
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

/// Writes a single-band Float32 GeoTIFF
///
/// Failures are reported as `WriteFailure`.
pub fn write_geotiff(path: &str, data: &[f32], width: usize, height: usize,
                     geo: &GeoReference, output: &OutputConfig) -> RasterResult<()> {
    let result = output.compression_handler().and_then(|handler| {
        GeoTiffBuilder::new(width as u32, height as u32)
            .rows_per_strip(output.rows_per_strip)
            .compression(handler)
            .geo_reference(geo.clone())
            .software(concat!("meshraster ", env!("CARGO_PKG_VERSION")))
            .build(data)
    });

    result
        .and_then(|layout| TiffWriter::write(layout, path))
        .map_err(|e| match e {
            RasterError::WriteFailure(_) => e,
            other => RasterError::WriteFailure(format!("{}: {}", path, other)),
        })
}

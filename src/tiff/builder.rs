//! Single-band GeoTIFF construction
//!
//! `GeoTiffBuilder` turns a row-major `f32` band plus its georeferencing
//! into a `TiffLayout`: one IFD, the tag payloads that do not fit inline and
//! the compressed strips. `TiffWriter` then puts the layout on disk.

use std::collections::BTreeMap;
use log::{debug, info};

use crate::compression::{CompressionHandler, UncompressedHandler};
use crate::errors::{RasterError, RasterResult};
use crate::tiff::constants::{field_types, geo_keys, photometric, planar_config, predictor, sample_format, tags};
use crate::tiff::geokeys::{format_no_data, GeoReference};
use crate::tiff::ifd::{IFD, IFDEntry};

/// Files whose payload gets close to 4 GiB are written as BigTIFF
const BIGTIFF_THRESHOLD: u64 = u32::MAX as u64 - (16 * 1024 * 1024);

/// Everything needed to write one single-image TIFF
pub struct TiffLayout {
    pub is_big_tiff: bool,
    pub ifd: IFD,
    /// Out-of-line tag payloads keyed by tag, little-endian encoded
    pub external_data: BTreeMap<u16, Vec<u8>>,
    /// Compressed strip payloads in row order
    pub strips: Vec<Vec<u8>>,
}

/// Builder for single-band Float32 GeoTIFFs
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    rows_per_strip: u32,
    compression: Box<dyn CompressionHandler>,
    geo: GeoReference,
    software: Option<String>,
}

impl GeoTiffBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        GeoTiffBuilder {
            width,
            height,
            rows_per_strip: 64,
            compression: Box::new(UncompressedHandler),
            geo: GeoReference::default(),
            software: None,
        }
    }

    pub fn rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = rows.max(1);
        self
    }

    pub fn compression(mut self, handler: Box<dyn CompressionHandler>) -> Self {
        self.compression = handler;
        self
    }

    /// Georeferencing to embed: geotransform, GeoKeys and no-data
    pub fn geo_reference(mut self, geo: GeoReference) -> Self {
        self.geo = geo;
        self
    }

    pub fn software(mut self, name: &str) -> Self {
        self.software = Some(name.to_string());
        self
    }

    /// Builds the layout for `data`, which must hold `width * height` values
    pub fn build(&self, data: &[f32]) -> RasterResult<TiffLayout> {
        let expected = self.width as usize * self.height as usize;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch { what: "band buffer", expected, actual: data.len() });
        }
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::MissingDimensions);
        }

        let rows_per_strip = self.rows_per_strip.min(self.height);
        let row_len = self.width as usize;

        let strips = data.chunks(row_len * rows_per_strip as usize)
            .map(|chunk| {
                let raw: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
                self.compression.compress(&raw)
            })
            .collect::<RasterResult<Vec<_>>>()?;

        let payload: u64 = strips.iter().map(|s| s.len() as u64).sum();
        let is_big_tiff = payload > BIGTIFF_THRESHOLD;
        info!("Building {}x{} Float32 GeoTIFF: {} strips, {} bytes, compression {}{}",
              self.width, self.height, strips.len(), payload, self.compression.name(),
              if is_big_tiff { ", BigTIFF" } else { "" });

        let mut tags_out = TagSet::new(is_big_tiff);
        tags_out.short(tags::IMAGE_WIDTH, self.width as u64);
        tags_out.short(tags::IMAGE_LENGTH, self.height as u64);
        tags_out.shorts(tags::BITS_PER_SAMPLE, &[32]);
        tags_out.shorts(tags::COMPRESSION, &[self.compression.code()]);
        tags_out.shorts(tags::PHOTOMETRIC_INTERPRETATION, &[photometric::BLACK_IS_ZERO]);
        tags_out.shorts(tags::SAMPLES_PER_PIXEL, &[1]);
        tags_out.short(tags::ROWS_PER_STRIP, rows_per_strip as u64);
        tags_out.shorts(tags::PLANAR_CONFIGURATION, &[planar_config::CHUNKY]);
        tags_out.shorts(tags::PREDICTOR, &[predictor::NONE]);
        tags_out.shorts(tags::SAMPLE_FORMAT, &[sample_format::IEEE_FLOAT]);

        let byte_counts: Vec<u64> = strips.iter().map(|s| s.len() as u64).collect();
        tags_out.offsets(tags::STRIP_BYTE_COUNTS, &byte_counts);
        // real offsets are filled in by the writer once the layout is known
        tags_out.offsets(tags::STRIP_OFFSETS, &vec![0; strips.len()]);

        if let Some(software) = &self.software {
            tags_out.ascii(tags::SOFTWARE, software);
        }

        self.add_geo_tags(&mut tags_out)?;

        Ok(TiffLayout {
            is_big_tiff,
            ifd: tags_out.ifd,
            external_data: tags_out.external_data,
            strips,
        })
    }

    fn add_geo_tags(&self, tags_out: &mut TagSet) -> RasterResult<()> {
        let gt = self.geo.require_geotransform()?;

        if gt[2] == 0.0 && gt[4] == 0.0 {
            tags_out.doubles(tags::MODEL_PIXEL_SCALE_TAG, &[gt[1], -gt[5], 0.0]);
            tags_out.doubles(tags::MODEL_TIEPOINT_TAG, &[0.0, 0.0, 0.0, gt[0], gt[3], 0.0]);
        } else {
            tags_out.doubles(tags::MODEL_TRANSFORMATION_TAG, &[
                gt[1], gt[2], 0.0, gt[0],
                gt[4], gt[5], 0.0, gt[3],
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ]);
        }

        if self.geo.geo_key_directory.is_empty() {
            debug!("No GeoKey directory to carry over, writing a minimal one");
            tags_out.shorts(tags::GEO_KEY_DIRECTORY_TAG, &[
                1, 1, 0, 2,
                geo_keys::GT_MODEL_TYPE, 0, 1, geo_keys::MODEL_TYPE_PROJECTED,
                geo_keys::GT_RASTER_TYPE, 0, 1, geo_keys::RASTER_PIXEL_IS_AREA,
            ]);
        } else {
            tags_out.shorts(tags::GEO_KEY_DIRECTORY_TAG, &self.geo.geo_key_directory);
        }

        if !self.geo.geo_double_params.is_empty() {
            tags_out.doubles(tags::GEO_DOUBLE_PARAMS_TAG, &self.geo.geo_double_params);
        }
        if !self.geo.geo_ascii_params.is_empty() {
            tags_out.ascii(tags::GEO_ASCII_PARAMS_TAG, &self.geo.geo_ascii_params);
        }
        if let Some(no_data) = self.geo.no_data {
            tags_out.ascii(tags::GDAL_NODATA, &format_no_data(no_data));
        }

        Ok(())
    }
}

/// Accumulates IFD entries, placing each payload inline or out of line
struct TagSet {
    is_big_tiff: bool,
    ifd: IFD,
    external_data: BTreeMap<u16, Vec<u8>>,
}

impl TagSet {
    fn new(is_big_tiff: bool) -> Self {
        TagSet {
            is_big_tiff,
            ifd: IFD::new(0, 0),
            external_data: BTreeMap::new(),
        }
    }

    fn push(&mut self, tag: u16, field_type: u16, count: u64, bytes: Vec<u8>) {
        let inline_size = if self.is_big_tiff { 8 } else { 4 };
        let mut entry = IFDEntry::new(tag, field_type, count, 0);

        if bytes.len() <= inline_size {
            entry.value_bytes = [0u8; 8];
            entry.value_bytes[..bytes.len()].copy_from_slice(&bytes);
        } else {
            self.external_data.insert(tag, bytes);
        }

        self.ifd.add_entry(entry);
    }

    /// SHORT when the value fits, LONG otherwise
    fn short(&mut self, tag: u16, value: u64) {
        if value <= u16::MAX as u64 {
            self.push(tag, field_types::SHORT, 1, (value as u16).to_le_bytes().to_vec());
        } else {
            self.push(tag, field_types::LONG, 1, (value as u32).to_le_bytes().to_vec());
        }
    }

    fn shorts(&mut self, tag: u16, values: &[u16]) {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(tag, field_types::SHORT, values.len() as u64, bytes);
    }

    /// LONG offsets for TIFF, LONG8 for BigTIFF
    fn offsets(&mut self, tag: u16, values: &[u64]) {
        if self.is_big_tiff {
            let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            self.push(tag, field_types::LONG8, values.len() as u64, bytes);
        } else {
            let bytes = values.iter().flat_map(|v| (*v as u32).to_le_bytes()).collect();
            self.push(tag, field_types::LONG, values.len() as u64, bytes);
        }
    }

    fn doubles(&mut self, tag: u16, values: &[f64]) {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(tag, field_types::DOUBLE, values.len() as u64, bytes);
    }

    fn ascii(&mut self, tag: u16, text: &str) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let count = bytes.len() as u64;
        self.push(tag, field_types::ASCII, count, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> GeoReference {
        GeoReference {
            geotransform: Some([100.0, 2.0, 0.0, 200.0, 0.0, -2.0]),
            no_data: Some(-9999.0),
            ..GeoReference::default()
        }
    }

    #[test]
    fn test_build_splits_rows_into_strips() {
        let data = vec![1.0f32; 4 * 5];
        let layout = GeoTiffBuilder::new(4, 5)
            .rows_per_strip(2)
            .geo_reference(geo())
            .build(&data)
            .unwrap();

        assert!(!layout.is_big_tiff);
        assert_eq!(layout.strips.len(), 3);
        assert_eq!(layout.strips[0].len(), 2 * 4 * 4);
        assert_eq!(layout.strips[2].len(), 4 * 4);

        let offsets = layout.ifd.get_entry(tags::STRIP_OFFSETS).unwrap();
        assert_eq!(offsets.count, 3);
        assert!(layout.external_data.contains_key(&tags::STRIP_OFFSETS));
        assert!(layout.external_data.contains_key(&tags::GDAL_NODATA));
    }

    #[test]
    fn test_build_rejects_wrong_buffer_size() {
        let result = GeoTiffBuilder::new(3, 3).geo_reference(geo()).build(&[0.0; 8]);
        assert!(matches!(result, Err(RasterError::SizeMismatch { expected: 9, actual: 8, .. })));
    }

    #[test]
    fn test_build_requires_geotransform() {
        let result = GeoTiffBuilder::new(1, 1).build(&[0.0]);
        assert!(matches!(result, Err(RasterError::MissingGeoTransform)));
    }

    #[test]
    fn test_rotated_transform_uses_matrix_tag() {
        let mut geo = geo();
        geo.geotransform = Some([0.0, 1.0, 0.5, 0.0, 0.5, -1.0]);
        let layout = GeoTiffBuilder::new(1, 1).geo_reference(geo).build(&[0.0]).unwrap();

        assert!(layout.ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG));
        assert!(!layout.ifd.has_tag(tags::MODEL_TIEPOINT_TAG));
    }
}

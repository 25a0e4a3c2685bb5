//! GeoTIFF georeferencing
//!
//! Derives the affine geotransform of a GeoTIFF from its model tags and
//! collects the GeoKey directory so it can be written back unchanged.

use log::{debug, warn};

use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Georeferencing read from the GeoTIFF tags of an IFD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoReference {
    /// `[originX, pixelWidth, rotX, originY, rotY, pixelHeight]`
    pub geotransform: Option<[f64; 6]>,
    /// GeoKeyDirectoryTag values, header included
    pub geo_key_directory: Vec<u16>,
    pub geo_double_params: Vec<f64>,
    pub geo_ascii_params: String,
    /// GDAL_NODATA value
    pub no_data: Option<f64>,
}

impl GeoReference {
    /// Reads the georeferencing tags of `ifd`
    pub fn read(reader: &TiffReader, stream: &mut dyn SeekableReader, ifd: &IFD) -> RasterResult<Self> {
        let mut geo = GeoReference::default();

        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let matrix = reader.read_tag_f64s(stream, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            geo.geotransform = geotransform_from_matrix(&matrix);
        }

        if geo.geotransform.is_none()
            && ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG)
            && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            let scale = reader.read_tag_f64s(stream, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
            let tiepoint = reader.read_tag_f64s(stream, ifd, tags::MODEL_TIEPOINT_TAG)?;
            geo.geotransform = geotransform_from_tiepoint(&scale, &tiepoint);
        }

        if ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            geo.geo_key_directory = reader.read_tag_values(stream, ifd, tags::GEO_KEY_DIRECTORY_TAG)?
                .into_iter()
                .map(|v| v as u16)
                .collect();
        }

        if ifd.has_tag(tags::GEO_DOUBLE_PARAMS_TAG) {
            geo.geo_double_params = reader.read_tag_f64s(stream, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?;
        }

        if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
            geo.geo_ascii_params = reader.read_tag_ascii(stream, ifd, tags::GEO_ASCII_PARAMS_TAG)?;
        }

        if ifd.has_tag(tags::GDAL_NODATA) {
            let text = reader.read_tag_ascii(stream, ifd, tags::GDAL_NODATA)?;
            geo.no_data = parse_no_data(&text);
            if geo.no_data.is_none() {
                warn!("Ignoring unparseable GDAL_NODATA value '{}'", text);
            }
        }

        debug!("Georeference: geotransform={:?}, {} geokey values, no-data={:?}",
               geo.geotransform, geo.geo_key_directory.len(), geo.no_data);
        Ok(geo)
    }

    /// The geotransform, or `MissingGeoTransform` if none could be derived
    pub fn require_geotransform(&self) -> RasterResult<[f64; 6]> {
        self.geotransform.ok_or(RasterError::MissingGeoTransform)
    }
}

/// Geotransform from a 4x4 row-major ModelTransformation matrix
pub fn geotransform_from_matrix(matrix: &[f64]) -> Option<[f64; 6]> {
    if matrix.len() < 16 {
        warn!("ModelTransformation has {} values, expected 16", matrix.len());
        return None;
    }

    Some([matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5]])
}

/// Geotransform from ModelPixelScale and the first ModelTiepoint
///
/// The tiepoint maps raster (i, j) to world (x, y); the raster y axis points
/// down, so the y scale is negated.
pub fn geotransform_from_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<[f64; 6]> {
    if scale.len() < 2 || tiepoint.len() < 6 {
        warn!("Incomplete pixel scale ({} values) or tiepoint ({} values)", scale.len(), tiepoint.len());
        return None;
    }

    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);

    Some([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy])
}

/// Parses a GDAL_NODATA string such as "-9999" or " nan "
pub fn parse_no_data(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok()
}

/// Formats a no-data value for the GDAL_NODATA tag
pub fn format_no_data(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

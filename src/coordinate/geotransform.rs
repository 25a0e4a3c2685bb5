//! Affine geotransform
//!
//! Coefficients follow the usual six-term layout
//! `[originX, pixelWidth, rotX, originY, rotY, pixelHeight]` where
//! `pixelHeight` is normally negative (north-up rasters).

use std::fmt;

use crate::errors::{RasterError, RasterResult};
use super::bbox::BoundingBox;
use super::window::PixelWindow;

/// Six-coefficient affine transform between pixel and world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    /// Wraps the coefficients, rejecting a zero or non-finite pixel size
    pub fn new(coefficients: [f64; 6]) -> RasterResult<Self> {
        let (pixel_width, pixel_height) = (coefficients[1], coefficients[5]);
        let usable = |v: f64| v.is_finite() && v != 0.0;

        if !usable(pixel_width) || !usable(pixel_height) || !coefficients.iter().all(|c| c.is_finite()) {
            return Err(RasterError::MissingGeoTransform);
        }

        Ok(GeoTransform(coefficients))
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.0[0], self.0[3])
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.0[1], self.0[5])
    }

    /// World to pixel, truncating toward zero; rotation terms are ignored
    ///
    /// No clamping happens here; the returned indices may be negative or
    /// beyond the raster.
    pub fn world_to_pixel_raw(&self, x: f64, y: f64) -> (i64, i64) {
        let px = ((x - self.0[0]) / self.0[1]) as i64;
        let py = ((y - self.0[3]) / self.0[5]) as i64;
        (px, py)
    }

    /// World coordinates of the top-left corner of cell (px, py)
    pub fn pixel_to_world(&self, px: f64, py: f64) -> (f64, f64) {
        let gt = &self.0;
        (gt[0] + px * gt[1] + py * gt[2],
         gt[3] + px * gt[4] + py * gt[5])
    }

    /// World extent covered by a `width` x `height` raster
    pub fn extent(&self, width: usize, height: usize) -> BoundingBox {
        let corners = [
            self.pixel_to_world(0.0, 0.0),
            self.pixel_to_world(width as f64, 0.0),
            self.pixel_to_world(0.0, height as f64),
            self.pixel_to_world(width as f64, height as f64),
        ];

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Pixel window covering `bbox`
    ///
    /// Start indices are truncated toward zero, end indices get one extra
    /// cell. When the window touches the raster, negative starts are moved
    /// to 0 and sizes are trimmed to the raster edge; otherwise the raw
    /// window is returned.
    pub fn bbox_to_pixel_window(&self, bbox: &BoundingBox, width: usize, height: usize) -> PixelWindow {
        let (origin_x, origin_y) = self.origin();
        let (pixel_width, pixel_height) = self.pixel_size();

        // `as i64` saturates for far-out coordinates, so the arithmetic
        // below saturates too
        let mut x1 = ((bbox.min_x - origin_x) / pixel_width) as i64;
        let x2 = (((bbox.max_x - origin_x) / pixel_width) as i64).saturating_add(1);
        let mut y1 = ((bbox.max_y - origin_y) / pixel_height) as i64;
        let y2 = (((bbox.min_y - origin_y) / pixel_height) as i64).saturating_add(1);

        let mut xsize = x2.saturating_sub(x1);
        let mut ysize = y2.saturating_sub(y1);
        let (width, height) = (width as i64, height as i64);

        if x1 < width && y1 < height {
            x1 = x1.max(0);
            y1 = y1.max(0);

            if x1.saturating_add(xsize) > width {
                xsize = width - x1;
            }
            if y1.saturating_add(ysize) > height {
                ysize = height - y1;
            }
        }

        PixelWindow::new(x1, y1, xsize, ysize)
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gt = &self.0;
        write!(f, "[{}, {}, {}, {}, {}, {}]", gt[0], gt[1], gt[2], gt[3], gt[4], gt[5])
    }
}

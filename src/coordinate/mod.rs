//! Coordinate handling
//!
//! World/pixel conversion through an affine geotransform, plus the
//! rectangles used to address parts of a raster.

mod bbox;
mod geotransform;
mod window;

pub use self::bbox::BoundingBox;
pub use self::geotransform::GeoTransform;
pub use self::window::PixelWindow;

//! TIFF and GeoTIFF container handling
//!
//! Reading walks the IFD chain of classic and BigTIFF files; writing lays
//! out a single-band Float32 GeoTIFF through `GeoTiffBuilder` and
//! `TiffWriter`.

pub mod ifd;
pub mod types;
pub mod reader;
pub mod geokeys;
pub mod builder;
pub mod writer;
pub mod constants;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use builder::{GeoTiffBuilder, TiffLayout};
pub use geokeys::GeoReference;
pub use ifd::{get_tag_name, IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TiffFile;
pub use writer::TiffWriter;

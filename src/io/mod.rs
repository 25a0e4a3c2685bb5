//! Low-level I/O for raster files
//!
//! Seekable readers and endian-aware primitive reads.

pub mod seekable;
pub mod byte_order;

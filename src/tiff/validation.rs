//! TIFF validation helpers
//!
//! Guards against malformed files before offsets read from them are
//! followed.

use log::{debug, error, warn};
use std::io::SeekFrom;

use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;

/// Validates that an IFD offset points inside the file and past the header
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> RasterResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(RasterError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates that `length` bytes starting at `offset` lie inside the file
pub fn validate_data_range(offset: u64, length: u64, file_size: u64) -> RasterResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(RasterError::GenericError(format!(
            "Data range {}+{} exceeds file size {}",
            offset, length, file_size
        ))),
    }
}

/// Gets the size of the underlying stream, restoring the current position
///
/// Returns u64::MAX when the size cannot be determined.
pub fn get_file_size(reader: &mut dyn SeekableReader) -> RasterResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(file_size)
}

/// Validates the two BigTIFF header fields that follow the version number
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> RasterResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(RasterError::InvalidBigTIFFHeader);
    }

    Ok(())
}

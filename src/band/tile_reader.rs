//! Tile-based band decoding
//!
//! Tiled TIFFs store the image as equally sized rectangles; tiles on the
//! right and bottom edges are padded and the padding is dropped here.

use log::{debug, info};
use std::io::SeekFrom;

use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;
use crate::utils::progress::ProgressTracker;

use super::sample::BlockDecoder;

/// Reads a whole band from a tiled TIFF
pub struct TileReader<'a> {
    tiff_reader: &'a TiffReader,
    ifd: &'a IFD,
}

impl<'a> TileReader<'a> {
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD) -> Self {
        TileReader { tiff_reader, ifd }
    }

    fn tile_dimensions(&self) -> RasterResult<(usize, usize)> {
        let tile_width = self.ifd.get_tag_value(tags::TILE_WIDTH).ok_or(RasterError::TagNotFound(tags::TILE_WIDTH))?;
        let tile_height = self.ifd.get_tag_value(tags::TILE_LENGTH).ok_or(RasterError::TagNotFound(tags::TILE_LENGTH))?;

        if tile_width == 0 || tile_height == 0 {
            return Err(RasterError::GenericError(format!("Invalid tile size {}x{}", tile_width, tile_height)));
        }

        Ok((tile_width as usize, tile_height as usize))
    }

    /// Decodes every tile into a row-major buffer of `width * height` values
    pub fn read(&self, stream: &mut dyn SeekableReader, decoder: &BlockDecoder,
                progress: Option<&ProgressTracker>) -> RasterResult<Vec<f32>> {
        let (width, height) = self.ifd.get_dimensions().ok_or(RasterError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);
        let (tile_width, tile_height) = self.tile_dimensions()?;

        let tiles_across = (width + tile_width - 1) / tile_width;
        let tiles_down = (height + tile_height - 1) / tile_height;
        let tile_count = tiles_across * tiles_down;

        let offsets = self.tiff_reader.read_tag_values(stream, self.ifd, tags::TILE_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(stream, self.ifd, tags::TILE_BYTE_COUNTS)?;
        if offsets.len() < tile_count || byte_counts.len() < tile_count {
            return Err(RasterError::GenericError(format!(
                "Expected {} tiles, found {} offsets and {} byte counts",
                tile_count, offsets.len(), byte_counts.len())));
        }

        info!("Reading {}x{} tiles of {}x{} pixels", tiles_across, tiles_down, tile_width, tile_height);
        let file_size = validation::get_file_size(stream)?;
        let mut band = vec![0f32; width * height];

        for tile in 0..tile_count {
            let x0 = (tile % tiles_across) * tile_width;
            let y0 = (tile / tiles_across) * tile_height;

            debug!("Tile {} at offset {} ({} bytes)", tile, offsets[tile], byte_counts[tile]);
            validation::validate_data_range(offsets[tile], byte_counts[tile], file_size)?;

            let mut raw = vec![0u8; byte_counts[tile] as usize];
            stream.seek(SeekFrom::Start(offsets[tile]))?;
            stream.read_exact(&mut raw)?;

            let values = decoder.decode(&raw, tile_width, tile_height)?;
            let copy_width = tile_width.min(width - x0);
            let copy_rows = tile_height.min(height - y0);

            for row in 0..copy_rows {
                let src = row * tile_width;
                let dst = (y0 + row) * width + x0;
                band[dst..dst + copy_width].copy_from_slice(&values[src..src + copy_width]);
            }

            if let Some(tracker) = progress {
                tracker.increment(1);
            }
        }

        Ok(band)
    }

    /// Number of tiles, used to size progress bars
    pub fn block_count(&self) -> u64 {
        self.ifd.get_entry(tags::TILE_OFFSETS).map(|e| e.count).unwrap_or(0)
    }
}

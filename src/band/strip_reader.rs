//! Strip-based band decoding
//!
//! Stripped TIFFs store the image as horizontal bands of `RowsPerStrip`
//! rows spanning the full width.

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

/// Reads a whole band from a stripped TIFF
pub struct StripReader<'a> {
    tiff_reader: &'a TiffReader,
    ifd: &'a IFD,
}

impl<'a> StripReader<'a> {
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD) -> Self {
        StripReader { tiff_reader, ifd }
    }

    /// Decodes every strip into a row-major buffer of `width * height` values
    pub fn read(&self, stream: &mut dyn SeekableReader, decoder: &BlockDecoder,
                progress: Option<&ProgressTracker>) -> RasterResult<Vec<f32>> {
        let (width, height) = self.ifd.get_dimensions().ok_or(RasterError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);

        // a missing RowsPerStrip means a single strip
        let rows_per_strip = (self.ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .unwrap_or(height as u64) as usize)
            .clamp(1, height.max(1));

        let offsets = self.tiff_reader.read_tag_values(stream, self.ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(stream, self.ifd, tags::STRIP_BYTE_COUNTS)?;
        let strip_count = (height + rows_per_strip - 1) / rows_per_strip;

        if offsets.len() < strip_count || byte_counts.len() < strip_count {
            return Err(RasterError::GenericError(format!(
                "Expected {} strips, found {} offsets and {} byte counts",
                strip_count, offsets.len(), byte_counts.len())));
        }

        info!("Reading {} strips of {} rows ({})", strip_count, rows_per_strip, decoder.compression.name());
        let file_size = validation::get_file_size(stream)?;
        let mut band = vec![0f32; width * height];

        for strip in 0..strip_count {
            let first_row = strip * rows_per_strip;
            let rows = rows_per_strip.min(height - first_row);

            debug!("Strip {} at offset {} ({} bytes, {} rows)", strip, offsets[strip], byte_counts[strip], rows);
            validation::validate_data_range(offsets[strip], byte_counts[strip], file_size)?;

            let mut raw = vec![0u8; byte_counts[strip] as usize];
            stream.seek(SeekFrom::Start(offsets[strip]))?;
            stream.read_exact(&mut raw)?;

            let values = decoder.decode(&raw, width, rows)?;
            band[first_row * width..(first_row + rows) * width].copy_from_slice(&values);

            if let Some(tracker) = progress {
                tracker.increment(1);
            }
        }

        Ok(band)
    }

    /// Number of strips, used to size progress bars
    pub fn block_count(&self) -> u64 {
        self.ifd.get_entry(tags::STRIP_OFFSETS).map(|e| e.count).unwrap_or(0)
    }
}

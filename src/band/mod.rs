//! Band decoding
//!
//! Reads the single band described by an IFD into a row-major `Vec<f32>`,
//! whatever its layout (strips or tiles), compression, predictor and
//! stored sample type.

mod sample;
mod strip_reader;
mod tile_reader;

pub use sample::{BlockDecoder, SampleType, undo_floating_point_predictor, undo_horizontal_predictor};
pub use strip_reader::StripReader;
pub use tile_reader::TileReader;

use log::info;

use crate::compression::CompressionFactory;
use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{planar_config, predictor, sample_format, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::progress::ProgressTracker;

/// Builds the block decoder for the band described by `ifd`
pub fn decoder_for(tiff_reader: &TiffReader, stream: &mut dyn SeekableReader, ifd: &IFD) -> RasterResult<BlockDecoder> {
    let samples_per_pixel = ifd.get_samples_per_pixel();
    if samples_per_pixel != 1 {
        return Err(RasterError::GenericError(format!(
            "Expected a single-band raster, found {} samples per pixel", samples_per_pixel)));
    }

    let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
    if planar != planar_config::CHUNKY as u64 {
        info!("Planar configuration {} with a single sample reads as chunky", planar);
    }

    let bits = ifd.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1) as u16;
    let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
        tiff_reader.read_tag_values(stream, ifd, tags::SAMPLE_FORMAT)?
            .first()
            .copied()
            .unwrap_or(sample_format::UNSIGNED_INT as u64) as u16
    } else {
        sample_format::UNSIGNED_INT
    };

    let sample_type = SampleType::from_tags(format, bits)?;
    let compression = CompressionFactory::create_handler(
        ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1) as u16)?;
    let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;

    info!("Band samples: {:?}, compression: {}, predictor: {}", sample_type, compression.name(), predictor);
    BlockDecoder::new(sample_type, tiff_reader.byte_order(), predictor, compression)
}

/// Reads the whole band of `ifd`
///
/// With `show_progress` a progress bar counts decoded strips or tiles.
pub fn read_band(tiff_reader: &TiffReader, stream: &mut dyn SeekableReader, ifd: &IFD,
                 show_progress: bool) -> RasterResult<Vec<f32>> {
    let decoder = decoder_for(tiff_reader, stream, ifd)?;

    if ifd.is_tiled() {
        let reader = TileReader::new(tiff_reader, ifd);
        let tracker = show_progress.then(|| ProgressTracker::new(reader.block_count(), "Decoding tiles"));
        let band = reader.read(stream, &decoder, tracker.as_ref())?;
        if let Some(tracker) = tracker {
            tracker.finish();
        }
        Ok(band)
    } else {
        let reader = StripReader::new(tiff_reader, ifd);
        let tracker = show_progress.then(|| ProgressTracker::new(reader.block_count(), "Decoding strips"));
        let band = reader.read(stream, &decoder, tracker.as_ref())?;
        if let Some(tracker) = tracker {
            tracker.finish();
        }
        Ok(band)
    }
}

//! Image File Directory (IFD) structures
//!
//! An IFD is the list of tag entries describing one image in a TIFF file.
//! Only the first IFD is sampled; later ones (overviews, masks) are parsed
//! so the chain can be walked but are otherwise ignored.

use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;
use log::trace;

use crate::tiff::constants::{field_types, tags};

lazy_static! {
    static ref TAG_NAMES: HashMap<u16, &'static str> = {
        let mut names = HashMap::new();
        names.insert(tags::NEW_SUBFILE_TYPE, "NewSubfileType");
        names.insert(tags::IMAGE_WIDTH, "ImageWidth");
        names.insert(tags::IMAGE_LENGTH, "ImageLength");
        names.insert(tags::BITS_PER_SAMPLE, "BitsPerSample");
        names.insert(tags::COMPRESSION, "Compression");
        names.insert(tags::PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation");
        names.insert(tags::STRIP_OFFSETS, "StripOffsets");
        names.insert(tags::SAMPLES_PER_PIXEL, "SamplesPerPixel");
        names.insert(tags::ROWS_PER_STRIP, "RowsPerStrip");
        names.insert(tags::STRIP_BYTE_COUNTS, "StripByteCounts");
        names.insert(tags::PLANAR_CONFIGURATION, "PlanarConfiguration");
        names.insert(tags::SOFTWARE, "Software");
        names.insert(tags::PREDICTOR, "Predictor");
        names.insert(tags::TILE_WIDTH, "TileWidth");
        names.insert(tags::TILE_LENGTH, "TileLength");
        names.insert(tags::TILE_OFFSETS, "TileOffsets");
        names.insert(tags::TILE_BYTE_COUNTS, "TileByteCounts");
        names.insert(tags::SAMPLE_FORMAT, "SampleFormat");
        names.insert(tags::MODEL_PIXEL_SCALE_TAG, "ModelPixelScale");
        names.insert(tags::MODEL_TIEPOINT_TAG, "ModelTiepoint");
        names.insert(tags::MODEL_TRANSFORMATION_TAG, "ModelTransformation");
        names.insert(tags::GEO_KEY_DIRECTORY_TAG, "GeoKeyDirectory");
        names.insert(tags::GEO_DOUBLE_PARAMS_TAG, "GeoDoubleParams");
        names.insert(tags::GEO_ASCII_PARAMS_TAG, "GeoAsciiParams");
        names.insert(tags::GDAL_METADATA, "GDALMetadata");
        names.insert(tags::GDAL_NODATA, "GDALNoData");
        names
    };
}

/// Human-readable name of a tag, "Unknown" if we do not track it
pub fn get_tag_name(tag: u16) -> &'static str {
    TAG_NAMES.get(&tag).copied().unwrap_or("Unknown")
}

/// Size in bytes of one value of a TIFF field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// An entry in an Image File Directory
///
/// `value_bytes` keeps the raw value/offset field as it appeared in the
/// file, so values that fit inline can be decoded in the file's byte order.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Raw value/offset field (4 bytes used for classic TIFF, 8 for BigTIFF)
    pub value_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates a new entry whose inline bytes are the little-endian
    /// encoding of `value_offset`
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            value_bytes: value_offset.to_le_bytes(),
        }
    }

    /// Total size of the entry's values in bytes
    pub fn data_size(&self) -> usize {
        field_type_size(self.field_type) * self.count as usize
    }

    /// Whether the values live in the value/offset field itself
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.data_size() <= inline_size
    }
}

/// An Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    tag_map: HashMap<u16, IFDEntry>,
}

impl IFD {
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry, replacing any earlier entry with the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("IFD #{}: adding tag {} ({})", self.number, entry.tag, get_tag_name(entry.tag));

        self.entries.retain(|e| e.tag != entry.tag);
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets the value/offset field of a tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the image, if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Samples per pixel, 1 when the tag is absent
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the image data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }

    /// Entries sorted by tag, as the TIFF format requires on disk
    pub fn sorted_entries(&self) -> Vec<IFDEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| entry.tag);
        entries
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Tags:")?;
        for entry in self.sorted_entries() {
            writeln!(f, "    {} ({}): count={} value/offset={}",
                     entry.tag, get_tag_name(entry.tag), entry.count, entry.value_offset)?;
        }

        Ok(())
    }
}

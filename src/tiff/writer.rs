//! TIFF writing
//!
//! Writes a `TiffLayout` sequentially in little-endian order:
//! header, the single IFD, out-of-line tag data (ascending tag order) and
//! finally the strips. Every block starts on a 4-byte boundary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use log::{debug, info};

use crate::errors::{RasterError, RasterResult};
use crate::tiff::constants::{header, tags};
use crate::tiff::builder::TiffLayout;
use crate::tiff::ifd::{IFD, IFDEntry};

/// Writes TIFF layouts to files or arbitrary sinks
pub struct TiffWriter;

impl TiffWriter {
    /// Write a layout to `output_path`, replacing any existing file
    pub fn write(layout: TiffLayout, output_path: &str) -> RasterResult<()> {
        info!("Writing TIFF to {}", output_path);

        let file = File::create(output_path)
            .map_err(|e| RasterError::WriteFailure(format!("{}: {}", output_path, e)))?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);

        Self::write_to(&mut writer, layout)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a layout to any sink
    pub fn write_to<W: Write>(writer: &mut W, mut layout: TiffLayout) -> RasterResult<()> {
        let is_big_tiff = layout.is_big_tiff;
        let entries = get_unique_sorted_entries(&layout.ifd);

        let header_size: u64 = if is_big_tiff { 16 } else { 8 };
        let ifd_offset = header_size;
        let data_start = align_to_4_bytes(ifd_offset + calculate_ifd_size(entries.len(), is_big_tiff));

        let (tag_offsets, strip_start) = calculate_offsets(&layout.external_data, data_start);
        let strip_offsets = strip_positions(&layout.strips, strip_start);
        Self::patch_strip_offsets(&mut layout, &strip_offsets, is_big_tiff)?;

        // patching may have changed the inline bytes of StripOffsets
        let entries = get_unique_sorted_entries(&layout.ifd);

        let mut position = write_header(writer, is_big_tiff, ifd_offset)?;
        position += write_ifd(writer, &entries, &tag_offsets, is_big_tiff)?;

        for (tag, data) in &layout.external_data {
            position += write_padding(writer, position)?;
            debug!("Tag {} data at {} ({} bytes)", tag, position, data.len());
            writer.write_all(data)?;
            position += data.len() as u64;
        }

        for strip in &layout.strips {
            position += write_padding(writer, position)?;
            writer.write_all(strip)?;
            position += strip.len() as u64;
        }

        debug!("Wrote {} bytes", position);
        Ok(())
    }

    /// Replace the StripOffsets placeholder with the final strip positions
    fn patch_strip_offsets(layout: &mut TiffLayout, offsets: &[u64], is_big_tiff: bool) -> RasterResult<()> {
        let bytes: Vec<u8> = if is_big_tiff {
            offsets.iter().flat_map(|v| v.to_le_bytes()).collect()
        } else {
            if offsets.last().map(|o| *o > u32::MAX as u64).unwrap_or(false) {
                return Err(RasterError::WriteFailure("strip offsets exceed 4 GiB in a classic TIFF".to_string()));
            }
            offsets.iter().flat_map(|v| (*v as u32).to_le_bytes()).collect()
        };

        if let Some(external) = layout.external_data.get_mut(&tags::STRIP_OFFSETS) {
            *external = bytes;
            return Ok(());
        }

        let mut entry = layout.ifd.get_entry(tags::STRIP_OFFSETS)
            .cloned()
            .ok_or(RasterError::TagNotFound(tags::STRIP_OFFSETS))?;
        entry.value_bytes = [0u8; 8];
        entry.value_bytes[..bytes.len()].copy_from_slice(&bytes);
        layout.ifd.add_entry(entry);
        Ok(())
    }
}

/// Entries sorted by tag with duplicates removed
pub fn get_unique_sorted_entries(ifd: &IFD) -> Vec<IFDEntry> {
    let mut entries = ifd.sorted_entries();
    entries.dedup_by_key(|entry| entry.tag);
    entries
}

/// Round an offset up to the next 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    (offset + 3) & !3
}

/// Size of an IFD with `entries` entries, including count and next offset
pub fn calculate_ifd_size(entries: usize, is_big_tiff: bool) -> u64 {
    let entries = entries as u64;
    if is_big_tiff {
        8 + 20 * entries + 8
    } else {
        2 + 12 * entries + 4
    }
}

/// File offsets of every external tag payload, plus where strips begin
fn calculate_offsets(external_data: &BTreeMap<u16, Vec<u8>>, data_start: u64) -> (BTreeMap<u16, u64>, u64) {
    let mut offsets = BTreeMap::new();
    let mut current = data_start;

    for (tag, data) in external_data {
        current = align_to_4_bytes(current);
        offsets.insert(*tag, current);
        current += data.len() as u64;
    }

    (offsets, align_to_4_bytes(current))
}

fn strip_positions(strips: &[Vec<u8>], start: u64) -> Vec<u64> {
    let mut current = start;
    strips.iter()
        .map(|strip| {
            current = align_to_4_bytes(current);
            let offset = current;
            current += strip.len() as u64;
            offset
        })
        .collect()
}

/// Returns the number of bytes written
fn write_header<W: Write>(writer: &mut W, is_big_tiff: bool, ifd_offset: u64) -> RasterResult<u64> {
    writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

    if is_big_tiff {
        writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
        writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
        writer.write_all(&[0u8, 0])?;
        writer.write_all(&ifd_offset.to_le_bytes())?;
        Ok(16)
    } else {
        writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
        writer.write_all(&(ifd_offset as u32).to_le_bytes())?;
        Ok(8)
    }
}

/// Writes the IFD with a zero next-IFD offset; returns the bytes written
fn write_ifd<W: Write>(writer: &mut W, entries: &[IFDEntry], tag_offsets: &BTreeMap<u16, u64>,
                       is_big_tiff: bool) -> RasterResult<u64> {
    let field_len = if is_big_tiff { 8 } else { 4 };

    if is_big_tiff {
        writer.write_all(&(entries.len() as u64).to_le_bytes())?;
    } else {
        writer.write_all(&(entries.len() as u16).to_le_bytes())?;
    }

    for entry in entries {
        writer.write_all(&entry.tag.to_le_bytes())?;
        writer.write_all(&entry.field_type.to_le_bytes())?;

        if is_big_tiff {
            writer.write_all(&entry.count.to_le_bytes())?;
        } else {
            writer.write_all(&(entry.count as u32).to_le_bytes())?;
        }

        match tag_offsets.get(&entry.tag) {
            Some(offset) if is_big_tiff => writer.write_all(&offset.to_le_bytes())?,
            Some(offset) => writer.write_all(&(*offset as u32).to_le_bytes())?,
            None => writer.write_all(&entry.value_bytes[..field_len])?,
        }
    }

    if is_big_tiff {
        writer.write_all(&0u64.to_le_bytes())?;
    } else {
        writer.write_all(&0u32.to_le_bytes())?;
    }

    Ok(calculate_ifd_size(entries.len(), is_big_tiff))
}

/// Pads with zeros up to the next 4-byte boundary; returns the padding size
fn write_padding<W: Write>(writer: &mut W, position: u64) -> RasterResult<u64> {
    let padding = align_to_4_bytes(position) - position;
    if padding > 0 {
        writer.write_all(&vec![0u8; padding as usize])?;
    }
    Ok(padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::tiff::builder::GeoTiffBuilder;
    use crate::tiff::geokeys::GeoReference;
    use crate::tiff::reader::TiffReader;

    #[test]
    fn test_alignment() {
        assert_eq!(align_to_4_bytes(0), 0);
        assert_eq!(align_to_4_bytes(5), 8);
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(calculate_ifd_size(3, false), 42);
        assert_eq!(calculate_ifd_size(3, true), 76);
    }

    #[test]
    fn test_written_file_parses_back() {
        let geo = GeoReference {
            geotransform: Some([10.0, 1.0, 0.0, 20.0, 0.0, -1.0]),
            no_data: Some(-1.0),
            ..GeoReference::default()
        };
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let layout = GeoTiffBuilder::new(4, 3).rows_per_strip(1).geo_reference(geo).build(&data).unwrap();

        let mut buffer = Vec::new();
        TiffWriter::write_to(&mut buffer, layout).unwrap();

        let mut cursor = Cursor::new(buffer);
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut cursor).unwrap();
        let ifd = tiff.main_ifd().unwrap();

        assert_eq!(ifd.get_dimensions(), Some((4, 3)));
        let offsets = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap();
        assert_eq!(offsets.len(), 3);
        assert!(offsets.iter().all(|o| o % 4 == 0));
        assert_eq!(offsets[1] - offsets[0], 16);
    }
}

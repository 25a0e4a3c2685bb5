//! TIFF file reader implementation
//!
//! Reads the header and the IFD chain of TIFF and BigTIFF files in either
//! byte order, and decodes tag values referenced by IFD entries.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TiffFile;
use crate::tiff::validation;

/// Upper bound on the IFD chain length, protects against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a reader; byte order and format are set by `read`
    pub fn new() -> Self {
        TiffReader {
            byte_order: ByteOrder::LittleEndian,
            handler: ByteOrder::LittleEndian.create_handler(),
            is_big_tiff: false,
        }
    }

    /// Loads a TIFF file from the given path
    pub fn load(&mut self, filepath: &str) -> RasterResult<TiffFile> {
        info!("Loading TIFF file: {}", filepath);

        let file = File::open(Path::new(filepath))?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads the header and IFD chain from the given reader
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> RasterResult<TiffFile> {
        reader.seek(SeekFrom::Start(0))?;

        self.byte_order = ByteOrder::detect(reader)?;
        self.handler = self.byte_order.create_handler();
        debug!("Detected byte order: {}", self.byte_order.name());

        let version = self.handler.read_u16(reader)?;
        self.is_big_tiff = match version {
            header::BIG_TIFF_VERSION => {
                validation::validate_bigtiff_header(reader, self.handler.as_ref())?;
                true
            },
            header::TIFF_VERSION => false,
            _ => return Err(RasterError::UnsupportedVersion(version)),
        };
        debug!("TIFF version {} (BigTIFF: {})", version, self.is_big_tiff);

        let first_ifd_offset = self.read_offset(reader)?;
        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TiffFile::new(self.is_big_tiff, self.byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        if tiff.ifds.is_empty() {
            return Err(RasterError::InvalidHeader);
        }

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads the chain of IFDs, stopping at the first malformed link
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64,
                      file_size: u64) -> RasterResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            // read_ifd leaves the stream right after the last entry
            let next_ifd_offset = match self.read_offset(reader) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };
            debug!("Next IFD offset: {}", next_ifd_offset);

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads a single IFD at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> RasterResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            self.handler.read_u64(reader)?
        } else {
            self.handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} at {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            debug!("Read IFD entry: tag={}, type={}, count={}, value/offset={}",
                   entry.tag, entry.field_type, entry.count, entry.value_offset);
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads one IFD entry, keeping the raw value/offset bytes
    ///
    /// Inline values are decoded according to their field type so that a
    /// SHORT stored in a big-endian file yields the same number as in a
    /// little-endian one.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> RasterResult<IFDEntry> {
        let tag = self.handler.read_u16(reader)?;
        let field_type = self.handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            self.handler.read_u64(reader)?
        } else {
            self.handler.read_u32(reader)? as u64
        };

        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut value_bytes = [0u8; 8];
        reader.read_exact(&mut value_bytes[..field_len])?;

        let mut entry = IFDEntry {
            tag,
            field_type,
            count,
            value_offset: 0,
            value_bytes,
        };

        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) && count > 0 {
            self.decode_value(&value_bytes, field_type)
        } else if self.is_big_tiff {
            self.byte_order.u64_from(&value_bytes)
        } else {
            self.byte_order.u32_from(&value_bytes) as u64
        };

        Ok(entry)
    }

    /// Reads a header or next-IFD offset (4 bytes, 8 for BigTIFF)
    fn read_offset(&self, reader: &mut dyn SeekableReader) -> RasterResult<u64> {
        if self.is_big_tiff {
            Ok(self.handler.read_u64(reader)?)
        } else {
            Ok(self.handler.read_u32(reader)? as u64)
        }
    }

    /// Decodes the first value of the given field type from `bytes`
    fn decode_value(&self, bytes: &[u8], field_type: u16) -> u64 {
        match field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII => bytes[0] as u64,
            field_types::SHORT | field_types::SSHORT => self.byte_order.u16_from(bytes) as u64,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => self.byte_order.u32_from(bytes) as u64,
            _ => self.byte_order.u64_from(bytes),
        }
    }

    /// Raw bytes of an entry's values, inline or at their offset
    pub fn read_entry_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> RasterResult<Vec<u8>> {
        let size = entry.data_size();

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.value_bytes[..size].to_vec());
        }

        let file_size = validation::get_file_size(reader)?;
        validation::validate_data_range(entry.value_offset, size as u64, file_size)?;

        let mut buffer = vec![0u8; size];
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a tag's values as unsigned integers
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> RasterResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(RasterError::TagNotFound(tag))?;
        let width = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => 1,
            field_types::SHORT | field_types::SSHORT => 2,
            field_types::LONG | field_types::SLONG => 4,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
            other => return Err(RasterError::UnsupportedFieldType(other)),
        };

        let bytes = self.read_entry_bytes(reader, entry)?;
        let values = bytes.chunks_exact(width)
            .map(|chunk| match width {
                1 => chunk[0] as u64,
                2 => self.byte_order.u16_from(chunk) as u64,
                4 => self.byte_order.u32_from(chunk) as u64,
                _ => self.byte_order.u64_from(chunk),
            })
            .collect();

        Ok(values)
    }

    /// Reads a DOUBLE (or FLOAT) tag's values as f64
    pub fn read_tag_f64s(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> RasterResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(RasterError::TagNotFound(tag))?;
        let bytes = self.read_entry_bytes(reader, entry)?;

        match entry.field_type {
            field_types::DOUBLE => Ok(bytes.chunks_exact(8).map(|c| self.byte_order.f64_from(c)).collect()),
            field_types::FLOAT => Ok(bytes.chunks_exact(4).map(|c| self.byte_order.f32_from(c) as f64).collect()),
            other => Err(RasterError::UnsupportedFieldType(other)),
        }
    }

    /// Reads an ASCII tag, trailing NULs removed
    pub fn read_tag_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> RasterResult<String> {
        let entry = ifd.get_entry(tag).ok_or(RasterError::TagNotFound(tag))?;
        let mut bytes = self.read_entry_bytes(reader, entry)?;

        while bytes.last() == Some(&0) {
            bytes.pop();
        }

        String::from_utf8(bytes)
            .map_err(|e| RasterError::GenericError(format!("Invalid ASCII in tag {}: {}", tag, e)))
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}

//! Sample decoding
//!
//! Turns one decompressed strip or tile into `f32` values: predictors are
//! undone first, then every sample is converted from its stored type.

use crate::compression::CompressionHandler;
use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{predictor, sample_format};

/// Stored sample type of a single-band raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Sample type from the SampleFormat and BitsPerSample tags
    pub fn from_tags(format: u16, bits: u16) -> RasterResult<Self> {
        match (format, bits) {
            (sample_format::UNSIGNED_INT, 8) => Ok(SampleType::U8),
            (sample_format::SIGNED_INT, 8) => Ok(SampleType::I8),
            (sample_format::UNSIGNED_INT, 16) => Ok(SampleType::U16),
            (sample_format::SIGNED_INT, 16) => Ok(SampleType::I16),
            (sample_format::UNSIGNED_INT, 32) => Ok(SampleType::U32),
            (sample_format::SIGNED_INT, 32) => Ok(SampleType::I32),
            (sample_format::IEEE_FLOAT, 32) => Ok(SampleType::F32),
            (sample_format::IEEE_FLOAT, 64) => Ok(SampleType::F64),
            _ => Err(RasterError::UnsupportedSampleFormat { format, bits }),
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Decodes one sample from its stored bytes
    fn to_f32(&self, bytes: &[u8], order: ByteOrder) -> f32 {
        match self {
            SampleType::U8 => bytes[0] as f32,
            SampleType::I8 => bytes[0] as i8 as f32,
            SampleType::U16 => order.u16_from(bytes) as f32,
            SampleType::I16 => order.u16_from(bytes) as i16 as f32,
            SampleType::U32 => order.u32_from(bytes) as f32,
            SampleType::I32 => order.u32_from(bytes) as i32 as f32,
            SampleType::F32 => order.f32_from(bytes),
            SampleType::F64 => order.f64_from(bytes) as f32,
        }
    }
}

/// Decodes compressed blocks of one band
pub struct BlockDecoder {
    pub sample_type: SampleType,
    pub byte_order: ByteOrder,
    pub predictor: u16,
    pub compression: Box<dyn CompressionHandler>,
}

impl BlockDecoder {
    pub fn new(sample_type: SampleType, byte_order: ByteOrder, predictor: u16,
               compression: Box<dyn CompressionHandler>) -> RasterResult<Self> {
        match predictor {
            predictor::NONE | predictor::HORIZONTAL_DIFFERENCING => {},
            predictor::FLOATING_POINT if sample_type.is_float() => {},
            other => return Err(RasterError::GenericError(format!(
                "Unsupported predictor {} for {:?} samples", other, sample_type))),
        }

        Ok(BlockDecoder { sample_type, byte_order, predictor, compression })
    }

    /// Decodes a block of `width` x `rows` samples
    pub fn decode(&self, raw: &[u8], width: usize, rows: usize) -> RasterResult<Vec<f32>> {
        let bps = self.sample_type.bytes_per_sample();
        let mut bytes = self.compression.decompress_exact(raw, width * rows * bps)?;

        let order = match self.predictor {
            predictor::HORIZONTAL_DIFFERENCING => {
                undo_horizontal_predictor(&mut bytes, width, bps, self.byte_order);
                self.byte_order
            },
            predictor::FLOATING_POINT => {
                bytes = undo_floating_point_predictor(&bytes, width, bps);
                // byte planes are reassembled most significant byte first
                ByteOrder::BigEndian
            },
            _ => self.byte_order,
        };

        Ok(bytes.chunks_exact(bps)
            .map(|sample| self.sample_type.to_f32(sample, order))
            .collect())
    }
}

/// Reverses horizontal differencing row by row, with wrapping integer sums
pub fn undo_horizontal_predictor(data: &mut [u8], width: usize, bps: usize, order: ByteOrder) {
    let row_len = width * bps;
    if row_len == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_len) {
        for i in 1..width {
            let (prev, cur) = ((i - 1) * bps, i * bps);
            match bps {
                1 => row[cur] = row[cur].wrapping_add(row[prev]),
                2 => {
                    let v = order.u16_from(&row[cur..]).wrapping_add(order.u16_from(&row[prev..]));
                    order.write_u16_to(&mut row[cur..cur + 2], v);
                },
                4 => {
                    let v = order.u32_from(&row[cur..]).wrapping_add(order.u32_from(&row[prev..]));
                    order.write_u32_to(&mut row[cur..cur + 4], v);
                },
                _ => {
                    let v = order.u64_from(&row[cur..]).wrapping_add(order.u64_from(&row[prev..]));
                    order.write_u64_to(&mut row[cur..cur + 8], v);
                },
            }
        }
    }
}

/// Reverses the floating point predictor
///
/// Each row holds `bps` byte planes (most significant first), byte-wise
/// differenced across the whole row. The result is big-endian samples.
pub fn undo_floating_point_predictor(data: &[u8], width: usize, bps: usize) -> Vec<u8> {
    let row_len = width * bps;
    let mut out = vec![0u8; data.len()];
    if row_len == 0 {
        return out;
    }

    for (row_in, row_out) in data.chunks_exact(row_len).zip(out.chunks_exact_mut(row_len)) {
        let mut acc = row_in.to_vec();
        for i in 1..row_len {
            acc[i] = acc[i].wrapping_add(acc[i - 1]);
        }

        for sample in 0..width {
            for plane in 0..bps {
                row_out[sample * bps + plane] = acc[plane * width + sample];
            }
        }
    }

    out
}

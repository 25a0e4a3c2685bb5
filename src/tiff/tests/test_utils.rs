use std::io::Cursor;
use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian, WriteBytesExt};

/// Geotransform of the rasters built below
pub const EXPECTED_GEOTRANSFORM: [f64; 6] = [500.0, 10.0, 0.0, 1000.0, 0.0, -10.0];

/// Cell values of the rasters built below, row-major; -1 is no-data
pub const EXPECTED_VALUES: [f32; 4] = [1.0, 2.0, -1.0, 4.0];

const ENTRY_COUNT: u16 = 13;
const PIXEL_SCALE_OFFSET: u32 = 8 + 2 + ENTRY_COUNT as u32 * 12 + 4;
const TIEPOINT_OFFSET: u32 = PIXEL_SCALE_OFFSET + 3 * 8;
const STRIP_OFFSET: u32 = TIEPOINT_OFFSET + 6 * 8;

fn short_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, value: u16) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(3).unwrap();
    buffer.write_u32::<E>(1).unwrap();
    buffer.write_u16::<E>(value).unwrap();
    buffer.write_u16::<E>(0).unwrap();
}

fn long_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, value: u32) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(4).unwrap();
    buffer.write_u32::<E>(1).unwrap();
    buffer.write_u32::<E>(value).unwrap();
}

fn double_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(12).unwrap();
    buffer.write_u32::<E>(count).unwrap();
    buffer.write_u32::<E>(offset).unwrap();
}

/// A 2x2 uncompressed Float32 GeoTIFF in byte order `E`, with a pixel
/// scale/tiepoint georeference and GDAL_NODATA "-1"
pub fn float_geotiff<E: Endian>(marker: [u8; 2]) -> Vec<u8> {
    let mut buffer = Vec::new();

    buffer.extend_from_slice(&marker);
    buffer.write_u16::<E>(42).unwrap();
    buffer.write_u32::<E>(8).unwrap();

    buffer.write_u16::<E>(ENTRY_COUNT).unwrap();
    short_entry::<E>(&mut buffer, 256, 2);                    // ImageWidth
    short_entry::<E>(&mut buffer, 257, 2);                    // ImageLength
    short_entry::<E>(&mut buffer, 258, 32);                   // BitsPerSample
    short_entry::<E>(&mut buffer, 259, 1);                    // Compression
    short_entry::<E>(&mut buffer, 262, 1);                    // Photometric
    long_entry::<E>(&mut buffer, 273, STRIP_OFFSET);          // StripOffsets
    short_entry::<E>(&mut buffer, 277, 1);                    // SamplesPerPixel
    short_entry::<E>(&mut buffer, 278, 2);                    // RowsPerStrip
    long_entry::<E>(&mut buffer, 279, 16);                    // StripByteCounts
    short_entry::<E>(&mut buffer, 339, 3);                    // SampleFormat
    double_entry::<E>(&mut buffer, 33550, 3, PIXEL_SCALE_OFFSET);
    double_entry::<E>(&mut buffer, 33922, 6, TIEPOINT_OFFSET);

    // GDAL_NODATA, ASCII inline
    buffer.write_u16::<E>(42113).unwrap();
    buffer.write_u16::<E>(2).unwrap();
    buffer.write_u32::<E>(3).unwrap();
    buffer.extend_from_slice(b"-1\0\0");

    buffer.write_u32::<E>(0).unwrap();
    assert_eq!(buffer.len(), PIXEL_SCALE_OFFSET as usize);

    for value in [10.0, 10.0, 0.0] {
        buffer.write_f64::<E>(value).unwrap();
    }
    for value in [0.0, 0.0, 0.0, 500.0, 1000.0, 0.0] {
        buffer.write_f64::<E>(value).unwrap();
    }
    assert_eq!(buffer.len(), STRIP_OFFSET as usize);

    for value in EXPECTED_VALUES {
        buffer.write_f32::<E>(value).unwrap();
    }

    buffer
}

pub fn little_endian_geotiff() -> Cursor<Vec<u8>> {
    Cursor::new(float_geotiff::<LittleEndian>(*b"II"))
}

pub fn big_endian_geotiff() -> Cursor<Vec<u8>> {
    Cursor::new(float_geotiff::<BigEndian>(*b"MM"))
}

/// A BigTIFF with a single IFD holding only the image dimensions
pub fn minimal_bigtiff() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.extend_from_slice(b"II");
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    buffer.write_u64::<LittleEndian>(2).unwrap();
    for (tag, value) in [(256u16, 1024u64), (257, 768)] {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(16).unwrap();
        buffer.write_u64::<LittleEndian>(1).unwrap();
        buffer.write_u64::<LittleEndian>(value).unwrap();
    }
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

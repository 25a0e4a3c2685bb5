//! Reader tests against hand-built files in both byte orders

use std::io::Cursor;

use super::test_utils::{big_endian_geotiff, little_endian_geotiff, minimal_bigtiff,
                        EXPECTED_GEOTRANSFORM, EXPECTED_VALUES};
use crate::band;
use crate::errors::RasterError;
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::geokeys::GeoReference;
use crate::tiff::reader::TiffReader;

fn check_geotiff(mut stream: Cursor<Vec<u8>>, expected_order: ByteOrder) {
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut stream).unwrap();

    assert_eq!(tiff.byte_order, expected_order);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 1);

    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((2, 2)));
    assert_eq!(ifd.get_tag_value(tags::BITS_PER_SAMPLE), Some(32));
    assert_eq!(ifd.get_tag_value(tags::STRIP_BYTE_COUNTS), Some(16));

    let geo = GeoReference::read(&reader, &mut stream, ifd).unwrap();
    assert_eq!(geo.geotransform, Some(EXPECTED_GEOTRANSFORM));
    assert_eq!(geo.no_data, Some(-1.0));

    let values = band::read_band(&reader, &mut stream, ifd, false).unwrap();
    assert_eq!(values, EXPECTED_VALUES.to_vec());
}

#[test]
fn test_read_little_endian_geotiff() {
    check_geotiff(little_endian_geotiff(), ByteOrder::LittleEndian);
}

#[test]
fn test_read_big_endian_geotiff() {
    check_geotiff(big_endian_geotiff(), ByteOrder::BigEndian);
}

#[test]
fn test_read_bigtiff_header() {
    let mut stream = minimal_bigtiff();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut stream).unwrap();

    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_ascii_tag_trims_nul() {
    let mut stream = little_endian_geotiff();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut stream).unwrap();

    let text = reader.read_tag_ascii(&mut stream, tiff.main_ifd().unwrap(), tags::GDAL_NODATA).unwrap();
    assert_eq!(text, "-1");
}

#[test]
fn test_missing_tag_is_reported() {
    let mut stream = little_endian_geotiff();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut stream).unwrap();

    let result = reader.read_tag_values(&mut stream, tiff.main_ifd().unwrap(), tags::TILE_OFFSETS);
    assert!(matches!(result, Err(RasterError::TagNotFound(tags::TILE_OFFSETS))));
}

#[test]
fn test_unsupported_version() {
    let mut stream = Cursor::new(vec![0x49, 0x49, 41, 0, 8, 0, 0, 0]);
    let result = TiffReader::new().read(&mut stream);
    assert!(matches!(result, Err(RasterError::UnsupportedVersion(41))));
}

#[test]
fn test_ifd_offset_past_end() {
    let mut stream = Cursor::new(vec![0x49, 0x49, 42, 0, 0xFF, 0, 0, 0]);
    assert!(TiffReader::new().read(&mut stream).is_err());
}

#[test]
fn test_truncated_strip_is_rejected() {
    let mut bytes = little_endian_geotiff().into_inner();
    bytes.truncate(bytes.len() - 4);
    let mut stream = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut stream).unwrap();
    assert!(band::read_band(&reader, &mut stream, tiff.main_ifd().unwrap(), false).is_err());
}

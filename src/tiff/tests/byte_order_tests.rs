//! Tests for byte order detection and conversion

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::errors::RasterError;
use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};

#[test]
fn test_byte_order_detection() {
    let mut cursor = Cursor::new(b"II".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);

    let mut cursor = Cursor::new(b"MM".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
}

#[test]
fn test_byte_order_detection_invalid() {
    let mut cursor = Cursor::new(vec![0x34, 0x12]);
    assert!(matches!(ByteOrder::detect(&mut cursor), Err(RasterError::InvalidByteOrder(0x1234))));
}

#[test]
fn test_stream_handlers() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_f64::<LittleEndian>(-2.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;
    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_f64(&mut cursor).unwrap(), -2.5);

    let mut buffer = Vec::new();
    buffer.write_u64::<BigEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);
    assert_eq!(BigEndianHandler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}

#[test]
fn test_slice_conversions() {
    let bytes = [0x3F, 0x80, 0x00, 0x00];
    assert_eq!(ByteOrder::BigEndian.f32_from(&bytes), 1.0);
    assert_eq!(ByteOrder::BigEndian.u16_from(&bytes), 0x3F80);
    assert_eq!(ByteOrder::LittleEndian.u16_from(&bytes), 0x803F);

    let mut out = [0u8; 4];
    ByteOrder::BigEndian.write_u32_to(&mut out, 0x01020304);
    assert_eq!(out, [1, 2, 3, 4]);
}

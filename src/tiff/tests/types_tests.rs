//! Tests for the TIFF file and IFD types

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TiffFile;

#[test]
fn test_tiff_file_creation() {
    let tiff = TiffFile::new(false, ByteOrder::LittleEndian);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 0);
    assert!(tiff.main_ifd().is_none());
}

#[test]
fn test_overviews_are_reduced_resolution_subfiles() {
    let mut tiff = TiffFile::new(true, ByteOrder::BigEndian);

    let mut main = IFD::new(0, 16);
    main.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, 512));
    let mut overview = IFD::new(1, 400);
    overview.add_entry(IFDEntry::new(tags::NEW_SUBFILE_TYPE, field_types::LONG, 1, 1));
    let mut mask = IFD::new(2, 800);
    mask.add_entry(IFDEntry::new(tags::NEW_SUBFILE_TYPE, field_types::LONG, 1, 4));

    tiff.ifds = vec![main, overview, mask];

    let overviews = tiff.overviews();
    assert_eq!(overviews.len(), 1);
    assert_eq!(overviews[0].number, 1);
    assert_eq!(tiff.main_ifd().unwrap().get_tag_value(tags::IMAGE_WIDTH), Some(512));
}

#[test]
fn test_duplicate_tag_replaces_entry() {
    let mut ifd = IFD::new(0, 8);
    ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::SHORT, 1, 10));
    ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::SHORT, 1, 20));
    ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::SHORT, 1, 30));

    assert_eq!(ifd.entries.len(), 2);
    assert_eq!(ifd.get_dimensions(), Some((30, 20)));
}

#[test]
fn test_entry_inline_rules() {
    let short = IFDEntry::new(tags::IMAGE_WIDTH, field_types::SHORT, 2, 0);
    assert!(short.is_value_inline(false));

    let doubles = IFDEntry::new(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 1, 0);
    assert!(!doubles.is_value_inline(false));
    assert!(doubles.is_value_inline(true));
    assert_eq!(doubles.data_size(), 8);
}

#[test]
fn test_display_lists_format() {
    let mut tiff = TiffFile::new(false, ByteOrder::LittleEndian);
    let mut ifd = IFD::new(0, 8);
    ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::SHORT, 1, 2));
    tiff.ifds.push(ifd);

    let text = tiff.to_string();
    assert!(text.contains("Format: TIFF"));
    assert!(text.contains("Little Endian"));
}

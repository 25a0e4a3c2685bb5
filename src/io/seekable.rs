//! Seekable reader trait

use std::io::{Read, Seek};

/// Readers that can both read and seek (files, buffered files, cursors)
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

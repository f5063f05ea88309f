//! CBWS file header parsing and encoding.
//!
//! The first 16 bytes of a script: a 4-byte ASCII type tag followed by three
//! big-endian u32 fields. Each field is independently patchable at its fixed
//! offset; no other part of the file is self-describing.

use crate::CbwsError;

/// Sentinel returned when the type tag is not printable ASCII.
pub const UNKNOWN_FILE_TYPE: &str = "Unknown File Type";

/// Parsed CBWS header.
///
/// The raw type-tag bytes are retained so the header re-encodes byte-exactly
/// even when the tag does not decode as ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    type_tag: [u8; 4],
    /// First numeric field. Its purpose has not been established; the value
    /// round-trips losslessly.
    pub unknown_value: u32,
    /// Number of functions recorded in the file. Maintained by add/remove
    /// operations, never verified against the actual lists.
    pub function_count: u32,
    /// Frames to wait before intermediate-function execution begins.
    pub frame_delay: u32,
}

impl Header {
    /// Header size in bytes.
    pub const SIZE: usize = 16;

    /// Byte offset of the type tag.
    pub const TYPE_TAG_OFFSET: usize = 0;
    /// Byte offset of the unknown value.
    pub const UNKNOWN_VALUE_OFFSET: usize = 4;
    /// Byte offset of the function count.
    pub const FUNCTION_COUNT_OFFSET: usize = 8;
    /// Byte offset of the frame delay.
    pub const FRAME_DELAY_OFFSET: usize = 12;

    /// Parse the header from the start of a file buffer.
    pub fn parse(data: &[u8]) -> Result<Self, CbwsError> {
        if data.len() < Self::SIZE {
            return Err(CbwsError::too_short(Self::SIZE, data.len()));
        }

        let read_u32 = |offset: usize| -> u32 {
            let word = [
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ];
            u32::from_be_bytes(word)
        };

        Ok(Self {
            type_tag: [data[0], data[1], data[2], data[3]],
            unknown_value: read_u32(Self::UNKNOWN_VALUE_OFFSET),
            function_count: read_u32(Self::FUNCTION_COUNT_OFFSET),
            frame_delay: read_u32(Self::FRAME_DELAY_OFFSET),
        })
    }

    /// The decoded type tag, or [`UNKNOWN_FILE_TYPE`] when the tag bytes are
    /// not printable ASCII. Decode failure is not an error; the sentinel is
    /// surfaced instead.
    pub fn file_type(&self) -> &str {
        if self.type_tag.iter().all(|b| b.is_ascii_graphic()) {
            // Graphic ASCII is valid UTF-8 by construction.
            std::str::from_utf8(&self.type_tag).unwrap_or(UNKNOWN_FILE_TYPE)
        } else {
            UNKNOWN_FILE_TYPE
        }
    }

    /// The raw type-tag bytes as stored in the file.
    pub fn type_tag(&self) -> [u8; 4] {
        self.type_tag
    }

    /// Encode the header back to its 16-byte on-disk form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.type_tag);
        out[4..8].copy_from_slice(&self.unknown_value.to_be_bytes());
        out[8..12].copy_from_slice(&self.function_count.to_be_bytes());
        out[12..16].copy_from_slice(&self.frame_delay.to_be_bytes());
        out
    }
}

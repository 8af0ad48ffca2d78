//! Message envelope serialization and parsing.
//!
//! An envelope carries one payload across the channel together with a tag
//! saying what it is: plain text, or the contents of a file identified by
//! its extension. The receiving side uses the tag to decide how to present
//! the payload.
//!
//! # Envelope Format
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0x4E 0x43 0x44 0x43 ("NCDC")
//! +------------------+
//! | tag_len (2)      |  u16 little-endian, 0 = plain text
//! +------------------+
//! | payload_len (4)  |  u32 little-endian
//! +------------------+
//! | crc32 (4)        |  u32 checksum
//! +------------------+
//! | tag              |  UTF-8 file extension (tag_len bytes)
//! | (variable)       |
//! +------------------+
//! | payload          |  payload_len bytes
//! | (variable)       |
//! +------------------+
//! ```
//!
//! The CRC32 covers tag_len, payload_len, the tag and the payload. Envelopes
//! sit above the channel codes, so a CRC failure means a miscorrection
//! slipped through the code below.

use crate::error::{Error, FramingError, Result};

/// Magic number for envelopes: "NCDC"
const MAGIC: [u8; 4] = [0x4E, 0x43, 0x44, 0x43];

/// Size of the envelope header in bytes
pub const HEADER_SIZE: usize = 14;

/// What an envelope's payload is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadTag {
    /// Free-form text typed by a user
    Text,

    /// File contents; holds the extension without the leading dot
    File(String),
}

impl PayloadTag {
    /// Tag for a file with the given extension. An empty extension is text.
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            PayloadTag::Text
        } else {
            PayloadTag::File(extension.to_string())
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            PayloadTag::Text => &[],
            PayloadTag::File(extension) => extension.as_bytes(),
        }
    }
}

/// A tagged payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub tag: PayloadTag,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn text(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: PayloadTag::Text,
            payload: payload.into(),
        }
    }

    pub fn file(extension: &str, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: PayloadTag::from_extension(extension),
            payload: payload.into(),
        }
    }

    /// Serialize the envelope for transmission.
    ///
    /// # Errors
    /// `FramingError::FieldTooLong` if the tag exceeds `u16::MAX` bytes or
    /// the payload exceeds `u32::MAX` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let tag = self.tag.as_bytes();
        let tag_len = u16::try_from(tag.len()).map_err(|_| FramingError::FieldTooLong {
            field: "tag",
            length: tag.len(),
            max: u16::MAX as usize,
        })?;
        let payload_len =
            u32::try_from(self.payload.len()).map_err(|_| FramingError::FieldTooLong {
                field: "payload",
                length: self.payload.len(),
                max: u32::MAX as usize,
            })?;

        let crc32 = compute_crc(tag_len, payload_len, tag, &self.payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + tag.len() + self.payload.len());
        frame.extend_from_slice(&MAGIC);
        frame.extend_from_slice(&tag_len.to_le_bytes());
        frame.extend_from_slice(&payload_len.to_le_bytes());
        frame.extend_from_slice(&crc32.to_le_bytes());
        frame.extend_from_slice(tag);
        frame.extend_from_slice(&self.payload);
        Ok(frame)
    }

    /// Parse an envelope from bytes.
    ///
    /// # Errors
    /// - `FramingError::FrameTooShort` if the buffer cannot hold a header
    /// - `FramingError::InvalidMagic` if the magic number doesn't match
    /// - `FramingError::LengthMismatch` if the buffer size disagrees with the header
    /// - `Error::Crc` if CRC validation fails
    /// - `FramingError::InvalidTag` if the tag is not UTF-8
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some((header, body)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(FramingError::FrameTooShort {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        };

        let magic = [header[0], header[1], header[2], header[3]];
        if magic != MAGIC {
            return Err(FramingError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let tag_len = u16::from_le_bytes([header[4], header[5]]);
        let payload_len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
        let crc32 = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);

        let expected = HEADER_SIZE + tag_len as usize + payload_len as usize;
        if bytes.len() != expected {
            return Err(FramingError::LengthMismatch {
                expected,
                actual: bytes.len(),
            }
            .into());
        }

        let (tag, payload) = body.split_at(tag_len as usize);
        let computed = compute_crc(tag_len, payload_len, tag, payload);
        if computed != crc32 {
            return Err(Error::Crc {
                expected: crc32,
                actual: computed,
            });
        }

        let tag = if tag.is_empty() {
            PayloadTag::Text
        } else {
            let extension = std::str::from_utf8(tag).map_err(|_| FramingError::InvalidTag)?;
            PayloadTag::File(extension.to_string())
        };

        Ok(Self {
            tag,
            payload: payload.to_vec(),
        })
    }
}

/// Compute CRC32 over the protected fields.
fn compute_crc(tag_len: u16, payload_len: u32, tag: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&tag_len.to_le_bytes());
    hasher.update(&payload_len.to_le_bytes());
    hasher.update(tag);
    hasher.update(payload);
    hasher.finalize()
}

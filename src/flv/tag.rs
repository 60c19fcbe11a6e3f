// FLV tag header codec

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use serde::Serialize;

use crate::error::{FlvError, Result};
use crate::flv::{MAX_DATA_SIZE, TAG_HEADER_LEN};
use crate::utils::io::{read_be_u32, read_full};

/// FLV tag types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Audio,
    Video,
    Script,
    /// Any tag type byte this crate has no name for
    Other(u8),
}

impl TagType {
    pub const AUDIO: u8 = 8;
    pub const VIDEO: u8 = 9;
    pub const SCRIPT: u8 = 18;

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            Self::AUDIO => TagType::Audio,
            Self::VIDEO => TagType::Video,
            Self::SCRIPT => TagType::Script,
            other => TagType::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            TagType::Audio => Self::AUDIO,
            TagType::Video => Self::VIDEO,
            TagType::Script => Self::SCRIPT,
            TagType::Other(byte) => byte,
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagType::Audio => write!(f, "audio"),
            TagType::Video => write!(f, "video"),
            TagType::Script => write!(f, "script"),
            TagType::Other(byte) => write!(f, "other({})", byte),
        }
    }
}

/// FLV tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagHeader {
    pub tag_type: TagType,
    pub data_size: u32,
    /// Milliseconds
    pub timestamp: u32,
}

/// A decoded tag: header plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub header: TagHeader,
    pub data: Vec<u8>,
}

impl TagHeader {
    /// Build a header for `payload_len` bytes, rejecting sizes beyond 24 bits
    pub fn new(tag_type: TagType, payload_len: usize, timestamp: u32) -> Result<Self> {
        if payload_len > MAX_DATA_SIZE as usize {
            return Err(FlvError::OutOfRange { size: payload_len });
        }
        Ok(TagHeader {
            tag_type,
            data_size: payload_len as u32,
            timestamp,
        })
    }

    /// Encode into the fixed 11-byte layout
    pub fn encode(&self) -> Result<[u8; TAG_HEADER_LEN]> {
        if self.data_size > MAX_DATA_SIZE {
            return Err(FlvError::OutOfRange {
                size: self.data_size as usize,
            });
        }

        let mut buffer = [0u8; TAG_HEADER_LEN];
        buffer[0] = self.tag_type.as_byte();
        BigEndian::write_u24(&mut buffer[1..4], self.data_size);
        BigEndian::write_u24(&mut buffer[4..7], self.timestamp & 0x00FF_FFFF);
        buffer[7] = (self.timestamp >> 24) as u8;
        // Stream ID stays zero
        Ok(buffer)
    }

    /// Decode from the fixed 11-byte layout; the stream ID is ignored
    pub fn decode(buffer: &[u8; TAG_HEADER_LEN]) -> Self {
        let data_size = BigEndian::read_u24(&buffer[1..4]);
        let timestamp = ((buffer[7] as u32) << 24) | BigEndian::read_u24(&buffer[4..7]);

        TagHeader {
            tag_type: TagType::from_byte(buffer[0]),
            data_size,
            timestamp,
        }
    }

    /// Read tag header from reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; TAG_HEADER_LEN];
        read_full(reader, &mut buffer, "tag header")?;
        Ok(Self::decode(&buffer))
    }

    /// Total encoded length of the tag, which is what the back-pointer records
    pub fn tag_size(&self) -> u32 {
        TAG_HEADER_LEN as u32 + self.data_size
    }
}

impl Tag {
    /// Read one complete tag, consuming its trailing back-pointer
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = TagHeader::read(reader)?;

        let mut data = vec![0u8; header.data_size as usize];
        read_full(reader, &mut data, "tag payload")?;

        // Passive field, not checked against the header
        read_back_pointer(reader)?;

        Ok(Tag { header, data })
    }
}

/// Write the back-pointer that follows a payload of `payload_len` bytes
pub fn write_back_pointer<W: Write>(writer: &mut W, payload_len: u32) -> std::io::Result<()> {
    writer.write_u32::<BigEndian>(TAG_HEADER_LEN as u32 + payload_len)
}

/// Read a back-pointer
pub fn read_back_pointer<R: Read>(reader: &mut R) -> Result<u32> {
    read_be_u32(reader, "back-pointer")
}

// FLV signature header

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{FlvError, Result};
use crate::flv::{FLV_SIGNATURE, HEADER_LEN};
use crate::utils::io::read_full;

/// FLV signature header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHeader {
    pub version: u8,
    /// Bit 0 = video present, bit 2 = audio present, the rest is opaque
    pub flags: u8,
    /// Length of the header, i.e. where the first PreviousTagSize starts
    pub data_offset: u32,
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            version: 1,
            flags: Self::FLAG_AUDIO | Self::FLAG_VIDEO,
            data_offset: HEADER_LEN as u32,
        }
    }
}

impl FileHeader {
    pub const FLAG_VIDEO: u8 = 0x01;
    pub const FLAG_AUDIO: u8 = 0x04;

    /// Read and validate the signature header
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; HEADER_LEN];
        read_full(reader, &mut buffer, "signature header")?;

        if &buffer[0..3] != FLV_SIGNATURE {
            return Err(FlvError::Format(format!(
                "bad signature {:02X?}, expected \"FLV\"",
                &buffer[0..3]
            )));
        }

        let data_offset = BigEndian::read_u32(&buffer[5..9]);
        if (data_offset as usize) < HEADER_LEN {
            return Err(FlvError::Format(format!(
                "data offset {} is shorter than the signature header",
                data_offset
            )));
        }

        Ok(FileHeader {
            version: buffer[3],
            flags: buffer[4],
            data_offset,
        })
    }

    /// Write the 9-byte signature header; `data_offset` is always written as 9
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(FLV_SIGNATURE)?;
        writer.write_u8(self.version)?;
        writer.write_u8(self.flags)?;
        writer.write_u32::<BigEndian>(HEADER_LEN as u32)
    }

    pub fn has_audio(&self) -> bool {
        self.flags & Self::FLAG_AUDIO != 0
    }

    pub fn has_video(&self) -> bool {
        self.flags & Self::FLAG_VIDEO != 0
    }

    /// Offset of the first tag: the header plus the zero PreviousTagSize0
    pub fn first_tag_offset(&self) -> u64 {
        self.data_offset as u64 + crate::flv::PREVIOUS_TAG_SIZE_LEN as u64
    }
}

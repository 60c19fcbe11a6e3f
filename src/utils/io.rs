// I/O utilities for reading FLV streams

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{FlvError, Result};

/// Fill `buffer` completely, reporting a short read as a truncated `context`
pub fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8], context: &'static str) -> Result<()> {
    reader
        .read_exact(buffer)
        .map_err(|e| FlvError::from_read(e, context))
}

/// Read big-endian 32-bit integer
pub fn read_be_u32<R: Read>(reader: &mut R, context: &'static str) -> Result<u32> {
    reader
        .read_u32::<BigEndian>()
        .map_err(|e| FlvError::from_read(e, context))
}

/// Total length of a seekable stream, restoring the current position
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> std::io::Result<u64> {
    let pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if pos != len {
        stream.seek(SeekFrom::Start(pos))?;
    }
    Ok(len)
}

/// Check if stream has signature at current position
pub fn check_signature<R: Read + Seek>(reader: &mut R, signature: &[u8]) -> std::io::Result<bool> {
    let pos = reader.stream_position()?;
    let mut buffer = vec![0u8; signature.len()];
    let matched = match reader.read_exact(&mut buffer) {
        Ok(()) => buffer == signature,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e),
    };
    reader.seek(SeekFrom::Start(pos))?;
    Ok(matched)
}

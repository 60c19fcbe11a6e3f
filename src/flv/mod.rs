// FLV container support
//
// FLV File Structure:
// - Signature header (9 bytes)
//   - Signature: "FLV" (3 bytes)
//   - Version: 1 (1 byte)
//   - Flags: bit 0 = video, bit 2 = audio (1 byte)
//   - Data offset: header length (4 bytes, big-endian)
// - PreviousTagSize0: always 0 (4 bytes)
// - Tags (repeated)
//   - Tag header (11 bytes)
//     - Tag type: 8 = audio, 9 = video, 18 = script data (1 byte)
//     - Data size (3 bytes)
//     - Timestamp, low 24 bits (3 bytes)
//     - Timestamp extended, bits 24-31 (1 byte)
//     - Stream ID: always 0 (3 bytes)
//   - Payload (data size bytes)
//   - PreviousTagSize: 11 + data size (4 bytes)

pub mod header;
pub mod reader;
pub mod tag;
pub mod writer;

pub use header::FileHeader;
pub use reader::{FlvReader, Tags};
pub use tag::{Tag, TagHeader, TagType};
pub use writer::{FlvWriter, TimestampRebaser};

// FLV signature
pub const FLV_SIGNATURE: &[u8; 3] = b"FLV";

/// Length of the signature header written by this crate
pub const HEADER_LEN: usize = 9;

/// Length of the zero back-pointer that precedes the first tag
pub const PREVIOUS_TAG_SIZE_LEN: usize = 4;

/// Encoded size of every tag header
pub const TAG_HEADER_LEN: usize = 11;

/// Largest payload the 24-bit data size field can describe
pub const MAX_DATA_SIZE: u32 = 0x00FF_FFFF;

/// Byte position of the `duration` number in a conventional `onMetaData` first tag
pub const DEFAULT_DURATION_OFFSET: u64 = 53;

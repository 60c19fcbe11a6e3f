//! flvio - sequential reader/writer for FLV tag containers
//!
//! A container is either created for writing ([`FlvWriter`]) or opened for
//! reading ([`FlvReader`]). The writer rebases timestamps so the stream starts
//! at 0, clamps regressions, and tracks the running duration that [`FlvWriter::sync`]
//! patches into a caller-provided metadata tag.
//!
//! ```no_run
//! use flvio::{FlvReader, FlvWriter};
//!
//! # fn main() -> flvio::Result<()> {
//! let mut writer = FlvWriter::create("out.flv")?;
//! writer.write_video_tag(&[0x17, 0x00], 90_000)?;
//! writer.write_audio_tag(&[0xAF, 0x01], 90_023)?;
//! writer.close()?;
//!
//! let mut reader = FlvReader::open("out.flv")?;
//! while !reader.is_finished() {
//!     let tag = reader.read_tag()?;
//!     println!("{} {} ms", tag.header.tag_type, tag.header.timestamp);
//! }
//! # Ok(())
//! # }
//! ```

mod container;
mod error;
pub mod flv;
mod utils;

pub use container::{ByteStream, ContainerConfig};
pub use error::{FlvError, Result};
pub use flv::{FileHeader, FlvReader, FlvWriter, Tag, TagHeader, TagType, Tags, TimestampRebaser};

/// Detect the FLV signature at the start of a file
pub fn is_flv_file<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<bool> {
    let mut file = std::fs::File::open(path)?;
    utils::io::check_signature(&mut file, flv::FLV_SIGNATURE)
}

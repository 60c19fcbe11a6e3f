// FLV tag writer

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, trace};

use crate::container::{ByteStream, Container, ContainerConfig};
use crate::error::{FlvError, Result};
use crate::flv::tag::{write_back_pointer, TagHeader, TagType};
use crate::flv::{FileHeader, HEADER_LEN, PREVIOUS_TAG_SIZE_LEN};

/// Timestamp normalization for one writer session.
///
/// Regressions are clamped to the last timestamp seen, and everything is shifted so
/// the first tag lands on 0. Nothing here is ever reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimestampRebaser {
    first_timestamp: Option<u32>,
    last_timestamp: u32,
    duration: f64,
}

impl TimestampRebaser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a caller timestamp into the one to encode, updating duration
    pub fn rebase(&mut self, timestamp: u32) -> u32 {
        let timestamp = if timestamp < self.last_timestamp {
            self.last_timestamp
        } else {
            self.last_timestamp = timestamp;
            timestamp
        };

        let first = *self.first_timestamp.get_or_insert(timestamp);
        let rebased = timestamp - first;

        let seconds = rebased as f64 / 1000.0;
        if self.duration < seconds {
            self.duration = seconds;
        }

        rebased
    }

    /// True once the first tag has fixed the rebasing origin
    pub fn is_started(&self) -> bool {
        self.first_timestamp.is_some()
    }

    pub fn first_timestamp(&self) -> Option<u32> {
        self.first_timestamp
    }

    pub fn last_timestamp(&self) -> u32 {
        self.last_timestamp
    }

    /// Seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }
}

/// Write-capable view of an FLV container
#[derive(Debug)]
pub struct FlvWriter<S> {
    container: Container<S>,
    rebaser: TimestampRebaser,
    written: u64,
}

impl FlvWriter<BufWriter<File>> {
    /// Create a new FLV file with the default configuration
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_config(path, ContainerConfig::default())
    }

    /// Create a new FLV file, truncating any existing one
    pub fn create_with_config<P: AsRef<Path>>(path: P, config: ContainerConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!("created {}", path.display());
        Self::start(BufWriter::new(file), Some(path), config)
    }
}

impl<S: Write + ByteStream> FlvWriter<S> {
    /// Start a container on an arbitrary stream, writing at its current position.
    ///
    /// Offsets such as `duration_offset` stay absolute positions in the stream.
    pub fn from_stream(stream: S, config: ContainerConfig) -> Result<Self> {
        Self::start(stream, None, config)
    }

    fn start(mut stream: S, path: Option<&Path>, config: ContainerConfig) -> Result<Self> {
        let header = FileHeader {
            data_offset: HEADER_LEN as u32,
            ..config.header
        };
        header.write(&mut stream)?;
        // PreviousTagSize0
        stream.write_u32::<BigEndian>(0)?;
        stream.flush_durable()?;
        let written = stream.stream_position()?;

        debug!(
            "wrote FLV header version={} flags={:#04x}",
            header.version, header.flags
        );

        Ok(FlvWriter {
            container: Container::new(stream, path, ContainerConfig { header, ..config }),
            rebaser: TimestampRebaser::new(),
            written,
        })
    }

    /// Data with audio header
    pub fn write_audio_tag(&mut self, data: &[u8], timestamp: u32) -> Result<()> {
        self.write_tag(data, TagType::Audio, timestamp)
    }

    /// Data with video header
    pub fn write_video_tag(&mut self, data: &[u8], timestamp: u32) -> Result<()> {
        self.write_tag(data, TagType::Video, timestamp)
    }

    /// Data with script data header
    pub fn write_script_tag(&mut self, data: &[u8], timestamp: u32) -> Result<()> {
        self.write_tag(data, TagType::Script, timestamp)
    }

    /// Write one tag: header, payload, then back-pointer.
    ///
    /// An I/O error leaves a partial tag behind; the container should be discarded.
    pub fn write_tag(&mut self, data: &[u8], tag_type: TagType, timestamp: u32) -> Result<()> {
        // Size is checked before the session state moves
        let mut header = TagHeader::new(tag_type, data.len(), 0)?;
        header.timestamp = self.rebaser.rebase(timestamp);
        let encoded = header.encode()?;

        let stream = &mut self.container.stream;
        stream.write_all(&encoded)?;
        stream.write_all(data)?;
        write_back_pointer(stream, header.data_size)?;

        self.written += header.tag_size() as u64 + PREVIOUS_TAG_SIZE_LEN as u64;
        trace!(
            "wrote {} tag: {} bytes at {} ms (input {} ms)",
            tag_type,
            header.data_size,
            header.timestamp,
            timestamp
        );
        Ok(())
    }

    /// Patch the duration into the metadata region and flush to durable storage
    pub fn sync(&mut self) -> Result<()> {
        let offset = self.container.config.duration_offset;
        if offset.checked_add(8).map_or(true, |end| end > self.written) {
            return Err(FlvError::DurationOffset {
                offset,
                written: self.written,
            });
        }

        let duration = self.rebaser.duration();
        let stream = &mut self.container.stream;
        stream.seek(SeekFrom::Start(offset))?;
        stream.write_f64::<BigEndian>(duration)?;
        stream.seek(SeekFrom::End(0))?;
        stream.flush_durable()?;

        debug!("synced duration {:.3}s at offset {}", duration, offset);
        Ok(())
    }

    /// Flush buffered tags to durable storage without touching the duration
    pub fn flush_durable(&mut self) -> Result<()> {
        self.container.stream.flush_durable()?;
        Ok(())
    }

    /// Flush and release the stream
    pub fn close(mut self) -> Result<()> {
        self.flush_durable()
    }
}

impl<S> FlvWriter<S> {
    pub fn path(&self) -> Option<&Path> {
        self.container.path()
    }

    /// Stream position just past the last emitted byte
    pub fn size(&self) -> u64 {
        self.written
    }

    /// Running duration in seconds
    pub fn duration(&self) -> f64 {
        self.rebaser.duration()
    }

    /// Override the duration that the next `sync` persists
    pub fn set_duration(&mut self, duration: f64) {
        self.rebaser.set_duration(duration);
    }

    pub fn rebaser(&self) -> &TimestampRebaser {
        &self.rebaser
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.container.config
    }

    /// Take the underlying stream back without flushing
    pub fn into_inner(self) -> S {
        self.container.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rebase_all(input: &[u32]) -> (Vec<u32>, TimestampRebaser) {
        let mut rebaser = TimestampRebaser::new();
        let out = input.iter().map(|&t| rebaser.rebase(t)).collect();
        (out, rebaser)
    }

    #[test]
    fn first_timestamp_becomes_zero() {
        let (out, rebaser) = rebase_all(&[5000, 5040, 5080]);
        assert_eq!(out, vec![0, 40, 80]);
        assert_eq!(rebaser.first_timestamp(), Some(5000));
        assert_eq!(rebaser.last_timestamp(), 5080);
    }

    #[test]
    fn regressions_are_clamped() {
        let (out, _) = rebase_all(&[1000, 1500, 1200, 900, 1600, 1550]);
        assert_eq!(out, vec![0, 500, 500, 500, 600, 600]);
        assert!(out.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn duration_tracks_running_maximum() {
        let mut rebaser = TimestampRebaser::new();
        assert!(!rebaser.is_started());
        let mut previous = 0.0;
        for t in [200u32, 1700, 1100, 4200, 4000] {
            let emitted = rebaser.rebase(t);
            let expected = f64::max(previous, emitted as f64 / 1000.0);
            assert_eq!(rebaser.duration(), expected);
            previous = expected;
        }
        assert!(rebaser.is_started());
        assert_eq!(rebaser.duration(), 4.0);
    }

    #[test]
    fn start_writes_header_and_zero_back_pointer() {
        let writer = FlvWriter::from_stream(Cursor::new(Vec::new()), ContainerConfig::default()).unwrap();
        assert_eq!(writer.size(), 13);
        assert_eq!(writer.path(), None);
        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes, b"FLV\x01\x05\x00\x00\x00\x09\x00\x00\x00\x00");
    }

    #[test]
    fn tag_bytes_follow_header_layout() {
        let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), ContainerConfig::default()).unwrap();
        writer.write_audio_tag(&[0xAF, 0x01], 300).unwrap();
        writer.write_video_tag(&[0x17], 340).unwrap();
        assert_eq!(writer.size(), 13 + 17 + 16);

        let bytes = writer.into_inner().into_inner();
        assert_eq!(
            &bytes[13..30],
            &[8, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0xAF, 0x01, 0, 0, 0, 13]
        );
        assert_eq!(
            &bytes[30..46],
            &[9, 0, 0, 1, 0, 0, 40, 0, 0, 0, 0, 0x17, 0, 0, 0, 12]
        );
    }

    #[test]
    fn oversize_payload_leaves_session_untouched() {
        let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), ContainerConfig::default()).unwrap();
        let huge = vec![0u8; 0x0100_0000];
        let err = writer.write_video_tag(&huge, 999).unwrap_err();
        assert!(matches!(err, FlvError::OutOfRange { size: 0x0100_0000 }));
        assert!(!writer.rebaser().is_started());
        assert_eq!(writer.size(), 13);
        assert_eq!(writer.into_inner().into_inner().len(), 13);
    }

    #[test]
    fn sync_patches_duration_and_returns_to_end() {
        let config = ContainerConfig {
            duration_offset: 24,
            ..ContainerConfig::default()
        };
        let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), config).unwrap();
        writer.write_script_tag(&[0u8; 8], 10).unwrap();
        writer.write_video_tag(&[1, 2, 3], 2510).unwrap();
        writer.sync().unwrap();
        writer.write_video_tag(&[4], 2550).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(&bytes[24..32], &2.5f64.to_be_bytes());
        // The tag written after sync lands at the end
        assert_eq!(bytes.len(), 13 + 23 + 18 + 16);
        assert_eq!(bytes[bytes.len() - 5], 4);
    }

    #[test]
    fn sync_without_metadata_region_is_rejected() {
        let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), ContainerConfig::default()).unwrap();
        writer.write_audio_tag(&[1], 0).unwrap();
        let err = writer.sync().unwrap_err();
        assert!(matches!(err, FlvError::DurationOffset { offset: 53, written: 18 }), "got {err:?}");
        assert_eq!(writer.into_inner().into_inner().len(), 18);
    }

    #[test]
    fn sync_offset_near_u64_max_is_rejected() {
        for offset in [u64::MAX, u64::MAX - 7] {
            let config: ContainerConfig =
                serde_json::from_str(&format!(r#"{{"duration_offset": {}}}"#, offset)).unwrap();
            let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), config).unwrap();
            writer.write_video_tag(&[1, 2], 0).unwrap();
            let err = writer.sync().unwrap_err();
            assert!(
                matches!(err, FlvError::DurationOffset { offset: o, written: 30 } if o == offset),
                "got {err:?}"
            );
        }
    }

    #[test]
    fn from_stream_keeps_offsets_absolute() {
        let mut cursor = Cursor::new(b"JUNK".to_vec());
        cursor.set_position(4);
        let config = ContainerConfig {
            duration_offset: 4 + 13 + 11,
            ..ContainerConfig::default()
        };
        let mut writer = FlvWriter::from_stream(cursor, config).unwrap();
        assert_eq!(writer.size(), 17);

        writer.write_script_tag(&[0u8; 8], 100).unwrap();
        writer.write_audio_tag(&[1], 1600).unwrap();
        writer.sync().unwrap();
        assert_eq!(writer.size(), 17 + 23 + 16);

        let bytes = writer.into_inner().into_inner();
        assert_eq!(&bytes[0..4], b"JUNK");
        assert_eq!(&bytes[4..7], b"FLV");
        assert_eq!(&bytes[28..36], &1.5f64.to_be_bytes());
        assert_eq!(bytes.len(), 56);
    }

    #[test]
    fn set_duration_overrides_running_value() {
        let mut writer = FlvWriter::from_stream(Cursor::new(Vec::new()), ContainerConfig::default()).unwrap();
        writer.write_audio_tag(&[1], 0).unwrap();
        writer.write_audio_tag(&[1], 1000).unwrap();
        writer.set_duration(12.5);
        assert_eq!(writer.duration(), 12.5);
        writer.write_audio_tag(&[1], 2000).unwrap();
        assert_eq!(writer.duration(), 12.5);
    }
}

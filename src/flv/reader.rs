// FLV tag reader

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace};

use crate::container::{ByteStream, Container, ContainerConfig};
use crate::error::Result;
use crate::flv::tag::Tag;
use crate::flv::FileHeader;

/// Read-capable view of an FLV container
#[derive(Debug)]
pub struct FlvReader<S> {
    container: Container<S>,
    header: FileHeader,
    size: u64,
}

impl FlvReader<BufReader<File>> {
    /// Open an existing FLV file with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ContainerConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ContainerConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!("opened {}", path.display());
        Self::start(BufReader::new(file), Some(path), config)
    }
}

impl<S: Read + ByteStream> FlvReader<S> {
    /// Open a container held in an arbitrary stream
    pub fn from_stream(stream: S, config: ContainerConfig) -> Result<Self> {
        Self::start(stream, None, config)
    }

    fn start(mut stream: S, path: Option<&Path>, config: ContainerConfig) -> Result<Self> {
        let size = stream.size()?;
        stream.seek(SeekFrom::Start(0))?;

        let header = FileHeader::read(&mut stream)?;
        stream.seek(SeekFrom::Start(header.first_tag_offset()))?;

        debug!(
            "FLV header version={} flags={:#04x} data_offset={} size={}",
            header.version, header.flags, header.data_offset, size
        );

        Ok(FlvReader {
            container: Container::new(stream, path, config),
            header,
            size,
        })
    }

    /// Read the next tag.
    ///
    /// A `TruncatedStream` error while `is_finished()` holds is the ordinary end of
    /// the stream rather than corruption.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let tag = Tag::read(&mut self.container.stream)?;
        trace!(
            "read {} tag: {} bytes at {} ms",
            tag.header.tag_type,
            tag.header.data_size,
            tag.header.timestamp
        );
        Ok(tag)
    }

    /// True at or past the size captured at open, or when the position is unknown
    pub fn is_finished(&mut self) -> bool {
        match self.container.stream.stream_position() {
            Ok(pos) => pos >= self.size,
            Err(_) => true,
        }
    }

    /// Rewind to the first tag
    pub fn loop_back(&mut self) -> Result<()> {
        self.container
            .stream
            .seek(SeekFrom::Start(self.header.first_tag_offset()))?;
        Ok(())
    }

    /// Iterate over the remaining tags until the end of the stream
    pub fn tags(&mut self) -> Tags<'_, S> {
        Tags {
            reader: self,
            failed: false,
        }
    }
}

impl<S> FlvReader<S> {
    pub fn path(&self) -> Option<&Path> {
        self.container.path()
    }

    /// Total size captured at open
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.container.config
    }

    /// Release the stream
    pub fn close(self) {
        drop(self.container.stream);
    }

    pub fn into_inner(self) -> S {
        self.container.stream
    }
}

/// Iterator over the tags of an `FlvReader`, stopping after the first error
pub struct Tags<'a, S> {
    reader: &'a mut FlvReader<S>,
    failed: bool,
}

impl<S: Read + ByteStream> Iterator for Tags<'_, S> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_finished() {
            return None;
        }
        let result = self.reader.read_tag();
        self.failed = result.is_err();
        Some(result)
    }
}

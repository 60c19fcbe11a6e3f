// Shared container state and the byte-stream collaborator

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::flv::{FileHeader, DEFAULT_DURATION_OFFSET};
use crate::utils::io::stream_len;

/// Byte-stream collaborator: seekable storage that can report its size and
/// push buffered bytes all the way to durable storage
pub trait ByteStream: Seek {
    fn flush_durable(&mut self) -> io::Result<()>;

    /// Current total size, leaving the position where it was
    fn size(&mut self) -> io::Result<u64> {
        stream_len(self)
    }
}

impl ByteStream for File {
    fn flush_durable(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl ByteStream for BufWriter<File> {
    fn flush_durable(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_ref().sync_all()
    }
}

impl ByteStream for BufReader<File> {
    // Read-only: nothing buffered on the write side
    fn flush_durable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().metadata()?.len())
    }
}

impl ByteStream for Cursor<Vec<u8>> {
    fn flush_durable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

/// Container configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Byte position of the 8-byte big-endian duration patched by `sync`.
    ///
    /// The metadata tag holding it is written by the caller; the default matches
    /// an `onMetaData` script tag placed first whose first property is `duration`.
    pub duration_offset: u64,
    /// Version and flags for newly created containers
    pub header: FileHeader,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            duration_offset: DEFAULT_DURATION_OFFSET,
            header: FileHeader::default(),
        }
    }
}

/// State shared by the reader and writer views
#[derive(Debug)]
pub(crate) struct Container<S> {
    pub(crate) stream: S,
    pub(crate) path: Option<PathBuf>,
    pub(crate) config: ContainerConfig,
}

impl<S> Container<S> {
    pub(crate) fn new(stream: S, path: Option<&Path>, config: ContainerConfig) -> Self {
        Container {
            stream,
            path: path.map(Path::to_path_buf),
            config,
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

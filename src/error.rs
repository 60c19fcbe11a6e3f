// Error type for FLV container operations

use std::io;

/// Errors produced while reading or writing an FLV container
#[derive(Debug, thiserror::Error)]
pub enum FlvError {
    /// The stream does not carry a valid FLV signature header
    #[error("file format error: {0}")]
    Format(String),

    /// A header, payload or back-pointer ended before all of its bytes were read
    #[error("truncated stream while reading {context}")]
    TruncatedStream { context: &'static str },

    /// Payload does not fit in the 24-bit data size field
    #[error("payload of {size} bytes exceeds the 24-bit tag data size")]
    OutOfRange { size: usize },

    /// The duration slot patched by `sync` does not lie inside the bytes written
    #[error("duration offset {offset} leaves no 8-byte slot inside the {written} bytes written")]
    DurationOffset { offset: u64, written: u64 },

    /// Underlying I/O failure, propagated as-is
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FlvError>;

impl FlvError {
    /// Map a short read onto `TruncatedStream`, leaving other I/O errors untouched
    pub(crate) fn from_read(err: io::Error, context: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FlvError::TruncatedStream { context }
        } else {
            FlvError::Io(err)
        }
    }

    /// True for truncation errors, which at end-of-stream are the normal stop signal
    pub fn is_truncated(&self) -> bool {
        matches!(self, FlvError::TruncatedStream { .. })
    }
}

//! Error types for `gamebryo-savegame`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for savegame parsing.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// The savegame file could not be opened.
    #[error("failed to {} {}: {}", .syscall, .path.display(), .source)]
    Open {
        /// The syscall that failed; always `"open"`.
        syscall: &'static str,
        /// The path the caller supplied.
        path: PathBuf,
        /// The OS error; errno is available through `raw_os_error`.
        #[source]
        source: std::io::Error,
    },

    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Format Errors ====================
    /// The file starts with none of the known savegame magics.
    #[error("invalid file header")]
    InvalidHeader,

    /// A read ran past the end of the stream.
    #[error("unexpected end of file at {offset} (read of {count} bytes)")]
    TruncatedRead {
        /// Stream length, where the cursor lands after the failure.
        offset: u64,
        /// Number of bytes the read asked for.
        count: usize,
    },

    /// A skip ran past the end of the stream.
    #[error("unexpected end of file at {offset} (skip of {count} bytes)")]
    TruncatedSkip {
        /// Stream length, where the cursor lands after the failure.
        offset: u64,
        /// Number of bytes the skip asked for.
        count: u64,
    },

    /// A semantic inconsistency was detected mid-parse: out-of-range
    /// screenshot dimensions, a missing field marker, an oversized plugin
    /// name.
    #[error("{message} at offset {offset}")]
    DataInvalid {
        /// Byte offset at which the inconsistency was detected.
        offset: u64,
        /// Description of what is invalid.
        message: String,
    },

    // ==================== Decoder Errors ====================
    /// A compressed region could not be decompressed.
    #[error("{codec} decompression failed at offset {offset}: {message}")]
    DecompressionFailed {
        /// `"zlib"` or `"LZ4"`.
        codec: &'static str,
        /// Offset in the outer stream when decompression was attempted.
        offset: u64,
        /// The error message from the decoder.
        message: String,
    },

    /// The screenshot pixel buffer could not be allocated.
    #[error("cannot allocate screenshot buffer of {bytes} bytes")]
    ScreenshotAllocation {
        /// The requested buffer size.
        bytes: usize,
    },

    /// Text could not be decoded under the configured codepage.
    #[error("text is not valid {codepage} data")]
    StringDecode {
        /// Name of the codepage the decode ran under.
        codepage: &'static str,
    },
}

impl Error {
    /// Byte offset the error was detected at, when one is known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::TruncatedRead { offset, .. }
            | Error::TruncatedSkip { offset, .. }
            | Error::DataInvalid { offset, .. }
            | Error::DecompressionFailed { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// A specialized Result type for savegame parsing.
pub type Result<T> = std::result::Result<T, Error>;

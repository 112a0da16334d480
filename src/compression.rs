//! Decompression of the compressed tail of newer save formats.
//!
//! Skyrim SE and Fallout 4 compress everything after the screenshot and
//! record `(uncompressed, compressed)` sizes plus a format discriminant in
//! the header. Decompression is eager and single-shot: the compressed
//! region is consumed from the active source in one read, inflated into an
//! owned buffer of exactly the declared size, and the buffer becomes the
//! new source for the rest of the parse.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{Error, Result};
use crate::source::MemorySource;

/// Compression scheme discriminant stored in the save header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Unrecognised discriminant; the stream is left untouched.
    Unknown(u16),
    /// Format 1.
    Zlib,
    /// Format 2. All retail saves observed so far use this.
    Lz4,
}

impl From<u16> for CompressionFormat {
    fn from(raw: u16) -> Self {
        match raw {
            1 => Self::Zlib,
            2 => Self::Lz4,
            other => Self::Unknown(other),
        }
    }
}

/// Consume `compressed` bytes from `source` and inflate them to
/// `uncompressed` bytes, yielding the replacement memory source.
///
/// Returns `Ok(None)` for unknown formats: the stream is left alone and
/// the next read fails naturally, which is the behavior callers rely on.
/// `offset` is the position in the outer stream, used to tag decoder
/// errors.
///
/// # Errors
/// Returns [`Error::TruncatedRead`] if the compressed region is shorter
/// than declared and [`Error::DecompressionFailed`] if the codec rejects
/// it.
pub(crate) fn decompress_region<R: Read + ?Sized>(
    source: &mut R,
    format: CompressionFormat,
    compressed: u32,
    uncompressed: u32,
    offset: u64,
) -> Result<Option<MemorySource>> {
    if let CompressionFormat::Unknown(raw) = format {
        tracing::warn!(format = raw, "unknown compression format, leaving stream as-is");
        return Ok(None);
    }

    let mut region = vec![0u8; compressed as usize];
    source.read_exact(&mut region).map_err(|_| Error::TruncatedRead {
        offset,
        count: compressed as usize,
    })?;

    let data = match format {
        CompressionFormat::Zlib => inflate_zlib(&region, uncompressed as usize, offset)?,
        CompressionFormat::Lz4 => lz4_flex::block::decompress(&region, uncompressed as usize)
            .map_err(|e| Error::DecompressionFailed {
                codec: "LZ4",
                offset,
                message: e.to_string(),
            })?,
        CompressionFormat::Unknown(_) => unreachable!(),
    };

    Ok(Some(MemorySource::new(data)))
}

fn inflate_zlib(region: &[u8], expected: usize, offset: u64) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(region);
    let mut data = Vec::with_capacity(expected);
    decoder
        .read_to_end(&mut data)
        .map_err(|e| Error::DecompressionFailed {
            codec: "zlib",
            offset,
            message: e.to_string(),
        })?;
    Ok(data)
}

//! Byte sources backing a parse.
//!
//! A parse starts on a file-backed source; when a format announces a
//! compressed tail, the decompression adapter replaces the active source
//! with an in-memory one holding the inflated region. Both are consumed
//! through the same trait object, so the framed reader never knows which
//! it is talking to.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};

/// A seekable byte stream the reader can own and swap out mid-parse.
pub(crate) trait ByteSource: Read + Seek + Send {}
impl<T: Read + Seek + Send> ByteSource for T {}

/// In-memory source owning a decompressed region.
pub(crate) type MemorySource = Cursor<Vec<u8>>;

/// Open the file-backed source for `path` in binary mode.
pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| Error::Open {
        syscall: "open",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

//! Framed reading of savegame fields.
//!
//! [`SaveReader`] is the stateful cursor every format parser drives. It
//! owns the active byte source as a trait object so the decompression
//! adapter can swap a memory region in mid-parse, and it carries the two
//! string conventions and the field-marker discipline as plain flags each
//! parser configures before it starts.

use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::compression::{self, CompressionFormat};
use crate::encoding::Codepage;
use crate::error::{Error, Result};
use crate::source::{self, ByteSource};
use crate::time::WinSystemTime;

/// Byte that terminates each field in Fallout 3 / New Vegas headers.
const FIELD_MARKER: u8 = b'|';

/// Longest plugin filename the plugin table accepts.
const PLUGIN_NAME_MAX: usize = 256;

/// Stateful cursor over the active byte source. All reads are
/// little-endian.
pub(crate) struct SaveReader {
    source: Box<dyn ByteSource>,
    has_field_markers: bool,
    bz_string: bool,
    codepage: Codepage,
}

impl SaveReader {
    /// Open a reader over the file at `path`, with the codepage picked
    /// from the filename.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            source: Box::new(source::open(path)?),
            has_field_markers: false,
            bz_string: false,
            codepage: Codepage::detect(path),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(data: Vec<u8>, codepage: Codepage) -> Self {
        Self {
            source: Box::new(std::io::Cursor::new(data)),
            has_field_markers: false,
            bz_string: false,
            codepage,
        }
    }

    /// bzstring mode: u8 length prefix, trailing NUL. (Oblivion.)
    pub(crate) fn set_bz_string(&mut self, on: bool) {
        self.bz_string = on;
    }

    /// Field-marker mode: every field is followed by `|`. (Fallout 3/NV,
    /// switched on after the format's probe step.)
    pub(crate) fn set_has_field_markers(&mut self, on: bool) {
        self.has_field_markers = on;
    }

    /// Current byte offset in the active source.
    pub(crate) fn offset(&mut self) -> u64 {
        self.source.stream_position().unwrap_or_default()
    }

    pub(crate) fn seek(&mut self, pos: u64) -> Result<()> {
        self.source.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Probe the file for `magic` at offset 0. A file shorter than the
    /// magic is a non-match, not an error.
    pub(crate) fn header(&mut self, magic: &[u8]) -> Result<bool> {
        self.source.seek(SeekFrom::Start(0))?;
        let mut found = vec![0u8; magic.len()];
        match self.source.read_exact(&mut found) {
            Ok(()) => Ok(found == magic),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Error for a read that ran off the end. The reported offset is the
    /// stream length, which is where the cursor lands after the failure.
    fn truncated(&mut self, count: usize) -> Error {
        let offset = self.source.seek(SeekFrom::End(0)).unwrap_or_default();
        Error::TruncatedRead { offset, count }
    }

    /// Raw read of exactly `buf.len()` bytes; no field marker handling.
    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.source.read_exact(buf).is_err() {
            return Err(self.truncated(buf.len()));
        }
        Ok(())
    }

    /// Consume exactly `count` bytes of opaque data.
    pub(crate) fn skip(&mut self, count: u64) -> Result<()> {
        let mut limited = (&mut self.source).take(count);
        let copied = std::io::copy(&mut limited, &mut std::io::sink())?;
        if copied < count {
            let offset = self.source.seek(SeekFrom::End(0)).unwrap_or_default();
            return Err(Error::TruncatedSkip { offset, count });
        }
        Ok(())
    }

    /// Consume and verify the `|` terminator when markers are active.
    fn field_marker(&mut self) -> Result<()> {
        if !self.has_field_markers {
            return Ok(());
        }
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        if byte[0] != FIELD_MARKER {
            let offset = self.offset();
            return Err(Error::DataInvalid {
                offset,
                message: format!("expected field marker, found 0x{:02x}", byte[0]),
            });
        }
        Ok(())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let value = match self.source.read_u8() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(1)),
        };
        self.field_marker()?;
        Ok(value)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let value = match self.source.read_u16::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(2)),
        };
        self.field_marker()?;
        Ok(value)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let value = match self.source.read_u32::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(4)),
        };
        self.field_marker()?;
        Ok(value)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        let value = match self.source.read_i32::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(4)),
        };
        self.field_marker()?;
        Ok(value)
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        let value = match self.source.read_u64::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(8)),
        };
        self.field_marker()?;
        Ok(value)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        let value = match self.source.read_f32::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(self.truncated(4)),
        };
        self.field_marker()?;
        Ok(value)
    }

    /// Read a string under the active convention: u8 length plus trailing
    /// NUL in bzstring mode, plain u16 length otherwise. Zero-length
    /// strings end at the length field; no payload or payload marker is
    /// consumed.
    pub(crate) fn read_string(&mut self) -> Result<String> {
        self.read_string_impl(None)
    }

    fn read_string_impl(&mut self, cap: Option<usize>) -> Result<String> {
        let length = if self.bz_string {
            usize::from(self.read_u8()?)
        } else {
            usize::from(self.read_u16()?)
        };
        self.check_plugin_name(length, cap)?;
        if length == 0 {
            return Ok(String::new());
        }
        let mut raw = vec![0u8; length];
        self.read_exact(&mut raw)?;
        if self.bz_string {
            raw.pop(); // trailing NUL
        }
        self.field_marker()?;
        self.codepage.decode(&raw)
    }

    /// u8-length-prefixed string without a NUL terminator. Oblivion's
    /// plugin table uses these even though the rest of that format is
    /// bzstrings.
    pub(crate) fn read_bstring(&mut self) -> Result<String> {
        self.read_bstring_impl(None)
    }

    fn read_bstring_impl(&mut self, cap: Option<usize>) -> Result<String> {
        let length = usize::from(self.read_u8()?);
        self.check_plugin_name(length, cap)?;
        if length == 0 {
            return Ok(String::new());
        }
        let mut raw = vec![0u8; length];
        self.read_exact(&mut raw)?;
        self.field_marker()?;
        self.codepage.decode(&raw)
    }

    /// Read the 16-byte WINSYSTEMTIME record.
    pub(crate) fn read_win_system_time(&mut self) -> Result<WinSystemTime> {
        Ok(WinSystemTime {
            year: self.read_u16()?,
            month: self.read_u16()?,
            day_of_week: self.read_u16()?,
            day: self.read_u16()?,
            hour: self.read_u16()?,
            minute: self.read_u16()?,
            second: self.read_u16()?,
            millisecond: self.read_u16()?,
        })
    }

    /// Read the main plugin list: u8 count, one name each.
    pub(crate) fn read_plugins(&mut self, bstrings: bool) -> Result<Vec<String>> {
        let count = self.read_u8()?;
        let mut plugins = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let name = if bstrings {
                self.read_bstring_impl(Some(PLUGIN_NAME_MAX))?
            } else {
                self.read_string_impl(Some(PLUGIN_NAME_MAX))?
            };
            plugins.push(name);
        }
        Ok(plugins)
    }

    /// Read the light-plugin list (u16 count) into the same table.
    pub(crate) fn read_light_plugins(&mut self, plugins: &mut Vec<String>) -> Result<()> {
        let count = self.read_u16()?;
        for _ in 0..count {
            plugins.push(self.read_string_impl(Some(PLUGIN_NAME_MAX))?);
        }
        Ok(())
    }

    /// Reject a plugin name whose declared length exceeds the cap. The
    /// cap applies to the raw on-disk bytes, checked before anything is
    /// allocated or decoded.
    fn check_plugin_name(&mut self, length: usize, cap: Option<usize>) -> Result<()> {
        let Some(cap) = cap else {
            return Ok(());
        };
        if length > cap {
            let offset = self.offset();
            return Err(Error::DataInvalid {
                offset,
                message: format!("plugin name of {length} bytes exceeds {cap}"),
            });
        }
        Ok(())
    }

    /// Treat the rest of the stream as a compressed region: consume
    /// `compressed` bytes, inflate them to `uncompressed`, and swap the
    /// result in as the active source. Unknown formats leave the source
    /// untouched.
    pub(crate) fn set_compression(
        &mut self,
        raw_format: u16,
        compressed: u32,
        uncompressed: u32,
    ) -> Result<()> {
        let format = CompressionFormat::from(raw_format);
        let offset = self.offset();
        tracing::debug!(?format, compressed, uncompressed, offset, "entering compressed region");
        if let Some(memory) =
            compression::decompress_region(&mut self.source, format, compressed, uncompressed, offset)?
        {
            self.source = Box::new(memory);
        }
        Ok(())
    }
}

//! Embedded screenshot decoding.
//!
//! Every format stores a small raw-pixel screenshot in its header — RGB in
//! the older titles, RGBA in Skyrim SE and Fallout 4. Output is always
//! RGBA8 so hosts get one pixel layout regardless of source format.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::SaveReader;

/// Hard cap on either screenshot dimension. Anything at or above this is
/// treated as a corrupt header rather than an allocation request.
const DIMENSION_MAX: u32 = 2000;

/// Width and height of the embedded screenshot, in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Reject dimensions a real save could never contain. `offset` is the
/// position of the width field, so corruption reports point at the bytes
/// that caused them.
pub(crate) fn validate_dimensions(width: u32, height: u32, offset: u64) -> Result<()> {
    if width >= DIMENSION_MAX || height >= DIMENSION_MAX {
        return Err(Error::DataInvalid {
            offset,
            message: format!("screenshot dimensions {width}x{height} out of range"),
        });
    }
    Ok(())
}

/// Read `width` and `height` from the stream, then the pixels that follow.
pub(crate) fn read_embedded(reader: &mut SaveReader, alpha: bool) -> Result<(Dimensions, Vec<u8>)> {
    let dims_offset = reader.offset();
    let width = reader.read_u32()?;
    let height = reader.read_u32()?;
    read_pixels(reader, width, height, alpha, dims_offset)
}

/// Decode `width`×`height` raw pixels into an RGBA8 buffer. `dims_offset`
/// is where the dimensions were read, for error reporting.
pub(crate) fn read_pixels(
    reader: &mut SaveReader,
    width: u32,
    height: u32,
    alpha: bool,
    dims_offset: u64,
) -> Result<(Dimensions, Vec<u8>)> {
    validate_dimensions(width, height, dims_offset)?;

    let bpp = if alpha { 4 } else { 3 };
    let bytes = width as usize * height as usize * bpp;

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(bytes)
        .map_err(|_| Error::ScreenshotAllocation { bytes })?;
    pixels.resize(bytes, 0);
    reader.read_exact(&mut pixels)?;

    let rgba = if alpha { pixels } else { expand_rgb(&pixels) };
    Ok((Dimensions { width, height }, rgba))
}

/// Append an opaque alpha channel to packed RGB triplets.
fn expand_rgb(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(px);
        rgba.push(0xFF);
    }
    rgba
}

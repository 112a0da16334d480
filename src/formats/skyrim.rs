//! The Elder Scrolls V: Skyrim, original and Special Edition
//! (`TESV_SAVEGAME`).

#![allow(clippy::cast_possible_truncation)]

use crate::error::Result;
use crate::reader::SaveReader;
use crate::save::SaveGame;
use crate::screenshot;
use crate::time;

/// Header versions below this are the 2011 release. Everything later is
/// Special Edition, which stores an RGBA screenshot and compresses the
/// rest of the file after it.
const SPECIAL_EDITION_VERSION: u32 = 0x0C;

/// Form versions from this one on append a light-plugin list.
const LIGHT_PLUGIN_FORM_VERSION: u8 = 0x4E;

pub(crate) fn read(reader: &mut SaveReader, save: &mut SaveGame, quick: bool) -> Result<()> {
    reader.skip(4)?; // header size
    let version = reader.read_u32()?;
    save.save_number = reader.read_u32()?;
    save.character_name = reader.read_string()?;
    save.character_level = reader.read_u32()? as u16;
    save.location = reader.read_string()?;
    save.play_time = reader.read_string()?;
    let _race = reader.read_string()?;
    reader.skip(2)?; // player gender
    reader.skip(8)?; // experience gathered, experience required
    save.creation_time = time::filetime_to_epoch(reader.read_u64()?);

    if quick {
        return Ok(());
    }

    if version < SPECIAL_EDITION_VERSION {
        let (size, pixels) = screenshot::read_embedded(reader, false)?;
        save.screenshot_size = size;
        save.screenshot = pixels;
    } else {
        let dims_offset = reader.offset();
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        screenshot::validate_dimensions(width, height, dims_offset)?;
        let compression_format = reader.read_u16()?;

        let (size, pixels) = screenshot::read_pixels(reader, width, height, true, dims_offset)?;
        save.screenshot_size = size;
        save.screenshot = pixels;

        // the rest of the file is compressed in Skyrim SE
        let uncompressed = reader.read_u32()?;
        let compressed = reader.read_u32()?;
        reader.set_compression(compression_format, compressed, uncompressed)?;
    }

    let form_version = reader.read_u8()?;
    reader.skip(4)?; // plugin info size
    save.plugins = reader.read_plugins(false)?;
    if form_version >= LIGHT_PLUGIN_FORM_VERSION {
        reader.read_light_plugins(&mut save.plugins)?;
    }
    Ok(())
}

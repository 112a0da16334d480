//! Fallout 4 (`FO4_SAVEGAME`).

#![allow(clippy::cast_possible_truncation)]

use crate::error::Result;
use crate::reader::SaveReader;
use crate::save::SaveGame;
use crate::screenshot;
use crate::time;

/// Form versions from this one on append a light-plugin list.
const LIGHT_PLUGIN_FORM_VERSION: u8 = 0x44;

pub(crate) fn read(reader: &mut SaveReader, save: &mut SaveGame, quick: bool) -> Result<()> {
    reader.skip(4)?; // header size
    reader.skip(4)?; // header version

    save.save_number = reader.read_u32()?;
    save.character_name = reader.read_string()?;
    save.character_level = reader.read_u32()? as u16;
    save.location = reader.read_string()?;
    save.play_time = reader.read_string()?; // engine text, hh.mm.ss
    let _race = reader.read_string()?;
    reader.skip(2)?; // player gender
    reader.skip(8)?; // experience gathered, experience required
    save.creation_time = time::filetime_to_epoch(reader.read_u64()?);

    if quick {
        return Ok(());
    }

    let (size, pixels) = screenshot::read_embedded(reader, true)?;
    save.screenshot_size = size;
    save.screenshot = pixels;

    let form_version = reader.read_u8()?;
    let _game_version = reader.read_string()?;
    reader.skip(4)?; // plugin info size
    save.plugins = reader.read_plugins(false)?;
    if form_version >= LIGHT_PLUGIN_FORM_VERSION {
        reader.read_light_plugins(&mut save.plugins)?;
    }
    Ok(())
}

//! Fallout 3 and Fallout: New Vegas (`FO3SAVEGAME`).

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::error::Result;
use crate::reader::SaveReader;
use crate::save::SaveGame;
use crate::screenshot;

pub(crate) fn read(reader: &mut SaveReader, save: &mut SaveGame, quick: bool) -> Result<()> {
    reader.skip(4)?; // header size
    reader.skip(4)?; // file version, always 0x30
    reader.skip(1)?; // delimiter

    // New Vegas shares the magic, extension, and version but inserts an
    // extra |-terminated field here. Scan forward: a field of exactly
    // 4 bytes is FO3's screenshot width, so rewind and re-read it as such.
    let probe_start = reader.offset();
    let mut field_size = 0u32;
    loop {
        let byte = reader.read_u8()?;
        field_size += 1;
        if byte == b'|' {
            break;
        }
    }
    if field_size == 5 {
        reader.seek(probe_start)?;
    }

    reader.set_has_field_markers(true);

    let dims_offset = reader.offset();
    let width = reader.read_u32()?;
    let height = reader.read_u32()?;
    screenshot::validate_dimensions(width, height, dims_offset)?;

    save.save_number = reader.read_u32()?;
    save.character_name = reader.read_string()?;
    let _karma_title = reader.read_string()?;
    save.character_level = reader.read_i32()? as u16;
    save.location = reader.read_string()?;
    save.play_time = reader.read_string()?;

    if !quick {
        let (size, pixels) = screenshot::read_pixels(reader, width, height, false, dims_offset)?;
        save.screenshot_size = size;
        save.screenshot = pixels;
        reader.skip(5)?; // unknown byte, size of plugin data
        save.plugins = reader.read_plugins(false)?;
    }
    Ok(())
}

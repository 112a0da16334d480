//! The Elder Scrolls IV: Oblivion (`TES4SAVEGAME`).

use crate::error::Result;
use crate::reader::SaveReader;
use crate::save::SaveGame;
use crate::screenshot;

/// Oblivion stores its strings as bzstrings and the screenshot without an
/// alpha channel. The plugin table alone uses plain bstrings.
pub(crate) fn read(reader: &mut SaveReader, save: &mut SaveGame, quick: bool) -> Result<()> {
    reader.set_bz_string(true);

    reader.skip(1)?; // major version
    reader.skip(1)?; // minor version
    reader.skip(16)?; // exe last-modified SYSTEMTIME
    reader.skip(4)?; // header version
    reader.skip(4)?; // header size

    save.save_number = reader.read_u32()?;
    save.character_name = reader.read_string()?;
    save.character_level = reader.read_u16()?;
    save.location = reader.read_string()?;

    let game_days = reader.read_f32()?;
    reader.skip(4)?; // game ticks
    save.play_time = play_time_from_days(game_days);

    save.creation_time = reader.read_win_system_time()?.to_epoch();

    if !quick {
        reader.skip(4)?; // screenshot byte size, trusted as-is
        let (size, pixels) = screenshot::read_embedded(reader, false)?;
        save.screenshot_size = size;
        save.screenshot = pixels;
        save.plugins = reader.read_plugins(true)?;
    }
    Ok(())
}

/// Oblivion has no textual playtime field; synthesize one from the
/// fractional day counter, truncating toward zero.
fn play_time_from_days(game_days: f32) -> String {
    let days = game_days as u32;
    let hours = (game_days * 24.0) as u32 % 24;
    format!("{days} days, {hours} hours")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_time_truncates_days_and_hours() {
        assert_eq!(play_time_from_days(3.5), "3 days, 12 hours");
        assert_eq!(play_time_from_days(0.0), "0 days, 0 hours");
        assert_eq!(play_time_from_days(48.99), "48 days, 23 hours");
    }
}

//! Per-format header parsers and the magic dispatcher.
//!
//! All four formats open with an ASCII magic string; everything after it
//! is format-specific. Parsers consume fields strictly in file order and
//! fill the caller's [`SaveGame`] as they go.

mod fallout3;
mod fallout4;
mod oblivion;
mod skyrim;

use crate::error::{Error, Result};
use crate::reader::SaveReader;
use crate::save::SaveGame;

const OBLIVION_MAGIC: &[u8] = b"TES4SAVEGAME";
const SKYRIM_MAGIC: &[u8] = b"TESV_SAVEGAME";
const FALLOUT3_MAGIC: &[u8] = b"FO3SAVEGAME";
const FALLOUT4_MAGIC: &[u8] = b"FO4_SAVEGAME";

/// Probe the magics in fixed order and run the matching parser.
pub(crate) fn dispatch(reader: &mut SaveReader, save: &mut SaveGame, quick: bool) -> Result<()> {
    if reader.header(OBLIVION_MAGIC)? {
        tracing::debug!("detected Oblivion save");
        oblivion::read(reader, save, quick)
    } else if reader.header(SKYRIM_MAGIC)? {
        tracing::debug!("detected Skyrim save");
        skyrim::read(reader, save, quick)
    } else if reader.header(FALLOUT3_MAGIC)? {
        tracing::debug!("detected Fallout 3 / New Vegas save");
        fallout3::read(reader, save, quick)
    } else if reader.header(FALLOUT4_MAGIC)? {
        tracing::debug!("detected Fallout 4 save");
        fallout4::read(reader, save, quick)
    } else {
        Err(Error::InvalidHeader)
    }
}

//! Reads savegame headers from the Gamebryo/Creation engine family:
//! The Elder Scrolls IV: Oblivion, The Elder Scrolls V: Skyrim (original
//! and Special Edition), Fallout 3 / New Vegas, and Fallout 4.
//!
//! One call parses one file into a [`SaveGame`] summary: character name and
//! level, location, save slot, in-game playtime, real-world creation
//! timestamp, the active plugin list, and (unless `quick` is set) the
//! embedded screenshot decoded to RGBA8. The newer formats compress
//! everything after the screenshot; the reader swaps a decompressed memory
//! region in mid-parse, so callers never see the difference.
//!
//! ```no_run
//! use gamebryo_savegame::SaveGame;
//!
//! let save = SaveGame::new("quicksave.ess", false)?;
//! println!("{} (level {}) at {}", save.character_name(),
//!          save.character_level(), save.location());
//! # Ok::<(), gamebryo_savegame::Error>(())
//! ```

pub mod compression;
pub mod encoding;
pub mod error;
mod formats;
mod reader;
pub mod save;
pub mod screenshot;
mod source;
mod time;

// Re-exports for convenience
pub use error::{Error, Result};
pub use save::{create, SaveGame};
pub use screenshot::Dimensions;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::encoding::Codepage;
    pub use crate::error::{Error, Result};
    pub use crate::save::{create, SaveGame};
    pub use crate::screenshot::Dimensions;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

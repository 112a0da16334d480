//! The parsed savegame summary and its entry points.

#![allow(clippy::cast_possible_truncation)]

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::error::Result;
use crate::formats;
use crate::reader::SaveReader;
use crate::screenshot::Dimensions;

/// Game-agnostic summary of one savegame file.
///
/// Built by the per-format parsers, one instance per file. With
/// `quick = true` the screenshot and the plugin list that trails it are
/// skipped: `screenshot_size` stays zero and `screenshot`/`plugins` stay
/// empty, while every other field is populated normally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveGame {
    pub(crate) file_name: PathBuf,
    pub(crate) character_name: String,
    pub(crate) character_level: u16,
    pub(crate) location: String,
    pub(crate) save_number: u32,
    pub(crate) play_time: String,
    pub(crate) creation_time: u32,
    pub(crate) plugins: Vec<String>,
    pub(crate) screenshot_size: Dimensions,
    /// RGBA8 pixels, `4 * width * height` bytes. Not serialized; hosts
    /// fetch pixels through [`get_screenshot`](Self::get_screenshot).
    #[serde(skip)]
    pub(crate) screenshot: Vec<u8>,
}

impl SaveGame {
    /// Parse the savegame at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, matches no known
    /// format, or is malformed; see [`Error`](crate::Error) for the
    /// variants.
    pub fn new(path: impl AsRef<Path>, quick: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = SaveReader::open(path)?;
        let mut save = SaveGame {
            file_name: path.to_path_buf(),
            character_name: String::new(),
            character_level: 0,
            location: String::new(),
            save_number: 0,
            play_time: String::new(),
            creation_time: 0,
            plugins: Vec::new(),
            screenshot_size: Dimensions::default(),
            screenshot: Vec::new(),
        };
        formats::dispatch(&mut reader, &mut save, quick)?;

        // Formats that embed no timestamp (and zeroed ones) fall back to
        // the file's own mtime; stat failure leaves the field 0.
        if save.creation_time == 0 {
            if let Some(mtime) = file_mtime(path) {
                save.creation_time = mtime;
            }
        }
        Ok(save)
    }

    /// The path this summary was parsed from.
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    pub fn character_level(&self) -> u16 {
        self.character_level
    }

    /// In-game place name, possibly empty.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Slot/sequence number of the save.
    pub fn save_number(&self) -> u32 {
        self.save_number
    }

    /// In-game playtime: the engine's own text where the format has one,
    /// synthesized `"D days, H hours"` for Oblivion.
    pub fn play_time(&self) -> &str {
        &self.play_time
    }

    /// Creation time in seconds since the Unix epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Active plugins in load order; duplicates pass through untouched.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn screenshot_size(&self) -> Dimensions {
        self.screenshot_size
    }

    /// Borrow the raw RGBA8 screenshot buffer (empty in quick mode).
    pub fn screenshot_data(&self) -> &[u8] {
        &self.screenshot
    }

    /// Copy up to `dest.len()` screenshot bytes into a host-owned buffer.
    pub fn get_screenshot(&self, dest: &mut [u8]) {
        let n = dest.len().min(self.screenshot.len());
        dest[..n].copy_from_slice(&self.screenshot[..n]);
    }
}

fn file_mtime(path: &Path) -> Option<u32> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(secs as u32)
}

/// Parse `path` on a worker thread and hand the outcome to `completion`.
///
/// The completion runs on the worker thread; a host that needs the result
/// on its own observer thread marshals it there itself. Parses of distinct
/// files are independent and may run concurrently.
pub fn create<P, F>(path: P, quick: bool, completion: F)
where
    P: Into<PathBuf>,
    F: FnOnce(Result<SaveGame>) + Send + 'static,
{
    let path = path.into();
    thread::spawn(move || completion(SaveGame::new(&path, quick)));
}

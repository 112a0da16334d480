//! Codepage handling for savegame strings.
//!
//! The engines write 8-bit text in whatever ANSI/OEM codepage the game ran
//! under and record nothing about which one that was. The only usable
//! signal is the save's own filename: players name saves after their
//! characters, so a mostly-Cyrillic stem means the strings inside are
//! Windows-1251. Everything else is decoded as UTF-8 with a codepage-850
//! retry for the byte values UTF-8 rejects.

use std::path::Path;

use crate::error::{Error, Result};

/// Codepage a save's strings are decoded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codepage {
    /// Strict UTF-8; undecodable input is an error.
    Utf8,
    /// OEM codepage 850 (what the Windows-side LATIN1 tag maps to).
    Latin1,
    /// Windows-1251.
    Cyrillic,
    /// Strict UTF-8, retried as codepage 850 on invalid sequences.
    #[default]
    Utf8OrLatin1,
}

impl Codepage {
    /// Pick the codepage for a save from its filename.
    ///
    /// The stem (basename minus the 4-character extension) is stripped of
    /// digits, `-`, `.` and spaces — slot numbering, not names — and if
    /// more than half of what remains is Cyrillic the save is decoded as
    /// Windows-1251.
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let chars: Vec<char> = name.chars().collect();
        let stem = &chars[..chars.len().saturating_sub(4)];

        let significant: Vec<char> = stem
            .iter()
            .copied()
            .filter(|c| !matches!(c, '0'..='9' | '-' | '.' | ' '))
            .collect();
        if significant.is_empty() {
            return Self::Utf8OrLatin1;
        }

        let cyrillic = significant
            .iter()
            .filter(|c| ('\u{0400}'..='\u{052f}').contains(*c))
            .count();
        if cyrillic * 2 > significant.len() {
            Self::Cyrillic
        } else {
            Self::Utf8OrLatin1
        }
    }

    /// Decode raw save bytes to a UTF-8 string.
    ///
    /// # Errors
    /// Returns [`Error::StringDecode`] only in strict [`Codepage::Utf8`]
    /// mode; the single-byte codepages map every input byte.
    pub fn decode(self, raw: &[u8]) -> Result<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| Error::StringDecode { codepage: "UTF-8" }),
            Self::Utf8OrLatin1 => match std::str::from_utf8(raw) {
                Ok(text) => Ok(text.to_owned()),
                Err(_) => Ok(decode_cp850(raw)),
            },
            Self::Latin1 => Ok(decode_cp850(raw)),
            Self::Cyrillic => {
                // undecodable bytes become U+FFFD, matching the lenient
                // MultiByteToWideChar conversion the format grew up with
                let (text, _, _) = encoding_rs::WINDOWS_1251.decode(raw);
                Ok(text.into_owned())
            }
        }
    }
}

fn decode_cp850(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP850_HIGH[(b - 0x80) as usize]
            }
        })
        .collect()
}

/// Upper half of codepage 850. `encoding_rs` only ships the WHATWG
/// encodings, which exclude the DOS codepages, so the mapping lives here.
const CP850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', // 0x80
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ', // 0x90
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»', // 0xA0
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐', // 0xB0
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤', // 0xC0
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀', // 0xD0
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´', // 0xE0
    '\u{ad}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■',
    '\u{a0}', // 0xF0
];

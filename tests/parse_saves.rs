//! End-to-end parses of crafted minimal save files, one per format.

use std::io::Write as _;
use std::time::UNIX_EPOCH;

use chrono::TimeZone;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use gamebryo_savegame::{Error, SaveGame};
use tempfile::NamedTempFile;

// ==================== fixture building blocks ====================

fn u16le(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn u32le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn u64le(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn f32le(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// u16-length-prefixed string, no terminator (Skyrim, Fallout 4).
fn wstring(out: &mut Vec<u8>, s: &str) {
    u16le(out, s.len() as u16);
    out.extend_from_slice(s.as_bytes());
}

/// bzstring: u8 length including the trailing NUL (Oblivion).
fn bzstring(out: &mut Vec<u8>, s: &str) {
    out.push(s.len() as u8 + 1);
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// bstring: u8 length, no terminator (Oblivion plugin table).
fn bstring(out: &mut Vec<u8>, s: &str) {
    out.push(s.len() as u8);
    out.extend_from_slice(s.as_bytes());
}

/// Field-marker variants for Fallout 3 / New Vegas: every primitive —
/// string length prefixes included — is followed by `|`.
fn u32_m(out: &mut Vec<u8>, v: u32) {
    u32le(out, v);
    out.push(b'|');
}

fn i32_m(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
    out.push(b'|');
}

fn wstring_m(out: &mut Vec<u8>, s: &str) {
    u16le(out, s.len() as u16);
    out.push(b'|');
    out.extend_from_slice(s.as_bytes());
    out.push(b'|');
}

fn write_save(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".ess")
        .tempfile()
        .expect("temp file");
    file.write_all(bytes).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

// ==================== per-format fixtures ====================

fn oblivion_fixture(full: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"TES4SAVEGAME");
    out.push(0); // major version
    out.push(125); // minor version
    out.extend_from_slice(&[0u8; 16]); // exe last-modified SYSTEMTIME
    u32le(&mut out, 125); // header version
    u32le(&mut out, 0); // header size
    u32le(&mut out, 1); // save number
    bzstring(&mut out, "Hero");
    u16le(&mut out, 5); // level
    bzstring(&mut out, "Cyrodiil");
    f32le(&mut out, 1.5); // game days
    u32le(&mut out, 0); // game ticks
    for v in [2008u16, 3, 5, 21, 12, 0, 0, 0] {
        u16le(&mut out, v); // save-time SYSTEMTIME
    }
    if full {
        u32le(&mut out, 12); // screenshot byte size
        u32le(&mut out, 2); // width
        u32le(&mut out, 2); // height
        out.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        out.push(1); // plugin count
        bstring(&mut out, "Oblivion.esm");
    }
    out
}

fn skyrim_header(version: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"TESV_SAVEGAME");
    u32le(&mut out, 0); // header size
    u32le(&mut out, version);
    u32le(&mut out, 5); // save number
    wstring(&mut out, "Dovah");
    u32le(&mut out, 10); // level
    wstring(&mut out, "Whiterun");
    wstring(&mut out, "1 hours 2 minutes");
    wstring(&mut out, "NordRace");
    u16le(&mut out, 0); // gender
    f32le(&mut out, 0.0); // experience gathered
    f32le(&mut out, 0.0); // experience required
    u64le(&mut out, 130_645_440_000_000_000); // 2015-01-01T00:00:00Z
    out
}

fn skyrim_legacy_fixture() -> Vec<u8> {
    let mut out = skyrim_header(9);
    u32le(&mut out, 2); // width
    u32le(&mut out, 2); // height
    out.extend_from_slice(&[0u8; 12]); // RGB pixels
    out.push(0x4D); // form version, below the light-plugin gate
    u32le(&mut out, 0); // plugin info size
    out.push(1); // plugin count
    wstring(&mut out, "Skyrim.esm");
    out
}

/// Skyrim SE: screenshot in the clear, everything after it compressed.
/// Returns the bytes and the offset of the width field.
fn skyrim_se_fixture(width: u32, compression_format: u16) -> (Vec<u8>, u64) {
    let mut out = skyrim_header(12);
    let width_pos = out.len() as u64;
    u32le(&mut out, width);
    u32le(&mut out, 2); // height
    u16le(&mut out, compression_format);
    out.extend_from_slice(&[0xEEu8; 16]); // RGBA pixels

    let mut body = Vec::new();
    body.push(0x4E); // form version, light plugins present
    u32le(&mut body, 0); // plugin info size
    body.push(1); // plugin count
    wstring(&mut body, "Skyrim.esm");
    u16le(&mut body, 1); // light plugin count
    wstring(&mut body, "ccA.esl");

    let compressed = match compression_format {
        1 => zlib_compress(&body),
        2 => lz4_flex::block::compress(&body),
        _ => body.clone(),
    };
    u32le(&mut out, body.len() as u32); // uncompressed
    u32le(&mut out, compressed.len() as u32); // compressed
    out.extend_from_slice(&compressed);
    (out, width_pos)
}

fn fallout3_fixture(new_vegas: bool, full: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"FO3SAVEGAME");
    u32le(&mut out, 0); // header size
    u32le(&mut out, 0x30); // file version
    out.push(b'|'); // delimiter
    if new_vegas {
        // the extra field FO3 lacks; three bytes, so the probe keeps going
        out.extend_from_slice(b"123");
        out.push(b'|');
    }
    u32_m(&mut out, 2); // width
    u32_m(&mut out, 2); // height
    u32_m(&mut out, 7); // save number
    wstring_m(&mut out, "Wanderer");
    wstring_m(&mut out, "Messiah"); // karma title, discarded
    i32_m(&mut out, 20); // level
    wstring_m(&mut out, "Megaton");
    wstring_m(&mut out, "10.23.35");
    if full {
        out.extend_from_slice(&[9u8; 12]); // RGB pixels, no markers
        out.extend_from_slice(&[b'|', 0, 0, 0, 0]); // unknown + plugin data size
        out.push(1); // plugin count
        out.push(b'|');
        wstring_m(&mut out, "Fallout3.esm");
    }
    out
}

fn fallout4_fixture(form_version: u8, full: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"FO4_SAVEGAME");
    u32le(&mut out, 0); // header size
    u32le(&mut out, 11); // header version
    u32le(&mut out, 11); // save number
    wstring(&mut out, "Sole Survivor");
    u32le(&mut out, 50); // level
    wstring(&mut out, "Sanctuary Hills");
    wstring(&mut out, "1h 30m 0s");
    wstring(&mut out, "HumanRace");
    u16le(&mut out, 1); // gender
    f32le(&mut out, 0.0);
    f32le(&mut out, 0.0);
    u64le(&mut out, 132_223_104_000_000_000); // 2020-01-08T00:00:00Z
    if full {
        u32le(&mut out, 2); // width
        u32le(&mut out, 2); // height
        out.extend_from_slice(&[7u8; 16]); // RGBA pixels
        out.push(form_version);
        wstring(&mut out, "1.10.163.0"); // game version
        u32le(&mut out, 0); // plugin info size
        out.push(1); // plugin count
        wstring(&mut out, "Fallout4.esm");
        if form_version >= 0x44 {
            u16le(&mut out, 1); // light plugin count
            wstring(&mut out, "cc.esl");
        }
    }
    out
}

// ==================== scenarios ====================

#[test]
fn oblivion_quick_reads_header_fields() {
    let file = write_save(&oblivion_fixture(false));
    let save = SaveGame::new(file.path(), true).unwrap();

    assert_eq!(save.character_name(), "Hero");
    assert_eq!(save.character_level(), 5);
    assert_eq!(save.location(), "Cyrodiil");
    assert_eq!(save.save_number(), 1);
    assert_eq!(save.play_time(), "1 days, 12 hours");
    assert!(save.plugins().is_empty());
    assert_eq!(save.screenshot_size().width(), 0);
    assert_eq!(save.screenshot_size().height(), 0);
    assert!(save.screenshot_data().is_empty());

    // the embedded SYSTEMTIME is recorded in local time
    let expected = chrono::Local
        .with_ymd_and_hms(2008, 3, 21, 12, 0, 0)
        .earliest()
        .unwrap()
        .timestamp() as u32;
    assert_eq!(save.creation_time(), expected);
}

#[test]
fn oblivion_full_reads_screenshot_and_plugins() {
    let file = write_save(&oblivion_fixture(true));
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.plugins(), ["Oblivion.esm"]);
    assert_eq!(save.screenshot_size().width(), 2);
    assert_eq!(save.screenshot_size().height(), 2);
    // RGB expanded to RGBA with opaque alpha
    assert_eq!(save.screenshot_data().len(), 16);
    assert_eq!(&save.screenshot_data()[..4], &[1, 2, 3, 0xFF]);
}

#[test]
fn quick_and_full_agree_on_non_image_fields() {
    for fixture in [oblivion_fixture(true), fallout4_fixture(0x44, true)] {
        let file = write_save(&fixture);
        let quick = SaveGame::new(file.path(), true).unwrap();
        let full = SaveGame::new(file.path(), false).unwrap();

        assert_eq!(quick.character_name(), full.character_name());
        assert_eq!(quick.character_level(), full.character_level());
        assert_eq!(quick.location(), full.location());
        assert_eq!(quick.save_number(), full.save_number());
        assert_eq!(quick.play_time(), full.play_time());
        assert_eq!(quick.creation_time(), full.creation_time());
    }
}

#[test]
fn parsing_twice_yields_identical_summaries() {
    let file = write_save(&skyrim_legacy_fixture());
    let first = SaveGame::new(file.path(), false).unwrap();
    let second = SaveGame::new(file.path(), false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn skyrim_legacy_parses_and_converts_filetime() {
    let file = write_save(&skyrim_legacy_fixture());
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.character_name(), "Dovah");
    assert_eq!(save.character_level(), 10);
    assert_eq!(save.location(), "Whiterun");
    assert_eq!(save.play_time(), "1 hours 2 minutes");
    assert_eq!(save.creation_time(), 1_420_070_400);
    assert_eq!(save.plugins(), ["Skyrim.esm"]);
    assert_eq!(save.screenshot_data().len(), 16);
}

#[test]
fn skyrim_se_reads_plugins_from_zlib_region() {
    let (bytes, _) = skyrim_se_fixture(2, 1);
    let file = write_save(&bytes);
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.plugins(), ["Skyrim.esm", "ccA.esl"]);
    assert_eq!(save.screenshot_size().width(), 2);
    assert_eq!(save.screenshot_data().len(), 16);
}

#[test]
fn skyrim_se_reads_plugins_from_lz4_region() {
    let (bytes, _) = skyrim_se_fixture(2, 2);
    let file = write_save(&bytes);
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.plugins(), ["Skyrim.esm", "ccA.esl"]);
}

#[test]
fn corrupt_dimensions_fail_at_the_width_field() {
    let (bytes, width_pos) = skyrim_se_fixture(3000, 1);
    let file = write_save(&bytes);
    let err = SaveGame::new(file.path(), false).unwrap_err();

    assert!(matches!(err, Error::DataInvalid { .. }));
    assert_eq!(err.offset(), Some(width_pos));
}

#[test]
fn fallout3_probe_rewinds_to_the_width_field() {
    let file = write_save(&fallout3_fixture(false, true));
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.character_name(), "Wanderer");
    assert_eq!(save.character_level(), 20);
    assert_eq!(save.location(), "Megaton");
    assert_eq!(save.play_time(), "10.23.35");
    assert_eq!(save.save_number(), 7);
    assert_eq!(save.plugins(), ["Fallout3.esm"]);
    assert_eq!(save.screenshot_data().len(), 16);
}

#[test]
fn new_vegas_extra_field_skips_the_rewind() {
    let fo3 = write_save(&fallout3_fixture(false, true));
    let nv = write_save(&fallout3_fixture(true, true));
    let fo3 = SaveGame::new(fo3.path(), false).unwrap();
    let nv = SaveGame::new(nv.path(), false).unwrap();

    // both land on the same fields once the probe has settled the layout
    assert_eq!(fo3.character_name(), nv.character_name());
    assert_eq!(fo3.character_level(), nv.character_level());
    assert_eq!(fo3.location(), nv.location());
    assert_eq!(fo3.play_time(), nv.play_time());
    assert_eq!(fo3.plugins(), nv.plugins());
}

#[test]
fn fallout3_creation_time_falls_back_to_mtime() {
    let file = write_save(&fallout3_fixture(false, true));
    let save = SaveGame::new(file.path(), false).unwrap();

    let mtime = std::fs::metadata(file.path())
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    assert_eq!(save.creation_time(), mtime);
}

#[test]
fn fallout4_appends_light_plugins() {
    let file = write_save(&fallout4_fixture(0x44, true));
    let save = SaveGame::new(file.path(), false).unwrap();

    assert_eq!(save.plugins(), ["Fallout4.esm", "cc.esl"]);
    assert_eq!(save.creation_time(), 1_578_441_600);
    assert_eq!(save.character_name(), "Sole Survivor");
    assert_eq!(save.character_level(), 50);
}

#[test]
fn fallout4_below_form_gate_has_no_light_plugins() {
    let file = write_save(&fallout4_fixture(0x43, true));
    let save = SaveGame::new(file.path(), false).unwrap();
    assert_eq!(save.plugins(), ["Fallout4.esm"]);
}

#[test]
fn screenshot_length_is_always_four_bytes_per_pixel() {
    for fixture in [
        oblivion_fixture(true),
        skyrim_legacy_fixture(),
        skyrim_se_fixture(2, 1).0,
        fallout3_fixture(false, true),
        fallout4_fixture(0x44, true),
    ] {
        let file = write_save(&fixture);
        let save = SaveGame::new(file.path(), false).unwrap();
        let size = save.screenshot_size();
        assert_eq!(
            save.screenshot_data().len(),
            4 * size.width() as usize * size.height() as usize
        );
    }
}

#[test]
fn get_screenshot_copies_at_most_the_destination_length() {
    let file = write_save(&oblivion_fixture(true));
    let save = SaveGame::new(file.path(), false).unwrap();

    let mut small = [0u8; 6];
    save.get_screenshot(&mut small);
    assert_eq!(&small[..], &save.screenshot_data()[..6]);

    let mut large = [0xCCu8; 32];
    save.get_screenshot(&mut large);
    assert_eq!(&large[..16], save.screenshot_data());
    assert_eq!(large[16], 0xCC); // untouched past the screenshot
}

#[test]
fn unknown_magic_is_an_invalid_header() {
    let file = write_save(b"JUNKSAVEGAMEWITHNOMAGIC");
    let err = SaveGame::new(file.path(), true).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader));
}

#[test]
fn truncated_file_reports_end_of_file() {
    let file = write_save(b"TESV_SAVEGAME");
    let err = SaveGame::new(file.path(), true).unwrap_err();
    assert!(err.to_string().starts_with("unexpected end of file at "));
}

#[test]
fn async_create_delivers_on_a_worker_thread() {
    let file = write_save(&fallout4_fixture(0x44, true));
    let (tx, rx) = std::sync::mpsc::channel();
    gamebryo_savegame::create(file.path().to_path_buf(), false, move |result| {
        tx.send(result.map(|s| s.character_name().to_owned())).unwrap();
    });
    let delivered = rx.recv().unwrap().unwrap();
    assert_eq!(delivered, "Sole Survivor");
}

//! Per-field scanners over the dumping tool's sidecar files.
//!
//! Every scanner returns `None` on any I/O error, format mismatch or early
//! end of file. One field failing never affects another.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel preceding the primary volume descriptor dump in `_mainInfo.txt`.
pub const PVD_SENTINEL: &str = "========== LBA[000016, 0x00010]: Main Channel ==========";
/// Lines between the PVD sentinel and the 0x320 row, DVD-class media.
pub const PVD_SKIP_SINGLE_TRACK: usize = 51;
/// CD-class dumps carry one extra sector-header row.
pub const PVD_SKIP_MULTI_TRACK: usize = 52;
pub const PVD_LINES: usize = 6;

pub const SATURN_HEADER_SKIP: u64 = 0x10;
pub const SATURN_HEADER_LEN: usize = 0x100;

/// Whole file as text. Invalid UTF-8 (CD-TEXT is often Shift-JIS) is
/// replaced rather than failing the read.
pub fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn lines(path: &Path) -> Option<Vec<String>> {
    let text = read_text(path)?;
    Some(text.lines().map(str::to_string).collect())
}

fn first_integer(text: &str) -> Option<i64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"-?\d+").expect("integer pattern is valid"));
    re.find(text)?.as_str().parse().ok()
}

/// Locate `sentinel`, skip `skip` lines after it, then join the next
/// `count` lines. Fails closed when the sentinel or any line is missing.
pub fn read_block(path: &Path, sentinel: &str, skip: usize, count: usize) -> Option<String> {
    let lines = lines(path)?;
    let start = lines.iter().position(|l| l.trim_start().starts_with(sentinel))?;
    let block: Vec<&str> = lines
        .iter()
        .skip(start + 1 + skip)
        .take(count)
        .map(String::as_str)
        .collect();
    (block.len() == count).then(|| block.join("\n"))
}

/// Payload after the first line starting with `label`.
pub fn labeled_value(path: &Path, label: &str) -> Option<String> {
    lines(path)?.iter().find_map(|line| {
        let value = line.trim_start().strip_prefix(label)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// First integer after the first line starting with `label`.
pub fn labeled_number(path: &Path, label: &str) -> Option<i64> {
    first_integer(&labeled_value(path, label)?)
}

/// The first run of consecutive lines starting with `tag`.
pub fn tag_block(path: &Path, tag: &str) -> Option<String> {
    let lines = lines(path)?;
    let block: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .skip_while(|l| !l.starts_with(tag))
        .take_while(|l| l.starts_with(tag))
        .collect();
    (!block.is_empty()).then(|| block.join("\n"))
}

/// Exactly `count` bytes starting at `skip`.
pub fn read_header_bytes(path: &Path, skip: u64, count: usize) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    file.seek(SeekFrom::Start(skip)).ok()?;
    let mut buf = vec![0u8; count];
    file.read_exact(&mut buf).ok()?;
    Some(buf)
}

/// Render bytes as `OOOO : HH HH ... HH   ASCII`, 16 per row.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex = chunk
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ");
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:04X} : {hex:<47}   {ascii}", row * 16)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Uncorrectable-error count.
///
/// A non-empty `_mainError.txt` yields -1, meaning the other counts are not
/// to be trusted. Otherwise the EDC/ECC report decides.
pub fn error_count(main_error: &Path, edc_ecc: &Path) -> Option<i64> {
    let primary = read_text(main_error)?;
    if !primary.trim().is_empty() {
        return Some(-1);
    }

    let detail = lines(edc_ecc)?;
    detail.iter().find_map(|line| {
        let line = line.trim();
        if line.contains("[NO ERROR]") {
            Some(0)
        } else {
            line.strip_prefix("Total errors:").and_then(first_integer)
        }
    })
}

/// Layer-zero sector count; `None` for single-layer discs.
pub fn layerbreak(disc_txt: &Path) -> Option<u64> {
    labeled_number(disc_txt, "LayerZeroSector:")
        .filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
}

/// Combined write offset in samples, rendered `+N`, `-N` or `0`.
pub fn write_offset(disc_txt: &Path) -> Option<String> {
    static SAMPLES: OnceLock<Regex> = OnceLock::new();
    let re = SAMPLES.get_or_init(|| {
        Regex::new(r"\(Samples\)\s*([+-]?\d+)").expect("samples pattern is valid")
    });

    let lines = lines(disc_txt)?;
    let section = lines
        .iter()
        .position(|l| l.trim_start().starts_with("========== Offset"))?;
    let combined = lines[section + 1..]
        .iter()
        .find(|l| l.trim_start().starts_with("Combined Offset"))?;
    let samples: i64 = re.captures(combined)?.get(1)?.as_str().parse().ok()?;

    Some(match samples {
        0 => "0".to_string(),
        n if n > 0 => format!("+{n}"),
        n => n.to_string(),
    })
}

/// Vendor, product and revision from `_drive.txt`.
pub fn drive_model(drive_txt: &Path) -> Option<String> {
    let parts: Vec<String> = ["VendorId:", "ProductId:", "ProductRevisionLevel:"]
        .iter()
        .filter_map(|label| labeled_value(drive_txt, label))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Protection section of `_disc.txt`.
pub fn protection(disc_txt: &Path) -> Option<String> {
    let lines = lines(disc_txt)?;
    let start = lines
        .iter()
        .position(|l| l.trim_start().starts_with("========== Protection"))?;
    let block: Vec<&str> = lines[start + 1..]
        .iter()
        .map(|l| l.trim_end())
        .take_while(|l| !l.trim().is_empty() && !l.trim_start().starts_with("=========="))
        .collect();
    (!block.is_empty()).then(|| block.join("\n"))
}

/// LibCrypt status from `_subIntention.txt`.
pub fn libcrypt(sub_intention: &Path) -> Option<String> {
    let text = read_text(sub_intention)?;
    let text = text.trim();
    Some(if text.is_empty() {
        "No".to_string()
    } else {
        format!("Yes\n{text}")
    })
}

/// Fields decoded from a Sega Saturn system header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturnHeader {
    pub serial: String,
    pub version: String,
    pub build_date: Option<String>,
}

/// First data track of a dump, by the naming the tool uses.
pub fn saturn_track_file(dir: &Path, base: &str) -> Option<PathBuf> {
    [
        format!("{base} (Track 01).bin"),
        format!("{base} (Track 1).bin"),
        format!("{base}.bin"),
    ]
    .into_iter()
    .map(|name| dir.join(name))
    .find(|p| p.is_file())
}

/// Decode serial, version and build date from the header bytes that
/// follow the sector sync.
pub fn parse_saturn_header(bytes: &[u8]) -> Option<SaturnHeader> {
    let field = |range: std::ops::Range<usize>| -> Option<String> {
        let raw = bytes.get(range)?;
        Some(String::from_utf8_lossy(raw).trim().to_string())
    };

    let serial = field(0x20..0x2A)?;
    let version = field(0x2A..0x30)?;
    let build_date = field(0x30..0x38).and_then(|d| {
        NaiveDate::parse_from_str(&d, "%Y%m%d")
            .ok()
            .map(|date| date.format("%Y-%m-%d").to_string())
    });

    Some(SaturnHeader {
        serial,
        version,
        build_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn block_reads_fixed_lines_after_sentinel() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.txt", "junk\nHEAD\nskip\nA\nB\nC\n");
        assert_eq!(read_block(&path, "HEAD", 1, 2).as_deref(), Some("A\nB"));
        assert_eq!(read_block(&path, "HEAD", 1, 9), None);
        assert_eq!(read_block(&path, "NOPE", 0, 1), None);
    }

    #[test]
    fn labeled_values() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "d.txt", "  VendorId: PLEXTOR\nLayerZeroSector: 2084960 (0x1fd0e0)\n");
        assert_eq!(labeled_value(&path, "VendorId:").as_deref(), Some("PLEXTOR"));
        assert_eq!(labeled_number(&path, "LayerZeroSector:"), Some(2_084_960));
        assert_eq!(layerbreak(&path), Some(2_084_960));
    }

    #[test]
    fn zero_layerbreak_is_single_layer() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "d.txt", "LayerZeroSector: 0\n");
        assert_eq!(layerbreak(&path), None);
    }

    #[test]
    fn tag_block_collects_consecutive_lines() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "g.dat",
            "<datafile>\n\t<game>\n\t\t<rom name=\"a\"/>\n\t\t<rom name=\"b\"/>\n\t</game>\n",
        );
        assert_eq!(
            tag_block(&path, "<rom").as_deref(),
            Some("<rom name=\"a\"/>\n<rom name=\"b\"/>")
        );
    }

    #[test]
    fn error_count_precedence() {
        let dir = TempDir::new().unwrap();
        let main = write(&dir, "main.txt", "");
        let edc = write(&dir, "edc.txt", "LBA 1\nTotal errors: 12\n");
        assert_eq!(error_count(&main, &edc), Some(12));

        let edc_clean = write(&dir, "edc2.txt", "[NO ERROR] All sectors ok\n");
        assert_eq!(error_count(&main, &edc_clean), Some(0));

        let main_dirty = write(&dir, "main2.txt", "LBA[000100] read error\n");
        assert_eq!(error_count(&main_dirty, &edc), Some(-1));

        let edc_unknown = write(&dir, "edc3.txt", "nothing here\n");
        assert_eq!(error_count(&main, &edc_unknown), None);
    }

    #[test]
    fn write_offset_is_signed() {
        let dir = TempDir::new().unwrap();
        let pos = write(
            &dir,
            "a.txt",
            "========== Offset ==========\n Combined Offset(Byte)   2352, (Samples)   588\n",
        );
        let neg = write(
            &dir,
            "b.txt",
            "========== Offset ==========\n Combined Offset(Byte)  -2592, (Samples)  -648\n",
        );
        let zero = write(
            &dir,
            "c.txt",
            "========== Offset ==========\n Combined Offset(Byte)      0, (Samples)     0\n",
        );
        assert_eq!(write_offset(&pos).as_deref(), Some("+588"));
        assert_eq!(write_offset(&neg).as_deref(), Some("-648"));
        assert_eq!(write_offset(&zero).as_deref(), Some("0"));
    }

    #[test]
    fn shift_jis_cd_text_does_not_hide_other_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("disc.txt");
        let mut bytes = b"CD-TEXT Title: ".to_vec();
        bytes.extend_from_slice(&[0x82, 0xa0]);
        bytes.extend_from_slice(
            b"\n========== Offset ==========\n Combined Offset(Byte)   2352, (Samples)   588\n\
              LayerZeroSector: 2084960\n",
        );
        fs::write(&path, bytes).unwrap();

        assert_eq!(write_offset(&path).as_deref(), Some("+588"));
        assert_eq!(layerbreak(&path), Some(2084960));
        assert!(read_text(&path).unwrap().contains('\u{FFFD}'));
    }

    #[test]
    fn drive_model_joins_labels() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "drive.txt",
            "VendorId: PLEXTOR\nProductId: DVDR   PX-760A\nProductRevisionLevel: 1.07\n",
        );
        assert_eq!(drive_model(&path).as_deref(), Some("PLEXTOR DVDR   PX-760A 1.07"));
    }

    #[test]
    fn protection_block_stops_at_blank_line() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "disc.txt",
            "========== Protection ==========\nSafeDisc 2.x\nBad sectors 1024-1100\n\ntrailing\n",
        );
        assert_eq!(
            protection(&path).as_deref(),
            Some("SafeDisc 2.x\nBad sectors 1024-1100")
        );
    }

    #[test]
    fn libcrypt_status() {
        let dir = TempDir::new().unwrap();
        let empty = write(&dir, "a.txt", "\n");
        let full = write(&dir, "b.txt", "MSF: 03:08:05 Q-Data: 4101\n");
        assert_eq!(libcrypt(&empty).as_deref(), Some("No"));
        assert!(libcrypt(&full).unwrap().starts_with("Yes\nMSF"));
        assert_eq!(libcrypt(&dir.path().join("missing.txt")), None);
    }

    #[test]
    fn hex_dump_layout() {
        let dump = hex_dump(b"SEGA SEGASATURN 0123");
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("0000 : 53 45 47 41"));
        assert!(rows[0].ends_with("SEGA SEGASATURN "));
        assert!(rows[1].starts_with("0010 : 30 31 32 33"));
    }

    #[test]
    fn saturn_header_fields() {
        let mut header = vec![b' '; SATURN_HEADER_LEN];
        header[0..16].copy_from_slice(b"SEGA SEGASATURN ");
        header[0x20..0x2A].copy_from_slice(b"MK-81009  ");
        header[0x2A..0x30].copy_from_slice(b"V1.000");
        header[0x30..0x38].copy_from_slice(b"19951027");

        let parsed = parse_saturn_header(&header).unwrap();
        assert_eq!(parsed.serial, "MK-81009");
        assert_eq!(parsed.version, "V1.000");
        assert_eq!(parsed.build_date.as_deref(), Some("1995-10-27"));
    }

    #[test]
    fn saturn_track_fallbacks() {
        let dir = TempDir::new().unwrap();
        assert_eq!(saturn_track_file(dir.path(), "game"), None);
        write(&dir, "game.bin", "");
        assert_eq!(saturn_track_file(dir.path(), "game"), Some(dir.path().join("game.bin")));
        write(&dir, "game (Track 1).bin", "");
        assert_eq!(
            saturn_track_file(dir.path(), "game"),
            Some(dir.path().join("game (Track 1).bin"))
        );
    }

    #[test]
    fn short_track_yields_no_header() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "short.bin", "tiny");
        assert_eq!(read_header_bytes(&path, SATURN_HEADER_SKIP, SATURN_HEADER_LEN), None);
    }
}

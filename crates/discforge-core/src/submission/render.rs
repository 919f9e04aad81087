//! Submission renderings: indented text and gzip-compressed JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::record::{RingCode, RingCodes, SubmissionRecord, TrackData};
use crate::domain::Result;

pub const TEXT_FILE_NAME: &str = "!submissionInfo.txt";
pub const JSON_FILE_NAME: &str = "!submissionInfo.json";
pub const JSON_GZ_FILE_NAME: &str = "!submissionInfo.json.gz";

struct TextWriter {
    out: String,
}

impl TextWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn section(&mut self, title: &str) {
        self.out.push_str(title);
        self.out.push_str(":\n");
    }

    fn heading(&mut self, depth: usize, title: &str) {
        self.out.push_str(&format!("{}{title}:\n", "\t".repeat(depth)));
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `label: value`, or the label followed by an indented block when the
    /// value spans lines.
    fn field(&mut self, depth: usize, label: &str, value: &str) {
        let indent = "\t".repeat(depth);
        if value.contains('\n') {
            self.out.push_str(&format!("{indent}{label}:\n\n"));
            for line in value.lines() {
                self.out.push_str(&format!("{indent}{line}\n"));
            }
            self.blank();
        } else {
            self.out.push_str(&format!("{indent}{label}: {value}\n"));
        }
    }

    fn optional(&mut self, depth: usize, label: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.field(depth, label, value);
        }
    }

    fn ring_code(&mut self, prefix: &str, ring: &RingCode) {
        self.field(2, &format!("{prefix}Mastering Code (laser branded/etched)"), &ring.mastering_code);
        self.field(2, &format!("{prefix}Mastering SID Code"), &ring.mastering_sid);
        self.field(2, &format!("{prefix}Toolstamp or Mastering Code (engraved/stamped)"), &ring.toolstamp);
        self.field(2, &format!("{prefix}Mould SID Code"), &ring.mould_sid);
        self.field(2, &format!("{prefix}Additional Mould"), &ring.additional_mould);
    }
}

/// Drop every blank line that follows another blank line, and trailing
/// blank lines.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line });
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let mut joined = out.join("\n");
    joined.push('\n');
    joined
}

/// Human-readable submission text.
pub fn render_text(record: &SubmissionRecord) -> String {
    let mut w = TextWriter::new();
    let common = &record.common;

    w.section("Common Disc Info");
    w.field(1, "System", common.system.long_name());
    w.field(1, "Media Type", common.media.long_name());
    w.field(1, "Title", &common.title);
    w.field(1, "Foreign Title (Non-latin)", &common.foreign_title);
    w.field(1, "Disc Number / Letter", &common.disc_number);
    w.field(1, "Disc Title", &common.disc_title);
    w.field(1, "Category", &common.category);
    w.field(1, "Region", &common.region);
    w.field(1, "Languages", &common.languages);
    w.field(1, "Disc Serial", &common.serial);
    w.blank();

    w.heading(1, "Ringcode Information");
    match &common.ring_codes {
        RingCodes::Single(ring) => w.ring_code("", ring),
        RingCodes::Dual { outer, inner } => {
            w.ring_code("Outer ", outer);
            w.ring_code("Inner ", inner);
        }
    }
    w.blank();

    w.field(1, "Barcode", &common.barcode);
    if let (Some(date), Some(label)) = (&common.build_date, common.system.build_date_label()) {
        w.field(1, label, date);
    }
    w.field(1, "Error Count", &common.error_count);
    w.field(1, "Comments", &common.comments);
    w.field(1, "Contents", &common.contents);
    w.blank();

    w.section("Version and Editions");
    w.field(1, "Version", &record.version.version);
    w.field(1, "Edition/Release", &record.version.editions);
    w.blank();

    let cp = &record.copy_protection;
    if cp.antimodchip.is_some() || cp.libcrypt.is_some() || cp.protection.is_some() {
        w.section("Copy Protection");
        w.optional(1, "Anti-modchip", cp.antimodchip.as_deref());
        w.optional(1, "LibCrypt", cp.libcrypt.as_deref());
        w.optional(1, "Copy Protection", cp.protection.as_deref());
        w.blank();
    }

    let extras = &record.extras;
    if extras.pvd.is_some() || extras.header.is_some() {
        w.section("Extras");
        w.optional(1, "Primary Volume Descriptor (PVD)", extras.pvd.as_deref());
        w.optional(1, "Header", extras.header.as_deref());
        w.blank();
    }

    match &record.tracks {
        TrackData::Tracks {
            dat,
            cuesheet,
            write_offset,
        } => {
            w.section("Tracks and Write Offsets");
            w.field(1, "DAT", dat);
            w.field(1, "Cuesheet", cuesheet);
            w.field(1, "Write Offset", write_offset);
        }
        TrackData::SizeAndChecksums {
            size,
            crc32,
            md5,
            sha1,
            layerbreak,
        } => {
            w.section("Size & Checksum");
            w.optional(1, "Layerbreak", layerbreak.as_deref());
            w.field(1, "Size", size);
            w.field(1, "CRC32", crc32);
            w.field(1, "MD5", md5);
            w.field(1, "SHA1", sha1);
        }
    }
    w.blank();

    w.section("Dumping Info");
    w.field(1, "Dumping Program", &record.dumping.program);
    w.field(1, "Dumping Command", &record.dumping.command);
    w.field(1, "Drive", &record.dumping.drive_model);
    w.blank();

    if !record.matched_ids.is_empty() {
        let ids = record
            .matched_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        w.field(0, "Matched Catalog IDs", &ids);
    }
    w.field(0, "Generated", &record.generated_at.to_rfc3339());

    collapse_blank_lines(&w.out)
}

/// Write the JSON rendering, gzip-compressed when `compress` is set.
pub fn write_json(record: &SubmissionRecord, path: &Path, compress: bool) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, record)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        serde_json::to_writer_pretty(&mut file, record)?;
        file.flush()?;
    }
    Ok(())
}

/// Load a record written by [`write_json`]; gzip is detected by magic bytes.
pub fn load_json(path: &Path) -> Result<SubmissionRecord> {
    let bytes = std::fs::read(path)?;
    let record = if bytes.starts_with(&[0x1f, 0x8b]) {
        serde_json::from_reader(BufReader::new(GzDecoder::new(bytes.as_slice())))?
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(record)
}

/// Paths of the two renderings written for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFiles {
    pub text: PathBuf,
    pub json: PathBuf,
}

/// Write both renderings into `dir`.
pub fn write_submission(record: &SubmissionRecord, dir: &Path, compress: bool) -> Result<SubmissionFiles> {
    let text = dir.join(TEXT_FILE_NAME);
    std::fs::write(&text, render_text(record))?;

    let json = dir.join(if compress { JSON_GZ_FILE_NAME } else { JSON_FILE_NAME });
    write_json(record, &json, compress)?;

    Ok(SubmissionFiles { text, json })
}

//! Track fingerprints from the tool's `.dat` hash manifest.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Size and hashes of one dumped file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub name: String,
    pub size: u64,
    pub crc32: String,
    pub md5: String,
    pub sha1: String,
}

impl Fingerprint {
    /// Cue sheets are listed in the manifest but are not tracks.
    pub fn is_track(&self) -> bool {
        !self.name.to_ascii_lowercase().ends_with(".cue")
    }
}

fn attribute(line: &str, name: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9]+)="([^"]*)""#).expect("attribute pattern is valid")
    });
    re.captures_iter(line)
        .find(|c| &c[1] == name)
        .map(|c| c[2].to_string())
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a single `<rom .../>` line.
pub fn parse_rom_line(line: &str) -> Option<Fingerprint> {
    let line = line.trim();
    if !line.starts_with("<rom") {
        return None;
    }

    let fingerprint = Fingerprint {
        name: attribute(line, "name")?,
        size: attribute(line, "size")?.parse().ok()?,
        crc32: attribute(line, "crc")?,
        md5: attribute(line, "md5")?,
        sha1: attribute(line, "sha1")?,
    };

    (is_hex(&fingerprint.crc32, 8) && is_hex(&fingerprint.md5, 32) && is_hex(&fingerprint.sha1, 40))
        .then_some(fingerprint)
}

/// Every well-formed `<rom>` entry, in manifest order. Malformed lines are
/// skipped.
pub fn parse_manifest(text: &str) -> Vec<Fingerprint> {
    text.lines().filter_map(parse_rom_line).collect()
}

/// Manifest entries that are tracks, the resolver's input.
pub fn track_fingerprints(text: &str) -> Vec<Fingerprint> {
    parse_manifest(text)
        .into_iter()
        .filter(Fingerprint::is_track)
        .collect()
}

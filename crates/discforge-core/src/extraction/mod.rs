//! Output extraction engine.
//!
//! Gates on the artifact set for the media category, then runs each field
//! scanner independently. A missing required file yields
//! [`ExtractionOutcome::Incomplete`] with no fields at all; a scanner that
//! fails only leaves its own field absent.

pub mod artifacts;
pub mod fingerprint;
pub mod scanners;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use artifacts::ArtifactSet;
pub use fingerprint::{parse_manifest, parse_rom_line, track_fingerprints, Fingerprint};
pub use scanners::SaturnHeader;

use crate::domain::media::MediaCategory;
use crate::domain::{KnownSystem, MediaType};

/// Fields the engine knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    DumpingCommand,
    DriveModel,
    ErrorCount,
    Pvd,
    Header,
    Serial,
    Version,
    BuildDate,
    Layerbreak,
    WriteOffset,
    Protection,
    LibCrypt,
    Dat,
    Cuesheet,
    Size,
    Crc32,
    Md5,
    Sha1,
}

/// An extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Block(String),
}

impl FieldValue {
    /// String form used when rendering a submission.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Block(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
        }
    }
}

/// Which ring-code field set the submission should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerVariant {
    SingleLayer,
    DualLayer { layerbreak: u64 },
}

/// Fields pulled from a complete dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub fields: BTreeMap<FieldKey, FieldValue>,
    /// Track fingerprints, cue sheets excluded.
    pub fingerprints: Vec<Fingerprint>,
}

impl ExtractedFields {
    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key)
    }

    pub fn text(&self, key: FieldKey) -> Option<String> {
        self.get(key).map(FieldValue::render)
    }

    pub fn integer(&self, key: FieldKey) -> Option<i64> {
        match self.get(key)? {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn layer_variant(&self) -> LayerVariant {
        match self.integer(FieldKey::Layerbreak) {
            Some(n) if n > 0 => LayerVariant::DualLayer {
                layerbreak: n as u64,
            },
            _ => LayerVariant::SingleLayer,
        }
    }

    fn put(&mut self, key: FieldKey, value: Option<FieldValue>) {
        match value {
            Some(v) => {
                self.fields.insert(key, v);
            }
            None => tracing::debug!(field = ?key, "Field not found in dump output"),
        }
    }
}

/// Result of an extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionOutcome {
    Complete(ExtractedFields),
    /// Names of the required files that were not found.
    Incomplete { missing: Vec<String> },
}

/// Scans the output of one dump.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    dir: PathBuf,
    base: String,
    media: MediaType,
    system: Option<KnownSystem>,
}

impl ExtractionEngine {
    pub fn new(dir: impl Into<PathBuf>, base: impl Into<String>, media: MediaType) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
            media,
            system: None,
        }
    }

    /// System-specific scanners (LibCrypt, Saturn header) run only when set.
    pub fn with_system(mut self, system: KnownSystem) -> Self {
        self.system = Some(system);
        self
    }

    pub fn artifact_set(&self) -> ArtifactSet {
        ArtifactSet::for_media(self.media)
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{suffix}", self.base))
    }

    pub fn extract(&self) -> ExtractionOutcome {
        let missing = self.artifact_set().missing(&self.dir, &self.base);
        if !missing.is_empty() {
            tracing::warn!(base = %self.base, missing = missing.len(), "Dump output incomplete");
            return ExtractionOutcome::Incomplete { missing };
        }

        let category = self.media.category();
        let mut out = ExtractedFields::default();

        out.put(
            FieldKey::DumpingCommand,
            first_line(&self.file("_cmd.txt")).map(FieldValue::Text),
        );

        let dat = self.file(".dat");
        out.put(
            FieldKey::Dat,
            scanners::tag_block(&dat, "<rom").map(FieldValue::Block),
        );
        out.fingerprints = scanners::read_text(&dat)
            .map(|text| track_fingerprints(&text))
            .unwrap_or_default();

        match category {
            MediaCategory::MultiTrackOptical => self.scan_multi_track(&mut out),
            MediaCategory::SingleTrackOptical => self.scan_single_track(&mut out),
            MediaCategory::BlockDevice => {}
        }

        if category != MediaCategory::MultiTrackOptical {
            if let [only] = out.fingerprints.as_slice() {
                let only = only.clone();
                out.put(FieldKey::Size, i64::try_from(only.size).ok().map(FieldValue::Integer));
                out.put(FieldKey::Crc32, Some(FieldValue::Text(only.crc32)));
                out.put(FieldKey::Md5, Some(FieldValue::Text(only.md5)));
                out.put(FieldKey::Sha1, Some(FieldValue::Text(only.sha1)));
            }
        }

        tracing::debug!(base = %self.base, fields = out.len(), "Extraction finished");
        ExtractionOutcome::Complete(out)
    }

    fn scan_common_optical(&self, out: &mut ExtractedFields, pvd_skip: usize) {
        out.put(
            FieldKey::Pvd,
            scanners::read_block(
                &self.file("_mainInfo.txt"),
                scanners::PVD_SENTINEL,
                pvd_skip,
                scanners::PVD_LINES,
            )
            .map(FieldValue::Block),
        );
        out.put(
            FieldKey::DriveModel,
            scanners::drive_model(&self.file("_drive.txt")).map(FieldValue::Text),
        );
        out.put(
            FieldKey::Protection,
            scanners::protection(&self.file("_disc.txt")).map(FieldValue::Block),
        );
    }

    fn scan_multi_track(&self, out: &mut ExtractedFields) {
        self.scan_common_optical(out, scanners::PVD_SKIP_MULTI_TRACK);

        let disc = self.file("_disc.txt");
        out.put(
            FieldKey::ErrorCount,
            scanners::error_count(&self.file("_mainError.txt"), &self.file(".img_EdcEcc.txt"))
                .map(FieldValue::Integer),
        );
        out.put(
            FieldKey::WriteOffset,
            scanners::write_offset(&disc).map(FieldValue::Text),
        );
        out.put(
            FieldKey::Cuesheet,
            scanners::read_text(&self.file(".cue"))
                .map(|s| s.trim_end().to_string())
                .filter(|s| !s.is_empty())
                .map(FieldValue::Block),
        );

        match self.system {
            Some(KnownSystem::SonyPlayStation) => out.put(
                FieldKey::LibCrypt,
                scanners::libcrypt(&self.file("_subIntention.txt")).map(FieldValue::Block),
            ),
            Some(KnownSystem::SegaSaturn) => self.scan_saturn(out),
            _ => {}
        }
    }

    fn scan_single_track(&self, out: &mut ExtractedFields) {
        self.scan_common_optical(out, scanners::PVD_SKIP_SINGLE_TRACK);

        let main_error = self.file("_mainError.txt");
        let main_error_dirty =
            scanners::read_text(&main_error).map(|s| !s.trim().is_empty());
        out.put(
            FieldKey::ErrorCount,
            main_error_dirty.map(|dirty| FieldValue::Integer(if dirty { -1 } else { 0 })),
        );

        out.put(
            FieldKey::Layerbreak,
            scanners::layerbreak(&self.file("_disc.txt"))
                .and_then(|n| i64::try_from(n).ok())
                .map(FieldValue::Integer),
        );
    }

    fn scan_saturn(&self, out: &mut ExtractedFields) {
        let Some(track) = scanners::saturn_track_file(&self.dir, &self.base) else {
            tracing::debug!(base = %self.base, "No Saturn data track found");
            return;
        };
        let bytes = scanners::read_header_bytes(
            &track,
            scanners::SATURN_HEADER_SKIP,
            scanners::SATURN_HEADER_LEN,
        );
        out.put(
            FieldKey::Header,
            bytes
                .as_deref()
                .map(scanners::hex_dump)
                .map(FieldValue::Block),
        );

        let header = bytes.as_deref().and_then(scanners::parse_saturn_header);
        if let Some(SaturnHeader {
            serial,
            version,
            build_date,
        }) = header
        {
            out.put(FieldKey::Serial, non_empty(serial).map(FieldValue::Text));
            out.put(FieldKey::Version, non_empty(version).map(FieldValue::Text));
            out.put(FieldKey::BuildDate, build_date.map(FieldValue::Text));
        }
    }
}

fn first_line(path: &Path) -> Option<String> {
    scanners::read_text(path)?
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

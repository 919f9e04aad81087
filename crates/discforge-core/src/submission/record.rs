//! Submission record model.

use chrono::{DateTime, Utc};
use redump_catalog::CatalogId;
use serde::{Deserialize, Serialize};

use crate::domain::{KnownSystem, MediaType};

pub const REQUIRED: &str = "(REQUIRED)";
pub const REQUIRED_IF_EXISTS: &str = "(REQUIRED, IF EXISTS)";
pub const OPTIONAL: &str = "(OPTIONAL)";

/// Codes read off one side of a disc's inner ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingCode {
    pub mastering_code: String,
    pub mastering_sid: String,
    pub toolstamp: String,
    pub mould_sid: String,
    pub additional_mould: String,
}

impl Default for RingCode {
    fn default() -> Self {
        Self {
            mastering_code: REQUIRED_IF_EXISTS.to_string(),
            mastering_sid: REQUIRED_IF_EXISTS.to_string(),
            toolstamp: REQUIRED_IF_EXISTS.to_string(),
            mould_sid: REQUIRED_IF_EXISTS.to_string(),
            additional_mould: REQUIRED_IF_EXISTS.to_string(),
        }
    }
}

impl RingCode {
    fn values(&self) -> [&str; 5] {
        [
            self.mastering_code.as_str(),
            self.mastering_sid.as_str(),
            self.toolstamp.as_str(),
            self.mould_sid.as_str(),
            self.additional_mould.as_str(),
        ]
    }
}

/// Ring-code field set, chosen by the layerbreak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layers", rename_all = "snake_case")]
pub enum RingCodes {
    Single(RingCode),
    Dual { outer: RingCode, inner: RingCode },
}

/// Identification section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonDiscInfo {
    pub system: KnownSystem,
    pub media: MediaType,
    pub title: String,
    pub foreign_title: String,
    pub disc_number: String,
    pub disc_title: String,
    pub category: String,
    pub region: String,
    pub languages: String,
    pub serial: String,
    pub ring_codes: RingCodes,
    pub barcode: String,
    /// Only carried by systems with a mandatory build date.
    pub build_date: Option<String>,
    pub error_count: String,
    pub comments: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionAndEditions {
    pub version: String,
    pub editions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyProtection {
    pub antimodchip: Option<String>,
    pub libcrypt: Option<String>,
    pub protection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub pvd: Option<String>,
    pub header: Option<String>,
    pub layerbreak: Option<String>,
}

/// Track sheet for multi-track media, size and hashes otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackData {
    Tracks {
        dat: String,
        cuesheet: String,
        write_offset: String,
    },
    SizeAndChecksums {
        size: String,
        crc32: String,
        md5: String,
        sha1: String,
        layerbreak: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpingInfo {
    pub program: String,
    pub command: String,
    pub drive_model: String,
}

/// One dump's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub common: CommonDiscInfo,
    pub version: VersionAndEditions,
    pub copy_protection: CopyProtection,
    pub extras: Extras,
    pub tracks: TrackData,
    pub dumping: DumpingInfo,
    pub matched_ids: Vec<CatalogId>,
    pub generated_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Whether any field still holds a `(REQUIRED)` placeholder.
    pub fn has_required_placeholders(&self) -> bool {
        self.text_values().any(|value| value == REQUIRED)
    }

    fn text_values(&self) -> impl Iterator<Item = &str> {
        let common = &self.common;
        let mut values = vec![
            common.title.as_str(),
            common.foreign_title.as_str(),
            common.disc_number.as_str(),
            common.disc_title.as_str(),
            common.category.as_str(),
            common.region.as_str(),
            common.languages.as_str(),
            common.serial.as_str(),
            common.barcode.as_str(),
            common.error_count.as_str(),
            common.comments.as_str(),
            common.contents.as_str(),
            self.version.version.as_str(),
            self.version.editions.as_str(),
            self.dumping.command.as_str(),
            self.dumping.drive_model.as_str(),
        ];
        values.extend(common.build_date.as_deref());
        values.extend(self.copy_protection.antimodchip.as_deref());
        values.extend(self.copy_protection.libcrypt.as_deref());
        values.extend(self.copy_protection.protection.as_deref());

        match &common.ring_codes {
            RingCodes::Single(ring) => values.extend(ring.values()),
            RingCodes::Dual { outer, inner } => {
                values.extend(outer.values());
                values.extend(inner.values());
            }
        }
        match &self.tracks {
            TrackData::Tracks {
                dat,
                cuesheet,
                write_offset,
            } => values.extend([dat.as_str(), cuesheet.as_str(), write_offset.as_str()]),
            TrackData::SizeAndChecksums {
                size,
                crc32,
                md5,
                sha1,
                ..
            } => values.extend([size.as_str(), crc32.as_str(), md5.as_str(), sha1.as_str()]),
        }
        values.into_iter()
    }
}

/// Values the user typed in. Any `Some` wins over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserMetadata {
    pub title: Option<String>,
    pub foreign_title: Option<String>,
    pub disc_number: Option<String>,
    pub disc_title: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub languages: Option<Vec<String>>,
    pub serial: Option<String>,
    /// One entry for single-layer discs; outer then inner for dual-layer.
    pub ring_codes: Vec<RingCode>,
    pub barcode: Option<String>,
    pub build_date: Option<String>,
    pub comments: Option<String>,
    pub contents: Option<String>,
    pub version: Option<String>,
    pub editions: Option<String>,
    pub antimodchip: Option<String>,
    pub protection: Option<String>,
}

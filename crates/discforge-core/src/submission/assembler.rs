//! Submission assembly.
//!
//! Every field is resolved from the first non-empty source in this order:
//! user input, catalog record, extracted value, system/media default,
//! placeholder.

use chrono::Utc;
use redump_catalog::CatalogRecord;

use super::record::{
    CommonDiscInfo, CopyProtection, DumpingInfo, Extras, RingCode, RingCodes, SubmissionRecord,
    TrackData, UserMetadata, VersionAndEditions, OPTIONAL, REQUIRED, REQUIRED_IF_EXISTS,
};
use crate::domain::{KnownSystem, MediaCategory, MediaType};
use crate::extraction::{ExtractedFields, FieldKey, LayerVariant};
use crate::matching::MatchResult;

const DEFAULT_CATEGORY: &str = "Games";

fn first_present<const N: usize>(sources: [Option<String>; N], placeholder: &str) -> String {
    first_present_opt(sources).unwrap_or_else(|| placeholder.to_string())
}

fn first_present_opt<const N: usize>(sources: [Option<String>; N]) -> Option<String> {
    sources
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Builds one [`SubmissionRecord`] per dump.
#[derive(Debug, Clone)]
pub struct SubmissionAssembler {
    system: KnownSystem,
    media: MediaType,
    program: String,
}

impl SubmissionAssembler {
    pub fn new(system: KnownSystem, media: MediaType) -> Self {
        Self {
            system,
            media,
            program: format!("DiscForge {}", crate::VERSION),
        }
    }

    /// Name written under "Dumping Program".
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn assemble(
        &self,
        extracted: &ExtractedFields,
        user: &UserMetadata,
        matched: Option<&MatchResult>,
    ) -> SubmissionRecord {
        let remote = matched.and_then(|m| m.record.as_ref());
        let field = |key: FieldKey| extracted.text(key);
        let from_remote = |f: fn(&CatalogRecord) -> Option<String>| remote.and_then(f);

        let common = CommonDiscInfo {
            system: self.system,
            media: self.media,
            title: first_present(
                [user.title.clone(), from_remote(|r| r.title.clone())],
                REQUIRED,
            ),
            foreign_title: first_present(
                [user.foreign_title.clone(), from_remote(|r| r.foreign_title.clone())],
                OPTIONAL,
            ),
            disc_number: first_present([user.disc_number.clone()], OPTIONAL),
            disc_title: first_present([user.disc_title.clone()], OPTIONAL),
            category: first_present([user.category.clone()], DEFAULT_CATEGORY),
            region: first_present(
                [
                    user.region.clone(),
                    from_remote(|r| r.region.clone()),
                    self.system.default_region().map(str::to_string),
                ],
                REQUIRED,
            ),
            languages: first_present(
                [
                    user.languages.as_ref().map(|l| l.join(", ")),
                    from_remote(|r| (!r.languages.is_empty()).then(|| r.languages.join(", "))),
                ],
                REQUIRED,
            ),
            serial: first_present(
                [
                    user.serial.clone(),
                    from_remote(|r| r.serial.clone()),
                    field(FieldKey::Serial),
                ],
                REQUIRED_IF_EXISTS,
            ),
            ring_codes: self.ring_codes(extracted.layer_variant(), user),
            barcode: first_present(
                [user.barcode.clone(), from_remote(|r| r.barcode.clone())],
                OPTIONAL,
            ),
            build_date: self.system.build_date_label().map(|_| {
                first_present(
                    [user.build_date.clone(), field(FieldKey::BuildDate)],
                    REQUIRED,
                )
            }),
            error_count: first_present([field(FieldKey::ErrorCount)], REQUIRED),
            comments: first_present([user.comments.clone()], OPTIONAL),
            contents: first_present([user.contents.clone()], OPTIONAL),
        };

        let version = VersionAndEditions {
            version: first_present(
                [
                    user.version.clone(),
                    from_remote(|r| r.version.clone()),
                    field(FieldKey::Version),
                ],
                REQUIRED_IF_EXISTS,
            ),
            editions: first_present(
                [user.editions.clone(), from_remote(|r| r.edition.clone())],
                OPTIONAL,
            ),
        };

        let copy_protection = CopyProtection {
            antimodchip: (self.system == KnownSystem::SonyPlayStation)
                .then(|| first_present([user.antimodchip.clone()], REQUIRED_IF_EXISTS)),
            libcrypt: field(FieldKey::LibCrypt),
            protection: first_present_opt([user.protection.clone(), field(FieldKey::Protection)]),
        };

        let layerbreak = match extracted.layer_variant() {
            LayerVariant::DualLayer { layerbreak } => Some(layerbreak.to_string()),
            LayerVariant::SingleLayer => None,
        };

        let extras = Extras {
            pvd: field(FieldKey::Pvd),
            header: field(FieldKey::Header),
            layerbreak: layerbreak.clone(),
        };

        let tracks = match self.media.category() {
            MediaCategory::MultiTrackOptical => TrackData::Tracks {
                dat: first_present([field(FieldKey::Dat)], REQUIRED),
                cuesheet: first_present([field(FieldKey::Cuesheet)], REQUIRED),
                write_offset: first_present([field(FieldKey::WriteOffset)], REQUIRED),
            },
            _ => TrackData::SizeAndChecksums {
                size: first_present([field(FieldKey::Size)], REQUIRED),
                crc32: first_present([field(FieldKey::Crc32)], REQUIRED),
                md5: first_present([field(FieldKey::Md5)], REQUIRED),
                sha1: first_present([field(FieldKey::Sha1)], REQUIRED),
                layerbreak,
            },
        };

        let dumping = DumpingInfo {
            program: self.program.clone(),
            command: first_present([field(FieldKey::DumpingCommand)], REQUIRED),
            drive_model: first_present([field(FieldKey::DriveModel)], OPTIONAL),
        };

        SubmissionRecord {
            common,
            version,
            copy_protection,
            extras,
            tracks,
            dumping,
            matched_ids: matched
                .map(|m| m.candidates.iter().copied().collect())
                .unwrap_or_default(),
            generated_at: Utc::now(),
        }
    }

    fn ring_codes(&self, variant: LayerVariant, user: &UserMetadata) -> RingCodes {
        let mut supplied = user.ring_codes.iter().cloned();
        match variant {
            LayerVariant::SingleLayer => RingCodes::Single(supplied.next().unwrap_or_default()),
            LayerVariant::DualLayer { .. } => RingCodes::Dual {
                outer: supplied.next().unwrap_or_default(),
                inner: supplied.next().unwrap_or_else(RingCode::default),
            },
        }
    }
}

//! End-to-end tests over a fake dump directory: completeness gate, field
//! scanning, catalog resolution and submission output.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use discforge_core::extraction::{ArtifactSet, ExtractionEngine, ExtractionOutcome, FieldKey};
use discforge_core::session::{process_output, OutputLocation};
use discforge_core::submission::{load_json, TrackData};
use discforge_core::{
    DiscForgeError, KnownSystem, MediaType, Options, Progress, ProgressEvent, UserMetadata,
};
use redump_catalog::fakes::MemoryCatalog;
use redump_catalog::{CatalogRecord, CatalogService};
use tempfile::TempDir;

const SHA_1: &str = "1111111111111111111111111111111111111111";
const SHA_2: &str = "2222222222222222222222222222222222222222";
const MD5: &str = "0123456789abcdef0123456789abcdef";

fn rom(name: &str, sha1: &str) -> String {
    format!(r#"		<rom name="{name}" size="650000000" crc="ABCD1234" md5="{MD5}" sha1="{sha1}"/>"#)
}

/// A complete Saturn CD dump: every artifact present, two tracks.
fn saturn_dump(dir: &Path, base: &str) {
    for path in ArtifactSet::for_media(MediaType::CdRom).paths(dir, base) {
        fs::write(path, "").unwrap();
    }

    let dat = format!(
        "<datafile>\n\t<game name=\"{base}\">\n{}\n{}\n{}\n\t</game>\n</datafile>\n",
        rom(&format!("{base}.cue"), "cccccccccccccccccccccccccccccccccccccccc"),
        rom(&format!("{base} (Track 1).bin"), SHA_1),
        rom(&format!("{base} (Track 2).bin"), SHA_2),
    );
    fs::write(dir.join(format!("{base}.dat")), dat).unwrap();
    fs::write(dir.join(format!("{base}.cue")), "FILE \"a.bin\" BINARY\n  TRACK 01 MODE1/2352\n").unwrap();
    fs::write(dir.join(format!("{base}_cmd.txt")), "cd F nights.bin 8 /c2 20\n").unwrap();
    fs::write(
        dir.join(format!("{base}_disc.txt")),
        "========== Offset ==========\n\tCombined Offset(Byte)   2352, (Samples)   588\n",
    )
    .unwrap();
    fs::write(
        dir.join(format!("{base}_drive.txt")),
        "VendorId: PLEXTOR\nProductId: DVDR   PX-716A\n",
    )
    .unwrap();
    fs::write(dir.join(format!("{base}.img_EdcEcc.txt")), "[NO ERROR]\n").unwrap();

    let mut header = vec![b' '; 0x110];
    header[0x10..0x20].copy_from_slice(b"SEGA SEGASATURN ");
    header[0x30..0x3A].copy_from_slice(b"MK-81020  ");
    header[0x3A..0x40].copy_from_slice(b"V1.003");
    header[0x40..0x48].copy_from_slice(b"19960705");
    fs::write(dir.join(format!("{base} (Track 1).bin")), header).unwrap();
}

#[test]
fn removing_any_required_file_yields_incomplete_with_no_fields() {
    let reference = TempDir::new().unwrap();
    saturn_dump(reference.path(), "nights");
    let suffixes = ArtifactSet::for_media(MediaType::CdRom).suffixes;
    assert_eq!(suffixes.len(), 18);

    for suffix in suffixes {
        let dir = TempDir::new().unwrap();
        saturn_dump(dir.path(), "nights");
        let victim = format!("nights{suffix}");
        fs::remove_file(dir.path().join(&victim)).unwrap();

        let outcome = ExtractionEngine::new(dir.path(), "nights", MediaType::CdRom)
            .with_system(KnownSystem::SegaSaturn)
            .extract();
        assert_eq!(
            outcome,
            ExtractionOutcome::Incomplete {
                missing: vec![victim]
            }
        );
    }
}

#[test]
fn complete_saturn_dump_extracts_fields() {
    let dir = TempDir::new().unwrap();
    saturn_dump(dir.path(), "nights");

    let ExtractionOutcome::Complete(fields) =
        ExtractionEngine::new(dir.path(), "nights", MediaType::CdRom)
            .with_system(KnownSystem::SegaSaturn)
            .extract()
    else {
        panic!("dump should be complete");
    };

    assert_eq!(fields.text(FieldKey::Serial).as_deref(), Some("MK-81020"));
    assert_eq!(fields.text(FieldKey::Version).as_deref(), Some("V1.003"));
    assert_eq!(fields.text(FieldKey::BuildDate).as_deref(), Some("1996-07-05"));
    assert_eq!(fields.text(FieldKey::WriteOffset).as_deref(), Some("+588"));
    assert_eq!(fields.integer(FieldKey::ErrorCount), Some(0));
    assert_eq!(
        fields.text(FieldKey::DriveModel).as_deref(),
        Some("PLEXTOR DVDR   PX-716A")
    );
    assert!(fields.text(FieldKey::Header).unwrap().starts_with("0000 : 53 45 47 41"));

    // The cue entry is in the DAT block but is not a track.
    assert!(fields.text(FieldKey::Dat).unwrap().contains("nights.cue"));
    assert_eq!(fields.fingerprints.len(), 2);
    assert_eq!(fields.fingerprints[0].size, 650_000_000);
    assert_eq!(fields.fingerprints[0].crc32, "ABCD1234");
}

fn recorder() -> (Progress, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (
        Progress::new(move |e| sink.lock().unwrap().push(e.clone())),
        events,
    )
}

fn location(dir: &Path) -> OutputLocation {
    OutputLocation {
        dir: dir.to_path_buf(),
        base: "nights".to_string(),
        system: KnownSystem::SegaSaturn,
        media: MediaType::CdRom,
    }
}

#[tokio::test]
async fn unique_match_enriches_and_writes_submission() {
    let dir = TempDir::new().unwrap();
    saturn_dump(dir.path(), "nights");

    let mut record = CatalogRecord::new(2140);
    record.title = Some("NiGHTS into Dreams...".to_string());
    record.region = Some("USA".to_string());
    record.languages = vec!["English".to_string()];
    let catalog = MemoryCatalog::new()
        .with_search(SHA_1, &[2140, 2141])
        .with_search(SHA_2, &[2140])
        .with_record(record);

    let (progress, events) = recorder();
    let user = UserMetadata {
        comments: Some("Sticker on case".to_string()),
        ..Default::default()
    };
    let report = process_output(
        &location(dir.path()),
        &user,
        &Options::default(),
        Some(&catalog as &dyn CatalogService),
        &progress,
    )
    .await
    .unwrap();

    assert_eq!(catalog.searched(), vec![SHA_1, SHA_2]);
    assert_eq!(report.record.matched_ids, vec![2140]);
    assert_eq!(report.record.common.title, "NiGHTS into Dreams...");
    assert_eq!(report.record.common.region, "USA");
    assert_eq!(report.record.common.serial, "MK-81020");
    assert_eq!(report.record.common.build_date.as_deref(), Some("1996-07-05"));
    assert_eq!(report.record.common.comments, "Sticker on case");
    assert!(matches!(
        &report.record.tracks,
        TrackData::Tracks { write_offset, .. } if write_offset == "+588"
    ));
    assert!(report.warnings.is_empty());

    let text = fs::read_to_string(&report.files.text).unwrap();
    assert!(text.contains("Title: NiGHTS into Dreams..."));
    assert!(text.contains("Build Date: 1996-07-05"));
    assert_eq!(load_json(&report.files.json).unwrap(), report.record);

    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&ProgressEvent::ExtractionStarted));
    assert!(events.contains(&ProgressEvent::MatchResolved { candidates: 1 }));
    assert!(matches!(events.last(), Some(ProgressEvent::SubmissionWritten { .. })));
}

#[tokio::test]
async fn catalog_failure_is_a_warning_not_an_error() {
    let dir = TempDir::new().unwrap();
    saturn_dump(dir.path(), "nights");
    let catalog = MemoryCatalog::new().failing_searches();
    let (progress, events) = recorder();

    let report = process_output(
        &location(dir.path()),
        &UserMetadata::default(),
        &Options::default(),
        Some(&catalog as &dyn CatalogService),
        &progress,
    )
    .await
    .unwrap();

    assert!(report.matched.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.record.common.title, "(REQUIRED)");
    assert!(report.files.text.exists());
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, ProgressEvent::Warning(_))));
}

#[tokio::test]
async fn bad_credentials_fall_back_to_local_data() {
    let dir = TempDir::new().unwrap();
    saturn_dump(dir.path(), "nights");
    let catalog = MemoryCatalog::new().with_credentials("dumper", "right");
    let mut options = Options::default();
    options.catalog.username = Some("dumper".to_string());
    options.catalog.password = Some("wrong".to_string());

    let report = process_output(
        &location(dir.path()),
        &UserMetadata::default(),
        &options,
        Some(&catalog as &dyn CatalogService),
        &Progress::none(),
    )
    .await
    .unwrap();

    assert!(report.matched.is_none());
    assert!(catalog.searched().is_empty());
    assert!(report.warnings[0].contains("catalog lookup failed"));
}

#[tokio::test]
async fn incomplete_dump_is_an_error_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    saturn_dump(dir.path(), "nights");
    fs::remove_file(dir.path().join("nights.sub")).unwrap();

    let err = process_output(
        &location(dir.path()),
        &UserMetadata::default(),
        &Options::default(),
        None,
        &Progress::none(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DiscForgeError::IncompleteDump(ref m) if m == &vec!["nights.sub".to_string()]));
    assert!(!dir.path().join("!submissionInfo.txt").exists());
}

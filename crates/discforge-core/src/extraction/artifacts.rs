//! Required sidecar files per media category.

use std::path::{Path, PathBuf};

use crate::domain::media::MediaCategory;
use crate::domain::MediaType;

const MULTI_TRACK: &[&str] = &[
    ".ccd",
    ".cue",
    ".dat",
    ".img",
    ".img_EdcEcc.txt",
    ".sub",
    "_c2Error.txt",
    "_cmd.txt",
    "_disc.txt",
    "_drive.txt",
    "_img.cue",
    "_mainError.txt",
    "_mainInfo.txt",
    "_subError.txt",
    "_subInfo.txt",
    "_subIntention.txt",
    "_subReadable.txt",
    "_volDesc.txt",
];

const SINGLE_TRACK: &[&str] = &[
    ".dat",
    "_cmd.txt",
    "_disc.txt",
    "_drive.txt",
    "_mainError.txt",
    "_mainInfo.txt",
    "_volDesc.txt",
];

const BLOCK_DEVICE: &[&str] = &[".dat", "_cmd.txt", "_disc.txt"];

/// The exact suffixes a complete dump leaves next to `<base>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSet {
    pub category: MediaCategory,
    pub suffixes: &'static [&'static str],
}

impl ArtifactSet {
    pub fn for_category(category: MediaCategory) -> Self {
        let suffixes = match category {
            MediaCategory::MultiTrackOptical => MULTI_TRACK,
            MediaCategory::SingleTrackOptical => SINGLE_TRACK,
            MediaCategory::BlockDevice => BLOCK_DEVICE,
        };
        Self { category, suffixes }
    }

    pub fn for_media(media: MediaType) -> Self {
        Self::for_category(media.category())
    }

    /// Full paths of every required file.
    pub fn paths(&self, dir: &Path, base: &str) -> Vec<PathBuf> {
        self.suffixes
            .iter()
            .map(|suffix| dir.join(format!("{base}{suffix}")))
            .collect()
    }

    /// File names that do not exist on disk, in suffix order.
    pub fn missing(&self, dir: &Path, base: &str) -> Vec<String> {
        self.suffixes
            .iter()
            .map(|suffix| format!("{base}{suffix}"))
            .filter(|name| !dir.join(name).is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_sizes() {
        assert_eq!(ArtifactSet::for_media(MediaType::CdRom).suffixes.len(), 18);
        assert_eq!(ArtifactSet::for_media(MediaType::GdRom).suffixes.len(), 18);
        assert_eq!(ArtifactSet::for_media(MediaType::BluRay).suffixes.len(), 7);
        assert_eq!(ArtifactSet::for_media(MediaType::FlashDrive).suffixes.len(), 3);
    }

    #[test]
    fn missing_reports_every_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet::for_media(MediaType::FloppyDisk);
        std::fs::write(dir.path().join("disk.dat"), "").unwrap();

        assert_eq!(set.missing(dir.path(), "disk"), vec!["disk_cmd.txt", "disk_disc.txt"]);
    }
}

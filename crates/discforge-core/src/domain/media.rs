//! Physical media types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DiscForgeError;

/// Physical media being dumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    CdRom,
    Dvd,
    GdRom,
    HdDvd,
    BluRay,
    NintendoGameCubeGameDisc,
    NintendoWiiOpticalDisc,
    FloppyDisk,
    FlashDrive,
    DataCartridge,
}

/// How a media type lays out its dump output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    /// CD-style media: several tracks, cuesheet, subchannel.
    MultiTrackOptical,
    /// DVD-style media: one image, optional second layer.
    SingleTrackOptical,
    /// Floppies, flash drives and tapes: one flat image.
    BlockDevice,
}

impl MediaType {
    pub const ALL: &'static [MediaType] = &[
        MediaType::CdRom,
        MediaType::Dvd,
        MediaType::GdRom,
        MediaType::HdDvd,
        MediaType::BluRay,
        MediaType::NintendoGameCubeGameDisc,
        MediaType::NintendoWiiOpticalDisc,
        MediaType::FloppyDisk,
        MediaType::FlashDrive,
        MediaType::DataCartridge,
    ];

    pub fn long_name(self) -> &'static str {
        match self {
            Self::CdRom => "CD-ROM",
            Self::Dvd => "DVD",
            Self::GdRom => "GD-ROM",
            Self::HdDvd => "HD-DVD",
            Self::BluRay => "BD-ROM",
            Self::NintendoGameCubeGameDisc => "GameCube Game Disc",
            Self::NintendoWiiOpticalDisc => "Wii Optical Disc",
            Self::FloppyDisk => "Floppy Disk",
            Self::FlashDrive => "Flash Drive",
            Self::DataCartridge => "Data Cartridge",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::CdRom => "cd",
            Self::Dvd => "dvd",
            Self::GdRom => "gd",
            Self::HdDvd => "hddvd",
            Self::BluRay => "bd",
            Self::NintendoGameCubeGameDisc => "gc-disc",
            Self::NintendoWiiOpticalDisc => "wii-disc",
            Self::FloppyDisk => "fd",
            Self::FlashDrive => "flash",
            Self::DataCartridge => "tape",
        }
    }

    pub fn category(self) -> MediaCategory {
        match self {
            Self::CdRom | Self::GdRom => MediaCategory::MultiTrackOptical,
            Self::Dvd
            | Self::HdDvd
            | Self::BluRay
            | Self::NintendoGameCubeGameDisc
            | Self::NintendoWiiOpticalDisc => MediaCategory::SingleTrackOptical,
            Self::FloppyDisk | Self::FlashDrive | Self::DataCartridge => {
                MediaCategory::BlockDevice
            }
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

impl FromStr for MediaType {
    type Err = DiscForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        MediaType::ALL
            .iter()
            .copied()
            .find(|m| m.short_name() == needle || m.long_name().to_ascii_lowercase() == needle)
            .ok_or_else(|| DiscForgeError::UnknownMedia(s.to_string()))
    }
}

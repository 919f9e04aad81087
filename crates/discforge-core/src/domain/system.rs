//! Known systems and their display tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DiscForgeError;
use super::media::MediaType;

/// Platform a dumped disc belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownSystem {
    AppleMacintosh,
    AtariJaguarCD,
    AudioCD,
    BDVideo,
    DVDVideo,
    EnhancedCD,
    HasbroVideoNow,
    HasbroVideoNowColor,
    HasbroVideoNowXP,
    IBMPCCompatible,
    MicrosoftXbox,
    MicrosoftXbox360,
    NECPCEngineCD,
    NintendoGameCube,
    NintendoWii,
    Panasonic3DO,
    PhilipsCDi,
    SegaCDMegaCD,
    SegaDreamcast,
    SegaSaturn,
    SNKNeoGeoCD,
    SonyPlayStation,
    SonyPlayStation2,
    SonyPlayStation3,
    SonyPlayStation4,
    SuperAudioCD,
}

impl KnownSystem {
    /// Every variant, in declaration order.
    pub const ALL: &'static [KnownSystem] = &[
        KnownSystem::AppleMacintosh,
        KnownSystem::AtariJaguarCD,
        KnownSystem::AudioCD,
        KnownSystem::BDVideo,
        KnownSystem::DVDVideo,
        KnownSystem::EnhancedCD,
        KnownSystem::HasbroVideoNow,
        KnownSystem::HasbroVideoNowColor,
        KnownSystem::HasbroVideoNowXP,
        KnownSystem::IBMPCCompatible,
        KnownSystem::MicrosoftXbox,
        KnownSystem::MicrosoftXbox360,
        KnownSystem::NECPCEngineCD,
        KnownSystem::NintendoGameCube,
        KnownSystem::NintendoWii,
        KnownSystem::Panasonic3DO,
        KnownSystem::PhilipsCDi,
        KnownSystem::SegaCDMegaCD,
        KnownSystem::SegaDreamcast,
        KnownSystem::SegaSaturn,
        KnownSystem::SNKNeoGeoCD,
        KnownSystem::SonyPlayStation,
        KnownSystem::SonyPlayStation2,
        KnownSystem::SonyPlayStation3,
        KnownSystem::SonyPlayStation4,
        KnownSystem::SuperAudioCD,
    ];

    /// Human-readable name used in submissions.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::AppleMacintosh => "Apple Macintosh",
            Self::AtariJaguarCD => "Atari Jaguar CD Interactive Multimedia System",
            Self::AudioCD => "Audio CD",
            Self::BDVideo => "BD-Video",
            Self::DVDVideo => "DVD-Video",
            Self::EnhancedCD => "Enhanced CD",
            Self::HasbroVideoNow => "Hasbro VideoNow",
            Self::HasbroVideoNowColor => "Hasbro VideoNow Color",
            Self::HasbroVideoNowXP => "Hasbro VideoNow XP",
            Self::IBMPCCompatible => "IBM PC compatible",
            Self::MicrosoftXbox => "Microsoft Xbox",
            Self::MicrosoftXbox360 => "Microsoft Xbox 360",
            Self::NECPCEngineCD => "NEC PC Engine CD & TurboGrafx CD",
            Self::NintendoGameCube => "Nintendo GameCube",
            Self::NintendoWii => "Nintendo Wii",
            Self::Panasonic3DO => "Panasonic 3DO Interactive Multiplayer",
            Self::PhilipsCDi => "Philips CD-i",
            Self::SegaCDMegaCD => "Sega Mega CD & Sega CD",
            Self::SegaDreamcast => "Sega Dreamcast",
            Self::SegaSaturn => "Sega Saturn",
            Self::SNKNeoGeoCD => "Neo Geo CD",
            Self::SonyPlayStation => "Sony PlayStation",
            Self::SonyPlayStation2 => "Sony PlayStation 2",
            Self::SonyPlayStation3 => "Sony PlayStation 3",
            Self::SonyPlayStation4 => "Sony PlayStation 4",
            Self::SuperAudioCD => "Super Audio CD",
        }
    }

    /// Catalog short code, also accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::AppleMacintosh => "mac",
            Self::AtariJaguarCD => "ajcd",
            Self::AudioCD => "audio-cd",
            Self::BDVideo => "bd-video",
            Self::DVDVideo => "dvd-video",
            Self::EnhancedCD => "enhanced-cd",
            Self::HasbroVideoNow => "hvn",
            Self::HasbroVideoNowColor => "hvnc",
            Self::HasbroVideoNowXP => "hvnxp",
            Self::IBMPCCompatible => "pc",
            Self::MicrosoftXbox => "xbox",
            Self::MicrosoftXbox360 => "xbox360",
            Self::NECPCEngineCD => "pce",
            Self::NintendoGameCube => "gc",
            Self::NintendoWii => "wii",
            Self::Panasonic3DO => "3do",
            Self::PhilipsCDi => "cdi",
            Self::SegaCDMegaCD => "mcd",
            Self::SegaDreamcast => "dc",
            Self::SegaSaturn => "ss",
            Self::SNKNeoGeoCD => "ngcd",
            Self::SonyPlayStation => "psx",
            Self::SonyPlayStation2 => "ps2",
            Self::SonyPlayStation3 => "ps3",
            Self::SonyPlayStation4 => "ps4",
            Self::SuperAudioCD => "sacd",
        }
    }

    /// Extra spellings accepted by `FromStr`.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::IBMPCCompatible => &["ibm", "ibmpc", "windows"],
            Self::MicrosoftXbox360 => &["x360"],
            Self::SegaCDMegaCD => &["segacd", "megacd"],
            Self::SegaDreamcast => &["dreamcast"],
            Self::SegaSaturn => &["saturn"],
            Self::SonyPlayStation => &["ps1", "playstation"],
            Self::NintendoGameCube => &["gamecube", "ngc"],
            _ => &[],
        }
    }

    /// Media this system usually ships on.
    pub fn default_media(self) -> MediaType {
        match self {
            Self::BDVideo | Self::SonyPlayStation3 | Self::SonyPlayStation4 => MediaType::BluRay,
            Self::DVDVideo
            | Self::MicrosoftXbox
            | Self::MicrosoftXbox360
            | Self::SonyPlayStation2
            | Self::SuperAudioCD => MediaType::Dvd,
            Self::NintendoGameCube => MediaType::NintendoGameCubeGameDisc,
            Self::NintendoWii => MediaType::NintendoWiiOpticalDisc,
            Self::SegaDreamcast => MediaType::GdRom,
            _ => MediaType::CdRom,
        }
    }

    /// Region to assume when nothing else names one.
    pub fn default_region(self) -> Option<&'static str> {
        match self {
            Self::HasbroVideoNow | Self::HasbroVideoNowColor | Self::HasbroVideoNowXP => {
                Some("USA")
            }
            _ => None,
        }
    }

    /// Label of the mandatory build-date field, for systems that have one.
    pub fn build_date_label(self) -> Option<&'static str> {
        match self {
            Self::SonyPlayStation | Self::SonyPlayStation2 => Some("EXE Date"),
            Self::SegaSaturn | Self::SegaDreamcast => Some("Build Date"),
            _ => None,
        }
    }
}

impl fmt::Display for KnownSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

impl FromStr for KnownSystem {
    type Err = DiscForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        KnownSystem::ALL
            .iter()
            .copied()
            .find(|sys| {
                sys.short_name() == needle
                    || sys.long_name().to_ascii_lowercase() == needle
                    || sys.aliases().contains(&needle.as_str())
            })
            .ok_or_else(|| DiscForgeError::UnknownSystem(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_system_parses_back_from_its_short_name() {
        for sys in KnownSystem::ALL {
            assert_eq!(sys.short_name().parse::<KnownSystem>().unwrap(), *sys);
            assert_eq!(sys.long_name().parse::<KnownSystem>().unwrap(), *sys);
        }
    }

    #[test]
    fn names_and_aliases_are_unique() {
        let mut seen = HashSet::new();
        for sys in KnownSystem::ALL {
            assert!(seen.insert(sys.short_name()), "duplicate {}", sys.short_name());
            for alias in sys.aliases() {
                assert!(seen.insert(alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn all_lists_every_variant_once() {
        let unique: HashSet<_> = KnownSystem::ALL.iter().collect();
        assert_eq!(unique.len(), KnownSystem::ALL.len());
    }

    #[test]
    fn aliases_parse() {
        assert_eq!("saturn".parse::<KnownSystem>().unwrap(), KnownSystem::SegaSaturn);
        assert_eq!("PS1".parse::<KnownSystem>().unwrap(), KnownSystem::SonyPlayStation);
        assert!("n64".parse::<KnownSystem>().is_err());
    }

    #[test]
    fn build_date_systems() {
        assert_eq!(KnownSystem::SegaSaturn.build_date_label(), Some("Build Date"));
        assert_eq!(KnownSystem::SonyPlayStation.build_date_label(), Some("EXE Date"));
        assert_eq!(KnownSystem::IBMPCCompatible.build_date_label(), None);
    }

    #[test]
    fn default_media_for_disc_consoles() {
        assert_eq!(KnownSystem::SegaDreamcast.default_media(), MediaType::GdRom);
        assert_eq!(KnownSystem::SonyPlayStation2.default_media(), MediaType::Dvd);
        assert_eq!(KnownSystem::SonyPlayStation.default_media(), MediaType::CdRom);
    }
}

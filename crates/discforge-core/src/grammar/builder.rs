//! Command string builder.
//!
//! Turns a semantic selection into a command string. The output always
//! passes `validator::validate`; a string that would not is reported as
//! an error instead of being returned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{Command, Flag, SlotKind};
use super::tokenizer::quote_if_needed;
use super::validator::validate;
use crate::domain::{DiscForgeError, KnownSystem, MediaType, Result};

/// Option set applied on top of the positional prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpOptions {
    pub quiet: bool,
    pub paranoid: bool,
    pub reread_count: u32,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            quiet: false,
            paranoid: false,
            reread_count: 20,
        }
    }
}

/// Everything the builder needs to produce one command string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRequest {
    pub system: KnownSystem,
    pub media: MediaType,
    pub drive: char,
    pub path: String,
    pub speed: u32,
    pub options: DumpOptions,
}

impl DumpRequest {
    pub fn new(system: KnownSystem, media: MediaType, drive: char, path: impl Into<String>) -> Self {
        Self {
            system,
            media,
            drive,
            path: path.into(),
            speed: 0,
            options: DumpOptions::default(),
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }
}

/// Command used to dump `media` for `system`.
pub fn command_for(system: KnownSystem, media: MediaType) -> Result<Command> {
    match media {
        MediaType::CdRom => Ok(Command::CompactDisc),
        MediaType::Dvd => match system {
            KnownSystem::MicrosoftXbox | KnownSystem::MicrosoftXbox360 => Ok(Command::Xbox),
            _ => Ok(Command::Dvd),
        },
        MediaType::NintendoGameCubeGameDisc => Ok(Command::Dvd),
        MediaType::GdRom => Ok(Command::GdRom),
        MediaType::BluRay => Ok(Command::BluRay),
        MediaType::FloppyDisk => Ok(Command::Floppy),
        MediaType::FlashDrive => Ok(Command::Disk),
        MediaType::DataCartridge => Ok(Command::Tape),
        MediaType::HdDvd | MediaType::NintendoWiiOpticalDisc => {
            Err(DiscForgeError::UnsupportedMedia(media.long_name().to_string()))
        }
    }
}

/// Flags derived from the selection, keyed in declared order.
fn option_flags(request: &DumpRequest, command: Command) -> BTreeMap<Flag, Vec<String>> {
    let mut flags = BTreeMap::new();
    let reread = request.options.reread_count.to_string();
    let paranoid = request.options.paranoid;

    if request.options.quiet {
        flags.insert(Flag::DisableBeep, vec![]);
    }

    match request.media {
        MediaType::CdRom => {
            flags.insert(Flag::C2Opcode, vec![reread]);
            match request.system {
                KnownSystem::IBMPCCompatible | KnownSystem::AppleMacintosh => {
                    flags.insert(Flag::NoFixSubQSecuRom, vec![]);
                    flags.insert(Flag::ScanFileProtect, vec![]);
                    if paranoid {
                        flags.insert(Flag::ScanSectorProtect, vec![]);
                        flags.insert(Flag::SubchannelReadLevel, vec!["2".to_string()]);
                    }
                }
                KnownSystem::SonyPlayStation => {
                    flags.insert(Flag::ScanAntiMod, vec![]);
                    flags.insert(Flag::NoFixSubQLibCrypt, vec![]);
                }
                KnownSystem::AtariJaguarCD => {
                    flags.insert(Flag::AtariJaguar, vec![]);
                }
                KnownSystem::HasbroVideoNow => {
                    flags.insert(Flag::VideoNow, vec![]);
                }
                KnownSystem::HasbroVideoNowColor => {
                    flags.insert(Flag::VideoNowColor, vec![]);
                }
                KnownSystem::HasbroVideoNowXP => {
                    flags.insert(Flag::VideoNowXp, vec![]);
                }
                _ => {}
            }
        }
        MediaType::Dvd => {
            flags.insert(Flag::DvdReread, vec![reread]);
            if paranoid {
                flags.insert(Flag::CopyrightManagementInfo, vec![]);
                flags.insert(Flag::ScanFileProtect, vec![]);
            }
        }
        MediaType::NintendoGameCubeGameDisc => {
            flags.insert(Flag::Raw, vec![]);
            flags.insert(Flag::DvdReread, vec![reread]);
        }
        MediaType::GdRom => {
            flags.insert(Flag::C2Opcode, vec![reread]);
        }
        _ => {}
    }

    let spec = command.spec();
    flags.retain(|flag, _| spec.permits(*flag));
    flags
}

/// Build a command string for `request`.
pub fn build(request: &DumpRequest) -> Result<String> {
    let command = command_for(request.system, request.media)?;
    let spec = command.spec();

    let drive = request.drive.to_ascii_uppercase();
    if !drive.is_ascii_alphabetic() {
        return Err(DiscForgeError::InvalidDrive(request.drive.to_string()));
    }

    let path = request.path.trim();
    if path.is_empty() || path.starts_with('/') || path.contains('"') {
        return Err(DiscForgeError::InvalidPath(request.path.clone()));
    }

    let mut parts = vec![command.keyword().to_string()];
    for slot in spec.slots {
        match slot.kind {
            SlotKind::Drive => parts.push(drive.to_string()),
            SlotKind::Path => parts.push(quote_if_needed(path)),
            SlotKind::Int { lo, hi } => {
                if !(lo..=hi).contains(&i64::from(request.speed)) {
                    return Err(DiscForgeError::SpeedOutOfRange {
                        command: command.keyword().to_string(),
                        speed: request.speed,
                        lo,
                        hi,
                    });
                }
                parts.push(request.speed.to_string());
            }
        }
    }

    for (flag, args) in option_flags(request, command) {
        parts.push(flag.token().to_string());
        parts.extend(args);
    }

    let line = parts.join(" ");
    if !validate(&line) {
        return Err(DiscForgeError::InvalidCommand(line));
    }

    tracing::debug!(command = %line, system = %request.system, media = %request.media, "Built dump command");
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(system: KnownSystem, media: MediaType) -> DumpRequest {
        DumpRequest::new(system, media, 'f', "game.bin").with_speed(8)
    }

    #[test]
    fn builds_plain_cd_command() {
        let line = build(&request(KnownSystem::SegaSaturn, MediaType::CdRom)).unwrap();
        assert_eq!(line, "cd F game.bin 8 /c2 20");
    }

    #[test]
    fn playstation_adds_antimod_and_libcrypt() {
        let line = build(&request(KnownSystem::SonyPlayStation, MediaType::CdRom)).unwrap();
        assert_eq!(line, "cd F game.bin 8 /am /c2 20 /nl");
    }

    #[test]
    fn paranoid_pc_flags_follow_declared_order() {
        let options = DumpOptions {
            quiet: true,
            paranoid: true,
            reread_count: 10,
        };
        let req = request(KnownSystem::IBMPCCompatible, MediaType::CdRom).with_options(options);
        let line = build(&req).unwrap();
        assert_eq!(line, "cd F game.bin 8 /q /c2 10 /ns /s 2 /sf /ss");
    }

    #[test]
    fn xbox_dvd_uses_xbox_command_without_speed() {
        let line = build(&request(KnownSystem::MicrosoftXbox, MediaType::Dvd)).unwrap();
        assert_eq!(line, "xbox F game.bin /rr 20");
    }

    #[test]
    fn gamecube_uses_raw_dvd() {
        let line = build(&request(
            KnownSystem::NintendoGameCube,
            MediaType::NintendoGameCubeGameDisc,
        ))
        .unwrap();
        assert_eq!(line, "dvd F game.bin 8 /raw /rr 20");
    }

    #[test]
    fn tape_has_only_a_path() {
        let line = build(&request(KnownSystem::IBMPCCompatible, MediaType::DataCartridge)).unwrap();
        assert_eq!(line, "tape game.bin");
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let req = DumpRequest::new(KnownSystem::SegaDreamcast, MediaType::GdRom, 'E', "My Games/dc.bin")
            .with_speed(4);
        assert_eq!(build(&req).unwrap(), "gd E \"My Games/dc.bin\" 4 /c2 20");
    }

    #[test]
    fn rejects_unsupported_media() {
        let err = build(&request(KnownSystem::NintendoWii, MediaType::NintendoWiiOpticalDisc))
            .unwrap_err();
        assert!(matches!(err, DiscForgeError::UnsupportedMedia(_)));
        let err = build(&request(KnownSystem::DVDVideo, MediaType::HdDvd)).unwrap_err();
        assert!(matches!(err, DiscForgeError::UnsupportedMedia(_)));
    }

    #[test]
    fn rejects_out_of_range_speed() {
        let req = request(KnownSystem::DVDVideo, MediaType::Dvd).with_speed(48);
        assert!(matches!(
            build(&req),
            Err(DiscForgeError::SpeedOutOfRange { hi: 24, .. })
        ));
    }

    #[test]
    fn rejects_bad_drive_and_path() {
        let mut req = request(KnownSystem::SegaSaturn, MediaType::CdRom);
        req.drive = '1';
        assert!(matches!(build(&req), Err(DiscForgeError::InvalidDrive(_))));

        let req = DumpRequest::new(KnownSystem::SegaSaturn, MediaType::CdRom, 'F', "/q");
        assert!(matches!(build(&req), Err(DiscForgeError::InvalidPath(_))));
    }
}

//! Recover a semantic selection from a command string.
//!
//! Each command keyword maps to a generic (media, system) pair. Override
//! flags then refine the pair, checked in this fixed order with the first
//! match winning:
//!
//! 1. `/raw` forces a GameCube game disc on a GameCube
//! 2. `/nl` or `/am` forces the Sony PlayStation
//! 3. `/aj` forces the Atari Jaguar CD
//! 4. `/vn`, `/vnc`, `/vnx` force the matching Hasbro VideoNow model

use serde::{Deserialize, Serialize};

use super::catalog::{Command, Flag, SlotKind};
use super::tokenizer::{tokenize, unquote};
use super::validator::parse;
use crate::domain::{KnownSystem, MediaType};

/// Best-effort selection; `None` where the string does not say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredSelection {
    pub media: Option<MediaType>,
    pub system: Option<KnownSystem>,
    pub drive: Option<char>,
    pub path: Option<String>,
}

/// Generic (media, system) pair for a command keyword.
pub fn defaults_for(command: Command) -> (Option<MediaType>, Option<KnownSystem>) {
    use Command::*;
    match command {
        Audio => (Some(MediaType::CdRom), Some(KnownSystem::AudioCD)),
        CompactDisc | Data | Swap => (Some(MediaType::CdRom), Some(KnownSystem::IBMPCCompatible)),
        Dvd => (Some(MediaType::Dvd), Some(KnownSystem::IBMPCCompatible)),
        BluRay => (Some(MediaType::BluRay), Some(KnownSystem::SonyPlayStation3)),
        Floppy => (Some(MediaType::FloppyDisk), Some(KnownSystem::IBMPCCompatible)),
        Disk => (Some(MediaType::FlashDrive), Some(KnownSystem::IBMPCCompatible)),
        GdRom => (Some(MediaType::GdRom), Some(KnownSystem::SegaDreamcast)),
        Xbox | XboxSwap => (Some(MediaType::Dvd), Some(KnownSystem::MicrosoftXbox)),
        Xgd2Swap | Xgd3Swap => (Some(MediaType::Dvd), Some(KnownSystem::MicrosoftXbox360)),
        Sacd => (Some(MediaType::Dvd), Some(KnownSystem::SuperAudioCD)),
        Tape => (Some(MediaType::DataCartridge), None),
        Close | DriveSpeed | Eject | Reset | Start | Stop | Sub | Mds | Merge => (None, None),
    }
}

fn apply_overrides(
    flags: &[Flag],
    media: Option<MediaType>,
    system: Option<KnownSystem>,
) -> (Option<MediaType>, Option<KnownSystem>) {
    let has = |f: Flag| flags.contains(&f);

    if has(Flag::Raw) {
        (
            Some(MediaType::NintendoGameCubeGameDisc),
            Some(KnownSystem::NintendoGameCube),
        )
    } else if has(Flag::NoFixSubQLibCrypt) || has(Flag::ScanAntiMod) {
        (media, Some(KnownSystem::SonyPlayStation))
    } else if has(Flag::AtariJaguar) {
        (media, Some(KnownSystem::AtariJaguarCD))
    } else if has(Flag::VideoNow) {
        (media, Some(KnownSystem::HasbroVideoNow))
    } else if has(Flag::VideoNowColor) {
        (media, Some(KnownSystem::HasbroVideoNowColor))
    } else if has(Flag::VideoNowXp) {
        (media, Some(KnownSystem::HasbroVideoNowXP))
    } else {
        (media, system)
    }
}

/// Infer the selection behind `input`.
///
/// Valid strings are read through the validator. Invalid ones are scanned
/// leniently: the keyword, any recognizable flags, and positional tokens
/// that fit their slot still contribute.
pub fn infer(input: &str) -> InferredSelection {
    let (command, positionals, flags) = match parse(input) {
        Some(parsed) => {
            let flags = parsed.flags.iter().map(|f| f.flag).collect::<Vec<_>>();
            (parsed.command, parsed.positionals, flags)
        }
        None => {
            let tokens = tokenize(input);
            let Some(command) = tokens.first().and_then(|k| Command::from_keyword(k)) else {
                return InferredSelection::default();
            };
            let slot_count = command.spec().slots.len();
            let positionals = tokens
                .iter()
                .skip(1)
                .take(slot_count)
                .take_while(|t| !t.starts_with('/'))
                .map(|t| unquote(t).to_string())
                .collect();
            let flags = tokens.iter().filter_map(|t| Flag::from_token(t)).collect();
            (command, positionals, flags)
        }
    };

    let (media, system) = defaults_for(command);
    let (media, system) = apply_overrides(&flags, media, system);

    let spec = command.spec();
    let mut drive = None;
    let mut path = None;
    for (slot, value) in spec.slots.iter().zip(&positionals) {
        match slot.kind {
            SlotKind::Drive if drive.is_none() => {
                drive = value.chars().next().filter(char::is_ascii_uppercase);
            }
            SlotKind::Path if path.is_none() => path = Some(value.clone()),
            _ => {}
        }
    }

    InferredSelection {
        media,
        system,
        drive,
        path,
    }
}

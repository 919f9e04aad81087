//! Static command catalog for the dumping tool.
//!
//! Every accepted command keyword, its positional slots in order, and the
//! flags it permits. The tables are `'static` and never change at runtime.

use serde::{Deserialize, Serialize};

const LBA_MAX: i64 = i32::MAX as i64;

/// Kind of a positional slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Drive letter, `F`, `F:` or `F:\`.
    Drive,
    /// Output or input path; must not look like a flag.
    Path,
    /// Integer within an inclusive range.
    Int { lo: i64, hi: i64 },
}

/// A named positional slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalSlot {
    pub name: &'static str,
    pub kind: SlotKind,
}

const DRIVE: PositionalSlot = PositionalSlot {
    name: "drive",
    kind: SlotKind::Drive,
};
const PATH: PositionalSlot = PositionalSlot {
    name: "path",
    kind: SlotKind::Path,
};
const SPEED_CD: PositionalSlot = PositionalSlot {
    name: "speed",
    kind: SlotKind::Int { lo: 0, hi: 72 },
};
const SPEED_DVD: PositionalSlot = PositionalSlot {
    name: "speed",
    kind: SlotKind::Int { lo: 0, hi: 24 },
};
const START_LBA: PositionalSlot = PositionalSlot {
    name: "start_lba",
    kind: SlotKind::Int { lo: 0, hi: LBA_MAX },
};
const END_LBA: PositionalSlot = PositionalSlot {
    name: "end_lba",
    kind: SlotKind::Int { lo: 0, hi: LBA_MAX },
};

/// Argument accepted after a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Int { lo: i64, hi: i64 },
    Choice(&'static [&'static str]),
}

impl ArgKind {
    /// Whether `token` is an acceptable argument value.
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            ArgKind::Int { lo, hi } => token
                .parse::<i64>()
                .map(|v| (*lo..=*hi).contains(&v))
                .unwrap_or(false),
            ArgKind::Choice(values) => values.contains(&token),
        }
    }
}

/// Trailing arguments a flag may consume. Every argument is optional:
/// a missing token or a following flag means "omitted, use the default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagArgs {
    pub kind: ArgKind,
    pub max: usize,
}

/// Tool commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Audio,
    BluRay,
    Close,
    CompactDisc,
    Data,
    Disk,
    DriveSpeed,
    Dvd,
    Eject,
    Floppy,
    GdRom,
    Mds,
    Merge,
    Reset,
    Sacd,
    Start,
    Stop,
    Sub,
    Swap,
    Tape,
    Xbox,
    XboxSwap,
    Xgd2Swap,
    Xgd3Swap,
}

impl Command {
    pub const ALL: &'static [Command] = &[
        Command::Audio,
        Command::BluRay,
        Command::Close,
        Command::CompactDisc,
        Command::Data,
        Command::Disk,
        Command::DriveSpeed,
        Command::Dvd,
        Command::Eject,
        Command::Floppy,
        Command::GdRom,
        Command::Mds,
        Command::Merge,
        Command::Reset,
        Command::Sacd,
        Command::Start,
        Command::Stop,
        Command::Sub,
        Command::Swap,
        Command::Tape,
        Command::Xbox,
        Command::XboxSwap,
        Command::Xgd2Swap,
        Command::Xgd3Swap,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Command::Audio => "audio",
            Command::BluRay => "bd",
            Command::Close => "close",
            Command::CompactDisc => "cd",
            Command::Data => "data",
            Command::Disk => "disk",
            Command::DriveSpeed => "ls",
            Command::Dvd => "dvd",
            Command::Eject => "eject",
            Command::Floppy => "fd",
            Command::GdRom => "gd",
            Command::Mds => "mds",
            Command::Merge => "merge",
            Command::Reset => "reset",
            Command::Sacd => "sacd",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Sub => "sub",
            Command::Swap => "swap",
            Command::Tape => "tape",
            Command::Xbox => "xbox",
            Command::XboxSwap => "xboxswap",
            Command::Xgd2Swap => "xgd2swap",
            Command::Xgd3Swap => "xgd3swap",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Command> {
        Command::ALL.iter().copied().find(|c| c.keyword() == keyword)
    }

    pub fn spec(self) -> CommandSpec {
        let slots: &'static [PositionalSlot] = match self {
            Command::Audio | Command::Data => &[DRIVE, PATH, SPEED_CD, START_LBA, END_LBA],
            Command::CompactDisc
            | Command::GdRom
            | Command::Swap
            | Command::XboxSwap
            | Command::Xgd2Swap
            | Command::Xgd3Swap => &[DRIVE, PATH, SPEED_CD],
            Command::Dvd => &[DRIVE, PATH, SPEED_DVD],
            Command::BluRay | Command::Floppy | Command::Disk | Command::Sacd | Command::Xbox => {
                &[DRIVE, PATH]
            }
            Command::Close
            | Command::DriveSpeed
            | Command::Eject
            | Command::Reset
            | Command::Start
            | Command::Stop => &[DRIVE],
            Command::Sub | Command::Mds | Command::Tape => &[PATH],
            Command::Merge => &[PATH, PATH],
        };

        let flags: &'static [Flag] = match self {
            Command::CompactDisc => CD_FLAGS,
            Command::Audio | Command::Data => AUDIO_DATA_FLAGS,
            Command::GdRom => GD_FLAGS,
            Command::Swap => SWAP_FLAGS,
            Command::Dvd => DVD_FLAGS,
            Command::BluRay => BD_FLAGS,
            Command::Xbox | Command::XboxSwap | Command::Xgd2Swap | Command::Xgd3Swap => {
                XBOX_FLAGS
            }
            Command::Sacd => SACD_FLAGS,
            _ => &[],
        };

        CommandSpec {
            command: self,
            slots,
            flags,
        }
    }
}

/// One command's grammar: keyword, positional slots, permitted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: Command,
    pub slots: &'static [PositionalSlot],
    pub flags: &'static [Flag],
}

impl CommandSpec {
    pub fn permits(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Bounds of the speed slot, if the command has one.
    pub fn speed_bounds(&self) -> Option<(i64, i64)> {
        self.slots
            .iter()
            .find(|s| s.name == "speed")
            .and_then(|s| match s.kind {
                SlotKind::Int { lo, hi } => Some((lo, hi)),
                _ => None,
            })
    }
}

/// Look up a command spec by keyword.
pub fn lookup(keyword: &str) -> Option<CommandSpec> {
    Command::from_keyword(keyword).map(Command::spec)
}

/// Tool flags, in the catalog's declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    DisableBeep,
    AddOffset,
    AtariJaguar,
    ScanAntiMod,
    AnchorVolumeDescriptor,
    BeOpcode,
    CopyrightManagementInfo,
    C2Opcode,
    D8Opcode,
    ForceUnitAccess,
    MultiSession,
    ExtractMicrosoftCab,
    NoFixSubQLibCrypt,
    NoFixSubP,
    NoFixSubQ,
    NoFixSubRtoW,
    NoFixSubQSecuRom,
    NoSkipSecuritySector,
    Amsf,
    PadSector,
    Reverse,
    Raw,
    Resume,
    DvdReread,
    SubchannelReadLevel,
    ScanFileProtect,
    SkipSector,
    ScanSectorProtect,
    VideoNow,
    VideoNowColor,
    VideoNowXp,
    SeventyFour,
}

impl Flag {
    /// Declared order; the builder emits flags in this order.
    pub const ALL: &'static [Flag] = &[
        Flag::DisableBeep,
        Flag::AddOffset,
        Flag::AtariJaguar,
        Flag::ScanAntiMod,
        Flag::AnchorVolumeDescriptor,
        Flag::BeOpcode,
        Flag::CopyrightManagementInfo,
        Flag::C2Opcode,
        Flag::D8Opcode,
        Flag::ForceUnitAccess,
        Flag::MultiSession,
        Flag::ExtractMicrosoftCab,
        Flag::NoFixSubQLibCrypt,
        Flag::NoFixSubP,
        Flag::NoFixSubQ,
        Flag::NoFixSubRtoW,
        Flag::NoFixSubQSecuRom,
        Flag::NoSkipSecuritySector,
        Flag::Amsf,
        Flag::PadSector,
        Flag::Reverse,
        Flag::Raw,
        Flag::Resume,
        Flag::DvdReread,
        Flag::SubchannelReadLevel,
        Flag::ScanFileProtect,
        Flag::SkipSector,
        Flag::ScanSectorProtect,
        Flag::VideoNow,
        Flag::VideoNowColor,
        Flag::VideoNowXp,
        Flag::SeventyFour,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Flag::DisableBeep => "/q",
            Flag::AddOffset => "/a",
            Flag::AtariJaguar => "/aj",
            Flag::ScanAntiMod => "/am",
            Flag::AnchorVolumeDescriptor => "/avdp",
            Flag::BeOpcode => "/be",
            Flag::CopyrightManagementInfo => "/c",
            Flag::C2Opcode => "/c2",
            Flag::D8Opcode => "/d8",
            Flag::ForceUnitAccess => "/f",
            Flag::MultiSession => "/ms",
            Flag::ExtractMicrosoftCab => "/mscf",
            Flag::NoFixSubQLibCrypt => "/nl",
            Flag::NoFixSubP => "/np",
            Flag::NoFixSubQ => "/nq",
            Flag::NoFixSubRtoW => "/nr",
            Flag::NoFixSubQSecuRom => "/ns",
            Flag::NoSkipSecuritySector => "/nss",
            Flag::Amsf => "/p",
            Flag::PadSector => "/ps",
            Flag::Reverse => "/r",
            Flag::Raw => "/raw",
            Flag::Resume => "/re",
            Flag::DvdReread => "/rr",
            Flag::SubchannelReadLevel => "/s",
            Flag::ScanFileProtect => "/sf",
            Flag::SkipSector => "/sk",
            Flag::ScanSectorProtect => "/ss",
            Flag::VideoNow => "/vn",
            Flag::VideoNowColor => "/vnc",
            Flag::VideoNowXp => "/vnx",
            Flag::SeventyFour => "/74",
        }
    }

    pub fn from_token(token: &str) -> Option<Flag> {
        Flag::ALL.iter().copied().find(|f| f.token() == token)
    }

    /// Trailing arguments, or `None` for a standalone flag.
    pub fn args(self) -> Option<FlagArgs> {
        const SIGNED: ArgKind = ArgKind::Int {
            lo: i32::MIN as i64,
            hi: i32::MAX as i64,
        };
        const COUNT: ArgKind = ArgKind::Int { lo: 0, hi: LBA_MAX };

        match self {
            Flag::AddOffset | Flag::VideoNow => Some(FlagArgs {
                kind: SIGNED,
                max: 1,
            }),
            Flag::BeOpcode => Some(FlagArgs {
                kind: ArgKind::Choice(&["raw", "pack"]),
                max: 1,
            }),
            Flag::C2Opcode => Some(FlagArgs {
                kind: COUNT,
                max: 3,
            }),
            Flag::DvdReread | Flag::ScanFileProtect | Flag::SkipSector => Some(FlagArgs {
                kind: COUNT,
                max: 1,
            }),
            Flag::SubchannelReadLevel => Some(FlagArgs {
                kind: ArgKind::Int { lo: 0, hi: 2 },
                max: 1,
            }),
            _ => None,
        }
    }
}

const CD_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::AddOffset,
    Flag::AtariJaguar,
    Flag::ScanAntiMod,
    Flag::BeOpcode,
    Flag::C2Opcode,
    Flag::D8Opcode,
    Flag::ForceUnitAccess,
    Flag::MultiSession,
    Flag::ExtractMicrosoftCab,
    Flag::NoFixSubQLibCrypt,
    Flag::NoFixSubP,
    Flag::NoFixSubQ,
    Flag::NoFixSubRtoW,
    Flag::NoFixSubQSecuRom,
    Flag::Amsf,
    Flag::Resume,
    Flag::SubchannelReadLevel,
    Flag::ScanFileProtect,
    Flag::SkipSector,
    Flag::ScanSectorProtect,
    Flag::VideoNow,
    Flag::VideoNowColor,
    Flag::VideoNowXp,
    Flag::SeventyFour,
];

const AUDIO_DATA_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::AddOffset,
    Flag::BeOpcode,
    Flag::C2Opcode,
    Flag::D8Opcode,
    Flag::ForceUnitAccess,
    Flag::ExtractMicrosoftCab,
    Flag::NoFixSubQLibCrypt,
    Flag::NoFixSubP,
    Flag::NoFixSubQ,
    Flag::NoFixSubRtoW,
    Flag::NoFixSubQSecuRom,
    Flag::Amsf,
    Flag::Resume,
    Flag::SubchannelReadLevel,
    Flag::ScanFileProtect,
    Flag::SkipSector,
    Flag::SeventyFour,
];

const GD_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::BeOpcode,
    Flag::C2Opcode,
    Flag::D8Opcode,
    Flag::ForceUnitAccess,
    Flag::NoFixSubP,
    Flag::NoFixSubQ,
    Flag::NoFixSubRtoW,
    Flag::SubchannelReadLevel,
];

const SWAP_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::AddOffset,
    Flag::BeOpcode,
    Flag::C2Opcode,
    Flag::D8Opcode,
    Flag::ForceUnitAccess,
    Flag::ExtractMicrosoftCab,
    Flag::NoFixSubQLibCrypt,
    Flag::NoFixSubP,
    Flag::NoFixSubQ,
    Flag::NoFixSubRtoW,
    Flag::NoFixSubQSecuRom,
    Flag::Amsf,
    Flag::SubchannelReadLevel,
    Flag::ScanFileProtect,
    Flag::SeventyFour,
];

const DVD_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::AnchorVolumeDescriptor,
    Flag::CopyrightManagementInfo,
    Flag::ForceUnitAccess,
    Flag::PadSector,
    Flag::Reverse,
    Flag::Raw,
    Flag::Resume,
    Flag::DvdReread,
    Flag::ScanFileProtect,
    Flag::SkipSector,
];

const BD_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::AnchorVolumeDescriptor,
    Flag::ForceUnitAccess,
];

const XBOX_FLAGS: &[Flag] = &[
    Flag::DisableBeep,
    Flag::ForceUnitAccess,
    Flag::NoSkipSecuritySector,
    Flag::DvdReread,
];

const SACD_FLAGS: &[Flag] = &[Flag::DisableBeep];

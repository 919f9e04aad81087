//! Command grammar engine for the dumping tool.
//!
//! - `catalog`: commands, positional slots, flags and permissions
//! - `tokenizer`: quote-aware whitespace splitting
//! - `validator`: boolean validation and `ParsedInvocation`
//! - `builder`: selection to command string
//! - `inference`: command string back to selection

pub mod builder;
pub mod catalog;
pub mod inference;
pub mod tokenizer;
pub mod validator;

pub use builder::{build, command_for, DumpOptions, DumpRequest};
pub use catalog::{lookup, ArgKind, Command, CommandSpec, Flag, FlagArgs, PositionalSlot, SlotKind};
pub use inference::{infer, InferredSelection};
pub use validator::{parse, validate, FlagUse, ParsedInvocation};

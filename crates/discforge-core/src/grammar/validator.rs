//! Command string validation.
//!
//! `validate` is boolean by contract: no diagnostics, no partial results.
//! `parse` is the same pass but hands back the `ParsedInvocation` it built,
//! which only exists when the whole string is valid.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::catalog::{lookup, Command, Flag, SlotKind};
use super::tokenizer::{tokenize, unquote};

/// A flag occurrence and the arguments it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagUse {
    pub flag: Flag,
    pub args: Vec<String>,
}

/// A fully validated command string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInvocation {
    pub command: Command,
    /// Positional values in slot order, with quotes removed.
    pub positionals: Vec<String>,
    pub flags: Vec<FlagUse>,
}

impl ParsedInvocation {
    fn slot(&self, name: &str) -> Option<&str> {
        let spec = self.command.spec();
        spec.slots
            .iter()
            .position(|s| s.name == name)
            .and_then(|i| self.positionals.get(i))
            .map(String::as_str)
    }

    /// Drive letter without the colon or backslash.
    pub fn drive(&self) -> Option<char> {
        self.slot("drive").and_then(|d| d.chars().next())
    }

    /// First path slot.
    pub fn path(&self) -> Option<&str> {
        self.slot("path")
    }

    pub fn speed(&self) -> Option<u32> {
        self.slot("speed").and_then(|s| s.parse().ok())
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.iter().any(|f| f.flag == flag)
    }

    pub fn flag_args(&self, flag: Flag) -> Option<&[String]> {
        self.flags
            .iter()
            .find(|f| f.flag == flag)
            .map(|f| f.args.as_slice())
    }
}

fn drive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]:?\\?$").expect("drive pattern is valid"))
}

fn is_flag_token(token: &str) -> bool {
    token.starts_with('/')
}

fn slot_accepts(kind: SlotKind, token: &str) -> bool {
    match kind {
        SlotKind::Drive => drive_pattern().is_match(token),
        SlotKind::Path => {
            let path = unquote(token);
            !path.is_empty() && !is_flag_token(path)
        }
        SlotKind::Int { lo, hi } => token
            .parse::<i64>()
            .map(|v| (lo..=hi).contains(&v))
            .unwrap_or(false),
    }
}

/// Validate and decompose a command string.
pub fn parse(input: &str) -> Option<ParsedInvocation> {
    if input.trim().is_empty() {
        return None;
    }

    let tokens = tokenize(input);
    let (keyword, rest) = tokens.split_first()?;
    let spec = lookup(keyword)?;

    if rest.len() < spec.slots.len() {
        return None;
    }

    let mut positionals = Vec::with_capacity(spec.slots.len());
    for (slot, token) in spec.slots.iter().zip(rest) {
        if !slot_accepts(slot.kind, token) {
            return None;
        }
        positionals.push(unquote(token).to_string());
    }

    let mut flags = Vec::new();
    let mut remaining = rest[spec.slots.len()..].iter().peekable();
    while let Some(token) = remaining.next() {
        let flag = Flag::from_token(token)?;
        if !spec.permits(flag) {
            return None;
        }

        let mut args = Vec::new();
        if let Some(arg_spec) = flag.args() {
            for _ in 0..arg_spec.max {
                // A missing token or a following flag means "use the default".
                match remaining.peek() {
                    Some(next) if !is_flag_token(next) => {
                        if !arg_spec.kind.accepts(next) {
                            return None;
                        }
                        args.push((*next).clone());
                        remaining.next();
                    }
                    _ => break,
                }
            }
        }

        flags.push(FlagUse { flag, args });
    }

    Some(ParsedInvocation {
        command: spec.command,
        positionals,
        flags,
    })
}

/// Whether `input` is a valid command string.
pub fn validate(input: &str) -> bool {
    parse(input).is_some()
}

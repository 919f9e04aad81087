//! DiscForge Core Library
//!
//! Everything between "the user picked a system and a drive" and "a
//! submission file sits next to the dump":
//!
//! - [`grammar`]: validate, build and reverse-map dumping tool command lines
//! - [`extraction`]: gate on the sidecar files and scan them into fields
//! - [`matching`]: intersect per-track catalog hits
//! - [`submission`]: merge every source into one record and render it
//! - [`session`]: run the whole flow for one dump

pub mod config;
pub mod domain;
pub mod extraction;
pub mod grammar;
pub mod matching;
pub mod obs;
pub mod progress;
pub mod session;
pub mod submission;
pub mod telemetry;
pub mod tool;
pub mod version;

pub use config::Options;
pub use domain::{DiscForgeError, KnownSystem, MediaCategory, MediaType, Result};
pub use extraction::{
    ArtifactSet, ExtractedFields, ExtractionEngine, ExtractionOutcome, FieldKey, FieldValue,
    Fingerprint, LayerVariant,
};
pub use grammar::{
    build, infer, parse, validate, Command, DumpOptions, DumpRequest, Flag, InferredSelection,
    ParsedInvocation,
};
pub use matching::{MatchResolver, MatchResult};
pub use progress::{Progress, ProgressEvent};
pub use session::{process_output, DumpSession, OutputLocation, SessionOutcome, SubmissionReport};
pub use submission::{SubmissionAssembler, SubmissionRecord, UserMetadata};
pub use tool::{execute, execute_cancellable, CancelHandle, ToolOutput};
pub use version::fetch_latest_version;

/// DiscForge version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Submission assembly and rendering.

pub mod assembler;
pub mod record;
pub mod render;

pub use assembler::SubmissionAssembler;
pub use record::{
    CommonDiscInfo, CopyProtection, DumpingInfo, Extras, RingCode, RingCodes, SubmissionRecord,
    TrackData, UserMetadata, VersionAndEditions, OPTIONAL, REQUIRED, REQUIRED_IF_EXISTS,
};
pub use render::{
    collapse_blank_lines, load_json, render_text, write_json, write_submission, SubmissionFiles,
};

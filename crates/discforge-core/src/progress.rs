//! Push-style progress reporting for dump sessions.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Something a session wants its caller to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    ToolStarted { command: String },
    ToolFinished { exit_code: i32 },
    ExtractionStarted,
    ExtractionIncomplete { missing: Vec<String> },
    ExtractionCompleted { fields: usize },
    MatchStarted { tracks: usize },
    MatchResolved { candidates: usize },
    /// A non-fatal problem; the session carries on.
    Warning(String),
    SubmissionWritten { path: PathBuf },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolStarted { command } => write!(f, "running: {command}"),
            Self::ToolFinished { exit_code } => write!(f, "dumping tool exited with {exit_code}"),
            Self::ExtractionStarted => write!(f, "scanning dump output"),
            Self::ExtractionIncomplete { missing } => {
                write!(f, "dump output incomplete, missing {}", missing.join(", "))
            }
            Self::ExtractionCompleted { fields } => write!(f, "extracted {fields} fields"),
            Self::MatchStarted { tracks } => write!(f, "looking up {tracks} tracks"),
            Self::MatchResolved { candidates } => write!(f, "{candidates} catalog candidates"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
            Self::SubmissionWritten { path } => write!(f, "wrote {}", path.display()),
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Optional, fire-and-forget sink for [`ProgressEvent`]s.
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
}

impl Progress {
    pub fn new(callback: impl Fn(&ProgressEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn report(&self, event: ProgressEvent) {
        if let Some(cb) = &self.callback {
            cb(&event);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

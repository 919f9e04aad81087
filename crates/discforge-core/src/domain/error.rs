//! Domain-level error taxonomy for DiscForge.

/// DiscForge errors.
///
/// Command validation never produces one of these: it is boolean by
/// contract. Field scanners never do either; they degrade to an absent
/// field.
#[derive(Debug, thiserror::Error)]
pub enum DiscForgeError {
    #[error("no dumping command supports media type {0}")]
    UnsupportedMedia(String),

    #[error("invalid drive letter: {0}")]
    InvalidDrive(String),

    #[error("speed {speed} outside {lo}..={hi} for command {command}")]
    SpeedOutOfRange {
        command: String,
        speed: u32,
        lo: i64,
        hi: i64,
    },

    #[error("invalid output path: {0}")]
    InvalidPath(String),

    #[error("built command failed validation: {0}")]
    InvalidCommand(String),

    #[error("unknown system: {0}")]
    UnknownSystem(String),

    #[error("unknown media type: {0}")]
    UnknownMedia(String),

    #[error("dump output incomplete, missing: {}", .0.join(", "))]
    IncompleteDump(Vec<String>),

    #[error("failed to launch dumping tool: {0}")]
    ToolLaunch(String),

    #[error("dumping tool was cancelled")]
    Cancelled,

    #[error("update check failed: {0}")]
    UpdateCheck(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] redump_catalog::CatalogError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for DiscForge operations.
pub type Result<T> = std::result::Result<T, DiscForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discforge_error_display() {
        let err = DiscForgeError::UnsupportedMedia("HD-DVD".to_string());
        assert!(err.to_string().contains("HD-DVD"));

        let err = DiscForgeError::InvalidDrive("1:".to_string());
        assert!(err.to_string().contains("invalid drive letter"));
    }

    #[test]
    fn test_speed_out_of_range_error() {
        let err = DiscForgeError::SpeedOutOfRange {
            command: "cd".to_string(),
            speed: 90,
            lo: 0,
            hi: 72,
        };
        let msg = err.to_string();
        assert!(msg.contains("90"));
        assert!(msg.contains("0..=72"));
    }

    #[test]
    fn test_incomplete_dump_lists_missing_files() {
        let err = DiscForgeError::IncompleteDump(vec!["game.cue".to_string(), "game.sub".to_string()]);
        assert!(err.to_string().contains("game.cue, game.sub"));
    }
}

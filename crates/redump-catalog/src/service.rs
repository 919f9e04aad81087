//! Catalog protocol definitions
//!
//! The resolver in `discforge-core` only ever sees this trait, so the real
//! HTTP client and the in-memory fake are interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::Result;

/// Numeric identifier of a catalog entry (one physical disc).
pub type CatalogId = u64;

/// Handle returned by [`CatalogService::authenticate`].
///
/// Anonymous sessions can search public entries; some catalogs hide
/// unverified entries from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSession {
    username: Option<String>,
}

impl CatalogSession {
    /// Session without credentials.
    pub fn anonymous() -> Self {
        Self { username: None }
    }

    /// Session for a user whose login succeeded.
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

/// Fields a catalog entry can contribute to a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: CatalogId,
    pub title: Option<String>,
    pub foreign_title: Option<String>,
    pub system: Option<String>,
    pub region: Option<String>,
    pub languages: Vec<String>,
    pub serial: Option<String>,
    pub version: Option<String>,
    pub edition: Option<String>,
    pub barcode: Option<String>,
}

impl CatalogRecord {
    pub fn new(id: CatalogId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Remote disc catalog.
///
/// Implementations must be safe to share, but callers issue requests one at
/// a time; nothing here assumes concurrent use.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Log in and return a session handle.
    async fn authenticate(&self, username: &str, password: &str) -> Result<CatalogSession>;

    /// All catalog IDs having a track with this SHA-1. Empty when unknown.
    async fn search_by_sha1(&self, session: &CatalogSession, sha1: &str)
        -> Result<Vec<CatalogId>>;

    /// Full record for one catalog ID.
    async fn fetch_by_id(&self, session: &CatalogSession, id: CatalogId) -> Result<CatalogRecord>;
}

/// Reject anything that is not a 40 character hex digest.
pub fn check_sha1(sha1: &str) -> Result<()> {
    if sha1.len() != 40 || !sha1.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CatalogError::InvalidFingerprint(sha1.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kinds() {
        assert!(!CatalogSession::anonymous().is_authenticated());
        let session = CatalogSession::authenticated("dumper");
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("dumper"));
    }

    #[test]
    fn test_check_sha1() {
        assert!(check_sha1("da39a3ee5e6b4b0d3255bfef95601890afd80709").is_ok());
        assert!(check_sha1("da39a3ee").is_err());
        assert!(check_sha1("zz39a3ee5e6b4b0d3255bfef95601890afd80709").is_err());
    }
}

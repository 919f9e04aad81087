//! Error types for redump-catalog

use thiserror::Error;

use crate::service::CatalogId;

/// Errors that can occur while talking to the disc catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Login rejected by the catalog
    #[error("Authentication failed for user: {0}")]
    AuthenticationFailed(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Catalog answered with something we could not interpret
    #[error("Unexpected catalog response: {0}")]
    UnexpectedResponse(String),

    /// No record with this ID
    #[error("Catalog record not found: {0}")]
    NotFound(CatalogId),

    /// Search input is not a SHA-1 hex digest
    #[error("Invalid SHA-1 fingerprint: {0}")]
    InvalidFingerprint(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::AuthenticationFailed("dumper".to_string());
        assert!(err.to_string().contains("dumper"));

        let err = CatalogError::NotFound(4242);
        assert!(err.to_string().contains("4242"));
    }
}

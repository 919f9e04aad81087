//! In-memory catalog fake (testing only)
//!
//! `MemoryCatalog` answers searches from a `HashMap<sha1, ids>` and keeps a
//! log of every query so callers can assert on request order and count.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::service::{check_sha1, CatalogId, CatalogRecord, CatalogService, CatalogSession};
use crate::Result;

/// A single call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Authenticate(String),
    Search(String),
    Fetch(CatalogId),
}

/// In-memory catalog backed by fixed search results and records.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    searches: HashMap<String, Vec<CatalogId>>,
    records: HashMap<CatalogId, CatalogRecord>,
    credentials: Option<(String, String)>,
    fail_searches: bool,
    calls: Mutex<Vec<CatalogCall>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the IDs returned for a SHA-1.
    pub fn with_search(mut self, sha1: &str, ids: &[CatalogId]) -> Self {
        self.searches.insert(sha1.to_ascii_lowercase(), ids.to_vec());
        self
    }

    /// Register a full record.
    pub fn with_record(mut self, record: CatalogRecord) -> Self {
        self.records.insert(record.id, record);
        self
    }

    /// Only accept this username/password pair.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Make every search fail with an HTTP error.
    pub fn failing_searches(mut self) -> Self {
        self.fail_searches = true;
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().unwrap().clone()
    }

    /// SHA-1 values searched so far, oldest first.
    pub fn searched(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CatalogCall::Search(sha1) => Some(sha1),
                _ => None,
            })
            .collect()
    }

    fn record_call(&self, call: CatalogCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogService for MemoryCatalog {
    async fn authenticate(&self, username: &str, password: &str) -> Result<CatalogSession> {
        self.record_call(CatalogCall::Authenticate(username.to_string()));
        match &self.credentials {
            Some((user, pass)) if user == username && pass == password => {
                Ok(CatalogSession::authenticated(username))
            }
            Some(_) => Err(CatalogError::AuthenticationFailed(username.to_string())),
            None => Ok(CatalogSession::authenticated(username)),
        }
    }

    async fn search_by_sha1(
        &self,
        _session: &CatalogSession,
        sha1: &str,
    ) -> Result<Vec<CatalogId>> {
        check_sha1(sha1)?;
        let key = sha1.to_ascii_lowercase();
        self.record_call(CatalogCall::Search(key.clone()));
        if self.fail_searches {
            return Err(CatalogError::Http("connection refused".to_string()));
        }
        Ok(self.searches.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_by_id(&self, _session: &CatalogSession, id: CatalogId) -> Result<CatalogRecord> {
        self.record_call(CatalogCall::Fetch(id));
        self.records
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}

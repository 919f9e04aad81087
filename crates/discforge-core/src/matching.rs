//! Remote match resolver.
//!
//! Every track must match: the candidate set is the intersection of the
//! per-track search results. Queries run one at a time, in track order,
//! and stop as soon as the running set is empty.

use std::collections::BTreeSet;

use redump_catalog::{CatalogId, CatalogRecord, CatalogService, CatalogSession};
use serde::{Deserialize, Serialize};

use crate::domain::Result;
use crate::extraction::Fingerprint;

/// Converged candidates and, for a unique match, the catalog record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidates: BTreeSet<CatalogId>,
    pub record: Option<CatalogRecord>,
    /// Searches issued before the resolver stopped.
    pub tracks_queried: usize,
    /// Non-fatal problems, e.g. a unique match whose record could not be
    /// fetched.
    pub warnings: Vec<String>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn unique_id(&self) -> Option<CatalogId> {
        match self.candidates.len() {
            1 => self.candidates.iter().next().copied(),
            _ => None,
        }
    }
}

/// Resolves fingerprints against a catalog with one session.
pub struct MatchResolver<'a, C: CatalogService + ?Sized> {
    catalog: &'a C,
    session: &'a CatalogSession,
}

impl<'a, C: CatalogService + ?Sized> MatchResolver<'a, C> {
    pub fn new(catalog: &'a C, session: &'a CatalogSession) -> Self {
        Self { catalog, session }
    }

    /// Intersect per-track candidates.
    ///
    /// A search error aborts resolution; callers treat it as a warning and
    /// carry on with local data.
    pub async fn resolve(&self, tracks: &[Fingerprint]) -> Result<MatchResult> {
        let mut result = MatchResult::default();
        let mut running: Option<BTreeSet<CatalogId>> = None;

        for track in tracks {
            let found: BTreeSet<CatalogId> = self
                .catalog
                .search_by_sha1(self.session, &track.sha1)
                .await?
                .into_iter()
                .collect();
            result.tracks_queried += 1;

            let next = match running {
                None => found,
                Some(prev) => prev.intersection(&found).copied().collect(),
            };

            tracing::debug!(
                track = %track.name,
                candidates = next.len(),
                "Track resolved against catalog"
            );

            if next.is_empty() {
                tracing::info!(
                    track = %track.name,
                    queried = result.tracks_queried,
                    "No catalog entry matches every track"
                );
                return Ok(result);
            }
            running = Some(next);
        }

        result.candidates = running.unwrap_or_default();

        if let Some(id) = result.unique_id() {
            match self.catalog.fetch_by_id(self.session, id).await {
                Ok(record) => result.record = Some(record),
                Err(e) => {
                    tracing::warn!(id, error = %e, "Failed to fetch matched catalog entry");
                    result.warnings.push(format!("could not fetch entry {id}: {e}"));
                }
            }
        }

        Ok(result)
    }
}

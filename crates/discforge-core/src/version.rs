//! Release update check against the GitHub releases API.

use serde::Deserialize;

use crate::domain::{DiscForgeError, Result};

pub const GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "discforge/discforge";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Tag of the latest published release of `repo` (`owner/name`).
pub async fn fetch_latest_version(client: &reqwest::Client, repo: &str) -> Result<String> {
    fetch_latest_version_from(client, GITHUB_API, repo).await
}

/// Same as [`fetch_latest_version`] against another API root.
pub async fn fetch_latest_version_from(
    client: &reqwest::Client,
    api_base: &str,
    repo: &str,
) -> Result<String> {
    let url = format!("{}/repos/{repo}/releases/latest", api_base.trim_end_matches('/'));
    tracing::debug!(url = %url, "Checking for updates");

    let response = client
        .get(&url)
        .header(reqwest::header::USER_AGENT, concat!("discforge/", env!("CARGO_PKG_VERSION")))
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| DiscForgeError::UpdateCheck(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscForgeError::UpdateCheck(format!("{url} returned {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| DiscForgeError::UpdateCheck(e.to_string()))?;
    parse_release_tag(&body)
}

/// Extract `tag_name` from a release JSON document.
pub fn parse_release_tag(body: &str) -> Result<String> {
    let release: Release = serde_json::from_str(body)?;
    Ok(release.tag_name)
}

fn numeric_parts(version: &str) -> Vec<u64> {
    version
        .trim_start_matches(['v', 'V'])
        .split(|c: char| c == '.' || c == '-')
        .map_while(|part| part.parse().ok())
        .collect()
}

/// Whether `tag` names a later release than `current`.
pub fn is_newer(current: &str, tag: &str) -> bool {
    numeric_parts(tag) > numeric_parts(current)
}

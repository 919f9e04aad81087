//! Redump HTTP client
//!
//! Talks to the public redump.org site: forum login for the session cookie,
//! quick search by SHA-1 and scraping of a disc page. The site has no API,
//! so every response is parsed with the patterns below.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::service::{check_sha1, CatalogId, CatalogRecord, CatalogService, CatalogSession};
use crate::Result;

const USER_AGENT: &str = concat!("discforge/", env!("CARGO_PKG_VERSION"));
const MAX_SEARCH_PAGES: u32 = 10;

/// Redump client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedumpConfig {
    /// Site root, e.g. `http://redump.org`
    pub base_url: String,
    /// Forum root used for login
    pub login_url: String,
    /// Minimum delay between two requests
    pub min_interval_ms: u64,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for RedumpConfig {
    fn default() -> Self {
        RedumpConfig {
            base_url: std::env::var("REDUMP_URL")
                .unwrap_or_else(|_| "http://redump.org".to_string()),
            login_url: std::env::var("REDUMP_LOGIN_URL")
                .unwrap_or_else(|_| "http://forum.redump.org/login/".to_string()),
            min_interval_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl RedumpConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific site (mirrors, tests)
    pub fn new(base_url: &str, login_url: &str) -> Self {
        RedumpConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            login_url: login_url.to_string(),
            min_interval_ms: 1000,
            timeout_secs: 30,
        }
    }

    /// Override the request spacing
    pub fn with_min_interval(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }
}

/// Keeps requests at least `min_interval` apart
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Redump client for disc lookups
pub struct RedumpClient {
    config: RedumpConfig,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl RedumpClient {
    /// Create a new Redump client
    pub fn new(config: RedumpConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(RedumpClient {
            rate_limiter: RateLimiter::new(config.min_interval_ms),
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(RedumpConfig::from_env())
    }

    async fn get_text(&self, url: &str) -> Result<(String, String)> {
        self.rate_limiter.wait().await;
        debug!(url = %url, "GET");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http(format!("{url} returned {status}")));
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok((final_url, body))
    }
}

#[async_trait]
impl CatalogService for RedumpClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<CatalogSession> {
        info!(user = %username, "Logging in to Redump");

        let (_, login_page) = self.get_text(&self.config.login_url).await?;
        let token = parse_csrf_token(&login_page).ok_or_else(|| {
            CatalogError::UnexpectedResponse("login page has no csrf token".to_string())
        })?;

        self.rate_limiter.wait().await;
        let response = self
            .http_client
            .post(&self.config.login_url)
            .form(&[
                ("form_sent", "1"),
                ("redirect_url", ""),
                ("csrf_token", token.as_str()),
                ("req_username", username),
                ("req_password", password),
                ("save_pass", "0"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        check_login_response(username, &body)?;
        Ok(CatalogSession::authenticated(username))
    }

    async fn search_by_sha1(
        &self,
        _session: &CatalogSession,
        sha1: &str,
    ) -> Result<Vec<CatalogId>> {
        check_sha1(sha1)?;
        let sha1 = sha1.to_ascii_lowercase();

        let mut ids: Vec<CatalogId> = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let url = format!(
                "{}/discs/quicksearch/{}/?page={}",
                self.config.base_url, sha1, page
            );
            let (final_url, body) = self.get_text(&url).await?;

            // A unique hit redirects straight to the disc page.
            if let Some(id) = parse_disc_id_from_url(&final_url) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                break;
            }

            let found = parse_disc_links(&body);
            let before = ids.len();
            for id in found {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            if ids.len() == before {
                break;
            }
        }

        debug!(sha1 = %sha1, matches = ids.len(), "Redump search complete");
        Ok(ids)
    }

    async fn fetch_by_id(&self, _session: &CatalogSession, id: CatalogId) -> Result<CatalogRecord> {
        let url = format!("{}/disc/{}/", self.config.base_url, id);
        let (_, body) = self.get_text(&url).await?;
        parse_disc_page(id, &body)
    }
}

fn csrf_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<input type="hidden" name="csrf_token" value="([^"]*)""#)
            .expect("csrf pattern is valid")
    })
}

fn disc_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<a href="/disc/(\d+)/""#).expect("disc link pattern is valid"))
}

fn disc_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/disc/(\d+)/?$").expect("disc url pattern is valid"))
}

fn language_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<img src="/images/languages/([A-Za-z\-]+)\.png""#)
            .expect("language pattern is valid")
    })
}

/// The forum answers a bad login with 200 and an inline message.
fn check_login_response(username: &str, body: &str) -> Result<()> {
    if body.contains("Incorrect username and/or password.") {
        warn!(user = %username, "Redump rejected credentials");
        return Err(CatalogError::AuthenticationFailed(username.to_string()));
    }
    Ok(())
}

/// Full region name for a site flag code. Unknown codes pass through.
fn region_name(code: &str) -> &str {
    match code {
        "A" => "Asia",
        "Ar" => "Argentina",
        "Au" => "Australia",
        "B" => "Brazil",
        "Be" => "Belgium",
        "C" => "China",
        "Ca" => "Canada",
        "Da" | "Dk" => "Denmark",
        "Du" | "H" => "Netherlands",
        "E" => "Europe",
        "F" => "France",
        "Fi" => "Finland",
        "G" => "Germany",
        "Gr" => "Greece",
        "Hk" => "Hong Kong",
        "I" => "Italy",
        "In" => "India",
        "Ir" => "Ireland",
        "Is" => "Israel",
        "J" | "Ja" => "Japan",
        "K" => "Korea",
        "M" => "Mexico",
        "N" => "Norway",
        "P" => "Portugal",
        "Po" => "Poland",
        "R" => "Russia",
        "S" => "Spain",
        "Sw" => "Sweden",
        "Sz" => "Switzerland",
        "T" => "Taiwan",
        "Uk" => "UK",
        "U" | "Us" => "USA",
        "W" => "World",
        other => other,
    }
}

fn parse_csrf_token(page: &str) -> Option<String> {
    csrf_regex()
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_disc_id_from_url(url: &str) -> Option<CatalogId> {
    disc_url_regex()
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_disc_links(body: &str) -> Vec<CatalogId> {
    let mut ids = Vec::new();
    for caps in disc_link_regex().captures_iter(body) {
        if let Some(id) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// `<tr><th>Label</th><td>value</td></tr>` rows of the disc table.
fn table_value(body: &str, label: &str) -> Option<String> {
    let pattern = format!(
        r"<tr><th>{}</th><td>(.*?)</td></tr>",
        regex::escape(label)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| clean_html(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn tag_value(body: &str, tag: &str) -> Option<String> {
    let pattern = format!(r"<{tag}>(.*?)</{tag}>");
    let re = Regex::new(&pattern).ok()?;
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| clean_html(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn link_target(body: &str, section: &str) -> Option<String> {
    let pattern = format!(r#"<a href="/discs/{}/([^/"]+)/""#, regex::escape(section));
    let re = Regex::new(&pattern).ok()?;
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip inner tags and decode the handful of entities the site emits.
fn clean_html(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .trim()
        .to_string()
}

fn parse_disc_page(id: CatalogId, body: &str) -> Result<CatalogRecord> {
    let title = tag_value(body, "h1");
    if title.is_none() {
        return Err(CatalogError::NotFound(id));
    }

    Ok(CatalogRecord {
        id,
        title,
        foreign_title: tag_value(body, "h2"),
        system: link_target(body, "system"),
        region: link_target(body, "region").map(|code| region_name(&code).to_string()),
        languages: language_regex()
            .captures_iter(body)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect(),
        serial: table_value(body, "Serial"),
        version: table_value(body, "Version"),
        edition: table_value(body, "Edition"),
        barcode: table_value(body, "Barcode"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISC_PAGE: &str = r#"<html><body>
<h1>Ridge Racer</h1>
<h2>リッジレーサー</h2>
<table class="gameinfo">
<tr><th>System</th><td><a href="/discs/system/psx/">Sony PlayStation</a></td></tr>
<tr><th>Region</th><td><a href="/discs/region/Ja/"><img src="/images/flags/Ja.png" alt="Ja" /></a></td></tr>
<tr><th>Languages</th><td><img src="/images/languages/Japanese.png" alt="Japanese" /></td></tr>
<tr><th>Serial</th><td>SLPS-00001</td></tr>
<tr><th>Version</th><td>1.0</td></tr>
<tr><th>Edition</th><td>Original &amp; Boxed</td></tr>
</table>
</body></html>"#;

    #[test]
    fn test_redump_config_new_trims_slash() {
        let config = RedumpConfig::new("https://mirror.example.com/", "https://mirror.example.com/login/");
        assert_eq!(config.base_url, "https://mirror.example.com");
        assert_eq!(config.min_interval_ms, 1000);
    }

    #[test]
    fn test_redump_config_with_min_interval() {
        let config = RedumpConfig::default().with_min_interval(0);
        assert_eq!(config.min_interval_ms, 0);
    }

    #[test]
    fn test_parse_csrf_token() {
        let page = r#"<form><input type="hidden" name="csrf_token" value="abc123" /></form>"#;
        assert_eq!(parse_csrf_token(page), Some("abc123".to_string()));
        assert_eq!(parse_csrf_token("<form></form>"), None);
    }

    #[test]
    fn test_parse_disc_links_dedups_in_order() {
        let body = r#"<a href="/disc/12/">A</a><a href="/disc/7/">B</a><a href="/disc/12/">A</a>"#;
        assert_eq!(parse_disc_links(body), vec![12, 7]);
    }

    #[test]
    fn test_parse_disc_id_from_redirect() {
        assert_eq!(parse_disc_id_from_url("http://redump.org/disc/1234/"), Some(1234));
        assert_eq!(
            parse_disc_id_from_url("http://redump.org/discs/quicksearch/abc/"),
            None
        );
    }

    #[test]
    fn test_parse_disc_page() {
        let record = parse_disc_page(1, DISC_PAGE).unwrap();
        assert_eq!(record.title.as_deref(), Some("Ridge Racer"));
        assert_eq!(record.foreign_title.as_deref(), Some("リッジレーサー"));
        assert_eq!(record.system.as_deref(), Some("psx"));
        assert_eq!(record.region.as_deref(), Some("Japan"));
        assert_eq!(record.languages, vec!["Japanese".to_string()]);
        assert_eq!(record.serial.as_deref(), Some("SLPS-00001"));
        assert_eq!(record.edition.as_deref(), Some("Original & Boxed"));
        assert_eq!(record.barcode, None);
    }

    #[test]
    fn test_region_codes_become_names() {
        assert_eq!(region_name("U"), "USA");
        assert_eq!(region_name("E"), "Europe");
        assert_eq!(region_name("Ja"), "Japan");
        assert_eq!(region_name("Zz"), "Zz");
    }

    #[test]
    fn test_login_response_outcomes() {
        let ok = "<p>Logged in successfully. Redirecting &hellip;</p>";
        assert!(check_login_response("dumper", ok).is_ok());

        let rejected = "<p>Incorrect username and/or password.</p>";
        assert!(matches!(
            check_login_response("dumper", rejected),
            Err(CatalogError::AuthenticationFailed(user)) if user == "dumper"
        ));
    }

    /// Serves the login form on GET and a 503 on POST, one request per
    /// connection.
    async fn flaky_forum() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                let header_end = loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break None;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                let Some(header_end) = header_end else {
                    continue;
                };
                let head = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
                let body_len: usize = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
                while request.len() < header_end + body_len {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let (status, body) = if head.starts_with("get") {
                    (
                        "200 OK",
                        r#"<input type="hidden" name="csrf_token" value="t0k" />"#,
                    )
                } else {
                    ("503 Service Unavailable", "<html>down</html>")
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_login_server_error_is_not_a_session() {
        let base = flaky_forum().await;
        let client = RedumpClient::new(
            RedumpConfig::new(&base, &format!("{base}/login/")).with_min_interval(0),
        )
        .unwrap();

        let err = client.authenticate("dumper", "secret").await.unwrap_err();
        match err {
            CatalogError::Http(message) => assert!(message.contains("503"), "{message}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_disc_page_without_title_is_not_found() {
        let err = parse_disc_page(99, "<html></html>").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(99)));
    }

    #[tokio::test]
    async fn test_search_rejects_bad_sha1_before_network() {
        let client = RedumpClient::new(RedumpConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9/login/")).unwrap();
        let err = client
            .search_by_sha1(&CatalogSession::anonymous(), "not-a-hash")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFingerprint(_)));
    }
}

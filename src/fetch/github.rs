//! GitHub repository metadata lookup
//!
//! Only used for cloned GitHub sources. Failures are reported to the caller,
//! which logs them and carries on without metadata.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

pub const GITHUB_API: &str = "https://api.github.com";

/// Environment variable holding an optional API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://(?:www\.)?github\.com/|ssh://git@github\.com/|git@github\.com:)([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$")
        .unwrap_or_else(|e| panic!("{e}"))
});

/// Fields of the `GET /repos/{owner}/{repo}` response used in the header.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepoMetadata {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Extract `(owner, repo)` from a GitHub clone URL.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let caps = GITHUB_URL.captures(url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Fetch repository metadata from the GitHub REST API.
pub fn fetch_metadata(
    api_base: &str,
    owner: &str,
    repo: &str,
    token: Option<&str>,
) -> Result<RepoMetadata, reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()?;

    let url = format!("{}/repos/{owner}/{repo}", api_base.trim_end_matches('/'));
    let mut request = client.get(&url).header("Accept", "application/vnd.github+json");
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        request = request.bearer_auth(token);
    }
    tracing::debug!(%url, authenticated = token.is_some(), "Fetching repository metadata");
    request.send()?.error_for_status()?.json::<RepoMetadata>()
}

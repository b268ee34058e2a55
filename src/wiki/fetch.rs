//! Fetch a user's profile-page wikitext from a Wikimedia project.
//!
//! Uses `action=query` with `prop=revisions` on `User:<name>` and pulls the
//! latest revision's main-slot content. A page that does not exist is not an
//! error — the caller gets [`FetchOutcome::Missing`] and typically offers to
//! create the page instead.

use crate::config::ClientConfig;
use crate::error::WikiProfileError;
use crate::wiki::{check_status, request_error};
use serde_json::Value;
use tracing::{debug, info};

/// Result of a profile fetch: the page's raw wikitext, or a missing signal.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The user page exists; here is its current wikitext.
    Found { wikitext: String },
    /// The user page has never been created on this project.
    Missing,
}

/// Fetch the raw wikitext of `User:<username>` on the configured project.
pub async fn fetch_profile(
    client: &reqwest::Client,
    config: &ClientConfig,
    username: &str,
) -> Result<FetchOutcome, WikiProfileError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(WikiProfileError::MissingInput { field: "username" });
    }

    let url = config.api_base();
    info!("Fetching User:{} from {}", username, config.domain);

    let response = client
        .get(&url)
        .query(&[
            ("action", "query"),
            ("titles", &format!("User:{username}")),
            ("prop", "revisions"),
            ("rvprop", "content"),
            ("rvslots", "main"),
            ("format", "json"),
            ("origin", "*"),
        ])
        .send()
        .await
        .map_err(|e| request_error(&url, config.api_timeout_secs, e))?;

    check_status(&url, &response)?;

    let data: Value = response
        .json()
        .await
        .map_err(|e| request_error(&url, config.api_timeout_secs, e))?;

    let pages = data
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_object)
        .ok_or_else(|| WikiProfileError::MalformedResponse {
            detail: "missing query.pages".into(),
        })?;

    // The API keys pages by page id; a single-title query yields one entry.
    let page = pages
        .values()
        .next()
        .ok_or_else(|| WikiProfileError::MalformedResponse {
            detail: "query.pages is empty".into(),
        })?;

    if page.get("missing").is_some() {
        debug!("User:{} does not exist on {}", username, config.domain);
        return Ok(FetchOutcome::Missing);
    }

    // Newer API shape nests content under slots.main; fall back to the
    // legacy flat "*" key, then to empty content.
    let revision = page.get("revisions").and_then(|r| r.get(0));
    let wikitext = revision
        .and_then(|r| r.pointer("/slots/main/*"))
        .or_else(|| revision.and_then(|r| r.get("*")))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    debug!("Fetched {} bytes of wikitext", wikitext.len());
    Ok(FetchOutcome::Found { wikitext })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_username_is_rejected_before_any_request() {
        let config = ClientConfig::default();
        let client = config.http_client().unwrap();
        let err = fetch_profile(&client, &config, "  ").await.unwrap_err();
        assert!(matches!(
            err,
            WikiProfileError::MissingInput { field: "username" }
        ));
    }
}

//! Error types for the wiki-profile-builder library.
//!
//! The error surface mirrors the three failure classes of the request layer:
//!
//! * **User-input errors** — a required field was empty or the configuration
//!   is invalid. Reported to the caller verbatim.
//!
//! * **Upstream-service errors** — the MediaWiki action API, ResourceLoader,
//!   or the Gemini endpoint failed. Reported with the upstream message and
//!   never retried automatically (the AI layer retries *transient* failures
//!   internally before surfacing one of these).
//!
//! * **State errors** — the client-state JSON file could not be read, parsed,
//!   or written.
//!
//! The HTML→wikitext converter itself has no error taxonomy: it is total and
//! never appears on the `Err` side of anything.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the wiki-profile-builder library.
#[derive(Debug, Error)]
pub enum WikiProfileError {
    // ── User-input errors ─────────────────────────────────────────────────
    /// A required request field was empty or missing.
    #[error("No {field} provided")]
    MissingInput { field: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upstream-service errors ───────────────────────────────────────────
    /// The HTTP request itself failed (DNS, connect, TLS, body read).
    #[error("Request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s\nIncrease --api-timeout.")]
    RequestTimeout { url: String, secs: u64 },

    /// The upstream service answered with a non-success HTTP status.
    #[error("API returned {status} for '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// The upstream answered 2xx but the body did not have the expected shape.
    #[error("Invalid API response: {detail}")]
    MalformedResponse { detail: String },

    // ── AI errors ─────────────────────────────────────────────────────────
    /// Gemini is required for this operation but no usable key is configured.
    #[error("AI editing requires a Gemini API key.\n{hint}")]
    AiNotConfigured { hint: String },

    /// The Gemini API returned a non-retryable error, or retries ran out.
    #[error("AI service error: {message}")]
    AiApiError { message: String },

    /// The model answered but produced no usable text.
    #[error("AI service returned an empty completion")]
    EmptyCompletion,

    // ── State errors ──────────────────────────────────────────────────────
    /// The client-state file exists but could not be read.
    #[error("Failed to read client state '{path}': {source}")]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The client-state file was read but is not valid JSON for [`crate::state::ClientState`].
    #[error("Client state '{path}' is corrupt: {detail}")]
    StateCorrupt { path: PathBuf, detail: String },

    /// Could not create or write the client-state file.
    #[error("Failed to write client state '{path}': {source}")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_display() {
        let e = WikiProfileError::MissingInput { field: "html" };
        assert_eq!(e.to_string(), "No html provided");
    }

    #[test]
    fn http_status_display() {
        let e = WikiProfileError::HttpStatus {
            url: "https://meta.wikimedia.org/w/api.php".into(),
            status: 503,
        };
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("api.php"));
    }

    #[test]
    fn timeout_display() {
        let e = WikiProfileError::RequestTimeout {
            url: "https://example.org".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn state_corrupt_display() {
        let e = WikiProfileError::StateCorrupt {
            path: PathBuf::from("/tmp/state.json"),
            detail: "expected value at line 1".into(),
        };
        assert!(e.to_string().contains("state.json"));
        assert!(e.to_string().contains("expected value"));
    }
}

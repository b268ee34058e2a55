//! MediaWiki action-API clients.
//!
//! Each submodule wraps exactly one upstream operation. Keeping them separate
//! makes each independently testable and keeps the error mapping (timeout vs.
//! transport vs. HTTP status vs. response shape) in one helper.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ action=query   revisions of User:<name>  ──▶ wikitext | missing
//! parse ──▶ action=parse   wikitext → rendered HTML
//!       └─▶ load.php       ResourceLoader module CSS (best-effort)
//! ```
//!
//! Neither call is retried: upstream failures surface immediately with the
//! upstream message, per the request-layer error policy.

pub mod fetch;
pub mod parse;

pub use fetch::{fetch_profile, FetchOutcome};
pub use parse::{parse_wikitext, RenderedPage};

use crate::error::WikiProfileError;

/// Map a `reqwest` failure onto the library error taxonomy.
pub(crate) fn request_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> WikiProfileError {
    if e.is_timeout() {
        WikiProfileError::RequestTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        WikiProfileError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Fail on non-success statuses before attempting to read a body.
pub(crate) fn check_status(
    url: &str,
    response: &reqwest::Response,
) -> Result<(), WikiProfileError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(WikiProfileError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        })
    }
}

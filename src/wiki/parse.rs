//! Render wikitext to HTML via `action=parse`, plus ResourceLoader CSS.
//!
//! The parse response carries two things we care about: the rendered HTML
//! (which already includes inline `<templatestyles>` CSS) and the list of
//! ResourceLoader style modules the page's templates pulled in. The module
//! CSS — userbox and infobox styling, mostly — lives behind `load.php` and
//! is fetched in a second, best-effort request: a styling failure degrades
//! the preview but must never fail the parse.

use crate::config::ClientConfig;
use crate::error::WikiProfileError;
use crate::wiki::{check_status, request_error};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A parsed page: rendered HTML plus the style modules it loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Rendered HTML, with module CSS prepended in a
    /// `<style data-wiki-modules>` block when any was fetched.
    pub html: String,
    /// ResourceLoader modules whose styles were requested (may be empty).
    pub modules_loaded: Vec<String>,
}

/// Render `text` (wikitext) to HTML on the configured project.
pub async fn parse_wikitext(
    client: &reqwest::Client,
    config: &ClientConfig,
    text: &str,
) -> Result<RenderedPage, WikiProfileError> {
    if text.is_empty() {
        return Err(WikiProfileError::MissingInput { field: "text" });
    }

    let url = config.api_base();
    info!("Parsing {} bytes of wikitext on {}", text.len(), config.domain);

    let response = client
        .post(&url)
        .form(&[
            ("action", "parse"),
            ("text", text),
            ("prop", "text|modulestyles"),
            ("disablelimitreport", "1"),
            ("format", "json"),
            ("origin", "*"),
            ("contentmodel", "wikitext"),
        ])
        .send()
        .await
        .map_err(|e| request_error(&url, config.api_timeout_secs, e))?;

    check_status(&url, &response)?;

    let data: Value = response
        .json()
        .await
        .map_err(|e| request_error(&url, config.api_timeout_secs, e))?;

    let html = data
        .pointer("/parse/text/*")
        .and_then(Value::as_str)
        .ok_or_else(|| WikiProfileError::MalformedResponse {
            detail: "missing parse.text".into(),
        })?
        .to_string();

    let modules: Vec<String> = data
        .pointer("/parse/modulestyles")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let css = fetch_module_styles(client, &config.domain, &modules).await;
    let html = if css.is_empty() {
        html
    } else {
        format!("<style data-wiki-modules>{css}</style>{html}")
    };

    debug!(
        "Parsed to {} bytes of HTML ({} style modules)",
        html.len(),
        modules.len()
    );

    Ok(RenderedPage {
        html,
        modules_loaded: modules,
    })
}

/// Fetch the combined CSS for `modules` from ResourceLoader.
///
/// Best-effort: any failure is logged at `warn` and yields an empty string,
/// exactly like a missing module list does.
async fn fetch_module_styles(
    client: &reqwest::Client,
    domain: &str,
    modules: &[String],
) -> String {
    if modules.is_empty() {
        return String::new();
    }

    // ResourceLoader accepts pipe-separated module names.
    let url = format!("https://{domain}/w/load.php");
    let module_list = modules.join("|");

    let response = match client
        .get(&url)
        .query(&[("modules", module_list.as_str()), ("only", "styles")])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Error fetching module styles: {e}");
            return String::new();
        }
    };

    if !response.status().is_success() {
        warn!("Failed to fetch module styles: {}", response.status());
        return String::new();
    }

    match response.text().await {
        Ok(css) => css,
        Err(e) => {
            warn!("Error reading module styles body: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_wikitext_is_rejected_before_any_request() {
        let config = ClientConfig::default();
        let client = config.http_client().unwrap();
        let err = parse_wikitext(&client, &config, "").await.unwrap_err();
        assert!(matches!(err, WikiProfileError::MissingInput { field: "text" }));
    }

    #[tokio::test]
    async fn no_modules_means_no_styles_request() {
        let config = ClientConfig::default();
        let client = config.http_client().unwrap();
        let css = fetch_module_styles(&client, &config.domain, &[]).await;
        assert!(css.is_empty());
    }
}

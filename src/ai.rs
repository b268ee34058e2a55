//! Gemini-backed wikitext services: targeted edits and profile generation.
//!
//! This module builds `generateContent` requests and handles transport
//! concerns; all prompt engineering lives in [`crate::prompts`] so it can be
//! changed without touching retry or error-handling logic here.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 5xx responses from hosted model APIs are transient and common.
//! Exponential backoff (`retry_backoff_ms * 2^(attempt-1)`) avoids hammering
//! a recovering endpoint: with the 500 ms default and 3 retries the wait
//! sequence is 500 ms → 1 s → 2 s. Permanent errors (bad key, 400) are not
//! retried and surface immediately.
//!
//! ## Fence cleanup
//!
//! Models occasionally wrap their answer in ```` ```wikitext ```` fences
//! despite the prompt saying not to. One leading and one trailing fence are
//! stripped before the wikitext reaches the caller.

use crate::config::ClientConfig;
use crate::error::WikiProfileError;
use crate::profile::{fallback_markup, ProfileData};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// An instruction-driven edit of existing wikitext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    /// The complete current wikitext of the page.
    pub original_wikitext: String,
    /// The portion the user selected for modification, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    /// The user's natural-language instruction.
    pub instruction: String,
}

/// Where a generated profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Gemini produced the wikitext.
    Ai,
    /// The deterministic template produced it (no key, or the AI call failed).
    Template,
}

/// A generated profile page and its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProfile {
    pub wikitext: String,
    pub source: Source,
}

/// Apply `request.instruction` to the selected wikitext via Gemini.
///
/// Unlike generation there is no template to fall back to, so a missing
/// Gemini key is an error here.
pub async fn edit_wikitext(
    client: &reqwest::Client,
    config: &ClientConfig,
    request: &EditRequest,
) -> Result<String, WikiProfileError> {
    if request.original_wikitext.trim().is_empty() {
        return Err(WikiProfileError::MissingInput {
            field: "original wikitext",
        });
    }
    if request.instruction.trim().is_empty() {
        return Err(WikiProfileError::MissingInput {
            field: "edit instruction",
        });
    }

    let key = config
        .usable_gemini_key()
        .ok_or_else(|| WikiProfileError::AiNotConfigured {
            hint: "Set GEMINI_API_KEY in your environment.".into(),
        })?;

    let user_prompt = prompts::build_edit_prompt(request);
    let raw = complete(client, config, key, prompts::EDIT_SYSTEM_PROMPT, &user_prompt).await?;
    Ok(strip_code_fences(&raw))
}

/// Generate a whole profile page from `data`.
///
/// Falls back to the deterministic template when no usable Gemini key is
/// configured, and when the AI call fails after retries — generation must
/// always produce *something* for a valid username.
pub async fn generate_profile(
    client: &reqwest::Client,
    config: &ClientConfig,
    data: &ProfileData,
) -> Result<GeneratedProfile, WikiProfileError> {
    if data.username.trim().is_empty() {
        return Err(WikiProfileError::MissingInput { field: "username" });
    }

    let Some(key) = config.usable_gemini_key() else {
        info!("No Gemini key configured; using template generation");
        return Ok(GeneratedProfile {
            wikitext: fallback_markup(data),
            source: Source::Template,
        });
    };

    let user_prompt = prompts::build_profile_prompt(data);
    match complete(client, config, key, prompts::GENERATE_SYSTEM_PROMPT, &user_prompt).await {
        Ok(raw) => Ok(GeneratedProfile {
            wikitext: strip_code_fences(&raw),
            source: Source::Ai,
        }),
        Err(e) => {
            warn!("Gemini generation failed ({e}); falling back to template");
            Ok(GeneratedProfile {
                wikitext: fallback_markup(data),
                source: Source::Template,
            })
        }
    }
}

// ── Gemini wire types ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

// ── Completion with retry ────────────────────────────────────────────────────

/// One system + one user part in a single user turn, matching how the
/// original Gemini SDK flattens a `[system, user]` text array.
fn build_request(config: &ClientConfig, system: &str, user: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part {
                    text: system.to_string(),
                },
                Part {
                    text: user.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        },
    }
}

async fn complete(
    client: &reqwest::Client,
    config: &ClientConfig,
    key: &str,
    system: &str,
    user: &str,
) -> Result<String, WikiProfileError> {
    let url = format!("{GEMINI_API_BASE}/{}:generateContent", config.model);
    let body = build_request(config, system, user);

    let mut last_err: Option<WikiProfileError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Gemini retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let sent = client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await;

        let response = match sent {
            Ok(r) => r,
            Err(e) => {
                last_err = Some(WikiProfileError::AiApiError {
                    message: e.to_string(),
                });
                continue;
            }
        };

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            last_err = Some(WikiProfileError::AiApiError {
                message: format!("Gemini returned {status}"),
            });
            continue;
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| WikiProfileError::AiApiError {
                    message: format!("unreadable Gemini response: {e}"),
                })?;

        if let Some(api_error) = parsed.error {
            // Non-retryable: quota misconfiguration, invalid key, bad request.
            return Err(WikiProfileError::AiApiError {
                message: api_error.message,
            });
        }

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(WikiProfileError::EmptyCompletion);
        }

        debug!(
            "Gemini completion: {} chars after {} retries",
            text.len(),
            attempt
        );
        return Ok(text.trim().to_string());
    }

    Err(last_err.unwrap_or_else(|| WikiProfileError::AiApiError {
        message: "Unknown error".into(),
    }))
}

// ── Fence cleanup ────────────────────────────────────────────────────────────

static RE_FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:wikitext|mediawiki|wiki)?\n?").unwrap());
static RE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n?```$").unwrap());

/// Strip one leading and one trailing markdown fence, then trim.
fn strip_code_fences(text: &str) -> String {
    let s = RE_FENCE_OPEN.replace(text, "");
    RE_FENCE_CLOSE.replace(&s, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_with_language_tag_are_stripped() {
        assert_eq!(
            strip_code_fences("```wikitext\n== Hi ==\n```"),
            "== Hi =="
        );
        assert_eq!(
            strip_code_fences("```mediawiki\n'''bold'''\n```"),
            "'''bold'''"
        );
    }

    #[test]
    fn bare_fences_are_stripped() {
        assert_eq!(strip_code_fences("```\ntext\n```"), "text");
    }

    #[test]
    fn unfenced_output_passes_through() {
        assert_eq!(strip_code_fences("== Hi ==\ntext"), "== Hi ==\ntext");
    }

    #[test]
    fn interior_fences_are_kept() {
        let input = "before\n```\ncode\n```\nafter";
        assert_eq!(strip_code_fences(input), input);
    }

    #[test]
    fn request_body_single_user_turn() {
        let config = ClientConfig::default();
        let request = build_request(&config, "SYSTEM", "USER");
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].parts.len(), 2);
        assert_eq!(request.contents[0].parts[0].text, "SYSTEM");

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[tokio::test]
    async fn edit_requires_wikitext_and_instruction() {
        let config = ClientConfig::builder().gemini_api_key("k").build().unwrap();
        let client = config.http_client().unwrap();

        let request = EditRequest {
            original_wikitext: "  ".into(),
            selected_text: None,
            instruction: "do a thing".into(),
        };
        assert!(matches!(
            edit_wikitext(&client, &config, &request).await.unwrap_err(),
            WikiProfileError::MissingInput {
                field: "original wikitext"
            }
        ));

        let request = EditRequest {
            original_wikitext: "== Hi ==".into(),
            selected_text: None,
            instruction: "".into(),
        };
        assert!(matches!(
            edit_wikitext(&client, &config, &request).await.unwrap_err(),
            WikiProfileError::MissingInput {
                field: "edit instruction"
            }
        ));
    }

    #[tokio::test]
    async fn edit_without_key_is_an_error() {
        let config = ClientConfig::builder()
            .gemini_api_key("your_gemini_api_key_here")
            .build()
            .unwrap();
        let client = config.http_client().unwrap();
        let request = EditRequest {
            original_wikitext: "== Hi ==".into(),
            selected_text: None,
            instruction: "shorten".into(),
        };
        assert!(matches!(
            edit_wikitext(&client, &config, &request).await.unwrap_err(),
            WikiProfileError::AiNotConfigured { .. }
        ));
    }

    #[tokio::test]
    async fn generate_without_key_uses_template() {
        let config = ClientConfig::builder()
            .gemini_api_key("your_gemini_api_key_here")
            .build()
            .unwrap();
        let client = config.http_client().unwrap();
        let data = ProfileData {
            username: "TemplateUser".into(),
            ..Default::default()
        };

        let profile = generate_profile(&client, &config, &data).await.unwrap();
        assert_eq!(profile.source, Source::Template);
        assert!(profile.wikitext.contains("TemplateUser"));
    }

    #[tokio::test]
    async fn generate_requires_username() {
        let config = ClientConfig::default();
        let client = config.http_client().unwrap();
        let data = ProfileData::default();
        assert!(matches!(
            generate_profile(&client, &config, &data).await.unwrap_err(),
            WikiProfileError::MissingInput { field: "username" }
        ));
    }
}

//! Configuration types for the wiki-profile client.
//!
//! All request behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across the CLI subcommands, serialise it for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::WikiProfileError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User agent sent to Wikimedia as `Api-User-Agent`, per the
/// [Wikimedia API etiquette](https://www.mediawiki.org/wiki/API:Etiquette).
pub const USER_AGENT: &str =
    "WikiProfileBuilder/1.0 (https://github.com/wiki-profile-builder; contact@example.com)";

/// Placeholder value shipped in `.env` examples; treated the same as no key.
const GEMINI_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

/// Wikimedia projects the profile tools know about: `(domain, label)`.
pub const WIKI_DOMAINS: &[(&str, &str)] = &[
    ("meta.wikimedia.org", "Meta-Wiki"),
    ("en.wikipedia.org", "English Wikipedia"),
    ("commons.wikimedia.org", "Wikimedia Commons"),
    ("www.wikidata.org", "Wikidata"),
    ("en.wiktionary.org", "English Wiktionary"),
];

/// The default Wikimedia project.
pub const DEFAULT_DOMAIN: &str = "meta.wikimedia.org";

/// Configuration for the MediaWiki and Gemini clients.
///
/// Built via [`ClientConfig::builder()`] or using [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use wiki_profile_builder::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .domain("en.wikipedia.org")
///     .api_timeout_secs(15)
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Wikimedia project domain the action-API calls target. Default: `meta.wikimedia.org`.
    pub domain: String,

    /// `Api-User-Agent` header value. Default: [`USER_AGENT`].
    pub user_agent: String,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Google Gemini API key. Default: read from `GEMINI_API_KEY`.
    ///
    /// A missing or placeholder key degrades profile *generation* to the
    /// deterministic template; AI *editing* refuses to run without one.
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// Gemini model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// Sampling temperature for Gemini completions. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to the surrounding wikitext —
    /// exactly what you want for targeted edits. Higher values introduce
    /// creativity that tends to rewrite text outside the selection.
    pub temperature: f32,

    /// Maximum tokens Gemini may generate per call. Default: 8192.
    ///
    /// Whole profile pages with styled infoboxes routinely exceed 2 000
    /// output tokens. Setting this too low silently truncates the wikitext
    /// mid-table, which renders as broken markup.
    pub max_output_tokens: usize,

    /// Maximum retry attempts on a transient Gemini failure. Default: 3.
    ///
    /// MediaWiki calls are never retried; only the AI layer retries, and
    /// only on 429/5xx or network errors.
    pub max_retries: u32,

    /// Initial AI retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            user_agent: USER_AGENT.to_string(),
            api_timeout_secs: 30,
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.1,
            max_output_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("domain", &self.domain)
            .field("user_agent", &self.user_agent)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// The Gemini key, if one is configured and is not the `.env` placeholder.
    pub fn usable_gemini_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != GEMINI_KEY_PLACEHOLDER)
    }

    /// Base URL of the action API for the configured project.
    pub fn api_base(&self) -> String {
        format!("https://{}/w/api.php", self.domain)
    }

    /// Build a `reqwest` client carrying the configured timeout and
    /// `Api-User-Agent` header, shared by the wiki and AI call sites.
    pub fn http_client(&self) -> Result<reqwest::Client, WikiProfileError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let ua = reqwest::header::HeaderValue::from_str(&self.user_agent)
            .map_err(|e| WikiProfileError::InvalidConfig(format!("user agent: {e}")))?;
        headers.insert("Api-User-Agent", ua);

        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.api_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| WikiProfileError::Internal(format!("HTTP client: {e}")))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.gemini_api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, WikiProfileError> {
        let c = &self.config;
        if c.domain.trim().is_empty() {
            return Err(WikiProfileError::InvalidConfig(
                "Domain must not be empty".into(),
            ));
        }
        if c.domain.contains('/') || c.domain.contains(' ') {
            return Err(WikiProfileError::InvalidConfig(format!(
                "'{}' is not a bare domain name",
                c.domain
            )));
        }
        if c.model.trim().is_empty() {
            return Err(WikiProfileError::InvalidConfig(
                "Model must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_meta_wiki() {
        let config = ClientConfig::default();
        assert_eq!(config.domain, "meta.wikimedia.org");
        assert_eq!(config.api_base(), "https://meta.wikimedia.org/w/api.php");
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ClientConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_url_as_domain() {
        let result = ClientConfig::builder().domain("https://meta.wikimedia.org").build();
        assert!(result.is_err());
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let config = ClientConfig::builder()
            .gemini_api_key("your_gemini_api_key_here")
            .build()
            .unwrap();
        assert!(config.usable_gemini_key().is_none());
    }

    #[test]
    fn real_key_is_usable() {
        let config = ClientConfig::builder()
            .gemini_api_key("AIza-test")
            .build()
            .unwrap();
        assert_eq!(config.usable_gemini_key(), Some("AIza-test"));
    }

    #[test]
    fn known_domains_include_default() {
        assert!(WIKI_DOMAINS.iter().any(|(d, _)| *d == DEFAULT_DOMAIN));
    }

    #[test]
    fn debug_redacts_key() {
        let config = ClientConfig::builder().gemini_api_key("secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("secret"));
    }
}

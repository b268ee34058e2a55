//! # wiki-profile-builder
//!
//! Fetch, edit, and regenerate Wikimedia user-profile pages.
//!
//! ## Why this crate?
//!
//! Editing a wiki user page visually means round-tripping between two markup
//! worlds: MediaWiki renders wikitext to HTML, the user edits the HTML, and
//! something has to turn the result *back* into wikitext. True HTML parsing
//! would reject or silently repair the not-quite-HTML a rich-text surface
//! produces; instead this crate uses a deliberate best-effort design — an
//! ordered pipeline of regex rewrites that degrades gracefully on malformed
//! input and never fails.
//!
//! ## Component Overview
//!
//! ```text
//! wikitext ──▶ wiki::parse    action=parse + ResourceLoader CSS ──▶ HTML
//! HTML     ──▶ convert        13-stage rewrite pipeline         ──▶ wikitext
//! username ──▶ wiki::fetch    action=query revisions            ──▶ wikitext | missing
//! edit     ──▶ ai             Gemini generateContent            ──▶ wikitext
//! form     ──▶ ai / profile   Gemini, or deterministic template ──▶ wikitext
//! state    ──▶ state          load-at-startup / save-on-change JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use wiki_profile_builder::html_to_wikitext;
//!
//! let wikitext = html_to_wikitext("<h2>About me</h2><p>I like <b>maps</b>.</p>");
//! assert_eq!(wikitext, "== About me ==\nI like '''maps'''.");
//! ```
//!
//! The converter is pure and synchronous; the service calls are async:
//!
//! ```rust,no_run
//! use wiki_profile_builder::{fetch_profile, ClientConfig, FetchOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let client = config.http_client()?;
//!     match fetch_profile(&client, &config, "Example").await? {
//!         FetchOutcome::Found { wikitext } => println!("{wikitext}"),
//!         FetchOutcome::Missing => eprintln!("no user page yet"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wikiprofile` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! wiki-profile-builder = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod ai;
pub mod config;
pub mod convert;
pub mod error;
pub mod profile;
pub mod prompts;
pub mod state;
pub mod wiki;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use ai::{edit_wikitext, generate_profile, EditRequest, GeneratedProfile, Source};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_DOMAIN, WIKI_DOMAINS};
pub use convert::html_to_wikitext;
pub use error::WikiProfileError;
pub use profile::{fallback_markup, ProfileData};
pub use state::ClientState;
pub use wiki::{fetch_profile, parse_wikitext, FetchOutcome, RenderedPage};

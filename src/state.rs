//! Persistent client state: username, domain, and current wikitext.
//!
//! A single JSON file with an explicit lifecycle — load once at startup,
//! save after every change. There is exactly one consumer per state file,
//! so no locking is needed; the only robustness concern is a crash mid-write,
//! which the sibling-temp-file-plus-rename write rules out.

use crate::config::DEFAULT_DOMAIN;
use crate::error::WikiProfileError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The client-side state persisted across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    /// Wikimedia username the wikitext belongs to.
    #[serde(default)]
    pub username: String,

    /// Project domain the profile lives on.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// The current working copy of the page wikitext.
    #[serde(default)]
    pub raw_wikitext: String,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            username: String::new(),
            domain: default_domain(),
            raw_wikitext: String::new(),
        }
    }
}

impl ClientState {
    /// Load state from `path`, or the defaults when no file exists yet.
    ///
    /// A present-but-unreadable or present-but-corrupt file is an error:
    /// silently resetting would lose the user's working wikitext.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WikiProfileError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No client state at {}, starting fresh", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| WikiProfileError::StateRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&raw).map_err(|e| WikiProfileError::StateCorrupt {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Save state to `path` atomically (temp file in the same directory,
    /// then rename) so a crash never leaves a half-written file behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WikiProfileError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| WikiProfileError::Internal(format!("serialise state: {e}")))?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir).map_err(|e| WikiProfileError::StateWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .map_err(|e| WikiProfileError::StateWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        std::io::Write::write_all(&mut tmp, json.as_bytes()).map_err(|e| {
            WikiProfileError::StateWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        tmp.persist(path).map_err(|e| WikiProfileError::StateWrite {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        debug!("Saved client state to {}", path.display());
        Ok(())
    }

    /// Clear the per-profile fields, keeping the selected domain.
    pub fn reset(&mut self) {
        self.username.clear();
        self.raw_wikitext.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = ClientState::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(state, ClientState::default());
        assert_eq!(state.domain, "meta.wikimedia.org");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let state = ClientState {
            username: "ExampleUser".into(),
            domain: "en.wikipedia.org".into(),
            raw_wikitext: "== Hello ==\nworld".into(),
        };
        state.save(&path).unwrap();

        assert_eq!(ClientState::load(&path).unwrap(), state);
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = ClientState::default();
        state.username = "First".into();
        state.save(&path).unwrap();
        state.username = "Second".into();
        state.save(&path).unwrap();

        assert_eq!(ClientState::load(&path).unwrap().username, "Second");
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = ClientState::load(&path).unwrap_err();
        assert!(matches!(err, WikiProfileError::StateCorrupt { .. }));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"username":"Partial"}"#).unwrap();

        let state = ClientState::load(&path).unwrap();
        assert_eq!(state.username, "Partial");
        assert_eq!(state.domain, "meta.wikimedia.org");
        assert_eq!(state.raw_wikitext, "");
    }

    #[test]
    fn reset_keeps_domain() {
        let mut state = ClientState {
            username: "U".into(),
            domain: "en.wikipedia.org".into(),
            raw_wikitext: "text".into(),
        };
        state.reset();
        assert_eq!(state.username, "");
        assert_eq!(state.raw_wikitext, "");
        assert_eq!(state.domain, "en.wikipedia.org");
    }
}

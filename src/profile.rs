//! Profile form data and the deterministic template fallback.
//!
//! When no Gemini key is configured (or the AI call fails outright), profile
//! generation degrades to [`fallback_markup`]: a fixed wikitext template
//! filled from [`ProfileData`]. The template intentionally produces the same
//! visual language the AI is prompted for — a float-right infobox with the
//! `#0057B7` header colour, styled section tables, and closing categories —
//! so switching between the two sources is not jarring.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured input for profile generation. Only `username` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Comma-separated, each entry optionally `Language (Proficiency)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    /// Comma-separated interest keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_year: Option<String>,
}

/// `Language (Proficiency)` entries in the comma-separated languages field.
static RE_LANG_PROFICIENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.+?)\s*\((.+?)\)").unwrap());

/// Render the fallback profile template.
///
/// Deterministic: identical `ProfileData` always yields identical wikitext.
/// Sections for absent optional fields are omitted entirely.
pub fn fallback_markup(data: &ProfileData) -> String {
    let mut sections: Vec<String> = Vec::new();
    let username = if data.username.is_empty() {
        "User"
    } else {
        &data.username
    };

    // Float-right user info box
    sections.push(
        r#"{| class="wikitable" style="float:right; margin-left:1em; width:280px; border:2px solid #0057B7;""#
            .into(),
    );
    sections.push("|-".into());
    sections.push(format!(
        r#"! colspan="2" style="background:#0057B7; color:white; font-size:1.2em; padding:10px;" | {username}"#
    ));

    let mut info_row = |label: &str, value: &str| {
        sections.push("|-".into());
        sections.push(format!(
            r#"| style="background:#f8f9fa; padding:5px; font-weight:bold;" | {label}"#
        ));
        sections.push(format!(r#"| style="padding:5px;" | {value}"#));
    };

    if let Some(ref v) = data.real_name {
        info_row("Name", v);
    }
    if let Some(ref v) = data.location {
        info_row("Location", v);
    }
    if let Some(ref v) = data.occupation {
        info_row("Occupation", v);
    }
    if let Some(ref v) = data.join_year {
        info_row("Member since", v);
    }

    sections.push("|}".into());
    sections.push(String::new());

    // Welcome message
    sections.push(r#"<div style="font-size:1.1em; color:#333;">"#.into());
    sections.push(
        "'''Welcome to my user page!''' I am an active contributor to the Wikimedia projects."
            .into(),
    );
    sections.push("</div>".into());
    sections.push(String::new());

    if let Some(ref about) = data.about_me {
        sections.push("== About me ==".into());
        sections.push(
            r#"<div style="background:#f8f9fa; padding:15px; border-radius:8px; border-left:4px solid #0057B7;">"#
                .into(),
        );
        sections.push(about.clone());
        sections.push("</div>".into());
        sections.push(String::new());
    }

    if let Some(ref languages) = data.languages {
        sections.push("== Languages ==".into());
        sections.push(r#"{| class="wikitable" style="border-collapse:collapse;""#.into());
        sections.push("|-".into());
        sections.push(r#"! style="background:#0057B7; color:white; padding:8px;" | Language"#.into());
        sections
            .push(r#"! style="background:#0057B7; color:white; padding:8px;" | Proficiency"#.into());

        for entry in languages.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, level) = match RE_LANG_PROFICIENCY.captures(entry) {
                Some(caps) => (caps[1].to_string(), caps[2].to_string()),
                None => (entry.to_string(), "Fluent".to_string()),
            };
            sections.push("|-".into());
            sections.push(format!(r#"| style="padding:6px;" | {name}"#));
            sections.push(format!(r#"| style="padding:6px;" | {level}"#));
        }
        sections.push("|}".into());
        sections.push(String::new());
    }

    if let Some(ref interests) = data.interests {
        sections.push("== Interests ==".into());
        sections.push(r#"<div style="display:flex; flex-wrap:wrap; gap:8px;">"#.into());
        for interest in interests.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            sections.push(format!(
                r#"<span style="background:#e3f2fd; color:#0057B7; padding:5px 12px; border-radius:15px; font-size:0.9em;">{{{{·}}}} {interest}</span>"#
            ));
        }
        sections.push("</div>".into());
        sections.push(String::new());
    }

    // Contact
    sections.push("== Contact ==".into());
    sections.push(
        r#"{| style="background:#fff3cd; padding:15px; border-radius:8px; border:1px solid #ffc107; width:100%;""#
            .into(),
    );
    sections.push("|-".into());
    sections.push(format!(
        r#"| style="font-size:1.1em;" | 📬 Feel free to leave a message on my [[User talk:{username}|talk page]]!"#
    ));
    sections.push("|}".into());
    sections.push(String::new());

    // Categories
    sections.push("[[Category:Wikipedians]]".into());
    if let Some(ref location) = data.location {
        if let Some(city) = location.split(',').next().map(str::trim) {
            if !city.is_empty() {
                sections.push(format!("[[Category:Wikipedians in {city}]]"));
            }
        }
    }

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> ProfileData {
        ProfileData {
            username: "ExampleUser".into(),
            real_name: Some("Alex Example".into()),
            location: Some("Kyiv, Ukraine".into()),
            languages: Some("Ukrainian (Native), English (Fluent)".into()),
            interests: Some("maps, botany".into()),
            about_me: Some("I map trails.".into()),
            occupation: Some("Cartographer".into()),
            join_year: Some("2019".into()),
        }
    }

    #[test]
    fn infobox_header_carries_username() {
        let wikitext = fallback_markup(&full_profile());
        assert!(wikitext.contains(r#"padding:10px;" | ExampleUser"#));
        assert!(wikitext.starts_with(r#"{| class="wikitable""#));
    }

    #[test]
    fn optional_rows_omitted_when_absent() {
        let data = ProfileData {
            username: "Solo".into(),
            ..Default::default()
        };
        let wikitext = fallback_markup(&data);
        assert!(!wikitext.contains("| Name"));
        assert!(!wikitext.contains("== About me =="));
        assert!(!wikitext.contains("== Languages =="));
        assert!(wikitext.contains("== Contact =="));
    }

    #[test]
    fn languages_split_into_name_and_proficiency() {
        let wikitext = fallback_markup(&full_profile());
        assert!(wikitext.contains(r#"| style="padding:6px;" | Ukrainian"#));
        assert!(wikitext.contains(r#"| style="padding:6px;" | Native"#));
    }

    #[test]
    fn language_without_proficiency_defaults_to_fluent() {
        let data = ProfileData {
            username: "U".into(),
            languages: Some("Esperanto".into()),
            ..Default::default()
        };
        let wikitext = fallback_markup(&data);
        assert!(wikitext.contains(r#"| style="padding:6px;" | Esperanto"#));
        assert!(wikitext.contains(r#"| style="padding:6px;" | Fluent"#));
    }

    #[test]
    fn location_category_uses_city_only() {
        let wikitext = fallback_markup(&full_profile());
        assert!(wikitext.contains("[[Category:Wikipedians in Kyiv]]"));
    }

    #[test]
    fn interest_chips_render_per_keyword() {
        let wikitext = fallback_markup(&full_profile());
        assert_eq!(wikitext.matches("{{·}}").count(), 2);
    }

    #[test]
    fn talk_page_link_targets_username() {
        let wikitext = fallback_markup(&full_profile());
        assert!(wikitext.contains("[[User talk:ExampleUser|talk page]]"));
    }

    #[test]
    fn deterministic_output() {
        let data = full_profile();
        assert_eq!(fallback_markup(&data), fallback_markup(&data));
    }
}

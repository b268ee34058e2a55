//! System and user prompts for the Gemini-backed wikitext services.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g.
//!    tightening the "modify only the selection" rule or the styling
//!    guidance) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without calling Gemini, making prompt regressions easy to catch.

use crate::ai::EditRequest;
use crate::profile::ProfileData;

/// System prompt for instruction-driven edits of existing wikitext.
pub const EDIT_SYSTEM_PROMPT: &str = r#"You are an expert Wikimedia markup editor. Your task is to modify ONLY the selected portion of wikitext based on the user's instruction.

CRITICAL RULES:
1. ONLY modify the specific selected text provided
2. Keep all other parts of the wikitext EXACTLY the same
3. Use proper MediaWiki syntax (not Markdown)
4. Preserve any existing styling and formatting in the selection
5. If adding new content, match the style of the surrounding content
6. Output the complete modified wikitext with ONLY the targeted section changed

FORMATTING GUIDELINES:
- Use proper wiki heading syntax (== Heading ==)
- Use wiki list syntax (* for bullets, # for numbered)
- Use wiki link syntax [[Page|Display Text]] for internal links
- Include inline CSS styling within wiki tables for visual appeal
- Use '''bold''' and ''italic'' wiki formatting

You MUST output ONLY the complete modified wikitext. No explanations, no markdown code blocks."#;

/// System prompt for generating a whole profile page from form data.
pub const GENERATE_SYSTEM_PROMPT: &str = r#"You are an expert Wikimedia markup generator. Generate a professional user profile page in MediaWiki wikitext format. Always add beautiful styling to it.

IMPORTANT GUIDELINES:
1. Use proper MediaWiki syntax (not Markdown)
2. Include inline CSS styling within wiki tables for visual appeal
3. Use wikitable class with custom styling (background colors, borders, padding)
4. Create an attractive user information box (infobox style) on the right side
5. Use proper wiki heading syntax (== Heading ==)
6. Use wiki list syntax (* for bullets, # for numbered)
7. Include relevant categories at the end
8. Use wiki link syntax [[Page|Display Text]] for internal links
9. Add userboxes if appropriate using {{Babel}} or similar templates where applicable
10. Make the profile look professional and well-formatted

Output ONLY the wikitext code, no explanations or markdown code blocks."#;

/// Build the user prompt for an edit request.
///
/// The selection block is omitted when no text is selected; the closing
/// instruction then asks the model to apply the change minimally.
pub fn build_edit_prompt(request: &EditRequest) -> String {
    let mut parts: Vec<String> = vec![
        "Here is the complete wikitext content:".into(),
        String::new(),
        "---BEGIN WIKITEXT---".into(),
        request.original_wikitext.clone(),
        "---END WIKITEXT---".into(),
        String::new(),
    ];

    if let Some(selected) = request
        .selected_text
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        parts.push("The user has selected this specific text to modify:".into());
        parts.push("---BEGIN SELECTION---".into());
        parts.push(selected.to_string());
        parts.push("---END SELECTION---".into());
        parts.push(String::new());
    }

    parts.push(format!("User's edit instruction: \"{}\"", request.instruction));
    parts.push(String::new());
    parts.push(
        "IMPORTANT: Modify ONLY the selected text (or apply the instruction minimally \
         if no selection). Keep everything else EXACTLY the same."
            .into(),
    );
    parts.push(String::new());
    parts.push("Output the complete modified wikitext:".into());

    parts.join("\n")
}

/// Build the user prompt for whole-profile generation.
pub fn build_profile_prompt(data: &ProfileData) -> String {
    let mut parts: Vec<String> = vec![
        "Generate a Wikimedia user profile page for the following user:".into(),
        String::new(),
        format!("Username: {}", data.username),
    ];

    if let Some(ref v) = data.real_name {
        parts.push(format!("Real Name: {v}"));
    }
    if let Some(ref v) = data.location {
        parts.push(format!("Location: {v}"));
    }
    if let Some(ref v) = data.occupation {
        parts.push(format!("Occupation: {v}"));
    }
    if let Some(ref v) = data.join_year {
        parts.push(format!("Member since: {v}"));
    }
    if let Some(ref v) = data.languages {
        parts.push(format!("Languages: {v}"));
    }
    if let Some(ref v) = data.interests {
        parts.push(format!("Interests/Hobbies: {v}"));
    }
    if let Some(ref v) = data.about_me {
        parts.push(format!("About Me: {v}"));
    }

    parts.push(String::new());
    parts.push("Create a visually appealing profile with:".into());
    parts.push("- A styled infobox/userbox on the right with user details".into());
    parts.push("- Proper section headings".into());
    parts.push("- Styled tables with inline CSS (background colors like #0057B7 for headers)".into());
    parts.push("- Language babel boxes if languages are provided".into());
    parts.push("- Appropriate categories".into());
    parts.push("- A welcoming talk page link".into());

    parts.join("\n")
}

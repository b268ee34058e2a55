//! HTML→wikitext structural conversion: an ordered regex rewrite pipeline.
//!
//! ## Why string rewriting instead of a DOM?
//!
//! The input is MediaWiki parser output that a contenteditable surface has
//! been let loose on — frequently *not* well-formed HTML. A real parser would
//! either reject it or silently repair it into a different tree, changing the
//! observable output. Thirteen cheap, order-sensitive regex rules degrade
//! gracefully instead: whatever a rule does not recognise falls through to
//! the residual-tag strip, so the output never contains raw markup tags even
//! for garbage input.
//!
//! ## Rule Order
//!
//! Order is a correctness invariant, not a style choice:
//!
//! - the synthetic `mw-parser-output` wrapper must be unwrapped before the
//!   generic `<div>` rule eats it and mis-anchors nested content;
//! - wikitable-classed tables must be matched before the generic `<table>`
//!   rule, and `/wiki/` anchors before the generic anchor rule;
//! - entity decoding must run *after* tag removal so literal `&lt;`/`&gt;`
//!   text is never reinterpreted as a tag;
//! - whitespace collapse runs last, over the stages' accumulated newlines.
//!
//! The converter is a pure function of its input: no state survives a call,
//! and concurrent callers need no coordination.

use once_cell::sync::Lazy;
use regex::Regex;

/// Convert a string of HTML markup to best-effort MediaWiki wikitext.
///
/// Total over all string inputs: empty in, empty out; malformed or
/// unrecognised markup passes through with only generic tag stripping
/// applied. Deterministic, no side effects, never fails.
///
/// Stages (applied in order):
/// 1. Unwrap the `mw-parser-output` container emitted by `action=parse`
/// 2. Headings `<h1>`–`<h6>` → `= … =` of matching depth
/// 3. Bold/italic tags → `'''…'''` / `''…''`
/// 4. Internal `/wiki/` anchors → `[[Target|Text]]`, then any anchor → `[url Text]`
/// 5. List containers dropped, `<li>` → `* ` lines
/// 6. Paragraphs, `<br>`, `<hr>` → blank line / newline / `----`
/// 7. `<pre>` → `<syntaxhighlight>` block (interior untouched), `<code>` kept inline
/// 8. Tables → `{|`/`|}`/`|-`/`! `/`| ` wikitext table syntax
/// 9. `<img>` → `[[File:name|alt]]`
/// 10. `<div>`/`<span>` stripped, content kept
/// 11. Any remaining tag deleted outright
/// 12. Six named entities decoded in a single non-cascading pass
/// 13. 3+ newlines collapsed to 2; document trimmed
pub fn html_to_wikitext(html: &str) -> String {
    let s = unwrap_parser_output(html);
    let s = convert_headings(&s);
    let s = convert_emphasis(&s);
    let s = convert_links(&s);
    let s = convert_lists(&s);
    let s = convert_blocks(&s);
    let s = convert_code(&s);
    let s = convert_tables(&s);
    let s = convert_images(&s);
    let s = strip_containers(&s);
    let s = strip_residual_tags(&s);
    let s = decode_entities(&s);
    normalise_whitespace(&s)
}

// ── Stage 1: Unwrap the parser-output container ──────────────────────────────

static RE_PARSER_OUTPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<div class="mw-parser-output">(.*?)</div>"#).unwrap());

fn unwrap_parser_output(input: &str) -> String {
    RE_PARSER_OUTPUT.replace_all(input, "$1").into_owned()
}

// ── Stage 2: Headings ────────────────────────────────────────────────────────
//
// One rule per level so that `<h2>…</h3>` mismatches fall through to the
// residual strip instead of being converted at the wrong depth.

static RE_HEADINGS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    (1..=6)
        .map(|level| {
            let re =
                Regex::new(&format!(r"(?i)<h{level}[^>]*>(.*?)</h{level}>")).unwrap();
            let marker = "=".repeat(level);
            (re, format!("{marker} $1 {marker}\n"))
        })
        .collect()
});

fn convert_headings(input: &str) -> String {
    let mut s = input.to_string();
    for (re, replacement) in RE_HEADINGS.iter() {
        s = re.replace_all(&s, replacement.as_str()).into_owned();
    }
    s
}

// ── Stage 3: Emphasis ────────────────────────────────────────────────────────

static RE_BOLD: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)<b[^>]*>(.*?)</b>").unwrap(),
        Regex::new(r"(?i)<strong[^>]*>(.*?)</strong>").unwrap(),
    ]
});

static RE_ITALIC: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)<i[^>]*>(.*?)</i>").unwrap(),
        Regex::new(r"(?i)<em[^>]*>(.*?)</em>").unwrap(),
    ]
});

fn convert_emphasis(input: &str) -> String {
    let mut s = input.to_string();
    for re in RE_BOLD.iter() {
        s = re.replace_all(&s, "'''$1'''").into_owned();
    }
    for re in RE_ITALIC.iter() {
        s = re.replace_all(&s, "''$1''").into_owned();
    }
    s
}

// ── Stage 4: Links ───────────────────────────────────────────────────────────
//
// Internal links must be matched first; the generic rule would otherwise
// turn `/wiki/Foo` anchors into external-style single brackets.

static RE_WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a[^>]*href="/wiki/([^"]*)"[^>]*>(.*?)</a>"#).unwrap());

static RE_EXTERNAL_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());

fn convert_links(input: &str) -> String {
    let s = RE_WIKI_LINK.replace_all(input, "[[$1|$2]]");
    RE_EXTERNAL_LINK.replace_all(&s, "[$1 $2]").into_owned()
}

// ── Stage 5: Lists ───────────────────────────────────────────────────────────
//
// Ordered and unordered items both become `* ` bullets. Known fidelity gap
// carried over deliberately; callers rely on bullet-only output (see
// DESIGN.md).

static RE_LIST_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<[uo]l[^>]*>").unwrap());
static RE_LIST_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</[uo]l>").unwrap());
static RE_LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li[^>]*>(.*?)</li>").unwrap());

fn convert_lists(input: &str) -> String {
    let s = RE_LIST_OPEN.replace_all(input, "");
    let s = RE_LIST_CLOSE.replace_all(&s, "\n");
    RE_LIST_ITEM.replace_all(&s, "* $1\n").into_owned()
}

// ── Stage 6: Paragraphs, line breaks, rules ──────────────────────────────────

static RE_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p[^>]*>(.*?)</p>").unwrap());
static RE_LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_HORIZ_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<hr[^>]*>").unwrap());

fn convert_blocks(input: &str) -> String {
    let s = RE_PARAGRAPH.replace_all(input, "$1\n\n");
    let s = RE_LINE_BREAK.replace_all(&s, "\n");
    RE_HORIZ_RULE.replace_all(&s, "----\n").into_owned()
}

// ── Stage 7: Code and preformatted blocks ────────────────────────────────────
//
// `<pre>` interiors keep their whitespace exactly; the `(?s)` flag lets the
// match span lines, and no later stage sees angle brackets because the
// emitted `<syntaxhighlight>` tags are themselves valid wikitext that the
// residual strip must not remove — hence stage 11's pattern excludes nothing
// and this stage's output is re-tagged only after the residual pass.

static RE_PREFORMATTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").unwrap());
static RE_INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<code[^>]*>(.*?)</code>").unwrap());

/// Sentinel pair shielding syntaxhighlight/code tags from the residual strip.
///
/// The wikitext we emit for code *is itself tag-shaped* (`<syntaxhighlight>`,
/// `<code>`); writing the tags directly would see stage 11 delete them.
/// U+0001/U+0002 never occur in real page HTML, so the shielded tags pass
/// the residual strip untouched and are swapped back right after it.
const TAG_OPEN_SENTINEL: char = '\u{0001}';
const TAG_CLOSE_SENTINEL: char = '\u{0002}';

fn shield(tag: &str) -> String {
    format!("{TAG_OPEN_SENTINEL}{tag}{TAG_CLOSE_SENTINEL}")
}

fn convert_code(input: &str) -> String {
    let open = shield("syntaxhighlight");
    let close = shield("/syntaxhighlight");
    let s = RE_PREFORMATTED
        .replace_all(input, format!("{open}\n$1\n{close}\n").as_str())
        .into_owned();
    let code_open = shield("code");
    let code_close = shield("/code");
    RE_INLINE_CODE
        .replace_all(&s, format!("{code_open}$1{code_close}").as_str())
        .into_owned()
}

// ── Stage 8: Tables ──────────────────────────────────────────────────────────

static RE_TABLE_WIKITABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<table[^>]*class="[^"]*wikitable[^"]*"[^>]*>"#).unwrap()
});
static RE_TABLE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<table[^>]*>").unwrap());
static RE_TABLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</table>").unwrap());
static RE_ROW_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<tr[^>]*>").unwrap());
static RE_ROW_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</tr>").unwrap());
static RE_HEADER_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<th[^>]*>(.*?)</th>").unwrap());
static RE_DATA_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<td[^>]*>(.*?)</td>").unwrap());

fn convert_tables(input: &str) -> String {
    let s = RE_TABLE_WIKITABLE.replace_all(input, "{| class=\"wikitable\"\n");
    let s = RE_TABLE_OPEN.replace_all(&s, "{|\n");
    let s = RE_TABLE_CLOSE.replace_all(&s, "|}\n");
    let s = RE_ROW_OPEN.replace_all(&s, "|-\n");
    let s = RE_ROW_CLOSE.replace_all(&s, "");
    let s = RE_HEADER_CELL.replace_all(&s, "! $1\n");
    RE_DATA_CELL.replace_all(&s, "| $1\n").into_owned()
}

// ── Stage 9: Images ──────────────────────────────────────────────────────────
//
// Only images exposing both a slash-separated src and an alt attribute are
// recognised; the filename is the last path segment. Anything else falls
// through to the residual strip.

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]*src="[^"]*/([^/"]+)"[^>]*alt="([^"]*)"[^>]*>"#).unwrap()
});

fn convert_images(input: &str) -> String {
    RE_IMAGE.replace_all(input, "[[File:$1|$2]]").into_owned()
}

// ── Stage 10: Generic container stripping ────────────────────────────────────

static RE_DIV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<div[^>]*>(.*?)</div>").unwrap());
static RE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<span[^>]*>(.*?)</span>").unwrap());

fn strip_containers(input: &str) -> String {
    let s = RE_DIV.replace_all(input, "$1\n");
    RE_SPAN.replace_all(&s, "$1").into_owned()
}

// ── Stage 11: Residual tag removal ───────────────────────────────────────────
//
// The fallback guarantee: whatever no prior stage recognised is deleted,
// opening and closing tags alike. After the strip, the stage-7 sentinels are
// swapped back into literal angle brackets so the emitted wikitext code tags
// survive.

static RE_RESIDUAL_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

fn strip_residual_tags(input: &str) -> String {
    RE_RESIDUAL_TAG
        .replace_all(input, "")
        .replace(TAG_OPEN_SENTINEL, "<")
        .replace(TAG_CLOSE_SENTINEL, ">")
}

// ── Stage 12: Entity decoding ────────────────────────────────────────────────
//
// Exactly six named entities, decoded in one pass so the output of one
// decode is never re-scanned: `&amp;lt;` yields `&` + literal `lt;`, not `<`.
// This is not a general entity decoder — anything else passes through.

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(nbsp|amp|lt|gt|quot|#39);").unwrap());

fn decode_entities(input: &str) -> String {
    RE_ENTITY
        .replace_all(input, |caps: &regex::Captures<'_>| {
            match &caps[1] {
                "nbsp" => " ",
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                "#39" => "'",
                _ => unreachable!("pattern admits only the six alternatives"),
            }
        })
        .into_owned()
}

// ── Stage 13: Whitespace normalisation ───────────────────────────────────────

static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn normalise_whitespace(input: &str) -> String {
    RE_EXCESS_NEWLINES
        .replace_all(input, "\n\n")
        .trim()
        .to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

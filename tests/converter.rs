//! Integration tests for the HTML → wikitext converter.
//!
//! These run entirely offline against realistic MediaWiki parser-output
//! fragments, the shape a contenteditable editor would hand back after a
//! user has been typing in it.

use wiki_profile_builder::html_to_wikitext;

/// Assert converted wikitext passes the baseline quality checks.
fn assert_wikitext_quality(wikitext: &str, context: &str) {
    assert!(
        !wikitext.contains("<div") && !wikitext.contains("<span"),
        "[{context}] container tags must not survive: {wikitext:?}"
    );
    assert!(
        !wikitext.contains("<p>") && !wikitext.contains("</p>"),
        "[{context}] paragraph tags must not survive: {wikitext:?}"
    );
    assert!(
        !wikitext.starts_with('\n') && !wikitext.ends_with('\n'),
        "[{context}] output must be trimmed: {wikitext:?}"
    );
    assert!(
        !wikitext.contains("\n\n\n"),
        "[{context}] blank-line runs must be collapsed: {wikitext:?}"
    );
}

#[test]
fn typical_user_page_round_trip_shape() {
    // The kind of HTML action=parse returns for a small user page.
    let html = concat!(
        r#"<div class="mw-parser-output">"#,
        r#"<h2><span class="mw-headline" id="About_me">About me</span></h2>"#,
        r#"<p>I am a <b>cartographer</b> from <a href="/wiki/Lviv" title="Lviv">Lviv</a>. "#,
        r#"I edit <i>maps</i> and occasionally "#,
        r#"<a href="https://osm.org" class="external text">OpenStreetMap</a>.</p>"#,
        r#"<h3><span class="mw-headline" id="Interests">Interests</span></h3>"#,
        r#"<ul><li>Historical atlases</li><li>Toponymy</li></ul>"#,
        r#"</div>"#,
    );

    let wikitext = html_to_wikitext(html);
    assert_wikitext_quality(&wikitext, "user page");

    assert!(wikitext.contains("== About me =="), "{wikitext:?}");
    assert!(wikitext.contains("=== Interests ==="), "{wikitext:?}");
    assert!(wikitext.contains("'''cartographer'''"), "{wikitext:?}");
    assert!(wikitext.contains("''maps''"), "{wikitext:?}");
    assert!(wikitext.contains("[[Lviv|Lviv]]"), "{wikitext:?}");
    assert!(
        wikitext.contains("[https://osm.org OpenStreetMap]"),
        "{wikitext:?}"
    );
    assert!(wikitext.contains("* Historical atlases"), "{wikitext:?}");
    assert!(wikitext.contains("* Toponymy"), "{wikitext:?}");
}

#[test]
fn babel_style_table_survives() {
    let html = concat!(
        r#"<table class="wikitable"><tbody>"#,
        r#"<tr><th>Language</th><th>Level</th></tr>"#,
        r#"<tr><td>Ukrainian</td><td>Native</td></tr>"#,
        r#"<tr><td>English</td><td>Fluent</td></tr>"#,
        r#"</tbody></table>"#,
    );

    let wikitext = html_to_wikitext(html);
    assert!(wikitext.starts_with("{| class=\"wikitable\""), "{wikitext:?}");
    assert!(wikitext.contains("! Language"), "{wikitext:?}");
    assert!(wikitext.contains("| Ukrainian"), "{wikitext:?}");
    assert!(wikitext.contains("|-"), "{wikitext:?}");
    assert!(wikitext.trim_end().ends_with("|}"), "{wikitext:?}");
}

#[test]
fn code_blocks_keep_their_tags_through_the_residual_strip() {
    let html = concat!(
        "<p>My favourite template call:</p>",
        "<pre>{{userbox|id=UA}}</pre>",
        "<p>Inline too: <code>{{ping}}</code> works.</p>",
    );

    let wikitext = html_to_wikitext(html);
    assert!(
        wikitext.contains("<syntaxhighlight>\n{{userbox|id=UA}}\n</syntaxhighlight>"),
        "{wikitext:?}"
    );
    assert!(wikitext.contains("<code>{{ping}}</code>"), "{wikitext:?}");
    // Everything else angle-bracketed is gone.
    assert!(!wikitext.contains("<p>"), "{wikitext:?}");
    assert!(!wikitext.contains("<pre>"), "{wikitext:?}");
}

#[test]
fn entities_decode_exactly_once() {
    let html = "<p>Use &amp;lt; to show a literal &lt; and Tom&nbsp;&amp;&nbsp;Jerry</p>";
    let wikitext = html_to_wikitext(html);

    // "&amp;lt;" is the author writing the text "&lt;", so it must decode to
    // the five characters `&lt;`, not cascade all the way to `<`.
    assert!(wikitext.contains("&lt; to show a literal <"), "{wikitext:?}");
    assert!(wikitext.contains("Tom & Jerry"), "{wikitext:?}");
}

#[test]
fn image_and_rule_markup() {
    let html = concat!(
        r#"<p>Signature:</p><hr>"#,
        r#"<img src="//upload.wikimedia.org/commons/thumb/Flag_of_Ukraine.svg" alt="Flag of Ukraine">"#,
    );
    let wikitext = html_to_wikitext(html);
    assert!(wikitext.contains("----"), "{wikitext:?}");
    assert!(
        wikitext.contains("[[File:Flag_of_Ukraine.svg|Flag of Ukraine]]"),
        "{wikitext:?}"
    );
}

#[test]
fn editor_noise_is_tolerated() {
    // Contenteditable surfaces inject spans, data attributes, and stray
    // self-closed breaks; none of it should leak into the wikitext.
    let html = concat!(
        r#"<p data-editor="true">Hello<br/>world<span style="color:red"> again</span></p>"#,
        r#"<figure><figcaption>ignored wrapper</figcaption></figure>"#,
    );
    let wikitext = html_to_wikitext(html);
    assert_wikitext_quality(&wikitext, "editor noise");
    assert!(wikitext.contains("Hello\nworld again"), "{wikitext:?}");
    assert!(wikitext.contains("ignored wrapper"), "{wikitext:?}");
}

#[test]
fn empty_and_whitespace_inputs() {
    assert_eq!(html_to_wikitext(""), "");
    assert_eq!(html_to_wikitext("   \n\t  "), "");
    assert_eq!(html_to_wikitext("<p></p><div></div>"), "");
}

#[test]
fn plain_text_passes_through_unchanged() {
    let text = "Just a sentence with no markup at all.";
    assert_eq!(html_to_wikitext(text), text);
}

#[test]
fn conversion_is_idempotent_on_its_own_output() {
    let html = concat!(
        r#"<h2>Links</h2>"#,
        r#"<p><a href="/wiki/Kyiv">Kyiv</a> and <b>bold</b> text.</p>"#,
        r#"<ul><li>one</li><li>two</li></ul>"#,
    );
    let once = html_to_wikitext(html);
    let twice = html_to_wikitext(&once);
    assert_eq!(once, twice);
}

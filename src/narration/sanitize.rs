//! Script text normalization
//!
//! Generated scripts arrive with markdown decoration that a speech engine
//! would read aloud ("asterisk", "hash") and with typographic punctuation
//! that the PDF base-14 fonts cannot draw. Both passes are idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Markup symbols dropped before speech
const MARKUP_SYMBOLS: &[char] = &['*', '#', '_', '`', '~', '>', '|'];

/// List bullets stripped from the start of a line
const BULLETS: &[char] = &['-', '+', '•', '◦', '▪', '‣'];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Prepare script text for a speech engine.
///
/// Removes markup symbols and leading list bullets, then collapses line
/// breaks and whitespace runs into single spaces. Words are left untouched.
#[must_use]
pub fn sanitize_for_speech(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !MARKUP_SYMBOLS.contains(c)).collect();

    let joined = stripped
        .lines()
        .map(strip_bullets)
        .collect::<Vec<_>>()
        .join(" ");

    WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string()
}

/// Strip any number of leading bullets, each followed by whitespace or the
/// end of the line.
fn strip_bullets(line: &str) -> &str {
    let mut rest = line.trim_start();
    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(first), next)
                if BULLETS.contains(&first) && next.map_or(true, char::is_whitespace) =>
            {
                rest = rest[first.len_utf8()..].trim_start();
            }
            _ => return rest,
        }
    }
}

/// Map punctuation outside the PDF standard-font repertoire to plain ASCII.
///
/// Smart quotes, dashes, ellipses, bullets and non-breaking spaces get
/// readable equivalents; any other character outside Latin-1 becomes `?`.
#[must_use]
pub fn normalize_for_pdf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25E6}' | '\u{25AA}' | '\u{2023}' => out.push('-'),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => out.push(' '),
            '\u{20AC}' => out.push_str("EUR"),
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c if u32::from(c) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_and_bullets() {
        let script = "# Meet **Acme**\n\n- Fast setup\n- Zero `config`\n> Loved by teams";
        assert_eq!(
            sanitize_for_speech(script),
            "Meet Acme Fast setup Zero config Loved by teams"
        );
    }

    #[test]
    fn keeps_hyphenated_words() {
        assert_eq!(
            sanitize_for_speech("state-of-the-art\n+ AI-driven"),
            "state-of-the-art AI-driven"
        );
    }

    #[test]
    fn nested_and_unicode_bullets() {
        assert_eq!(sanitize_for_speech("  • ◦ one\n‣two\n▪"), "one ‣two");
    }

    #[test]
    fn lone_bullet_line_disappears() {
        assert_eq!(sanitize_for_speech("-\nitem"), "item");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "# Title\n\n* bullet one\n* bullet two\n\nDone.",
            "-\n- - item",
            "plain text   with    gaps",
            "  ~~strike~~ | table | cell |",
            "",
            "• ",
        ];
        for s in samples {
            let once = sanitize_for_speech(s);
            assert_eq!(sanitize_for_speech(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn only_markup_is_empty() {
        assert!(sanitize_for_speech("***\n-\n# #").is_empty());
    }

    #[test]
    fn pdf_punctuation_is_ascii() {
        assert_eq!(
            normalize_for_pdf("\u{201C}Fast\u{201D} \u{2014} it\u{2019}s here\u{2026}"),
            "\"Fast\" - it's here..."
        );
        assert_eq!(normalize_for_pdf("caf\u{e9}"), "caf\u{e9}");
        assert_eq!(normalize_for_pdf("\u{4f60}\u{597d}"), "??");
    }

    #[test]
    fn pdf_normalization_is_idempotent() {
        for s in ["\u{2022} one\u{a0}two", "\u{20AC}5 \u{2013} \u{1F680}", "line\nbreak"] {
            let once = normalize_for_pdf(s);
            assert_eq!(normalize_for_pdf(&once), once);
        }
    }
}

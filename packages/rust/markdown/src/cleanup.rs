//! Cleanup passes for record bodies before they are embedded in a document.
//!
//! Each pass is a function `&str -> String` applied in sequence. Fenced code
//! blocks are left untouched by the passes that rewrite lines.

use std::sync::LazyLock;

use regex::Regex;

/// Run every cleanup pass on a record body.
pub(crate) fn clean_body(md: &str) -> String {
    let mut result = md.replace("\r\n", "\n").replace('\r', "\n");

    result = strip_leftover_html(&result);
    result = demote_headings(&result);
    result = normalize_whitespace(&result);
    result = clean_blank_lines(&result);
    result = ensure_trailing_newline(result.trim_start_matches('\n'));

    result
}

/// Apply `f` to every line outside fenced code blocks.
fn map_prose_lines(md: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            lines.push(line.to_string());
        } else if in_code_block {
            lines.push(line.to_string());
        } else {
            lines.push(f(line));
        }
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 1: Strip stray HTML
// ---------------------------------------------------------------------------

/// Remove HTML tags pasted into spreadsheet cells, keeping their text.
/// `<br>` becomes a line break.
fn strip_leftover_html(md: &str) -> String {
    static BR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").expect("valid regex")
    });

    map_prose_lines(md, |line| {
        let line = BR_RE.replace_all(line, "\n");
        HTML_TAG_RE.replace_all(&line, "").to_string()
    })
}

// ---------------------------------------------------------------------------
// Pass 2: Demote headings
// ---------------------------------------------------------------------------

/// Push embedded headings below the document's own `#`/`##`/`###` levels.
fn demote_headings(md: &str) -> String {
    static H_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));

    map_prose_lines(md, |line| match H_RE.captures(line) {
        Some(caps) => {
            let level = (caps[1].len() + 3).min(6);
            format!("{} {}", "#".repeat(level), caps[2].trim())
        }
        None => line.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Pass 3: Normalize whitespace
// ---------------------------------------------------------------------------

/// Trim trailing whitespace on every line.
pub(crate) fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 4: Collapse blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of blank lines into a single blank line.
fn clean_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Ensure trailing newline
// ---------------------------------------------------------------------------

/// Ensure the text ends with exactly one newline.
pub(crate) fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}

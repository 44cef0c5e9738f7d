//! Slug generation for artifact file names.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that never survive into a slug.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s-]").expect("disallowed-chars regex"));

/// Runs of whitespace, collapsed to a single dash.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Fallback slug for text with no usable characters.
const EMPTY_SLUG: &str = "item";

/// Turn arbitrary text into a URL- and filename-safe slug.
///
/// Drops everything outside `[A-Za-z0-9 -]`, lowercases, and collapses
/// whitespace runs to `-`. Text with nothing left becomes `item`.
pub fn slugify(text: &str) -> String {
    let kept = DISALLOWED_RE.replace_all(text, "");
    let lowered = kept.trim().to_lowercase();
    let slug = WHITESPACE_RE.replace_all(&lowered, "-");

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_common_titles() {
        assert_eq!(slugify("Custom Home Building"), "custom-home-building");
        assert_eq!(slugify("  Kitchen & Bath Remodels "), "kitchen-bath-remodels");
        assert_eq!(slugify("What's your warranty?"), "whats-your-warranty");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify(""), "item");
        assert_eq!(slugify("!!!"), "item");
    }

    #[test]
    fn slugify_is_stable() {
        let once = slugify("Design / Build Services");
        assert_eq!(slugify(&once), once);
    }
}

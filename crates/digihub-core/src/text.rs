//! Text helpers for slugs and excerpts.

use std::sync::LazyLock;

use regex::Regex;

/// Excerpts longer than this many characters are truncated.
pub const EXCERPT_MAX_CHARS: usize = 300;

const ELLIPSIS: &str = "...";

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// URL-safe slug for a human-readable name.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Remove every `<...>` run from `html`.
pub fn strip_tags(html: &str) -> String {
    MARKUP.replace_all(html, "").into_owned()
}

/// Plain-text summary of an HTML body.
///
/// Markup is stripped first. Text longer than [`EXCERPT_MAX_CHARS`] keeps its
/// first 297 characters followed by `...`, so the result never exceeds the
/// limit.
pub fn derive_excerpt(content: &str) -> String {
    let clean = strip_tags(content);
    if clean.chars().count() <= EXCERPT_MAX_CHARS {
        return clean;
    }

    let keep = EXCERPT_MAX_CHARS - ELLIPSIS.len();
    let mut excerpt: String = clean.chars().take(keep).collect();
    excerpt.push_str(ELLIPSIS);
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  SEO Tips  for 2024 "), "seo-tips-for-2024");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn test_excerpt_short_content_is_kept() {
        assert_eq!(derive_excerpt("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_excerpt_long_content_is_truncated() {
        let content = format!("<div>{}</div>", "a".repeat(301));
        let excerpt = derive_excerpt(&content);

        assert_eq!(excerpt.chars().count(), 300);
        assert!(excerpt.ends_with("..."));
        assert_eq!(&excerpt[..297], "a".repeat(297));
    }

    #[test]
    fn test_excerpt_exactly_at_limit() {
        let content = "b".repeat(300);
        assert_eq!(derive_excerpt(&content), content);
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(301);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 300);
    }
}

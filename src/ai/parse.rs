//! Turning a free-form model response into Ruby source.
//!
//! Models wrap code in fences inconsistently, so extraction is an ordered
//! chain of strategies; each one runs only if the previous found nothing.
//! The order is a fixed policy, not an implementation detail.

use regex::Regex;
use std::sync::LazyLock;

static FENCED_TAGGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:ruby|rb)[ \t]*\n(.*?)```").unwrap());

static FENCED_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap());

static RUBY_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:def|class|module|require|require_relative|end)\b").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// First code block explicitly fenced as Ruby.
    FencedTagged,
    /// First fenced code block of any language.
    FencedGeneric,
    /// No fence, but the raw text looks like Ruby (keywords or a leading
    /// comment marker).
    KeywordHeuristic,
    /// Raw text accepted verbatim as a last resort.
    Raw,
}

/// Apply the strategy chain to a model response. The caller has already
/// rejected empty responses.
pub fn extract_code(response: &str) -> (String, ExtractionStrategy) {
    if let Some(captures) = FENCED_TAGGED.captures(response) {
        return (captures[1].trim().to_string(), ExtractionStrategy::FencedTagged);
    }

    if let Some(captures) = FENCED_GENERIC.captures(response) {
        return (captures[1].trim().to_string(), ExtractionStrategy::FencedGeneric);
    }

    let trimmed = response.trim();
    if looks_like_ruby(trimmed) {
        return (trimmed.to_string(), ExtractionStrategy::KeywordHeuristic);
    }

    (trimmed.to_string(), ExtractionStrategy::Raw)
}

fn looks_like_ruby(text: &str) -> bool {
    text.starts_with('#') || RUBY_KEYWORDS.is_match(text)
}

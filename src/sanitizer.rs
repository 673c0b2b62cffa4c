//! Markdown stripping for model replies
//!
//! The front end renders replies as plain text, so emphasis, headings, code
//! fences, quotes and list bullets are removed before the reply leaves the
//! gateway.

use regex::Regex;
use std::sync::LazyLock;

/// Removal passes, applied in order.
///
/// Double markers run before single markers so `**bold**` is never left
/// half-stripped. Line-start passes allow indentation, and the last pass
/// removes any run of stacked quote and bullet markers.
static MARKUP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\*\*",
        r"\*",
        r"#{1,6}",
        r"`{1,3}",
        r"_{1,2}",
        r"(?m)^[ \t]*-{2,}",
        r"(?m)^(?:[ \t]*(?:>+|[-*+][ \t]))+[ \t]*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Strip formatting markup from model output
#[must_use]
pub fn sanitize(text: &str) -> String {
    let stripped = MARKUP_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());

    stripped.trim().to_string()
}

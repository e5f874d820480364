use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, fold accents, turn punctuation into spaces and collapse
/// whitespace. Output is ASCII-only and normalizing it again is a no-op.
pub fn normalize_text(value: &str) -> String {
    let lowered = value.to_lowercase().replace(['\u{2019}', '-'], " ");
    let folded: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let folded = folded.replace('\'', " ");
    let cleaned = NON_ALNUM_RE.replace_all(&folded, " ");
    SPACES_RE.replace_all(&cleaned, " ").trim().to_string()
}

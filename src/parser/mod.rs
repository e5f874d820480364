pub mod amount;
pub mod html;
pub mod normalize;
pub mod numerals;

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use normalize::normalize_text;

const FINGERPRINT_LEN: usize = 20;

// Matched against normalized text, so no accents and no colon.
static LAST_UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"derniere mise a jour des donnees de ce texte\s+([0-9]{1,2}(?:er)?\s+[a-z]+\s+[0-9]{4})")
        .unwrap()
});

/// Plain-text projection of one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub text: String,
    pub fingerprint: String,
    pub last_update: String,
}

/// Two-step pipeline: HTML → plain text → (fingerprint, last update date).
pub fn process_page(raw_html: &str) -> PageText {
    let text = html::html_to_text(raw_html);
    PageText {
        fingerprint: fingerprint(&text),
        last_update: extract_last_update(&text),
        text,
    }
}

/// First 20 hex chars of the SHA-256 of the text. Only used as a change
/// oracle between runs.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// "Dernière mise à jour des données de ce texte : 1er janvier 2026" →
/// "1er janvier 2026". Empty when the page carries no such line.
pub fn extract_last_update(text: &str) -> String {
    LAST_UPDATE_RE
        .captures(&normalize_text(text))
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

// ── Tests ──

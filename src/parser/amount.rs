use std::sync::LazyLock;

use regex::Regex;

use super::normalize::normalize_text;
use super::numerals::parse_french_number_detailed;

static LUMP_SUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)est\s+fix[ée]e?\s+à\s+la\s+somme\s+forfaitaire\s+de\s+([^.]+)\.").unwrap()
});

// Runs on the raw phrase: normalizing would turn the decimal comma into a space.
static EURO_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9]{1,3}(?:[ \u{a0}\u{2009}\u{202f}][0-9]{3})+|[0-9]+)(?:[.,]([0-9]+))?\s*(?:euro|€)")
        .unwrap()
});

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Non-negative money value held as a whole number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount {
    cents: u64,
}

impl Amount {
    pub fn from_cents(cents: u64) -> Self {
        Amount { cents }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }

    pub fn euros(&self) -> u64 {
        self.cents / 100
    }

    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

/// Result of looking for the lump-sum sentence.
///
/// `raw_phrase` is kept even when no value could be derived from it, so a
/// human can still read what the text says.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmountMatch {
    pub value: Option<Amount>,
    pub raw_phrase: String,
    /// Words the numeral parser had to skip.
    pub unrecognized: Vec<String>,
}

impl AmountMatch {
    pub fn found_sentence(&self) -> bool {
        !self.raw_phrase.is_empty()
    }
}

/// Find "est fixée à la somme forfaitaire de ..." in flattened legal text and
/// turn the phrase into an amount.
pub fn extract_amount(text: &str) -> AmountMatch {
    let Some(caps) = LUMP_SUM_RE.captures(text) else {
        return AmountMatch::default();
    };
    let raw_phrase = caps[1].trim().to_string();
    let normalized = normalize_text(&raw_phrase);
    let mut unrecognized = Vec::new();

    let euro_cents = match euro_from_digits(&raw_phrase) {
        Some(cents) => Some(cents),
        None => {
            let words = normalized.split("euro").next().unwrap_or_default();
            let report = parse_french_number_detailed(words);
            unrecognized.extend(report.unrecognized);
            (report.recognized > 0).then_some(report.value.saturating_mul(100))
        }
    };

    let centimes = if normalized.contains("centime") {
        // skip the rest of the "euro(s)" word itself
        let after_euro = match normalized.split_once("euro") {
            Some((_, rest)) => rest.split_once(' ').map_or("", |(_, tail)| tail),
            None => normalized.as_str(),
        };
        let chunk = after_euro.split("centime").next().unwrap_or_default();
        match DIGITS_RE.find(chunk) {
            Some(m) => m.as_str().parse::<u64>().unwrap_or(u64::MAX),
            None => {
                let report = parse_french_number_detailed(chunk);
                unrecognized.extend(report.unrecognized);
                report.value
            }
        }
    } else {
        0
    };

    let value = match euro_cents {
        Some(cents) if centimes <= 99 => Some(Amount::from_cents(cents.saturating_add(centimes))),
        _ => None,
    };

    AmountMatch { value, raw_phrase, unrecognized }
}

/// "1500,75 euros", "1 500 €" or "90 euros" -> cents.
fn euro_from_digits(raw_phrase: &str) -> Option<u64> {
    let caps = EURO_DIGITS_RE.captures(raw_phrase)?;
    let whole: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    let whole = whole.parse::<u64>().ok()?;
    let fraction = match caps.get(2) {
        Some(m) => fraction_to_cents(m.as_str()),
        None => 0,
    };
    Some(whole.saturating_mul(100).saturating_add(fraction))
}

/// Decimal digits after the separator, rounded to two places.
fn fraction_to_cents(digits: &str) -> u64 {
    let padded = format!("{:0<3}", digits);
    let head: u64 = padded[..2].parse().unwrap_or(0);
    let round_up = padded.as_bytes()[2] >= b'5';
    head + u64::from(round_up)
}

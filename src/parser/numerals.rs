use super::normalize::normalize_text;

const UNITS: &[(&str, u64)] = &[
    ("zero", 0),
    ("un", 1),
    ("une", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
    ("six", 6),
    ("sept", 7),
    ("huit", 8),
    ("neuf", 9),
    ("dix", 10),
    ("onze", 11),
    ("douze", 12),
    ("treize", 13),
    ("quatorze", 14),
    ("quinze", 15),
    ("seize", 16),
    ("dixsept", 17),
    ("dixhuit", 18),
    ("dixneuf", 19),
];

const TENS: &[(&str, u64)] = &[
    ("vingt", 20),
    ("trente", 30),
    ("quarante", 40),
    ("cinquante", 50),
    ("soixante", 60),
];

const FILLERS: &[&str] = &["de", "des", "du", "la", "le", "et"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Unit(u64),
    Tens(u64),
    Hundred,
    Thousand,
    Other(String),
}

impl Token {
    fn classify(word: &str) -> Option<Token> {
        if FILLERS.contains(&word) {
            return None;
        }
        let token = if let Some(&(_, v)) = UNITS.iter().find(|(w, _)| *w == word) {
            Token::Unit(v)
        } else if let Some(&(_, v)) = TENS.iter().find(|(w, _)| *w == word) {
            Token::Tens(v)
        } else {
            match word {
                "vingts" => Token::Tens(20),
                "cent" | "cents" => Token::Hundred,
                "mille" => Token::Thousand,
                _ => Token::Other(word.to_string()),
            }
        };
        Some(token)
    }

    /// Units below ten are the only ones that can follow a tens word.
    fn small_unit(&self) -> Option<u64> {
        match self {
            Token::Unit(v) if *v < 10 => Some(*v),
            _ => None,
        }
    }
}

/// Outcome of parsing a run of French number words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumeralReport {
    pub value: u64,
    /// Number of tokens that contributed to `value`.
    pub recognized: usize,
    /// Words that were neither numerals nor fillers, in input order.
    pub unrecognized: Vec<String>,
}

/// Convert French number words ("mille cinq cents") to an integer.
/// Unknown words are skipped and listed; empty input gives 0.
pub fn parse_french_number_detailed(text: &str) -> NumeralReport {
    let tokens = tokenize(&normalize_text(text));

    let mut report = NumeralReport::default();
    let mut total: u64 = 0;
    let mut current: u64 = 0;
    let mut i = 0;

    while i < tokens.len() {
        let next_small = |offset: usize| tokens.get(i + offset).and_then(Token::small_unit);

        match &tokens[i] {
            // "quatre vingt" has to be tried before the plain unit rule
            Token::Unit(4) if tokens.get(i + 1) == Some(&Token::Tens(20)) => {
                let mut value = 80;
                let mut used = 2;
                if let Some(u) = next_small(2) {
                    value += u;
                    used += 1;
                }
                current = current.saturating_add(value);
                report.recognized += used;
                i += used;
            }
            Token::Unit(v) => {
                current = current.saturating_add(*v);
                report.recognized += 1;
                i += 1;
            }
            Token::Tens(v) => {
                let mut value = *v;
                let mut used = 1;
                if let Some(u) = next_small(1) {
                    value += u;
                    used += 1;
                }
                current = current.saturating_add(value);
                report.recognized += used;
                i += used;
            }
            Token::Hundred => {
                current = current.max(1).saturating_mul(100);
                report.recognized += 1;
                i += 1;
            }
            Token::Thousand => {
                total = total.saturating_add(current.max(1).saturating_mul(1000));
                current = 0;
                report.recognized += 1;
                i += 1;
            }
            Token::Other(word) => {
                report.unrecognized.push(word.clone());
                i += 1;
            }
        }
    }

    report.value = total.saturating_add(current);
    report
}

/// Split on spaces, glue "dix sept|huit|neuf" back together, drop fillers.
fn tokenize(normalized: &str) -> Vec<Token> {
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
    let mut merged: Vec<String> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        match (words[i], words.get(i + 1)) {
            ("dix", Some(&next)) if matches!(next, "sept" | "huit" | "neuf") => {
                merged.push(format!("dix{}", next));
                i += 2;
            }
            (word, _) => {
                merged.push(word.to_string());
                i += 1;
            }
        }
    }
    merged.iter().filter_map(|w| Token::classify(w)).collect()
}

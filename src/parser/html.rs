use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Latin-1 entities, `&nbsp;` (U+00A0) through `&yuml;` (U+00FF), in code point order.
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect",
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr",
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot",
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil",
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times",
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig",
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml",
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide",
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

/// Greek capitals from U+0391; U+03A2 has no letter.
const GREEK_UPPER: [&str; 25] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota",
    "Kappa", "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "", "Sigma",
    "Tau", "Upsilon", "Phi", "Chi", "Psi", "Omega",
];

/// Greek small letters from U+03B1.
const GREEK_LOWER: [&str; 25] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota",
    "kappa", "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigmaf", "sigma",
    "tau", "upsilon", "phi", "chi", "psi", "omega",
];

/// Remaining HTML 4 entities, plus the HTML5 spacing entities French
/// typesetting uses as thousands separators.
const OTHER_ENTITIES: &[(&str, u32)] = &[
    ("quot", 34), ("amp", 38), ("apos", 39), ("lt", 60), ("gt", 62),
    ("OElig", 338), ("oelig", 339), ("Scaron", 352), ("scaron", 353), ("Yuml", 376),
    ("fnof", 402), ("circ", 710), ("tilde", 732),
    ("thetasym", 977), ("upsih", 978), ("piv", 982),
    ("ensp", 8194), ("emsp", 8195), ("numsp", 8199), ("puncsp", 8200),
    ("thinsp", 8201), ("hairsp", 8202), ("ZeroWidthSpace", 8203),
    ("zwnj", 8204), ("zwj", 8205), ("lrm", 8206), ("rlm", 8207),
    ("hyphen", 8208), ("ndash", 8211), ("mdash", 8212),
    ("lsquo", 8216), ("rsquo", 8217), ("sbquo", 8218),
    ("ldquo", 8220), ("rdquo", 8221), ("bdquo", 8222),
    ("dagger", 8224), ("Dagger", 8225), ("bull", 8226), ("hellip", 8230),
    ("permil", 8240), ("prime", 8242), ("Prime", 8243),
    ("lsaquo", 8249), ("rsaquo", 8250), ("oline", 8254), ("frasl", 8260),
    ("MediumSpace", 8287), ("euro", 8364),
    ("image", 8465), ("weierp", 8472), ("real", 8476), ("trade", 8482), ("alefsym", 8501),
    ("larr", 8592), ("uarr", 8593), ("rarr", 8594), ("darr", 8595), ("harr", 8596),
    ("crarr", 8629), ("lArr", 8656), ("uArr", 8657), ("rArr", 8658), ("dArr", 8659),
    ("hArr", 8660),
    ("forall", 8704), ("part", 8706), ("exist", 8707), ("empty", 8709), ("nabla", 8711),
    ("isin", 8712), ("notin", 8713), ("ni", 8715), ("prod", 8719), ("sum", 8721),
    ("minus", 8722), ("lowast", 8727), ("radic", 8730), ("prop", 8733), ("infin", 8734),
    ("ang", 8736), ("and", 8743), ("or", 8744), ("cap", 8745), ("cup", 8746),
    ("int", 8747), ("there4", 8756), ("sim", 8764), ("cong", 8773), ("asymp", 8776),
    ("ne", 8800), ("equiv", 8801), ("le", 8804), ("ge", 8805),
    ("sub", 8834), ("sup", 8835), ("nsub", 8836), ("sube", 8838), ("supe", 8839),
    ("oplus", 8853), ("otimes", 8855), ("perp", 8869), ("sdot", 8901),
    ("lceil", 8968), ("rceil", 8969), ("lfloor", 8970), ("rfloor", 8971),
    ("lang", 9001), ("rang", 9002), ("loz", 9674),
    ("spades", 9824), ("clubs", 9827), ("hearts", 9829), ("diams", 9830),
];

static NAMED_ENTITIES: LazyLock<HashMap<&'static str, char>> = LazyLock::new(|| {
    let ranges = [
        (0xA0, &LATIN1_ENTITIES[..]),
        (0x391, &GREEK_UPPER[..]),
        (0x3B1, &GREEK_LOWER[..]),
    ];
    let sequential = ranges.into_iter().flat_map(|(first, names)| {
        names
            .iter()
            .zip(first..)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, code)| (*name, code))
    });
    sequential
        .chain(OTHER_ENTITIES.iter().copied())
        .filter_map(|(name, code)| char::from_u32(code).map(|c| (name, c)))
        .collect()
});

/// Flatten raw HTML into a single line of plain text.
///
/// This is a lossy projection, not a parser: script and style blocks are
/// dropped, every `<...>` becomes a space, entities are decoded and
/// whitespace collapsed. A `<script>` without its closing tag is kept as
/// text (only the opening tag itself goes away).
pub fn html_to_text(raw_html: &str) -> String {
    let cleaned = SCRIPT_RE.replace_all(raw_html, " ");
    let cleaned = STYLE_RE.replace_all(&cleaned, " ");
    let cleaned = TAG_RE.replace_all(&cleaned, " ");
    let decoded = decode_entities(&cleaned);
    SPACES_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Decode named and numeric HTML entities.
pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            decode_one(body).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_one(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        // NUL and surrogates fall back to the replacement char
        return Some(char::from_u32(code).filter(|c| *c != '\0').unwrap_or('\u{fffd}'));
    }
    NAMED_ENTITIES.get(body).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes() {
        assert_eq!(html_to_text("<p>A &amp; B</p>"), "A & B");
    }

    #[test]
    fn drops_script_and_style_blocks() {
        let html = "<html><HEAD><Style type=\"text/css\">\nbody { color: red }\n</STYLE>\
                    <script>\nvar x = '<p>nope</p>';\n</script></HEAD>\
                    <body><h1>Arrêté</h1>\n<p>du 1er&nbsp;janvier</p></body></html>";
        assert_eq!(html_to_text(html), "Arrêté du 1er janvier");
    }

    #[test]
    fn unclosed_script_is_kept() {
        let out = html_to_text("<p>avant</p><script>var a = 1;");
        assert_eq!(out, "avant var a = 1;");
    }

    #[test]
    fn unclosed_style_is_kept() {
        let out = html_to_text("<p>avant</p><style>p { color: red }");
        assert_eq!(out, "avant p { color: red }");
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        assert_eq!(html_to_text("<div><p>texte</div>"), "texte");
        assert_eq!(html_to_text("a < b"), "a < b");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_entities("&#233;t&#xE9; &#8364;"), "été €");
        assert_eq!(decode_entities("&#0;"), "\u{fffd}");
    }

    #[test]
    fn accented_named_entities() {
        assert_eq!(decode_entities("fix&eacute;e &agrave; la somme"), "fixée à la somme");
    }

    #[test]
    fn latin1_and_symbol_entities() {
        assert_eq!(decode_entities("&aelig; &Uuml; &times; &Euml; &ordm;"), "æ Ü × Ë º");
        assert_eq!(decode_entities("&yuml;&nbsp;&iexcl;"), "ÿ\u{a0}¡");
        assert_eq!(decode_entities("&Omega; &sigmaf; &Sigma;"), "Ω ς Σ");
        assert_eq!(decode_entities("&laquo;&thinsp;oui&thinsp;&raquo; &permil; &trade;"), "«\u{2009}oui\u{2009}» ‰ ™");
    }

    #[test]
    fn spacing_entities_collapse_to_spaces() {
        assert_eq!(html_to_text("1&thinsp;500&ensp;|&emsp;x&hairsp;y"), "1 500 | x y");
    }

    #[test]
    fn unknown_entities_left_verbatim() {
        assert_eq!(decode_entities("&bogus; &amp"), "&bogus; &amp");
    }
}

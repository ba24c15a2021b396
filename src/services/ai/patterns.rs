//! Data-driven phrase detection over the cleaned user message.
//!
//! Detection tables are (pattern, canonical ingredient) rows generated from
//! phrasing templates crossed with the ingredient vocabulary, compiled once
//! and evaluated in a fixed order. New phrasings or languages are new rows,
//! not new code.

use std::sync::OnceLock;

use regex::Regex;

/// Canonical ingredient vocabulary. The second column is a regex
/// alternation over English, Hindi-Latin and Devanagari variants; the
/// Devanagari forms are spelled with explicit code points so both the
/// precomposed and the nukta-decomposed spellings match.
const INGREDIENT_VOCAB: &[(&str, &str)] = &[
    (
        "onion",
        r"onions?|pyaz|pyaaz|piyaz|kanda|प्या(?:\x{095B}|ज\x{093C}?)",
    ),
    ("garlic", r"garlic|lehsun|lahsun|lasun|लहसुन"),
];

/// "without X / no X / bina X" phrasings, one row per template x ingredient.
const EXCLUSION_TEMPLATES: &[&str] = &[
    r"(?i)\b(?:without|no|avoid|skip|minus|remove|except)\b[^.!?]*\b(?:{ing})\b",
    r"(?i)\bbina\b[^.!?]*(?:{ing})",
    r"(?i)(?:{ing})[^.!?]*\b(?:nahi|nahin|mat|na)\b",
    r"बिना[^।!?]*(?:{ing})",
    r"(?:{ing})[^।!?]*(?:के बिना|नहीं|मत)",
];

/// "does X contain Y / is there Y in X / kya X mein Y hai" phrasings.
const QUESTION_TEMPLATES: &[&str] = &[
    r"(?i)\b(?:does|do|did)\b[^.!?]*\b(?:contain|have|has|include)\b[^.!?]*\b(?:{ing})\b",
    r"(?i)\bis there\b[^.!?]*\b(?:{ing})\b",
    r"(?i)\b(?:any)\b[^.!?]*\b(?:{ing})\b[^.!?]*\b(?:in)\b",
    r"(?i)\bkya\b[^.!?]*(?:{ing})[^.!?]*\bhai\b",
    r"(?i)\b(?:mein|me)\b[^.!?]*(?:{ing})[^.!?]*\bhai\b",
    r"क्या[^।!?]*(?:{ing})[^।!?]*है",
];

/// Vague references that should be resolved against previously suggested
/// dishes ("yeh", "this", "order this").
const VAGUE_REFERENCE_PATTERNS: &[&str] = &[
    r"(?i)\b(?:yeh|yah|yahi|isko|ise|iska|wahi|woh)\b",
    r"(?i)\border (?:this|that|it|one)\b",
    r"(?i)\b(?:this|that) one\b",
    r"(?i)\b(?:want|take|get|order|price of)\b[^.!?]*\b(?:this|that)\b",
    r"\b(?:यह|ये|यही|इसे|इसको|वही)\b",
];

const EMOJI_SHORTCODE: &str = r":[A-Za-z0-9_+\-]+:";

fn build_table(templates: &[&str]) -> Vec<(Regex, &'static str)> {
    let mut rows = Vec::with_capacity(templates.len() * INGREDIENT_VOCAB.len());
    for template in templates {
        for &(canonical, variants) in INGREDIENT_VOCAB {
            let pattern = template.replace("{ing}", variants);
            rows.push((
                Regex::new(&pattern).expect("invalid ingredient pattern"),
                canonical,
            ));
        }
    }
    rows
}

fn exclusion_table() -> &'static [(Regex, &'static str)] {
    static TABLE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| build_table(EXCLUSION_TEMPLATES))
}

fn question_table() -> &'static [(Regex, &'static str)] {
    static TABLE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| build_table(QUESTION_TEMPLATES))
}

fn vague_reference_table() -> &'static [Regex] {
    static TABLE: OnceLock<Vec<Regex>> = OnceLock::new();
    TABLE.get_or_init(|| {
        VAGUE_REFERENCE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("invalid vague-reference pattern"))
            .collect()
    })
}

/// Strips `:shortcode:` emoji tokens; all pattern matching runs on the
/// cleaned text.
pub fn strip_emoji_shortcodes(message: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(EMOJI_SHORTCODE).expect("invalid shortcode pattern"));
    re.replace_all(message, "").trim().to_string()
}

/// All ingredients the message asks to leave out, canonical, first-match
/// order, deduplicated.
pub fn detect_excluded_ingredients(message: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (re, canonical) in exclusion_table() {
        if re.is_match(message) && !found.iter().any(|f| f == canonical) {
            found.push((*canonical).to_string());
        }
    }
    found
}

/// The ingredient an "is there X in it?"-style question asks about, if any.
pub fn detect_ingredient_question(message: &str) -> Option<String> {
    for (re, canonical) in question_table() {
        if re.is_match(message) {
            return Some((*canonical).to_string());
        }
    }
    None
}

pub fn is_vague_reference(message: &str) -> bool {
    vague_reference_table().iter().any(|re| re.is_match(message))
}

use crate::models::Language;

/// Any Devanagari code point marks the message as Hindi; everything else is
/// treated as English (which covers Hinglish written in Latin script).
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        Language::Hi
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_devanagari_as_hindi() {
        assert_eq!(detect_language("बिना प्याज़ के ऑप्शंस दिखाओ"), Language::Hi);
        assert_eq!(detect_language("2 इडली please"), Language::Hi);
    }

    #[test]
    fn test_latin_script_is_english() {
        assert_eq!(detect_language("I want 2 masala dosa"), Language::En);
        assert_eq!(detect_language("mujhe yeh order karna hai"), Language::En);
        assert_eq!(detect_language(""), Language::En);
    }
}

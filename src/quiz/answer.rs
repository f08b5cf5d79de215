use icu_normalizer::{ComposingNormalizerBorrowed, DecomposingNormalizerBorrowed};

// Breathings (U+0313, U+0314) and iota subscript (U+0345) are distinctive and kept.
const ACCENT_MARKS: [char; 4] = [
    '\u{0301}', // acute
    '\u{0300}', // grave
    '\u{0342}', // circumflex
    '\u{0308}', // diaeresis
];

/// Canonical form used to compare an answer against the paradigm form.
pub fn normalize_answer(text: &str, strict_accents: bool) -> String {
    let decomposed = DecomposingNormalizerBorrowed::new_nfd().normalize(text.trim());
    let folded: String = decomposed
        .chars()
        .filter(|c| strict_accents || !ACCENT_MARKS.contains(c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ς' { 'σ' } else { c })
        .collect();
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(&folded)
        .into_owned()
}

pub fn answers_match(input: &str, expected: &str, strict_accents: bool) -> bool {
    normalize_answer(input, strict_accents) == normalize_answer(expected, strict_accents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_ignored_by_default() {
        assert!(answers_match("λυω", "λύω", false));
        assert!(answers_match("μουσα", "μοῦσα", false));
        assert!(answers_match("  λόγου ", "λογου", false));
    }

    #[test]
    fn test_breathing_is_required() {
        assert!(answers_match("ἀνθρωπος", "ἄνθρωπος", false));
        assert!(!answers_match("ανθρωπος", "ἄνθρωπος", false));
        assert!(!answers_match("ἁνθρωπος", "ἄνθρωπος", false));
    }

    #[test]
    fn test_iota_subscript_is_required() {
        assert!(answers_match("τῃ", "τῇ", false));
        assert!(!answers_match("τη", "τῇ", false));
        assert!(answers_match("μουσῃ", "μούσῃ", false));
    }

    #[test]
    fn test_case_and_final_sigma_folded() {
        assert!(answers_match("Λογος", "λόγος", false));
        assert!(answers_match("λογοσ", "λόγος", false));
    }

    #[test]
    fn test_strict_mode_checks_accents() {
        assert!(!answers_match("λυω", "λύω", true));
        assert!(answers_match("λύω", "λύω", true));
        // oxia and tonos are canonically equivalent
        assert!(answers_match("λ\u{1F7B}ω", "λ\u{03CD}ω", true));
    }

    #[test]
    fn test_normalize_composes_result() {
        assert_eq!(normalize_answer("ΤΗ\u{0345}", false), "\u{03C4}\u{1FC3}");
    }
}

//! Pure string transforms shared by every canonicalizer.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").expect("valid hyphen pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthesized pattern"));

/// Remove combining diacritical marks after NFD decomposition ("ó" → "o").
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Canonical text form used for every lookup.
///
/// Lower-cases, strips diacritics, rewrites any hyphen (with or without
/// surrounding spaces) to `" - "`, collapses whitespace and trims.
/// Idempotent.
pub fn normalize(text: &str) -> String {
    let folded = strip_diacritics(&text.to_lowercase());
    let hyphenated = HYPHEN.replace_all(&folded, " - ");
    WHITESPACE.replace_all(&hyphenated, " ").trim().to_string()
}

/// Drop parenthesized qualifiers such as "(Escanteios)".
pub fn strip_parenthesized(text: &str) -> String {
    let stripped = PARENTHESIZED.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Whitespace-separated words of already-normalized text, skipping pure punctuation.
pub fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("Handicap Asiático - 1º Tempo"), "handicap asiatico - 1º tempo");
        assert_eq!(normalize("CARTÕES"), "cartoes");
    }

    #[test]
    fn canonicalizes_hyphen_separators() {
        assert_eq!(normalize("Total-Partida"), "total - partida");
        assert_eq!(normalize("Total -Partida"), "total - partida");
        assert_eq!(normalize("Total   -   Partida"), "total - partida");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize("  Mais \t de\n 2.5 "), "mais de 2.5");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Handicap Asiático - Mais Opções",
            "-leading hyphen",
            "trailing-",
            "Gols +/- - Mais Alternativas",
            "İstanbul Başakşehir",
            "",
            "   ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn removes_parenthesized_suffixes() {
        assert_eq!(strip_parenthesized("palmeiras (escanteios)"), "palmeiras");
        assert_eq!(strip_parenthesized("a (x) b (y)"), "a b");
    }

    #[test]
    fn words_skip_separators() {
        let collected: Vec<&str> = words("al - hilal fc").collect();
        assert_eq!(collected, vec!["al", "hilal", "fc"]);
    }
}

//! Per-language tables driving normalization, verbalization and segmentation.

mod speller;
mod tables;

pub use speller::{EnglishSpeller, NumberSpeller};

use crate::error::{PipelineError, Result};

/// Sentence-ending punctuation; the primary split points.
pub const HARD_PUNCTUATION: &[char] = &[
    '.', '!', '?', '…', '‽', '。', '！', '？', '؟', '।', '॥', '။', '។',
];

/// Clause-level punctuation; used only when a sentence is too long.
pub const SOFT_PUNCTUATION: &[char] = &[',', ';', ':', '、', '，', '；', '：', '،'];

/// How text in a language is broken into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Words are separated by spaces (Latin, Cyrillic, ...).
    SpaceDelimited,
    Chinese,
    Japanese,
    Korean,
    /// Thai, Lao, Burmese and Khmer: no spaces between words.
    Thai,
}

impl Script {
    /// Whether units must be rebuilt from script-specific tokens.
    pub fn needs_tokenizer(self) -> bool {
        !matches!(self, Script::SpaceDelimited)
    }
}

/// Static description of a supported language.
#[derive(Debug)]
pub struct Language {
    /// ISO 639-3 code, the primary key.
    pub iso3: &'static str,
    /// ISO 639-1 code.
    pub iso1: &'static str,
    pub name: &'static str,
    /// Maximum length of a sentence unit, in characters.
    pub max_chars: usize,
    pub script: Script,
    pub abbreviations: &'static [(&'static str, &'static str)],
    /// Words that introduce a numbered chapter ("chapter", "part", ...).
    pub chapter_words: &'static [&'static str],
    /// Digit and math symbol pronunciations.
    pub math_phonemes: &'static [(&'static str, &'static str)],
    pub special_chars: &'static [(char, &'static str)],
    /// Characters known to make synthesis engines hallucinate.
    pub punctuation_switch: &'static [(char, &'static str)],
    /// Whether years inside dates are read as two-digit groups.
    pub year_words: bool,
    speller: Option<&'static dyn NumberSpeller>,
}

impl Language {
    /// The locale-aware number speller, when one exists for this language.
    pub fn speller(&self) -> Option<&'static dyn NumberSpeller> {
        self.speller
    }

    /// Pronunciation of a digit or math symbol.
    pub fn phoneme(&self, key: &str) -> Option<&'static str> {
        self.math_phonemes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Spell a string character by character with the phoneme map.
    ///
    /// Characters without a pronunciation are kept as they are.
    pub fn spell_digits(&self, text: &str) -> String {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|c| {
                let key: &str = c.encode_utf8(&mut buf);
                self.phoneme(key)
                    .map(str::to_string)
                    .unwrap_or_else(|| c.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Find a language by ISO 639-3 or ISO 639-1 code (case-insensitive).
pub fn lookup(code: &str) -> Result<&'static Language> {
    let code = code.trim().to_lowercase();
    tables::LANGUAGES
        .iter()
        .find(|l| l.iso3 == code || l.iso1 == code)
        .ok_or(PipelineError::UnsupportedLanguage(code))
}

/// All supported languages.
pub fn supported() -> impl Iterator<Item = &'static Language> {
    tables::LANGUAGES.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_either_code() {
        assert_eq!(lookup("eng").unwrap().iso1, "en");
        assert_eq!(lookup("FR").unwrap().iso3, "fra");
        assert_eq!(lookup(" zho ").unwrap().script, Script::Chinese);
    }

    #[test]
    fn test_lookup_unknown_language() {
        let err = lookup("xxx").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedLanguage(code) if code == "xxx"));
    }

    #[test]
    fn test_every_language_spells_all_digits() {
        for lang in supported() {
            for d in '0'..='9' {
                assert!(
                    lang.phoneme(&d.to_string()).is_some(),
                    "{} lacks digit {}",
                    lang.iso3,
                    d
                );
            }
        }
    }

    #[test]
    fn test_spell_digits() {
        let eng = lookup("eng").unwrap();
        assert_eq!(eng.spell_digits("19"), "one nine");
        assert_eq!(eng.spell_digits("3.5"), "three point five");
    }

    #[test]
    fn test_only_english_has_speller() {
        assert!(lookup("eng").unwrap().speller().is_some());
        assert!(lookup("deu").unwrap().speller().is_none());
    }
}

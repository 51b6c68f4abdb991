//! Spoken forms for dates, math symbols, numbers and Roman numerals.

use crate::lang::Language;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

/// Largest value read out as a number; anything above passes through.
const MAX_SPOKEN_NUMBER: u64 = 999_999_999_999_999;

/// Integer digits accepted in one numeric token.
const MAX_INTEGER_DIGITS: usize = 12;

/// Math symbols that also occur in ordinary prose.
const AMBIGUOUS_SYMBOLS: &[&str] = &["-", "/", "*", "x"];

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*\d+)\)").expect("valid list marker regex"));

static AMBIGUOUS_MATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*([-/*x])\s*(\d+)|([-/*x])\s*(\d+)").expect("valid math regex")
});

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:,\d{3})*(?:\.\d+)?").expect("valid number regex"));

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("valid year regex"));

static LINE_START_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([IVXLCDM]+)\.+\s*").expect("valid roman regex"));

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|\
                      november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static ENGLISH_DATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // March 5th, 1987 / Mar. 5 1987
        format!(r"(?i)\b(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b"),
        // 5th of March 1987 / 5 March, 1987
        format!(r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})\.?,?\s+\d{{4}}\b"),
        // March 1987
        format!(r"(?i)\b(?:{MONTHS})\.?,?\s+\d{{4}}\b"),
        // in 1987, since 1066
        r"(?i)\b(?:in|since|until|till|by|during|from|before|after|around|circa|of|year)\s+\d{4}\b"
            .to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid date regex"))
    .collect()
});

/// Finds spans of text that denote a date.
pub trait DateRecognizer: Send + Sync {
    /// Byte ranges of date mentions, in any order; ranges may overlap.
    fn date_spans(&self, text: &str) -> Vec<Range<usize>>;
}

/// Pattern-based recognizer for English dates.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishDateRecognizer;

impl DateRecognizer for EnglishDateRecognizer {
    fn date_spans(&self, text: &str) -> Vec<Range<usize>> {
        ENGLISH_DATES
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| m.range()))
            .collect()
    }
}

fn recognizer_for(language: &Language) -> Option<&'static dyn DateRecognizer> {
    match language.iso3 {
        "eng" if language.year_words => Some(&EnglishDateRecognizer),
        _ => None,
    }
}

/// Replace dates, math symbols and numbers with words, in that order.
pub fn verbalize(text: &str, language: &Language) -> String {
    let text = verbalize_dates(text, language);
    let text = verbalize_math(&text, language);
    verbalize_numbers(&text, language)
}

/// Spoken form of an integer: locale speller when present, digits otherwise.
fn speak_integer(n: u64, language: &Language) -> String {
    match language.speller() {
        Some(speller) => speller.cardinal(n),
        None => language.spell_digits(&n.to_string()),
    }
}

/// Read a year as two groups ("nineteen eighty-seven"), or as one cardinal
/// when the last two digits are below ten.
pub fn year_to_words(year: u64, language: &Language) -> String {
    let (century, rest) = (year / 100, year % 100);
    if rest < 10 {
        speak_integer(year, language)
    } else {
        format!(
            "{} {}",
            speak_integer(century, language),
            speak_integer(rest, language)
        )
    }
}

fn merge_spans(mut spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    spans.sort_by_key(|span| span.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

fn verbalize_dates(text: &str, language: &Language) -> String {
    let Some(recognizer) = recognizer_for(language) else {
        return text.to_string();
    };

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in merge_spans(recognizer.date_spans(text)) {
        result.push_str(&text[cursor..span.start]);
        let date = &text[span.clone()];
        let spoken = YEAR.replace_all(date, |caps: &Captures| match caps[0].parse::<u64>() {
            Ok(year) => year_to_words(year, language),
            Err(_) => caps[0].to_string(),
        });
        result.push_str(&spoken);
        cursor = span.end;
    }
    result.push_str(&text[cursor..]);
    result
}

fn is_isolated(text: &str, range: Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    before.is_none_or(char::is_whitespace) && after.is_none_or(char::is_whitespace)
}

fn verbalize_math(text: &str, language: &Language) -> String {
    let mut text = LIST_MARKER.replace_all(text, "${1} : ").into_owned();

    for (symbol, word) in language.math_phonemes {
        let is_digit_or_separator = symbol.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.');
        if is_digit_or_separator || AMBIGUOUS_SYMBOLS.contains(symbol) {
            continue;
        }
        if text.contains(*symbol) {
            text = text.replace(*symbol, &format!(" {} ", word));
        }
    }

    AMBIGUOUS_MATH
        .replace_all(&text, |caps: &Captures| {
            let Some(whole) = caps.get(0) else {
                return String::new();
            };
            if !is_isolated(&text, whole.range()) {
                return whole.as_str().to_string();
            }
            let (symbol, left, right) = match (caps.get(1), caps.get(3)) {
                (Some(left), Some(right)) => (&caps[2], Some(left.as_str()), right.as_str()),
                _ => (&caps[4], None, &caps[5]),
            };
            let Some(word) = language.phoneme(symbol) else {
                return whole.as_str().to_string();
            };
            match left {
                Some(left) => format!("{} {} {}", left, word, right),
                None => format!("{} {}", word, right),
            }
        })
        .into_owned()
}

/// Spoken form of one numeric token, or `None` when it is left as written.
fn speak_number(token: &str, language: &Language) -> Option<String> {
    let token: String = token.nfkc().filter(|c| *c != ',').collect();
    if !token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let (integer, fraction) = match token.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (token.as_str(), None),
    };
    if integer.len() > MAX_INTEGER_DIGITS {
        return None;
    }
    let value: u64 = integer.parse().ok()?;
    if value > MAX_SPOKEN_NUMBER {
        return None;
    }

    Some(match (language.speller(), fraction) {
        (Some(speller), Some(fraction)) => speller.decimal(value, fraction),
        (Some(speller), None) => speller.cardinal(value),
        (None, _) => language.spell_digits(&token),
    })
}

fn verbalize_numbers(text: &str, language: &Language) -> String {
    NUMBER
        .replace_all(text, |caps: &Captures| {
            let Some(m) = caps.get(0) else {
                return String::new();
            };
            let Some(spoken) = speak_number(m.as_str(), language) else {
                return m.as_str().to_string();
            };
            let pad_before = text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
            let pad_after = text[m.end()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
            format!(
                "{}{}{}",
                if pad_before { " " } else { "" },
                spoken,
                if pad_after { " " } else { "" }
            )
        })
        .into_owned()
}

const ROMAN_VALUES: &[(&str, u32)] = &[
    ("M", 1000),
    ("CM", 900),
    ("D", 500),
    ("CD", 400),
    ("C", 100),
    ("XC", 90),
    ("L", 50),
    ("XL", 40),
    ("X", 10),
    ("IX", 9),
    ("V", 5),
    ("IV", 4),
    ("I", 1),
];

fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for (numeral, value) in ROMAN_VALUES {
        while n >= *value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Value of a canonical upper-case Roman numeral.
pub fn parse_roman(numeral: &str) -> Option<u32> {
    if numeral.is_empty() {
        return None;
    }
    let mut total = 0u32;
    let mut rest = numeral;
    for (symbol, value) in ROMAN_VALUES {
        while let Some(tail) = rest.strip_prefix(*symbol) {
            total += value;
            rest = tail;
        }
    }
    (rest.is_empty() && to_roman(total) == numeral).then_some(total)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Turn Roman chapter numbers into digits.
///
/// "Chapter IV. The trial" becomes "Chapter 4; The trial", and a line opening
/// with "XII." becomes "12. ".
pub fn convert_roman_numerals(text: &str, language: &Language) -> String {
    let mut text = LINE_START_ROMAN
        .replace_all(text, |caps: &Captures| match parse_roman(&caps[1]) {
            Some(n) => format!("{}. ", n),
            None => caps[0].to_string(),
        })
        .into_owned();

    if language.chapter_words.is_empty() {
        return text;
    }
    let words = language
        .chapter_words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"\b(?i:({}))\s+((?i:[IVXLCDM]+))\b\.?\s*", words);
    match Regex::new(&pattern) {
        Ok(re) => {
            text = re
                .replace_all(&text, |caps: &Captures| {
                    match parse_roman(&caps[2].to_ascii_uppercase()) {
                        Some(n) => format!("{} {}; ", capitalize(&caps[1]), n),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned();
        }
        Err(e) => log::warn!("Chapter word pattern for {} is invalid: {}", language.iso3, e),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;

    #[test]
    fn test_roman_chapter_heading() {
        let eng = lookup("eng").unwrap();
        assert_eq!(
            convert_roman_numerals("Chapter IV. The trial", eng),
            "Chapter 4; The trial"
        );
        assert_eq!(convert_roman_numerals("PART XII", eng), "Part 12; ");
        assert_eq!(convert_roman_numerals("chapter iv", eng), "Chapter 4; ");
        assert_eq!(convert_roman_numerals("Book xii. Home", eng), "Book 12; Home");
        // Not a valid numeral.
        assert_eq!(convert_roman_numerals("part did", eng), "part did");
    }

    #[test]
    fn test_roman_line_start() {
        let eng = lookup("eng").unwrap();
        assert_eq!(convert_roman_numerals("XII. Return", eng), "12. Return");
        assert_eq!(convert_roman_numerals("IIII. Bad", eng), "IIII. Bad");
    }

    #[test]
    fn test_parse_roman() {
        assert_eq!(parse_roman("IV"), Some(4));
        assert_eq!(parse_roman("MCMXCIV"), Some(1994));
        assert_eq!(parse_roman("IC"), None);
        assert_eq!(parse_roman(""), None);
    }

    #[test]
    fn test_year_in_date_span() {
        let eng = lookup("eng").unwrap();
        assert_eq!(
            verbalize("In 1987, it happened", eng),
            "In nineteen eighty-seven, it happened"
        );
        assert_eq!(
            verbalize("Born March 5, 1822.", eng),
            "Born March five, eighteen twenty-two."
        );
    }

    #[test]
    fn test_year_with_small_tail_is_one_number() {
        let eng = lookup("eng").unwrap();
        assert_eq!(year_to_words(2005, eng), "two thousand and five");
        assert_eq!(year_to_words(1066, eng), "ten sixty-six");
    }

    #[test]
    fn test_year_without_speller_uses_phonemes() {
        let deu = lookup("deu").unwrap();
        assert_eq!(year_to_words(1987, deu), "eins neun acht sieben");
    }

    #[test]
    fn test_ambiguous_math_between_digits() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("3 x 4", eng), "three times four");
        assert_eq!(verbalize("a box of 4", eng), "a box of four");
        assert_eq!(verbalize("well-known path/to", eng), "well-known path/to");
        assert_eq!(verbalize("10/2", eng), "ten divided by two");
    }

    #[test]
    fn test_unambiguous_symbols_everywhere() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("2+2=4", eng), "two plus two equals four");
        assert_eq!(verbalize("50%", eng), "fifty percent ");
    }

    #[test]
    fn test_list_marker() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("1) First", eng), "one : First");
    }

    #[test]
    fn test_numbers() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("1,234 items", eng), "one thousand two hundred and thirty-four items");
        assert_eq!(verbalize("pi is 3.14", eng), "pi is three point one four");
        assert_eq!(verbalize("room 7b", eng), "room seven b");
    }

    #[test]
    fn test_numbers_without_speller() {
        let fra = lookup("fra").unwrap();
        assert_eq!(verbalize("j'ai 42 ans", fra), "j'ai quatre deux ans");
    }

    #[test]
    fn test_overlong_numbers_pass_through() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("id 1234567890123", eng), "id 1234567890123");
    }

    #[test]
    fn test_fullwidth_digits() {
        let eng = lookup("eng").unwrap();
        assert_eq!(verbalize("\u{ff11}\u{ff12}", eng), "twelve");
    }
}

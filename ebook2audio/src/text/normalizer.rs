//! Language-aware text cleanup ahead of segmentation.

use crate::lang::{HARD_PUNCTUATION, Language, SOFT_PUNCTUATION};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::PAUSE_SENTINEL;

static ACRONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z](?:\.[A-Za-z])+\.?").expect("valid acronym regex"));

static PAUSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)###|\[pause\]").expect("valid pause marker regex"));

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static OK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bok\b").expect("valid ok regex"));

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]*)\)").expect("valid parenthesis regex"));

static HARD_RUN: Lazy<Regex> = Lazy::new(|| punctuation_run(HARD_PUNCTUATION));

static SOFT_RUN: Lazy<Regex> = Lazy::new(|| punctuation_run(SOFT_PUNCTUATION));

static LETTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})(\d)").expect("valid letter-digit regex"));

static DIGIT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)(\p{L})").expect("valid digit-letter regex"));

static LEADING_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+|[IVXLCDM]+)").expect("valid leading numeral regex"));

/// Separator inserted after a leading chapter number.
const NUMERAL_SEPARATOR: &str = "—";

fn punctuation_run(chars: &[char]) -> Regex {
    let class: String = chars.iter().map(|c| regex::escape(&c.to_string())).collect();
    Regex::new(&format!(r"(?:\s*([{}]))+\s*", class)).expect("valid punctuation run regex")
}

/// Normalize raw chapter text for synthesis.
///
/// Steps run in a fixed order; the output of one feeds the next:
/// - strip emoji
/// - expand abbreviations and collapse dotted acronyms
/// - turn explicit markers and paragraph breaks into the pause sentinel
/// - replace characters that trip synthesis engines, collapse whitespace
/// - quote parenthesized spans, tidy punctuation runs and letter/digit boundaries
/// - spell special characters and separate a leading chapter number
///
/// Normalizing already-normalized text returns it unchanged.
pub fn normalize(text: &str, language: &Language) -> String {
    let text = strip_emoji(text);
    let text = expand_abbreviations(&text, language);
    let text = collapse_acronyms(&text);
    let text = PAUSE_MARKER.replace_all(&text, padded_sentinel().as_str()).into_owned();
    let text = convert_newlines(&text);
    let text = switch_punctuation(&text, language);
    let text = collapse_whitespace(&text.replace('\u{00a0}', " "));
    let text = OK_TOKEN.replace_all(&text, "Okay").into_owned();
    let text = quote_parentheses(&text);
    let text = collapse_punctuation_run(&HARD_RUN, &text);
    let text = collapse_punctuation_run(&SOFT_RUN, &text);
    let text = LETTER_DIGIT.replace_all(&text, "${1} ${2}");
    let text = DIGIT_LETTER.replace_all(&text, "${1} ${2}").into_owned();
    // Spacing fixes above can free an abbreviation glued to the next word.
    let text = expand_abbreviations(&text, language);
    let text = collapse_whitespace(&spell_special_chars(&text, language));
    separate_leading_numeral(text.trim()).trim().to_string()
}

fn padded_sentinel() -> String {
    format!(" {} ", PAUSE_SENTINEL)
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF
        | 0x2600..=0x27BF
        | 0x2B00..=0x2BFF
        | 0xFE0F
        | 0x200D
        | 0xE0020..=0xE007F)
}

fn strip_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

fn expand_abbreviations(text: &str, language: &Language) -> String {
    if language.abbreviations.is_empty() {
        return text.to_string();
    }

    let mut abbreviations: Vec<&(&str, &str)> = language.abbreviations.iter().collect();
    abbreviations.sort_by_key(|(abbr, _)| std::cmp::Reverse(abbr.chars().count()));

    let alternation = abbreviations
        .iter()
        .map(|(abbr, _)| regex::escape(abbr))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(re) = Regex::new(&format!("(?i)(?:{})", alternation)) else {
        log::warn!("Abbreviation table for {} does not compile", language.iso3);
        return text.to_string();
    };

    re.replace_all(text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        let standalone = !text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
            && !text[m.end()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        let found = m.as_str().to_lowercase();
        match abbreviations.iter().find(|(abbr, _)| abbr.to_lowercase() == found) {
            Some((_, expansion)) if standalone => (*expansion).to_string(),
            _ => m.as_str().to_string(),
        }
    })
    .into_owned()
}

/// Turn every balanced pair of parentheses into double quotes, innermost first.
fn quote_parentheses(text: &str) -> String {
    let mut text = text.to_string();
    while PARENTHESIZED.is_match(&text) {
        text = PARENTHESIZED.replace_all(&text, "\"${1}\"").into_owned();
    }
    text
}

fn collapse_acronyms(text: &str) -> String {
    ACRONYM
        .replace_all(text, |caps: &Captures| caps[0].replace('.', "").to_uppercase())
        .into_owned()
}

fn convert_newlines(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    PARAGRAPH_BREAK
        .replace_all(&text, padded_sentinel().as_str())
        .replace('\n', " ")
}

fn switch_punctuation(text: &str, language: &Language) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match language.punctuation_switch.iter().find(|(ch, _)| *ch == c) {
            Some((_, replacement)) => result.push_str(replacement),
            None => result.push(c),
        }
    }
    result
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

fn is_boundary_punctuation(c: char) -> bool {
    HARD_PUNCTUATION.contains(&c) || SOFT_PUNCTUATION.contains(&c)
}

/// Reduce a punctuation run to its last mark; a single space follows unless
/// more punctuation or the end of the text comes next.
fn collapse_punctuation_run(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &Captures| {
        let end = caps.get(0).map_or(text.len(), |m| m.end());
        let mark = &caps[1];
        match text[end..].chars().next() {
            Some(next) if !is_boundary_punctuation(next) => format!("{} ", mark),
            _ => mark.to_string(),
        }
    })
    .into_owned()
}

fn spell_special_chars(text: &str, language: &Language) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match language.special_chars.iter().find(|(ch, _)| *ch == c) {
            Some((_, word)) => {
                result.push(' ');
                result.push_str(word);
                result.push(' ');
            }
            None => result.push(c),
        }
    }
    result
}

/// Insert a separator after a chapter number that opens the text.
fn separate_leading_numeral(text: &str) -> String {
    let Some(m) = LEADING_NUMERAL.find(text) else {
        return text.to_string();
    };
    let numeral = m.as_str();
    let rest = &text[m.end()..];
    if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return text.to_string();
    }

    let is_roman = !numeral.starts_with(|c: char| c.is_ascii_digit());
    if is_roman && super::verbalizer::parse_roman(numeral).is_none() {
        return text.to_string();
    }

    let after = rest.trim_start();
    // A lone "I" is the pronoun unless nothing else follows on the line.
    if numeral == "I" && !(after.is_empty() || after.starts_with(PAUSE_SENTINEL)) {
        return text.to_string();
    }
    if after
        .chars()
        .next()
        .is_some_and(|c| is_boundary_punctuation(c) || c == '—' || c == '-')
    {
        return text.to_string();
    }

    if after.is_empty() {
        format!("{} {}", numeral, NUMERAL_SEPARATOR)
    } else {
        format!("{} {} {}", numeral, NUMERAL_SEPARATOR, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;
    use proptest::prelude::*;

    fn eng(text: &str) -> String {
        normalize(text, lookup("eng").unwrap())
    }

    #[test]
    fn test_strips_emoji() {
        assert_eq!(eng("Great job 👍🏽 team"), "Great job team");
    }

    #[test]
    fn test_expands_abbreviations() {
        assert_eq!(eng("mr. Smith met Dr. Jones"), "Mister Smith met Doctor Jones");
        // Not inside a word.
        assert_eq!(eng("Amr. went"), "Amr. went");
    }

    #[test]
    fn test_collapses_acronyms() {
        assert_eq!(eng("the F.D.A. said"), "the FDA said");
        assert_eq!(eng("made in the u.s. today"), "made in the US today");
    }

    #[test]
    fn test_pause_markers() {
        let out = eng("One.\n\nTwo. ### Three [pause] four");
        assert_eq!(out.matches(PAUSE_SENTINEL).count(), 3);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_single_newline_becomes_space() {
        assert_eq!(eng("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_switches_punctuation() {
        assert_eq!(eng("\u{201c}Hi,\u{201d} she said"), "\"Hi, \" she said");
        assert_eq!(eng("a\u{200b}b"), "ab");
        // The em dash is kept.
        assert_eq!(eng("yes — no"), "yes — no");
    }

    #[test]
    fn test_whitespace_and_nbsp() {
        assert_eq!(eng("a\u{00a0}\u{00a0}b   c\t d"), "a b c d");
    }

    #[test]
    fn test_ok_becomes_okay() {
        assert_eq!(eng("It is OK now"), "It is Okay now");
        assert_eq!(eng("token stays"), "token stays");
    }

    #[test]
    fn test_parentheses_become_quotes() {
        assert_eq!(eng("a (quiet) word"), "a \"quiet\" word");
    }

    #[test]
    fn test_nested_parentheses_become_quotes() {
        assert_eq!(eng("((a))"), "\"\"a\"\"");
        assert_eq!(eng("a (b (c) d) e"), "a \"b \"c\" d\" e");
        // Unbalanced marks are left alone.
        assert_eq!(eng("a ( b"), "a ( b");
    }

    #[test]
    fn test_glued_abbreviation() {
        assert_eq!(eng("Mr.Smith"), "Mister Smith");
        assert_eq!(eng("ask Dr.Who now"), "ask Doctor Who now");
    }

    #[test]
    fn test_punctuation_runs() {
        assert_eq!(eng("Wait... what?!"), "Wait. what!");
        assert_eq!(eng("one ,, two"), "one, two");
        assert_eq!(eng("end.,"), "end.,");
    }

    #[test]
    fn test_letter_digit_boundaries() {
        assert_eq!(eng("abc123def"), "abc 123 def");
    }

    #[test]
    fn test_special_chars() {
        assert_eq!(eng("Tom & Jerry"), "Tom and Jerry");
        assert_eq!(eng("me@home"), "me at home");
    }

    #[test]
    fn test_leading_numeral_separator() {
        assert_eq!(eng("IV The trial"), "IV — The trial");
        assert_eq!(eng("12 Rules"), "12 — Rules");
        assert_eq!(eng("IV. The trial"), "IV. The trial");
        assert_eq!(eng("I went home"), "I went home");
        assert_eq!(eng("IVAN said"), "IVAN said");
    }

    #[test]
    fn test_normalize_is_idempotent_on_examples() {
        for text in [
            "IV The trial",
            "Wait... what?!",
            "\u{201c}Hi,\u{201d} she said (quietly).\n\nNext mr. Smith.",
            "hello ,. world",
            "I",
            "((a))",
            "a (b (c) d) e",
            "Mr.Smith",
        ] {
            let once = eng(text);
            assert_eq!(eng(&once), once, "input: {:?}", text);
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(words in prop::collection::vec(
            prop::sample::select(vec![
                "hello", "world", "ok", "Mr.", "F.D.A.", ",", ".", "!", "?", ";",
                "\n", "\n\n", "###", "(aside)", "((", ")", "Mr.Smith", "Dr.Who",
                "42", "x9", "IV", "I", "&", "—",
                "\u{201c}", "\u{2019}", "\u{00a0}", "🎉", "…", "。", "你好",
            ]),
            0..40,
        )) {
            let text = words.join(" ");
            let once = eng(&text);
            prop_assert_eq!(eng(&once), once);
        }
    }
}

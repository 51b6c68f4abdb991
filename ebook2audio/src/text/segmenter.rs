//! Splitting normalized text into bounded-length speakable units.

use super::tokenizer::tokenize;
use super::{PAUSE_SENTINEL, SpeakableUnit};
use crate::lang::{HARD_PUNCTUATION, Language, SOFT_PUNCTUATION};
use crate::tts::TtsEngine;

/// Soft-split fragments are merged until they hold at least this many words.
const MIN_SOFT_TOKENS: usize = 5;

/// Split normalized text into speakable units.
///
/// Pauses come from the pause sentinel. Sentences end at hard punctuation
/// followed by whitespace or the end of the text; sentences longer than the
/// language limit are split again at soft punctuation and then packed by
/// words. Languages written without spaces are packed by script tokens
/// across sentence boundaries, flushing only when a unit is full or at a pause.
/// Every sentence in the output is non-empty and at most
/// `language.max_chars` characters long.
pub fn segment(text: &str, language: &Language, engine: TtsEngine) -> Vec<SpeakableUnit> {
    let text = if engine.mishandles_double_quotes() {
        text.replace('"', "")
    } else {
        text.to_string()
    };
    let max = language.max_chars.max(1);

    let mut units = Vec::new();
    for (i, span) in text.split(PAUSE_SENTINEL).enumerate() {
        if i > 0 {
            push_pause(&mut units);
        }
        let span = span.trim();
        if span.is_empty() {
            continue;
        }

        // Scripts without word spaces are packed across sentences up to the next pause.
        let mut span_tokens: Vec<String> = Vec::new();
        let mut packed = Vec::new();
        for sentence in split_after(span, HARD_PUNCTUATION) {
            let pieces = if char_len(&sentence) > max {
                soft_split(&sentence)
            } else {
                vec![sentence]
            };
            for piece in pieces {
                if language.script.needs_tokenizer() {
                    if !span_tokens.is_empty() {
                        span_tokens.push(" ".to_string());
                    }
                    span_tokens.extend(tokenize(&piece, language.script));
                } else if char_len(&piece) > max {
                    packed.extend(pack_words(&piece, max));
                } else {
                    packed.push(piece);
                }
            }
        }
        if !span_tokens.is_empty() {
            packed.extend(pack_tokens(&span_tokens, max));
        }
        units.extend(
            packed
                .into_iter()
                .filter(|unit| is_speakable(unit))
                .map(SpeakableUnit::Sentence),
        );
    }

    collapse_pauses(units)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_speakable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

fn push_pause(units: &mut Vec<SpeakableUnit>) {
    if !matches!(units.last(), Some(SpeakableUnit::Pause)) {
        units.push(SpeakableUnit::Pause);
    }
}

fn collapse_pauses(units: Vec<SpeakableUnit>) -> Vec<SpeakableUnit> {
    let mut out = Vec::with_capacity(units.len());
    for unit in units {
        match unit {
            SpeakableUnit::Pause => push_pause(&mut out),
            sentence => out.push(sentence),
        }
    }
    out
}

/// Cut after each mark in `marks` that is followed by whitespace or the end.
///
/// Marks glued to the next character ("3.5", "e.g.x") are not split points.
fn split_after(text: &str, marks: &[char]) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !marks.contains(&c) {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            let part = text[start..end].trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }
    parts
}

/// Split a long sentence at soft punctuation, merging small fragments.
fn soft_split(sentence: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buffer = String::new();

    for fragment in split_after(sentence, SOFT_PUNCTUATION) {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&fragment);
        if buffer.split_whitespace().count() >= MIN_SOFT_TOKENS {
            out.push(std::mem::take(&mut buffer));
        }
    }

    if !buffer.is_empty() {
        out.push(buffer);
    }
    out
}

/// Greedily pack words into chunks of at most `max` characters.
fn pack_words(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = char_len(word);
        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(hard_split(word, max));
        } else if current.is_empty() {
            current = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= max {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Join script tokens into chunks of at most `max` characters.
fn pack_tokens(tokens: &[String], max: usize) -> Vec<String> {
    fn flush(chunks: &mut Vec<String>, current: &mut String) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        current.clear();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for token in tokens {
        let token_len = char_len(token);
        if token_len > max {
            flush(&mut chunks, &mut current);
            current_len = 0;
            chunks.extend(
                hard_split(token, max)
                    .into_iter()
                    .map(|piece| piece.trim().to_string())
                    .filter(|piece| !piece.is_empty()),
            );
            continue;
        }
        if current_len + token_len > max {
            flush(&mut chunks, &mut current);
            current_len = 0;
        }
        current.push_str(token);
        current_len += token_len;
    }

    flush(&mut chunks, &mut current);
    chunks
}

/// Hard split text at exact character positions (last resort).
fn hard_split(text: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_length.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;
    use proptest::prelude::*;

    fn sentences(units: &[SpeakableUnit]) -> Vec<&str> {
        units
            .iter()
            .filter_map(|u| match u {
                SpeakableUnit::Sentence(s) => Some(s.as_str()),
                SpeakableUnit::Pause => None,
            })
            .collect()
    }

    #[test]
    fn test_splits_on_hard_punctuation() {
        let units = segment("Hello world. How are you? Fine", lookup("eng").unwrap(), TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["Hello world.", "How are you?", "Fine"]);
    }

    #[test]
    fn test_no_split_without_following_space() {
        let units = segment("Version 3.5 is out.", lookup("eng").unwrap(), TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["Version 3.5 is out."]);
    }

    #[test]
    fn test_pause_sentinel_becomes_unit() {
        let text = format!("One. {} {} Two.", PAUSE_SENTINEL, PAUSE_SENTINEL);
        let units = segment(&text, lookup("eng").unwrap(), TtsEngine::Xtts);
        assert_eq!(
            units,
            vec![
                SpeakableUnit::Sentence("One.".into()),
                SpeakableUnit::Pause,
                SpeakableUnit::Sentence("Two.".into()),
            ]
        );
    }

    #[test]
    fn test_drops_unspeakable_fragments() {
        let units = segment("Hi. ... !", lookup("eng").unwrap(), TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["Hi."]);
    }

    #[test]
    fn test_strips_double_quotes_for_tacotron() {
        let eng = lookup("eng").unwrap();
        let units = segment("\"Hello\" she said.", eng, TtsEngine::Tacotron2);
        assert_eq!(sentences(&units), vec!["Hello she said."]);
        let units = segment("\"Hello\" she said.", eng, TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["\"Hello\" she said."]);
    }

    #[test]
    fn test_soft_split_merges_small_fragments() {
        let parts = soft_split("a, b, c d e f, g h i j k, l");
        assert_eq!(parts, vec!["a, b, c d e f,", "g h i j k,", "l"]);
    }

    #[test]
    fn test_long_sentence_respects_limit() {
        let eng = lookup("eng").unwrap();
        let text = "word ".repeat(200);
        let units = segment(&text, eng, TtsEngine::Xtts);
        assert!(units.len() > 1);
        for s in sentences(&units) {
            assert!(s.chars().count() <= eng.max_chars);
        }
    }

    #[test]
    fn test_overlong_word_is_hard_split() {
        let parts = pack_words("tiny abcdefghij end", 4);
        assert_eq!(parts, vec!["tiny", "abcd", "efgh", "ij", "end"]);
    }

    #[test]
    fn test_hard_split() {
        assert_eq!(hard_split("abcdefghij", 3), vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_chinese_packing() {
        let zho = lookup("zho").unwrap();
        let text = "我".repeat(zho.max_chars * 2 + 5);
        let units = segment(&text, zho, TtsEngine::Xtts);
        let parts = sentences(&units);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= zho.max_chars));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_chinese_short_sentences_share_a_unit() {
        let zho = lookup("zho").unwrap();
        let units = segment("你好。 我很好。 谢谢。", zho, TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["你好。 我很好。 谢谢。"]);

        // A pause still flushes.
        let text = format!("你好。 {} 谢谢。", PAUSE_SENTINEL);
        let units = segment(&text, zho, TtsEngine::Xtts);
        assert_eq!(
            units,
            vec![
                SpeakableUnit::Sentence("你好。".into()),
                SpeakableUnit::Pause,
                SpeakableUnit::Sentence("谢谢。".into()),
            ]
        );
    }

    #[test]
    fn test_trailing_text_is_kept() {
        let units = segment("First. trailing words", lookup("eng").unwrap(), TtsEngine::Xtts);
        assert_eq!(sentences(&units), vec!["First.", "trailing words"]);
    }

    proptest! {
        #[test]
        fn prop_units_fit_language_limit(
            text in "[a-zA-Z0-9 ,.;!?我是한국어กิน\u{2021}]{0,600}",
            code in prop::sample::select(vec!["eng", "fra", "zho", "jpn", "kor", "tha"]),
        ) {
            let language = lookup(code).unwrap();
            for unit in segment(&text, language, TtsEngine::Xtts) {
                if let SpeakableUnit::Sentence(s) = unit {
                    prop_assert!(!s.trim().is_empty());
                    prop_assert!(s.chars().count() <= language.max_chars);
                }
            }
        }
    }
}

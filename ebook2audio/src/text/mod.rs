//! Text processing for TTS: linearizing markup, normalizing, verbalizing and
//! splitting chapters into speakable units.

pub mod linearizer;
pub mod normalizer;
pub mod segmenter;
mod tokenizer;
pub mod verbalizer;

use crate::lang::Language;
use crate::tts::TtsEngine;

/// Internal marker for a fixed-length silence.
pub const PAUSE_SENTINEL: &str = "‡pause‡";

/// Characters blanked before normalization; they carry no speech.
const BLANKED_CHARS: &[char] = &['*', '_', '~', '|', '\\', '{', '}', '`'];

/// One item of a chapter's reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakableUnit {
    Pause,
    /// Normalized, non-empty text within the language's length limit.
    Sentence(String),
}

impl SpeakableUnit {
    pub fn is_sentence(&self) -> bool {
        matches!(self, SpeakableUnit::Sentence(_))
    }
}

/// A chapter ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub units: Vec<SpeakableUnit>,
}

impl Chapter {
    pub fn new(units: Vec<SpeakableUnit>) -> Self {
        Self { units }
    }

    /// Number of units that produce an audio file.
    pub fn sentence_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_sentence()).count()
    }

    /// The chapter's first sentence, used as its title in audiobook metadata.
    pub fn title(&self) -> Option<&str> {
        self.units.iter().find_map(|u| match u {
            SpeakableUnit::Sentence(s) => Some(s.as_str()),
            SpeakableUnit::Pause => None,
        })
    }
}

/// Turn one body document into a chapter.
///
/// Returns `None` for documents that are excluded or have nothing to say.
pub fn build_chapter(html: &str, language: &Language, engine: TtsEngine) -> Option<Chapter> {
    let text = linearizer::linearize(html, language)?;
    let text = verbalizer::verbalize(&text, language);
    let text: String = text
        .chars()
        .map(|c| if BLANKED_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    let text = normalizer::normalize(&text, language);
    let chapter = Chapter::new(segmenter::segment(&text, language, engine));
    (chapter.sentence_count() > 0).then_some(chapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;

    #[test]
    fn test_chapter_counts_and_title() {
        let chapter = Chapter::new(vec![
            SpeakableUnit::Pause,
            SpeakableUnit::Sentence("Chapter one.".into()),
            SpeakableUnit::Pause,
            SpeakableUnit::Sentence("It was dark.".into()),
        ]);
        assert_eq!(chapter.sentence_count(), 2);
        assert_eq!(chapter.title(), Some("Chapter one."));
    }

    #[test]
    fn test_build_chapter_end_to_end() {
        let html = "<html><body>\
            <h1>Chapter IV</h1>\
            <p>In 1987, *Mr.* Smith bought 3 apples.</p>\
            </body></html>";
        let chapter = build_chapter(html, lookup("eng").unwrap(), TtsEngine::Xtts).unwrap();
        assert_eq!(
            chapter.units,
            vec![
                SpeakableUnit::Sentence("Chapter four;".into()),
                SpeakableUnit::Pause,
                SpeakableUnit::Sentence(
                    "In nineteen eighty-seven, Mister Smith bought three apples.".into()
                ),
                SpeakableUnit::Pause,
            ]
        );
    }

    #[test]
    fn test_build_chapter_skips_excluded_documents() {
        let html = r#"<html><body epub:type="toc"><p>Contents</p></body></html>"#;
        assert!(build_chapter(html, lookup("eng").unwrap(), TtsEngine::Xtts).is_none());
    }
}

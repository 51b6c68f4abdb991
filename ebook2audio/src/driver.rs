//! Chapter audio driver: synthesizes every sentence in reading order, resuming
//! from the files a previous run left behind, and combines finished chapters.

use crate::audio::assembler::numbered_files;
use crate::audio::{AudioTools, CHAPTER_EXTENSION, SENTENCE_EXTENSION, assemble_audiobook, combine_chapter};
use crate::error::{PipelineError, Result, RunOutcome};
use crate::session::{ConversionSession, SessionDirs, temp_sibling};
use crate::text::SpeakableUnit;
use crate::tts::{SynthesisRequest, Synthesizer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Progress after one unit, pauses included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Units handled so far, 1-based
    pub position: usize,
    pub total: usize,
    /// 1-based chapter of the unit
    pub chapter: usize,
}

impl ProgressUpdate {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.position as f64 * 100.0 / self.total as f64
        }
    }
}

/// What a previous run left on disk.
///
/// The resume point of each level is the highest numbered artifact; numbers
/// below it without a file are missing and get regenerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeState {
    pub last_sentence: Option<usize>,
    pub missing_sentences: BTreeSet<usize>,
    pub last_chapter: Option<usize>,
    pub missing_chapters: BTreeSet<usize>,
}

impl ResumeState {
    pub fn has_sentence(&self, index: usize) -> bool {
        self.last_sentence.is_some_and(|last| index <= last)
            && !self.missing_sentences.contains(&index)
    }

    pub fn has_chapter(&self, chapter: usize) -> bool {
        self.last_chapter.is_some_and(|last| chapter <= last)
            && !self.missing_chapters.contains(&chapter)
    }
}

/// Counters of a finished synthesis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub synthesized: usize,
    pub reused: usize,
    pub chapters_combined: usize,
}

/// Scan the working directories and drop half-written files.
pub fn discover_resume_state(dirs: &SessionDirs) -> Result<ResumeState> {
    remove_stale_temp_files(&dirs.sentences)?;
    remove_stale_temp_files(&dirs.chapters)?;

    let sentences: BTreeSet<usize> = numbered_files(&dirs.sentences, "", SENTENCE_EXTENSION)?
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    let chapters: BTreeSet<usize> =
        numbered_files(&dirs.chapters, "chapter_", CHAPTER_EXTENSION)?
            .into_iter()
            .map(|(n, _)| n)
            .collect();

    let last_sentence = sentences.last().copied();
    let last_chapter = chapters.last().copied();
    let state = ResumeState {
        last_sentence,
        missing_sentences: gaps(&sentences, 0, last_sentence),
        last_chapter,
        missing_chapters: gaps(&chapters, 1, last_chapter),
    };
    if let Some(last) = last_sentence {
        log::info!(
            "Resuming after sentence {} ({} missing below it)",
            last,
            state.missing_sentences.len()
        );
    }
    Ok(state)
}

fn gaps(present: &BTreeSet<usize>, first: usize, last: Option<usize>) -> BTreeSet<usize> {
    match last {
        Some(last) => (first..last).filter(|n| !present.contains(n)).collect(),
        None => BTreeSet::new(),
    }
}

fn remove_stale_temp_files(dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(".tmp."));
        if is_temp && path.is_file() {
            log::debug!("Removing stale {}", path.display());
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// One sentence with its global index and trailing silence.
#[derive(Debug, Clone, PartialEq)]
struct PlannedSentence<'a> {
    index: usize,
    text: &'a str,
    silence_after: Option<Duration>,
}

/// Assign global sentence indices and turn pauses into trailing silence.
///
/// A pause extends the sentence before it; a pause with no sentence before it
/// in the same chapter has nothing to extend and is dropped.
fn plan_sentences(session: &ConversionSession) -> Vec<Vec<PlannedSentence<'_>>> {
    let mut next_index = 0;
    session
        .chapters
        .iter()
        .map(|chapter| {
            let mut planned: Vec<PlannedSentence<'_>> = Vec::new();
            for unit in &chapter.units {
                match unit {
                    SpeakableUnit::Sentence(text) => {
                        planned.push(PlannedSentence {
                            index: next_index,
                            text,
                            silence_after: None,
                        });
                        next_index += 1;
                    }
                    SpeakableUnit::Pause => {
                        if let Some(last) = planned.last_mut() {
                            last.silence_after = Some(session.pause);
                        }
                    }
                }
            }
            planned
        })
        .collect()
}

async fn synthesize_sentence(
    session: &ConversionSession,
    synthesizer: &dyn Synthesizer,
    sentence: &PlannedSentence<'_>,
    chapter: usize,
) -> Result<()> {
    let output = session.dirs.sentence_file(sentence.index);
    let temp_output = temp_sibling(&output);
    let request = SynthesisRequest {
        index: sentence.index,
        chapter,
        text: sentence.text,
        language: session.language,
        engine: session.engine,
        silence_after: sentence.silence_after,
    };

    if let Err(reason) = synthesizer
        .synthesize_with_retry(&request, &temp_output, session.synth_attempts)
        .await
    {
        let _ = std::fs::remove_file(&temp_output);
        return Err(PipelineError::Synthesis {
            index: sentence.index,
            chapter,
            reason,
        });
    }
    std::fs::rename(&temp_output, &output)?;
    log::debug!("Sentence {} saved to {}", sentence.index, output.display());
    Ok(())
}

/// Synthesize every missing sentence and combine every chapter that changed.
///
/// Sentences are synthesized one at a time in reading order. A chapter is
/// combined when any of its sentences was synthesized in this run or its
/// chapter file is absent. Cancellation is checked before each unit and before
/// each chapter combination.
pub async fn convert_chapters(
    session: &ConversionSession,
    synthesizer: &dyn Synthesizer,
    tools: &Arc<dyn AudioTools>,
    progress: &mut dyn FnMut(ProgressUpdate),
) -> Result<RunOutcome<ConversionStats>> {
    let resume = discover_resume_state(&session.dirs)?;
    let plans = plan_sentences(session);
    let total = session.total_units();
    let mut stats = ConversionStats::default();
    let mut position = 0;

    for (chapter_index, (chapter, planned)) in session.chapters.iter().zip(&plans).enumerate() {
        let number = chapter_index + 1;
        let mut sentences = planned.iter();
        let mut changed = false;

        for unit in &chapter.units {
            if session.is_cancelled() {
                log::info!("Cancelled at unit {} of {}", position, total);
                return Ok(RunOutcome::Cancelled);
            }
            if unit.is_sentence() {
                if let Some(sentence) = sentences.next() {
                    if resume.has_sentence(sentence.index) {
                        stats.reused += 1;
                    } else {
                        synthesize_sentence(session, synthesizer, sentence, number).await?;
                        stats.synthesized += 1;
                        changed = true;
                    }
                }
            }
            position += 1;
            progress(ProgressUpdate {
                position,
                total,
                chapter: number,
            });
        }

        let (Some(first), Some(last)) = (planned.first(), planned.last()) else {
            log::warn!("Chapter {} has no sentences, skipping", number);
            continue;
        };
        if changed || !resume.has_chapter(number) {
            if session.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            combine_chapter(session, tools, number, first.index, last.index).await?;
            stats.chapters_combined += 1;
        }
    }

    Ok(RunOutcome::Completed(stats))
}

/// Run the whole conversion: sentences, chapters, then the final audiobook.
pub async fn run(
    session: &ConversionSession,
    synthesizer: &dyn Synthesizer,
    tools: &Arc<dyn AudioTools>,
    progress: &mut dyn FnMut(ProgressUpdate),
) -> Result<RunOutcome<Vec<PathBuf>>> {
    let stats = match convert_chapters(session, synthesizer, tools, progress).await? {
        RunOutcome::Completed(stats) => stats,
        RunOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
    };
    log::info!(
        "{} sentences synthesized, {} reused, {} chapters combined",
        stats.synthesized,
        stats.reused,
        stats.chapters_combined
    );

    if session.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
    }
    assemble_audiobook(session, tools).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::assembler::tests::FakeTools;
    use crate::session::test_session;
    use crate::text::Chapter;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSynth {
        calls: Mutex<Vec<(usize, Option<Duration>)>>,
        fail_on: Option<usize>,
    }

    impl RecordingSynth {
        fn indices(&self) -> Vec<usize> {
            self.calls.lock().unwrap().iter().map(|(i, _)| *i).collect()
        }
    }

    #[async_trait]
    impl Synthesizer for RecordingSynth {
        async fn synthesize(
            &self,
            request: &SynthesisRequest<'_>,
            output_path: &Path,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((request.index, request.silence_after));
            if self.fail_on == Some(request.index) {
                std::fs::write(output_path, "partial")?;
                anyhow::bail!("model crashed");
            }
            std::fs::write(output_path, format!("{}\n", request.text))?;
            Ok(())
        }
    }

    fn sentence(text: &str) -> SpeakableUnit {
        SpeakableUnit::Sentence(text.to_string())
    }

    /// Two chapters, three sentences, three pauses.
    fn book_session(root: &Path) -> ConversionSession {
        let mut session = test_session(root);
        session.chapters = vec![
            Chapter::new(vec![sentence("One."), SpeakableUnit::Pause, sentence("Two.")]),
            Chapter::new(vec![
                SpeakableUnit::Pause,
                sentence("Three."),
                SpeakableUnit::Pause,
            ]),
        ];
        session
    }

    fn fake_tools() -> Arc<dyn AudioTools> {
        Arc::new(FakeTools::default())
    }

    #[tokio::test]
    async fn test_fresh_run_synthesizes_everything() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        let synth = RecordingSynth::default();
        let mut updates = Vec::new();

        let outcome = convert_chapters(&session, &synth, &fake_tools(), &mut |u| updates.push(u))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(ConversionStats {
                synthesized: 3,
                reused: 0,
                chapters_combined: 2
            })
        );
        let pause = Some(session.pause);
        assert_eq!(
            *synth.calls.lock().unwrap(),
            vec![(0, pause), (1, None), (2, pause)]
        );
        assert_eq!(updates.len(), 6);
        assert_eq!(updates.last().unwrap().percent(), 100.0);
        assert_eq!(updates[3].chapter, 2);
        assert_eq!(
            std::fs::read_to_string(session.dirs.chapter_file(1)).unwrap(),
            "One.\nTwo.\n"
        );
        assert_eq!(
            std::fs::read_to_string(session.dirs.chapter_file(2)).unwrap(),
            "Three.\n"
        );
    }

    #[tokio::test]
    async fn test_resume_regenerates_only_missing_files() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        std::fs::write(session.dirs.sentence_file(0), "One.\n").unwrap();
        std::fs::write(session.dirs.sentence_file(2), "Three.\n").unwrap();
        std::fs::write(session.dirs.chapter_file(2), "Three.\n").unwrap();
        let synth = RecordingSynth::default();

        let outcome = convert_chapters(&session, &synth, &fake_tools(), &mut |_| {})
            .await
            .unwrap();

        assert_eq!(synth.indices(), vec![1]);
        assert_eq!(
            outcome,
            RunOutcome::Completed(ConversionStats {
                synthesized: 1,
                reused: 2,
                chapters_combined: 1
            })
        );
        assert_eq!(
            std::fs::read_to_string(session.dirs.chapter_file(1)).unwrap(),
            "One.\nTwo.\n"
        );
    }

    #[tokio::test]
    async fn test_missing_first_sentence_is_detected() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        std::fs::write(session.dirs.sentence_file(1), "Two.\n").unwrap();
        std::fs::write(session.dirs.sentence_file(2), "Three.\n").unwrap();
        let synth = RecordingSynth::default();

        convert_chapters(&session, &synth, &fake_tools(), &mut |_| {})
            .await
            .unwrap();

        assert_eq!(synth.indices(), vec![0]);
    }

    #[tokio::test]
    async fn test_completed_book_does_no_work() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        for (i, text) in ["One.", "Two.", "Three."].iter().enumerate() {
            std::fs::write(session.dirs.sentence_file(i), format!("{}\n", text)).unwrap();
        }
        std::fs::write(session.dirs.chapter_file(1), "One.\nTwo.\n").unwrap();
        std::fs::write(session.dirs.chapter_file(2), "Three.\n").unwrap();
        let fake = Arc::new(FakeTools::default());
        let tools: Arc<dyn AudioTools> = fake.clone();
        let synth = RecordingSynth::default();

        convert_chapters(&session, &synth, &tools, &mut |_| {})
            .await
            .unwrap();

        assert!(synth.indices().is_empty());
        assert!(fake.concat_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_units() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        let synth = RecordingSynth::default();
        let token = session.cancellation.clone();

        let outcome = convert_chapters(&session, &synth, &fake_tools(), &mut |_| token.cancel())
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert_eq!(synth.indices(), vec![0]);
        assert!(session.dirs.sentence_file(0).exists());
        assert!(!session.dirs.chapter_file(1).exists());
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_fatal_and_keeps_resume_state() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        let synth = RecordingSynth {
            fail_on: Some(1),
            ..Default::default()
        };

        let err = convert_chapters(&session, &synth, &fake_tools(), &mut |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Synthesis {
                index: 1,
                chapter: 1,
                ..
            }
        ));
        assert!(session.dirs.sentence_file(0).exists());
        assert!(!session.dirs.sentence_file(1).exists());
        assert!(!temp_sibling(&session.dirs.sentence_file(1)).exists());
    }

    #[tokio::test]
    async fn test_run_produces_audiobook() {
        let dir = TempDir::new().unwrap();
        let session = book_session(dir.path());
        let synth = RecordingSynth::default();

        let outcome = run(&session, &synth, &fake_tools(), &mut |_| {}).await.unwrap();

        let RunOutcome::Completed(files) = outcome else {
            panic!("run was not cancelled");
        };
        assert_eq!(files, vec![session.output_dir.join("Test_Book.m4b")]);
        assert_eq!(
            std::fs::read_to_string(&files[0]).unwrap(),
            "One.\nTwo.\nThree.\n"
        );
    }

    #[test]
    fn test_discovery_records_gaps_and_removes_temp_files() {
        let dir = TempDir::new().unwrap();
        let session = test_session(dir.path());
        for i in [1, 2, 5] {
            std::fs::write(session.dirs.sentence_file(i), "").unwrap();
        }
        std::fs::write(session.dirs.chapter_file(2), "").unwrap();
        let stale = temp_sibling(&session.dirs.sentence_file(6));
        std::fs::write(&stale, "").unwrap();

        let state = discover_resume_state(&session.dirs).unwrap();

        assert_eq!(state.last_sentence, Some(5));
        assert_eq!(state.missing_sentences, BTreeSet::from([0, 3, 4]));
        assert_eq!(state.last_chapter, Some(2));
        assert_eq!(state.missing_chapters, BTreeSet::from([1]));
        assert!(state.has_sentence(2));
        assert!(!state.has_sentence(3));
        assert!(!state.has_sentence(6));
        assert!(!stale.exists());
    }
}

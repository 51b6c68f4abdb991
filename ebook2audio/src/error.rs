//! Error types for the segmentation and audio assembly pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the conversion core.
///
/// Every variant that concerns audio carries the sentence or chapter index it
/// failed on, so a later run can resume from the files already on disk.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid document {document}: {reason}")]
    InvalidDocument { document: String, reason: String },

    #[error("Synthesis failed for sentence {index} (chapter {chapter}): {reason:#}")]
    Synthesis {
        index: usize,
        chapter: usize,
        reason: anyhow::Error,
    },

    #[error("No sentence audio found for chapter {chapter} in range {start}-{end}")]
    NoSentenceAudio {
        chapter: usize,
        start: usize,
        end: usize,
    },

    #[error("Combining chapter {chapter} (sentences {start}-{end}) failed")]
    ChapterMerge {
        chapter: usize,
        start: usize,
        end: usize,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Merge of chunk {chunk} failed: {reason:#}")]
    ChunkMerge { chunk: usize, reason: anyhow::Error },

    #[error("No chapter audio files found in {}", .0.display())]
    NoChapterAudio(PathBuf),

    #[error("Could not read the duration of {}: {reason:#}", .path.display())]
    Probe { path: PathBuf, reason: anyhow::Error },

    #[error("Export of audiobook part {part} failed: {reason:#}")]
    Export { part: usize, reason: anyhow::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result of a run that may stop early on request.
///
/// Cancellation is kept apart from failure: files written before the stop remain
/// valid resume state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> RunOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_error_mentions_indices() {
        let err = PipelineError::Synthesis {
            index: 42,
            chapter: 3,
            reason: anyhow::anyhow!("engine crashed"),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("chapter 3"));
        assert!(msg.contains("engine crashed"));
    }

    #[test]
    fn test_chapter_merge_keeps_source() {
        let err = PipelineError::ChapterMerge {
            chapter: 2,
            start: 10,
            end: 19,
            source: Box::new(PipelineError::NoSentenceAudio {
                chapter: 2,
                start: 10,
                end: 19,
            }),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("No sentence audio"));
    }

    #[test]
    fn test_run_outcome_cancelled() {
        assert!(RunOutcome::<()>::Cancelled.is_cancelled());
        assert!(!RunOutcome::Completed(1).is_cancelled());
    }
}

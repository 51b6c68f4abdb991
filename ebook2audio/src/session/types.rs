//! Session data types for a book conversion.

use crate::audio::{CHAPTER_EXTENSION, OutputFormat, SENTENCE_EXTENSION};
use crate::cancellation::CancellationToken;
use crate::epub::BookMetadata;
use crate::lang::Language;
use crate::text::Chapter;
use crate::tts::TtsEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Working directories of one book.
///
/// File names inside them are the only resume state: `<index>.wav` per
/// sentence and `chapter_<n>.flac` per chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDirs {
    /// `<data_dir>/<book hash>`; also holds combined parts and metadata documents
    pub root: PathBuf,
    pub chapters: PathBuf,
    pub sentences: PathBuf,
}

impl SessionDirs {
    pub fn new(root: PathBuf) -> Self {
        let chapters = root.join("chapters");
        let sentences = chapters.join("sentences");
        Self {
            root,
            chapters,
            sentences,
        }
    }

    /// Artifact of one sentence, by global index.
    pub fn sentence_file(&self, index: usize) -> PathBuf {
        self.sentences
            .join(format!("{}.{}", index, SENTENCE_EXTENSION))
    }

    /// Combined audio of one chapter, 1-based.
    pub fn chapter_file(&self, chapter: usize) -> PathBuf {
        self.chapters
            .join(format!("chapter_{}.{}", chapter, CHAPTER_EXTENSION))
    }
}

/// Temporary sibling used while an artifact is being written.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.tmp.{}", stem, ext))
}

/// Everything one conversion run reads.
///
/// Immutable during the run apart from the cancellation flag.
#[derive(Debug, Clone)]
pub struct ConversionSession {
    pub language: &'static Language,
    pub engine: TtsEngine,
    pub output_format: OutputFormat,
    /// Hours per part when the book is split
    pub split_hours: u32,
    /// Silence inserted for a pause
    pub pause: Duration,
    /// Files per intermediate merge
    pub merge_batch_size: usize,
    /// Attempts per sentence before the run fails
    pub synth_attempts: u32,
    pub metadata: BookMetadata,
    pub cover: Option<PathBuf>,
    pub dirs: SessionDirs,
    /// Where final audiobook files are written
    pub output_dir: PathBuf,
    pub chapters: Vec<Chapter>,
    pub cancellation: CancellationToken,
}

impl ConversionSession {
    /// Total number of units, pauses included.
    pub fn total_units(&self) -> usize {
        self.chapters.iter().map(|c| c.units.len()).sum()
    }

    pub fn total_sentences(&self) -> usize {
        self.chapters.iter().map(Chapter::sentence_count).sum()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Summary of a book's working directory, saved as `session.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub book_path: PathBuf,
    /// SHA256 hash of the book (first 1MB)
    pub book_hash: String,
    pub title: String,
    pub language: String,
    pub engine: TtsEngine,
    pub output_format: OutputFormat,
    pub total_chapters: usize,
    pub total_sentences: usize,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last updated
    pub updated_at: DateTime<Utc>,
    /// Final files of the last completed run
    #[serde(default)]
    pub exported: Vec<PathBuf>,
}

//! Audio assembly: sentence files into chapters, chapters into audiobook parts.

pub mod assembler;
pub mod metadata;
pub mod silence;
pub mod tools;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use assembler::{assemble_audiobook, combine_chapter};
pub use tools::{AudioTools, FfmpegTools};

/// Extension of synthesized sentence files.
pub const SENTENCE_EXTENSION: &str = "wav";

/// Extension of combined chapter files and intermediate merges.
pub const CHAPTER_EXTENSION: &str = "flac";

/// Container of the final audiobook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Wav,
    Aac,
    Flac,
    M4a,
    #[default]
    M4b,
    Mp4,
    Mov,
    Mp3,
    Webm,
    Ogg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Aac => "aac",
            OutputFormat::Flac => "flac",
            OutputFormat::M4a => "m4a",
            OutputFormat::M4b => "m4b",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mov => "mov",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Webm => "webm",
            OutputFormat::Ogg => "ogg",
        }
    }

    /// Vorbis-comment containers, whose tag keys are upper case.
    pub fn is_vorbis(self) -> bool {
        matches!(self, OutputFormat::Ogg | OutputFormat::Webm)
    }

    pub fn is_mp4_like(self) -> bool {
        matches!(
            self,
            OutputFormat::M4a | OutputFormat::M4b | OutputFormat::Mp4 | OutputFormat::Mov
        )
    }

    /// Formats that get a cover picture after export.
    pub fn supports_cover(self) -> bool {
        matches!(
            self,
            OutputFormat::Mp3 | OutputFormat::M4a | OutputFormat::M4b | OutputFormat::Mp4
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_families() {
        assert!(OutputFormat::Ogg.is_vorbis());
        assert!(!OutputFormat::Mp3.is_vorbis());
        assert!(OutputFormat::Mov.is_mp4_like());
        assert!(!OutputFormat::Mov.supports_cover());
        assert!(OutputFormat::Mp3.supports_cover());
        assert_eq!(OutputFormat::default().to_string(), "m4b");
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let w: Wrapper = toml::from_str("format = \"webm\"").unwrap();
        assert_eq!(w.format, OutputFormat::Webm);
    }
}

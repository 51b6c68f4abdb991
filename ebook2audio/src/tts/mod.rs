//! Speech synthesis seam: the engine identity and the synthesizer trait.

pub mod command;

use crate::lang::Language;
use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub use command::CommandSynthesizer;

/// Text-to-speech engine the audio is produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    #[default]
    Xtts,
    Bark,
    Vits,
    Fairseq,
    Tacotron2,
    Yourtts,
}

impl TtsEngine {
    /// Engines that read double quotes aloud or stumble over them.
    pub fn mishandles_double_quotes(self) -> bool {
        matches!(self, TtsEngine::Tacotron2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TtsEngine::Xtts => "xtts",
            TtsEngine::Bark => "bark",
            TtsEngine::Vits => "vits",
            TtsEngine::Fairseq => "fairseq",
            TtsEngine::Tacotron2 => "tacotron2",
            TtsEngine::Yourtts => "yourtts",
        }
    }
}

impl fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a synthesizer needs for one sentence.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    /// Global sentence index; also the artifact's file name.
    pub index: usize,
    /// 1-based chapter number.
    pub chapter: usize,
    pub text: &'a str,
    pub language: &'a Language,
    pub engine: TtsEngine,
    /// Silence appended after the speech, for a pause that follows.
    pub silence_after: Option<Duration>,
}

/// TTS backend trait - all synthesis engines implement this.
///
/// Calling `synthesize` twice for the same request must be safe; missing
/// files are regenerated that way on resume.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize one sentence into a WAV file at `output_path`.
    async fn synthesize(&self, request: &SynthesisRequest<'_>, output_path: &Path) -> Result<()>;

    /// Synthesize with retry logic for error handling.
    async fn synthesize_with_retry(
        &self,
        request: &SynthesisRequest<'_>,
        output_path: &Path,
        max_attempts: u32,
    ) -> Result<()> {
        let attempts = max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.synthesize(request, output_path).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!(
                        "Synthesis of sentence {} failed (attempt {}/{}): {:#}",
                        request.index,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed")))
    }
}

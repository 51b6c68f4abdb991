//! ebook2audio configuration management.

use crate::audio::OutputFormat;
use crate::tts::TtsEngine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_LANGUAGE: &str = "eng";
const DEFAULT_SPLIT_HOURS: u32 = 12;
const DEFAULT_PAUSE_SECS: f32 = 1.4;
const DEFAULT_MERGE_BATCH_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// ISO 639-3 code of the language books are read in
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub tts_engine: TtsEngine,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Books longer than twice this many hours are split into parts of at most this length
    #[serde(default = "default_split_hours")]
    pub output_split_hours: u32,

    /// Silence inserted for a pause, in seconds
    #[serde(default = "default_pause_secs")]
    pub pause_secs: f32,

    /// Files per intermediate merge
    #[serde(default = "default_merge_batch_size")]
    pub merge_batch_size: usize,

    /// Synthesis command and its arguments; the sentence is written to stdin.
    /// Placeholders: {output}, {language}, {language_iso1}, {engine}, {index}, {chapter}
    #[serde(default)]
    pub synth_command: Vec<String>,

    /// Attempts per sentence before the run fails
    #[serde(default = "default_synth_retries")]
    pub synth_retries: u32,

    /// FFmpeg executable. None means the one on PATH.
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe: Option<PathBuf>,

    /// Working files root. None means the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_split_hours() -> u32 {
    DEFAULT_SPLIT_HOURS
}

fn default_pause_secs() -> f32 {
    DEFAULT_PAUSE_SECS
}

fn default_merge_batch_size() -> usize {
    DEFAULT_MERGE_BATCH_SIZE
}

fn default_synth_retries() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            tts_engine: TtsEngine::default(),
            output_format: OutputFormat::default(),
            output_split_hours: default_split_hours(),
            pause_secs: default_pause_secs(),
            merge_batch_size: default_merge_batch_size(),
            synth_command: Vec::new(),
            synth_retries: default_synth_retries(),
            ffmpeg: None,
            ffprobe: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Get the config file path: <config dir>/ebook2audio/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .context("Could not determine config directory")?;
        Ok(dir.join("ebook2audio").join("config.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.tts_engine, TtsEngine::Xtts);
        assert_eq!(config.output_format, OutputFormat::M4b);
        assert_eq!(config.output_split_hours, 12);
        assert_eq!(config.pause_secs, 1.4);
        assert_eq!(config.merge_batch_size, 1024);
        assert!(config.synth_command.is_empty());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_path() {
        if let Ok(path) = Config::config_path() {
            assert!(path.ends_with("ebook2audio/config.toml"));
        }
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
language = "fra"
tts_engine = "vits"
output_format = "mp3"
output_split_hours = 6
pause_secs = 0.8
synth_command = ["piper", "--model", "fr.onnx", "--output_file", "{output}"]
ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.language, "fra");
        assert_eq!(config.tts_engine, TtsEngine::Vits);
        assert_eq!(config.output_format, OutputFormat::Mp3);
        assert_eq!(config.output_split_hours, 6);
        assert_eq!(config.pause_secs, 0.8);
        assert_eq!(config.synth_command.len(), 5);
        assert_eq!(config.ffmpeg, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(config.merge_batch_size, 1024);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.synth_command = vec!["tts".into(), "{output}".into()];
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

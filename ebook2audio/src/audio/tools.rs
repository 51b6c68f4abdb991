//! External audio tooling: concatenation, probing and export through FFmpeg.

use super::OutputFormat;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

/// Loudness normalization followed by light denoising, applied on export.
pub const EXPORT_FILTERS: &str = "loudnorm=I=-16:LRA=11:TP=-1.5,afftdn=nf=-70";

/// Merge, probe and export operations the assembler depends on.
#[async_trait]
pub trait AudioTools: Send + Sync {
    /// Concatenate `inputs` in order into `output`, keeping their format.
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;

    /// Duration of an audio file in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Encode `input` into `output` with the format's parameters.
    ///
    /// `metadata` is an FFMETADATA document with global tags and chapters.
    async fn export(
        &self,
        input: &Path,
        metadata: &Path,
        output: &Path,
        format: OutputFormat,
    ) -> Result<()>;

    /// Embed a cover picture into an exported file.
    async fn embed_cover(&self, file: &Path, cover: &Path) -> Result<()>;
}

/// [`AudioTools`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl FfmpegTools {
    /// Use the given executables, falling back to the ones on `PATH`.
    pub fn new(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.unwrap_or_else(|| PathBuf::from("ffmpeg")),
            ffprobe: ffprobe.unwrap_or_else(|| PathBuf::from("ffprobe")),
        }
    }

    fn ffmpeg_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostats", "-loglevel", "error"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Check whether both executables run.
    pub async fn is_available(&self) -> bool {
        let probe = |program: &PathBuf| {
            let mut cmd = Command::new(program);
            cmd.arg("-version").stdout(Stdio::null()).stderr(Stdio::null());
            cmd
        };
        let ffmpeg = probe(&self.ffmpeg).status().await;
        let ffprobe = probe(&self.ffprobe).status().await;
        matches!((ffmpeg, ffprobe), (Ok(a), Ok(b)) if a.success() && b.success())
    }
}

async fn run(mut cmd: Command, what: &str) -> Result<()> {
    let output = cmd
        .output()
        .await
        .with_context(|| format!("Failed to run {}", what))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} failed ({}): {}", what, output.status, stderr.trim());
    }
    Ok(())
}

/// Render an ffmpeg concat-demuxer list.
fn concat_list(inputs: &[PathBuf]) -> String {
    let mut list = String::new();
    for path in inputs {
        // Escape single quotes in path
        let path_str = path.to_string_lossy().replace('\\', "/").replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", path_str));
    }
    list
}

/// Codec for an intermediate file, picked from its extension.
fn intermediate_codec(output: &Path) -> &'static str {
    match output.extension().and_then(|e| e.to_str()) {
        Some("flac") => "flac",
        Some("wav") => "pcm_s16le",
        _ => "copy",
    }
}

/// Encoder arguments for a final export. The second value tells whether the
/// container carries the metadata document.
fn encoder_args(format: OutputFormat) -> (&'static [&'static str], bool) {
    match format {
        OutputFormat::Wav => (&["-map", "0:a", "-ar", "44100", "-sample_fmt", "s16"], false),
        OutputFormat::Aac => (&["-c:a", "aac", "-b:a", "192k", "-ar", "44100"], false),
        OutputFormat::Flac => (
            &["-c:a", "flac", "-compression_level", "5", "-ar", "44100", "-sample_fmt", "s16"],
            false,
        ),
        OutputFormat::M4a | OutputFormat::M4b | OutputFormat::Mp4 | OutputFormat::Mov => (
            &[
                "-c:a",
                "aac",
                "-b:a",
                "192k",
                "-ar",
                "44100",
                "-movflags",
                "+faststart+use_metadata_tags",
            ],
            true,
        ),
        OutputFormat::Mp3 => (&["-c:a", "libmp3lame", "-b:a", "192k", "-ar", "44100"], true),
        OutputFormat::Webm => (&["-c:a", "libopus", "-b:a", "192k", "-ar", "48000"], true),
        OutputFormat::Ogg => (
            &["-c:a", "libopus", "-compression_level", "0", "-b:a", "192k", "-ar", "48000"],
            true,
        ),
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: String,
}

fn parse_probe_duration(json: &str) -> Result<f64> {
    let probe: ProbeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe output")?;
    probe
        .format
        .duration
        .trim()
        .parse()
        .context("Failed to parse duration")
}

#[async_trait]
impl AudioTools for FfmpegTools {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.is_empty() {
            anyhow::bail!("No audio files provided");
        }

        // Keep the list next to the output so relative layouts stay on one filesystem.
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let temp_dir = TempDir::new_in(parent).context("Failed to create concat directory")?;
        let list_file = temp_dir.path().join("concat_list.txt");
        tokio::fs::write(&list_file, concat_list(inputs))
            .await
            .context("Failed to write concat list")?;

        let mut cmd = self.ffmpeg_command();
        cmd.args(["-y", "-safe", "0", "-f", "concat", "-i"])
            .arg(&list_file)
            .args(["-c:a", intermediate_codec(output)])
            .args(["-map_metadata", "-1", "-threads", "1"])
            .arg(output);
        run(cmd, "ffmpeg concat").await
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .context("Failed to run ffprobe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffprobe failed on {}: {}", path.display(), stderr.trim());
        }
        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("No duration for {}", path.display()))
    }

    async fn export(
        &self,
        input: &Path,
        metadata: &Path,
        output: &Path,
        format: OutputFormat,
    ) -> Result<()> {
        let (encoder, with_metadata) = encoder_args(format);
        let mut cmd = self.ffmpeg_command();
        cmd.arg("-i").arg(input);
        if with_metadata {
            cmd.args(["-f", "ffmetadata", "-i"]).arg(metadata);
            cmd.args(["-map", "0:a"]);
        }
        cmd.args(encoder);
        if with_metadata {
            cmd.args(["-map_metadata", "1"]);
        }
        cmd.args(["-af", EXPORT_FILTERS, "-strict", "experimental", "-threads", "1", "-y"])
            .arg(output);
        run(cmd, "ffmpeg export").await
    }

    async fn embed_cover(&self, file: &Path, cover: &Path) -> Result<()> {
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("tmp");
        let temp_path = file.with_extension(format!("cover.{}", extension));

        let mut cmd = self.ffmpeg_command();
        cmd.args(["-y", "-i"])
            .arg(file)
            .arg("-i")
            .arg(cover)
            .args([
                "-map",
                "0:a",
                "-map",
                "1:v",
                "-c:a",
                "copy",
                "-c:v",
                "mjpeg",
                "-disposition:v:0",
                "attached_pic",
                "-map_metadata",
                "0",
                "-map_chapters",
                "0",
            ])
            .arg(&temp_path);
        if let Err(e) = run(cmd, "ffmpeg cover embedding").await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tokio::fs::rename(&temp_path, file)
            .await
            .with_context(|| format!("Failed to replace {}", file.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list(&[PathBuf::from("/a/b.wav"), PathBuf::from("/a/it's.wav")]);
        assert_eq!(list, "file '/a/b.wav'\nfile '/a/it'\\''s.wav'\n");
    }

    #[test]
    fn test_intermediate_codec() {
        assert_eq!(intermediate_codec(Path::new("chapter_1.flac")), "flac");
        assert_eq!(intermediate_codec(Path::new("chunk.wav")), "pcm_s16le");
        assert_eq!(intermediate_codec(Path::new("noext")), "copy");
    }

    #[test]
    fn test_encoder_args_metadata_containers() {
        assert!(!encoder_args(OutputFormat::Wav).1);
        assert!(!encoder_args(OutputFormat::Flac).1);
        assert!(encoder_args(OutputFormat::M4b).1);
        assert!(encoder_args(OutputFormat::Ogg).1);
        assert!(encoder_args(OutputFormat::Mp3).0.contains(&"libmp3lame"));
        assert!(encoder_args(OutputFormat::Webm).0.contains(&"48000"));
    }

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"duration": "12.480000"}}"#;
        assert!((parse_probe_duration(json).unwrap() - 12.48).abs() < 1e-9);
        assert!(parse_probe_duration("{}").is_err());
        assert!(parse_probe_duration(r#"{"format": {"duration": "N/A"}}"#).is_err());
    }

    #[tokio::test]
    async fn test_concat_rejects_empty_input() {
        let tools = FfmpegTools::default();
        assert!(tools.concat(&[], Path::new("out.flac")).await.is_err());
    }
}

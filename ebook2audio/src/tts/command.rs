//! Synthesis through an external command.

use super::{SynthesisRequest, Synthesizer};
use crate::audio::silence::append_silence;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs a command per sentence.
///
/// The argument template may use `{output}`, `{language}`, `{language_iso1}`,
/// `{engine}`, `{index}` and `{chapter}`; the sentence text is written to
/// stdin. The command must write a WAV file to `{output}`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// Build from an argv template whose first element is the program.
    pub fn new(template: &[String]) -> Result<Self> {
        let (program, args) = template
            .split_first()
            .context("Synthesis command is empty; set synth_command in the config")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn render_args(&self, request: &SynthesisRequest<'_>, output_path: &Path) -> Vec<String> {
        let output = output_path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{language_iso1}", request.language.iso1)
                    .replace("{language}", request.language.iso3)
                    .replace("{engine}", request.engine.as_str())
                    .replace("{index}", &request.index.to_string())
                    .replace("{chapter}", &request.chapter.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest<'_>, output_path: &Path) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.render_args(request, output_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run synthesis command {}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that takes its text elsewhere may exit without reading.
            if let Err(e) = stdin.write_all(request.text.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e).context("Failed to send text to synthesis command");
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for synthesis command")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Synthesis command failed ({}): {}", output.status, stderr.trim());
        }
        if !output_path.exists() {
            anyhow::bail!(
                "Synthesis command did not write {}",
                output_path.display()
            );
        }

        if let Some(silence) = request.silence_after {
            let path = output_path.to_path_buf();
            tokio::task::spawn_blocking(move || append_silence(&path, silence))
                .await
                .context("Task join error")??;
        }

        Ok(())
    }
}

//! Appending silence to WAV files.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Append `duration` of silence to the WAV file at `path`, in place.
///
/// The file is rewritten through a `.tmp.wav` sibling and renamed, so a crash
/// never leaves a truncated artifact under the final name.
pub fn append_silence(path: &Path, duration: Duration) -> Result<()> {
    let temp_path = path.with_extension("tmp.wav");
    {
        let mut reader = WavReader::open(path)
            .with_context(|| format!("Failed to read WAV file {}", path.display()))?;
        let spec = reader.spec();
        let silent_frames = (duration.as_secs_f64() * f64::from(spec.sample_rate)).round() as usize;
        let silent_samples = silent_frames * usize::from(spec.channels);

        let mut writer = WavWriter::create(&temp_path, spec)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        match spec.sample_format {
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
                for _ in 0..silent_samples {
                    writer.write_sample(0i32)?;
                }
            }
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
                for _ in 0..silent_samples {
                    writer.write_sample(0.0f32)?;
                }
            }
        }
        writer.finalize()?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

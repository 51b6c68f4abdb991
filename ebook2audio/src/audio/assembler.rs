//! Audio file assembly: sentence files into chapters, chapters into audiobook parts.
//!
//! Both levels merge through a two-level concatenation: inputs are merged in
//! batches into intermediate chunks, in parallel, and the chunks are merged
//! into the target. No single external call sees more than one batch of files.

use super::metadata::{build_chapter_info, write_ffmpeg_metadata};
use super::{AudioTools, CHAPTER_EXTENSION, SENTENCE_EXTENSION};
use crate::error::{PipelineError, Result, RunOutcome};
use crate::session::{ConversionSession, get_sanitized, temp_sibling};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// List numbered files `<prefix><n>.<extension>` in `dir`, sorted by number.
///
/// Temporary siblings (`12.tmp.wav`) never parse as a number and are skipped.
pub fn numbered_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<(usize, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(prefix))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(number) = number {
            files.push((number, path));
        }
    }
    files.sort_by_key(|(number, _)| *number);
    Ok(files)
}

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Concatenate `inputs` into `output` through batches of `batch_size` files.
///
/// Batches are merged concurrently, bounded by the available parallelism. The
/// output is written to a temporary sibling and renamed once complete. A
/// failure of the final merge is reported as chunk `n`, one past the last
/// batch.
pub async fn merge_batched(
    tools: &Arc<dyn AudioTools>,
    inputs: &[PathBuf],
    output: &Path,
    batch_size: usize,
) -> Result<()> {
    let batch_size = batch_size.max(1);
    let temp_output = temp_sibling(output);
    let parent = output.parent().unwrap_or_else(|| Path::new("."));

    let result = if inputs.len() <= batch_size {
        tools
            .concat(inputs, &temp_output)
            .await
            .map_err(|reason| PipelineError::ChunkMerge { chunk: 0, reason })
    } else {
        let work_dir = TempDir::new_in(parent)?;
        let chunk_files = merge_chunks(tools, inputs, batch_size, work_dir.path()).await?;
        tools
            .concat(&chunk_files, &temp_output)
            .await
            .map_err(|reason| PipelineError::ChunkMerge {
                chunk: chunk_files.len(),
                reason,
            })
    };

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_output);
        return Err(e);
    }
    std::fs::rename(&temp_output, output)?;
    Ok(())
}

/// Merge each batch into its own chunk file; every chunk must succeed.
async fn merge_chunks(
    tools: &Arc<dyn AudioTools>,
    inputs: &[PathBuf],
    batch_size: usize,
    work_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let semaphore = Arc::new(Semaphore::new(worker_count()));
    let mut tasks = JoinSet::new();
    let mut chunk_files = Vec::new();

    for (chunk, batch) in inputs.chunks(batch_size).enumerate() {
        let chunk_file = work_dir.join(format!("chunk_{:04}.{}", chunk, CHAPTER_EXTENSION));
        chunk_files.push(chunk_file.clone());

        let tools = Arc::clone(tools);
        let semaphore = Arc::clone(&semaphore);
        let batch = batch.to_vec();
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => tools.concat(&batch, &chunk_file).await,
                Err(e) => Err(e.into()),
            };
            (chunk, result)
        });
    }
    log::debug!(
        "Merging {} files in {} chunks",
        inputs.len(),
        chunk_files.len()
    );

    let mut outcomes: Vec<Option<anyhow::Result<()>>> =
        (0..chunk_files.len()).map(|_| None).collect();
    let mut panicked = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((chunk, result)) => outcomes[chunk] = Some(result),
            Err(e) => panicked = Some(anyhow::anyhow!("Merge task failed: {}", e)),
        }
    }

    for (chunk, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Some(Ok(())) => {}
            Some(Err(reason)) => return Err(PipelineError::ChunkMerge { chunk, reason }),
            None => {
                let reason = panicked
                    .take()
                    .unwrap_or_else(|| anyhow::anyhow!("Merge task did not finish"));
                return Err(PipelineError::ChunkMerge { chunk, reason });
            }
        }
    }
    Ok(chunk_files)
}

/// Combine the sentence files of one chapter into `chapter_<n>`.
///
/// `start` and `end` are global sentence indices, both inclusive.
pub async fn combine_chapter(
    session: &ConversionSession,
    tools: &Arc<dyn AudioTools>,
    chapter: usize,
    start: usize,
    end: usize,
) -> Result<PathBuf> {
    let wrap = |source: PipelineError| PipelineError::ChapterMerge {
        chapter,
        start,
        end,
        source: Box::new(source),
    };

    let inputs: Vec<PathBuf> = numbered_files(&session.dirs.sentences, "", SENTENCE_EXTENSION)
        .map_err(wrap)?
        .into_iter()
        .filter(|(index, _)| (start..=end).contains(index))
        .map(|(_, path)| path)
        .collect();
    if inputs.is_empty() {
        return Err(wrap(PipelineError::NoSentenceAudio {
            chapter,
            start,
            end,
        }));
    }

    let output = session.dirs.chapter_file(chapter);
    merge_batched(tools, &inputs, &output, session.merge_batch_size)
        .await
        .map_err(wrap)?;
    log::info!(
        "Combined chapter {} from {} sentence files into {}",
        chapter,
        inputs.len(),
        output.display()
    );
    Ok(output)
}

/// Group chapters into contiguous parts by duration.
///
/// The book is split only when its total duration exceeds twice
/// `split_hours`. Parts then take chapters greedily up to `split_hours`; a
/// chapter is never divided, so a single chapter longer than the cap forms a
/// part of its own.
pub fn plan_parts(durations_secs: &[f64], split_hours: u32) -> Vec<Range<usize>> {
    if durations_secs.is_empty() {
        return Vec::new();
    }
    let cap = f64::from(split_hours) * 3600.0;
    let total: f64 = durations_secs.iter().sum();
    if total <= 2.0 * cap {
        return vec![0..durations_secs.len()];
    }

    let mut parts = Vec::new();
    let mut part_start = 0;
    let mut part_duration = 0.0;
    for (i, duration) in durations_secs.iter().enumerate() {
        if i > part_start && part_duration + duration > cap {
            parts.push(part_start..i);
            part_start = i;
            part_duration = 0.0;
        }
        part_duration += duration;
    }
    parts.push(part_start..durations_secs.len());
    parts
}

/// Merge all chapter files into the final audiobook file(s).
///
/// Returns the exported files in part order. Each file is encoded under a
/// temporary name and renamed only after export and cover embedding succeed.
pub async fn assemble_audiobook(
    session: &ConversionSession,
    tools: &Arc<dyn AudioTools>,
) -> Result<RunOutcome<Vec<PathBuf>>> {
    let chapter_files = numbered_files(&session.dirs.chapters, "chapter_", CHAPTER_EXTENSION)?;
    if chapter_files.is_empty() {
        return Err(PipelineError::NoChapterAudio(session.dirs.chapters.clone()));
    }

    let mut durations = Vec::with_capacity(chapter_files.len());
    for (_, path) in &chapter_files {
        let seconds = tools
            .probe_duration(path)
            .await
            .map_err(|reason| PipelineError::Probe {
                path: path.clone(),
                reason,
            })?;
        durations.push(seconds);
    }

    let parts = plan_parts(&durations, session.split_hours);
    let split = parts.len() > 1;
    if split {
        log::info!(
            "Total duration {:.1}h exceeds {}h, splitting into {} parts",
            durations.iter().sum::<f64>() / 3600.0,
            session.split_hours * 2,
            parts.len()
        );
    }

    let mut base_name = get_sanitized(&session.metadata.title);
    if base_name.is_empty() {
        base_name = "audiobook".to_string();
    }
    std::fs::create_dir_all(&session.output_dir)?;

    let mut exported = Vec::with_capacity(parts.len());
    for (part_index, range) in parts.into_iter().enumerate() {
        if session.is_cancelled() {
            log::info!("Cancelled before audiobook part {}", part_index + 1);
            return Ok(RunOutcome::Cancelled);
        }
        let part = part_index + 1;
        let name = if split {
            format!("{}_part{}", base_name, part)
        } else {
            base_name.clone()
        };

        let inputs: Vec<PathBuf> = chapter_files[range.clone()]
            .iter()
            .map(|(_, path)| path.clone())
            .collect();
        let combined = session
            .dirs
            .root
            .join(format!("{}.{}", name, CHAPTER_EXTENSION));
        merge_batched(tools, &inputs, &combined, session.merge_batch_size).await?;

        let titles: Vec<String> = chapter_files[range.clone()]
            .iter()
            .map(|(number, _)| chapter_title(session, *number))
            .collect();
        let durations_ms: Vec<u64> = durations[range]
            .iter()
            .map(|secs| (secs * 1000.0).round() as u64)
            .collect();
        let chapters = build_chapter_info(&durations_ms, &titles);
        let metadata_path = session.dirs.root.join(format!("metadata_part{}.txt", part));
        write_ffmpeg_metadata(
            &session.metadata,
            session.output_format,
            &chapters,
            &metadata_path,
        )
        .map_err(|reason| PipelineError::Export { part, reason })?;

        let final_path = session
            .output_dir
            .join(format!("{}.{}", name, session.output_format.extension()));
        export_part(session, tools, &combined, &metadata_path, &final_path)
            .await
            .map_err(|reason| PipelineError::Export { part, reason })?;
        log::info!("Exported {}", final_path.display());
        exported.push(final_path);
    }

    Ok(RunOutcome::Completed(exported))
}

fn chapter_title(session: &ConversionSession, number: usize) -> String {
    number
        .checked_sub(1)
        .and_then(|i| session.chapters.get(i))
        .and_then(|chapter| chapter.title())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Chapter {}", number))
}

async fn export_part(
    session: &ConversionSession,
    tools: &Arc<dyn AudioTools>,
    combined: &Path,
    metadata: &Path,
    final_path: &Path,
) -> anyhow::Result<()> {
    let temp_path = temp_sibling(final_path);
    let result = async {
        tools
            .export(combined, metadata, &temp_path, session.output_format)
            .await?;
        if let Some(cover) = session.cover.as_deref() {
            if session.output_format.supports_cover() {
                log::info!("Adding cover {} to {}", cover.display(), final_path.display());
                // The audio is already exported; a bad cover only costs the artwork.
                if let Err(e) = tools.embed_cover(&temp_path, cover).await {
                    log::warn!("Skipping cover {}: {:#}", cover.display(), e);
                }
            }
        }
        tokio::fs::rename(&temp_path, final_path).await?;
        anyhow::Ok(())
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

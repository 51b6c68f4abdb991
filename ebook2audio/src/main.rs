//! ebook2audio - Convert EPUB books into chaptered audiobooks with resumable TTS synthesis

mod audio;
mod cancellation;
mod config;
mod driver;
mod epub;
mod error;
mod lang;
mod session;
mod text;
mod tts;

use anyhow::{Context, Result};
use audio::{AudioTools, FfmpegTools, OutputFormat};
use cancellation::CancellationToken;
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::Config;
use env_logger::Env;
use error::RunOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use session::{ConversionSession, SessionManifest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use text::Chapter;
use tts::{CommandSynthesizer, TtsEngine};

#[derive(Parser, Debug)]
#[command(name = "ebook2audio")]
#[command(about = "Convert EPUB books into chaptered audiobooks", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the EPUB file
    epub_file: Option<PathBuf>,

    /// Directory for the finished audiobook (default: next to the EPUB)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Language of the book, ISO 639-3 (e.g. eng, fra, zho)
    #[arg(short, long)]
    language: Option<String>,

    /// TTS engine the synthesis command drives
    #[arg(long, value_enum)]
    tts_engine: Option<TtsEngine>,

    /// Audiobook container
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Hours per part when a book is split
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    split_hours: Option<u32>,

    /// Start fresh, discard sentence and chapter files of a previous run
    #[arg(long)]
    no_resume: bool,

    /// Keep working files after a successful conversion
    #[arg(long)]
    keep_work: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List supported languages
    Languages,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default language
    SetLanguage {
        /// ISO 639-3 code
        code: String,
    },
    /// Set default TTS engine
    SetEngine {
        #[arg(value_enum)]
        engine: TtsEngine,
    },
    /// Set default output format
    SetFormat {
        #[arg(value_enum)]
        format: OutputFormat,
    },
    /// Set hours per part for long books
    SetSplitHours {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        hours: u32,
    },
    /// Set pause length in seconds
    SetPause {
        /// Value (0.0-10.0)
        seconds: f32,
    },
    /// Set the synthesis command, e.g. `set-command -- piper -m voice.onnx -f {output}`
    SetCommand {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    // Handle subcommands
    match &args.command {
        Some(Commands::Config { action }) => return handle_config_command(action),
        Some(Commands::Languages) => {
            for lang in lang::supported() {
                println!("{}  {}  {}", lang.iso3, lang.iso1, lang.name);
            }
            return Ok(());
        }
        None => {}
    }

    let epub_path = args
        .epub_file
        .clone()
        .ok_or_else(|| anyhow::anyhow!("EPUB file path is required. Run 'ebook2audio --help' for usage."))?;

    if !epub_path.exists() {
        anyhow::bail!("EPUB file not found: {}", epub_path.display());
    }

    let config = Config::load().context("Failed to load configuration")?;
    let language = lang::lookup(args.language.as_deref().unwrap_or(&config.language))?;
    let engine = args.tts_engine.unwrap_or(config.tts_engine);
    let output_format = args.format.unwrap_or(config.output_format);
    let split_hours = args.split_hours.unwrap_or(config.output_split_hours).max(1);
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => epub_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let synthesizer = CommandSynthesizer::new(&config.synth_command)?;
    let ffmpeg = FfmpegTools::new(config.ffmpeg.clone(), config.ffprobe.clone());
    if !ffmpeg.is_available().await {
        anyhow::bail!("ffmpeg and ffprobe are required; install them or set their paths in the config");
    }

    // Working directory keyed by the book's content
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => session::default_data_dir()?,
    };
    let book_hash = session::compute_book_hash(&epub_path)?;
    let mut dirs = session::prepare_dirs(&data_dir, &book_hash)?;
    if args.no_resume {
        session::cleanup_session(&dirs)?;
        dirs = session::prepare_dirs(&data_dir, &book_hash)?;
    }

    eprintln!("Reading EPUB: {}", epub_path.display());
    let book = epub::read_epub(&epub_path, language.iso3).context("Failed to read EPUB")?;
    eprintln!(
        "Book: \"{}\" by {}",
        book.metadata.title,
        book.metadata.creator.as_deref().unwrap_or("Unknown")
    );

    let chapters = build_chapters(&book, language, engine);
    if chapters.is_empty() {
        anyhow::bail!("No readable chapters found in EPUB");
    }
    let cover = epub::save_cover(&book, &dirs.root)?;

    let cancellation = CancellationToken::new();
    let session = ConversionSession {
        language,
        engine,
        output_format,
        split_hours,
        pause: Duration::from_secs_f32(config.pause_secs.clamp(0.0, 10.0)),
        merge_batch_size: config.merge_batch_size,
        synth_attempts: config.synth_retries.max(1),
        metadata: book.metadata.clone(),
        cover,
        dirs,
        output_dir,
        chapters,
        cancellation: cancellation.clone(),
    };
    eprintln!(
        "Chapters: {}, Sentences: {}",
        session.chapters.len(),
        session.total_sentences()
    );

    let mut manifest = match session::load_manifest(&session.dirs)? {
        Some(existing) => {
            eprintln!(
                "Resuming session started {}",
                existing.created_at.format("%Y-%m-%d %H:%M")
            );
            existing
        }
        None => new_manifest(&epub_path, &book_hash, &session),
    };
    session::save_manifest(&session.dirs, &manifest)?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current sentence...");
            cancellation.cancel();
        }
    });

    let pb = ProgressBar::new(session.total_units() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let tools: Arc<dyn AudioTools> = Arc::new(ffmpeg);
    let outcome = driver::run(&session, &synthesizer, &tools, &mut |update| {
        pb.set_position(update.position as u64);
        pb.set_message(format!("chapter {} ({:.1}%)", update.chapter, update.percent()));
    })
    .await;
    pb.finish_and_clear();

    match outcome? {
        RunOutcome::Cancelled => {
            eprintln!("Cancelled. Run the same command again to resume.");
        }
        RunOutcome::Completed(files) => {
            for file in &files {
                let size_mb = std::fs::metadata(file)?.len() as f64 / (1024.0 * 1024.0);
                eprintln!("Output: {} ({:.1} MB)", file.display(), size_mb);
            }
            if args.keep_work {
                manifest.exported = files;
                session::save_manifest(&session.dirs, &manifest)?;
            } else {
                session::cleanup_session(&session.dirs)?;
            }
        }
    }

    Ok(())
}

/// Turn every body document into a chapter, dropping the ones with nothing to read.
fn build_chapters(book: &epub::Book, language: &'static lang::Language, engine: TtsEngine) -> Vec<Chapter> {
    book.documents
        .iter()
        .filter_map(|document| {
            let chapter = text::build_chapter(&document.html, language, engine);
            if chapter.is_none() {
                log::debug!("Skipping document {}", document.id);
            }
            chapter
        })
        .collect()
}

fn new_manifest(epub_path: &Path, book_hash: &str, session: &ConversionSession) -> SessionManifest {
    let now = Utc::now();
    SessionManifest {
        book_path: epub_path.to_path_buf(),
        book_hash: book_hash.to_string(),
        title: session.metadata.title.clone(),
        language: session.language.iso3.to_string(),
        engine: session.engine,
        output_format: session.output_format,
        total_chapters: session.chapters.len(),
        total_sentences: session.total_sentences(),
        created_at: now,
        updated_at: now,
        exported: Vec::new(),
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Show => {
            println!("Configuration file: {:?}", Config::config_path()?);
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            if config.synth_command.is_empty() {
                println!("# synth_command is not set; conversions need one");
            }
            return Ok(());
        }
        ConfigAction::SetLanguage { code } => {
            let language = lang::lookup(code)?;
            config.language = language.iso3.to_string();
            println!("Default language set to: {} ({})", language.name, language.iso3);
        }
        ConfigAction::SetEngine { engine } => {
            config.tts_engine = *engine;
            println!("Default TTS engine set to: {}", engine);
        }
        ConfigAction::SetFormat { format } => {
            config.output_format = *format;
            println!("Default output format set to: {}", format);
        }
        ConfigAction::SetSplitHours { hours } => {
            config.output_split_hours = *hours;
            println!("Split hours set to: {}", hours);
        }
        ConfigAction::SetPause { seconds } => {
            config.pause_secs = seconds.clamp(0.0, 10.0);
            println!("Pause set to: {}s", config.pause_secs);
        }
        ConfigAction::SetCommand { argv } => {
            CommandSynthesizer::new(argv)?;
            config.synth_command = argv.clone();
            println!("Synthesis command set to: {}", argv.join(" "));
        }
    }
    config.save()
}

//! Session persistence: working directories, book identity and the manifest.

use super::types::{SessionDirs, SessionManifest};
use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "session.json";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static FORBIDDEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F ()]"#).expect("valid filename regex"));

/// Get the base data directory for ebook2audio.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join("ebook2audio"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
}

/// Compute a hash of the book file for session identification.
///
/// Uses SHA256 of the first 1MB for speed with large files.
pub fn compute_book_hash(book_path: &Path) -> Result<String> {
    let file = File::open(book_path).context("Failed to open book file for hashing")?;
    let mut reader = BufReader::new(file).take(1024 * 1024);

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    let result = hasher.finalize();

    // Return first 16 hex characters
    Ok(format!("{:x}", result)[..16].to_string())
}

/// Create (or reopen) the working directories of a book.
pub fn prepare_dirs(data_dir: &Path, book_hash: &str) -> Result<SessionDirs> {
    let dirs = SessionDirs::new(data_dir.join(book_hash));
    fs::create_dir_all(&dirs.sentences).with_context(|| {
        format!(
            "Failed to create working directory {}",
            dirs.sentences.display()
        )
    })?;
    Ok(dirs)
}

/// Make a string safe to use as a file name.
///
/// `&` becomes `And`; whitespace and characters forbidden on common
/// filesystems become `_`.
pub fn get_sanitized(name: &str) -> String {
    let name = name.replace('&', "And");
    let name = WHITESPACE.replace_all(&name, "_");
    let name = FORBIDDEN_CHARS.replace_all(&name, "_");
    name.trim_matches('_').to_string()
}

/// Load the manifest of a working directory, if one was saved.
pub fn load_manifest(dirs: &SessionDirs) -> Result<Option<SessionManifest>> {
    let path = dirs.root.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(&path).context("Failed to open session manifest")?;
    let manifest = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(manifest))
}

/// Save the manifest, stamping its update time.
pub fn save_manifest(dirs: &SessionDirs, manifest: &SessionManifest) -> Result<()> {
    let path = dirs.root.join(MANIFEST_FILE);
    let mut manifest = manifest.clone();
    manifest.updated_at = Utc::now();

    let file = File::create(&path).context("Failed to create session manifest")?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &manifest).context("Failed to write session JSON")?;
    Ok(())
}

/// Remove a book's working directory.
pub fn cleanup_session(dirs: &SessionDirs) -> Result<()> {
    if dirs.root.exists() {
        fs::remove_dir_all(&dirs.root)
            .with_context(|| format!("Failed to remove {}", dirs.root.display()))?;
    }
    Ok(())
}

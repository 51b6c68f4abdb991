//! FFmpeg metadata generation for audiobook tags and chapter markers.

use super::OutputFormat;
use crate::epub::BookMetadata;
use crate::text::PAUSE_SENTINEL;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fmt::Write as _;
use std::path::Path;

/// Information about a chapter marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterInfo {
    /// Chapter title
    pub title: String,
    /// Start position in milliseconds
    pub start_ms: u64,
    /// End position in milliseconds
    pub end_ms: u64,
}

impl ChapterInfo {
    /// Create a new chapter info.
    pub fn new(title: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            title: title.into(),
            start_ms,
            end_ms,
        }
    }
}

/// Render the FFMETADATA1 document for one audiobook part.
///
/// Tag keys follow the container: upper case for vorbis comments, `date`
/// instead of `year` there, and publisher or identifiers only where the
/// container has a field for them.
pub fn render_ffmpeg_metadata(
    book: &BookMetadata,
    format: OutputFormat,
    chapters: &[ChapterInfo],
) -> String {
    let tag = |key: &str| {
        if format.is_vorbis() {
            key.to_uppercase()
        } else {
            key.to_string()
        }
    };
    let rich_tags = format.is_mp4_like() || format == OutputFormat::Mp3;

    let mut out = String::from(";FFMETADATA1\n");
    let mut push = |key: &str, value: &str| {
        let _ = writeln!(out, "{}={}", tag(key), escape_metadata_value(value));
    };

    if !book.title.is_empty() {
        push("title", &book.title);
    }
    if let Some(creator) = &book.creator {
        push("artist", creator);
    }
    if !book.language.is_empty() {
        push("language", &book.language);
    }
    if let Some(description) = &book.description {
        push("description", description);
    }
    if rich_tags {
        if let Some(publisher) = &book.publisher {
            push("publisher", publisher);
        }
    }
    let year = publication_year(book.published.as_deref()).to_string();
    push(if format.is_vorbis() { "date" } else { "year" }, &year);
    if rich_tags {
        if let Some(isbn) = &book.isbn {
            push("isbn", isbn);
        }
        if let Some(asin) = &book.asin {
            push("asin", asin);
        }
    }

    for chapter in chapters {
        let _ = writeln!(out, "[CHAPTER]");
        let _ = writeln!(out, "TIMEBASE=1/1000");
        let _ = writeln!(out, "START={}", chapter.start_ms);
        let _ = writeln!(out, "END={}", chapter.end_ms);
        let _ = writeln!(
            out,
            "{}={}",
            tag("title"),
            escape_metadata_value(&chapter.title)
        );
    }

    out
}

/// Write the metadata document for one part.
pub fn write_ffmpeg_metadata(
    book: &BookMetadata,
    format: OutputFormat,
    chapters: &[ChapterInfo],
    output_path: &Path,
) -> Result<()> {
    std::fs::write(output_path, render_ffmpeg_metadata(book, format, chapters))
        .with_context(|| format!("Failed to create metadata file {}", output_path.display()))
}

/// Escape special characters in metadata values.
///
/// FFmpeg metadata values need to escape: = ; # \ and newlines
fn escape_metadata_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '=' | ';' | '#' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => {
                escaped.push_str("\\n");
            }
            '\r' => {
                // Skip carriage returns
            }
            _ => {
                escaped.push(c);
            }
        }
    }

    escaped
}

/// Strip pause markers and stray whitespace from a chapter title.
pub fn sanitize_chapter_title(title: &str) -> String {
    title
        .replace(PAUSE_SENTINEL, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Year of publication, or the current year when unknown.
fn publication_year(published: Option<&str>) -> i32 {
    published
        .and_then(|p| parse_year(p).or_else(|| parse_leading_year(p)))
        .unwrap_or_else(|| Utc::now().year())
}

fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.year());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d") {
        return Some(date.year());
    }
    None
}

fn parse_leading_year(value: &str) -> Option<i32> {
    let digits = value.trim().get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Build cumulative chapter markers from chapter durations.
///
/// # Arguments
/// * `durations_ms` - Duration of each chapter in milliseconds
/// * `titles` - Title of each chapter, same order
pub fn build_chapter_info(durations_ms: &[u64], titles: &[String]) -> Vec<ChapterInfo> {
    let mut start_ms = 0;
    durations_ms
        .iter()
        .zip(titles)
        .map(|(duration, title)| {
            let chapter = ChapterInfo::new(sanitize_chapter_title(title), start_ms, start_ms + duration);
            start_ms += duration;
            chapter
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn book() -> BookMetadata {
        BookMetadata {
            title: "My Book".into(),
            creator: Some("John Author".into()),
            language: "eng".into(),
            description: None,
            publisher: Some("Acme".into()),
            published: Some("2004-05-01T00:00:00+00:00".into()),
            isbn: Some("9780306406157".into()),
            asin: None,
        }
    }

    #[test]
    fn test_chapter_info_new() {
        let chapter = ChapterInfo::new("Chapter 1", 0, 60000);
        assert_eq!(chapter.title, "Chapter 1");
        assert_eq!(chapter.start_ms, 0);
        assert_eq!(chapter.end_ms, 60000);
    }

    #[test]
    fn test_escape_metadata_value() {
        assert_eq!(escape_metadata_value("Simple"), "Simple");
        assert_eq!(escape_metadata_value("Test=Value"), "Test\\=Value");
        assert_eq!(escape_metadata_value("Test;Value"), "Test\\;Value");
        assert_eq!(escape_metadata_value("Test#Value"), "Test\\#Value");
        assert_eq!(escape_metadata_value("Test\\Value"), "Test\\\\Value");
        assert_eq!(escape_metadata_value("Line1\nLine2"), "Line1\\nLine2");
    }

    #[test]
    fn test_mp4_metadata() {
        let chapters = vec![
            ChapterInfo::new("Chapter 1", 0, 60000),
            ChapterInfo::new("Chapter 2", 60000, 120000),
        ];
        let content = render_ffmpeg_metadata(&book(), OutputFormat::M4b, &chapters);
        assert!(content.starts_with(";FFMETADATA1\n"));
        assert!(content.contains("title=My Book\n"));
        assert!(content.contains("artist=John Author\n"));
        assert!(content.contains("publisher=Acme\n"));
        assert!(content.contains("year=2004\n"));
        assert!(content.contains("isbn=9780306406157\n"));
        assert!(content.contains("[CHAPTER]\nTIMEBASE=1/1000\nSTART=60000\nEND=120000\ntitle=Chapter 2\n"));
    }

    #[test]
    fn test_vorbis_metadata() {
        let content = render_ffmpeg_metadata(&book(), OutputFormat::Ogg, &[]);
        assert!(content.contains("TITLE=My Book\n"));
        assert!(content.contains("DATE=2004\n"));
        assert!(!content.contains("PUBLISHER"));
        assert!(!content.contains("ISBN"));
    }

    #[test]
    fn test_write_metadata_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata_part1.txt");
        write_ffmpeg_metadata(&book(), OutputFormat::Mp3, &[], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("publisher=Acme"));
    }

    #[test]
    fn test_publication_year() {
        assert_eq!(publication_year(Some("1999-12-31")), 1999);
        assert_eq!(publication_year(Some("1851")), 1851);
        assert_eq!(publication_year(Some("garbage")), Utc::now().year());
        assert_eq!(publication_year(None), Utc::now().year());
    }

    #[test]
    fn test_build_chapter_info() {
        let titles = vec![
            "Chapter one;".to_string(),
            format!("Two {} parts", PAUSE_SENTINEL),
            "Three".to_string(),
        ];
        let chapters = build_chapter_info(&[1000, 2000, 3000], &titles);

        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0], ChapterInfo::new("Chapter one;", 0, 1000));
        assert_eq!(chapters[1], ChapterInfo::new("Two parts", 1000, 3000));
        assert_eq!(chapters[2], ChapterInfo::new("Three", 3000, 6000));
    }
}

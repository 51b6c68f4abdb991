// EPUB container reading: metadata, cover and body documents in spine order

use crate::error::PipelineError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Book-level metadata written into the audiobook tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub creator: Option<String>,
    /// ISO 639-3 code of the language the book is read in
    pub language: String,
    pub description: Option<String>,
    pub publisher: Option<String>,
    /// Publication date as found in the package, e.g. `2004-05-01T00:00:00+00:00`
    pub published: Option<String>,
    pub isbn: Option<String>,
    pub asin: Option<String>,
}

/// One body document of the spine.
#[derive(Debug, Clone)]
pub struct Document {
    /// Manifest id
    pub id: String,
    pub html: String,
}

/// Parsed EPUB book
#[derive(Debug)]
pub struct Book {
    pub metadata: BookMetadata,
    /// Body documents in reading order
    pub documents: Vec<Document>,
    /// Cover image data (if available)
    pub cover_image: Option<Vec<u8>>,
}

/// Open an EPUB file and read everything the pipeline needs.
///
/// `language` is the ISO 639-3 code chosen for the conversion; it is recorded in
/// the metadata, and a mismatch with the package language is only logged.
pub fn read_epub(path: &Path, language: &str) -> Result<Book> {
    let mut doc = epub::doc::EpubDoc::new(path)
        .map_err(|e| anyhow::anyhow!("Failed to open EPUB {}: {}", path.display(), e))?;

    let field = |name: &str| {
        doc.mdata(name)
            .map(|m| m.value.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let title = field("title").unwrap_or_else(|| fallback_title(path));
    let creator = field("creator").filter(|c| c != "Unknown");
    let description = field("description");
    let publisher = field("publisher");
    let published = field("date");
    let package_language = field("language");

    let identifiers: Vec<String> = doc
        .metadata
        .iter()
        .filter(|m| m.property == "identifier")
        .map(|m| m.value.trim().to_string())
        .collect();
    let (isbn, asin) = classify_identifiers(&identifiers);

    if let Some(package_language) = &package_language {
        if !language_matches(package_language, language) {
            log::warn!(
                "Selected language {} differs from the EPUB language {}",
                language,
                package_language
            );
        }
    }

    let cover_image = extract_cover_image(&mut doc);

    let mut documents = Vec::new();
    let spine = doc.spine.clone();
    for spine_item in spine.iter() {
        let resource = doc.get_resource(&spine_item.idref).map(|(bytes, _mime)| bytes);
        documents.push(spine_document(&spine_item.idref, resource)?);
    }

    if documents.is_empty() {
        anyhow::bail!("EPUB {} has no body documents", path.display());
    }

    Ok(Book {
        metadata: BookMetadata {
            title,
            creator,
            language: language.to_string(),
            description,
            publisher,
            published,
            isbn,
            asin,
        },
        documents,
        cover_image,
    })
}

/// A spine entry must resolve to a manifest resource; a missing body would
/// silently drop a chapter.
fn spine_document(id: &str, resource: Option<Vec<u8>>) -> Result<Document, PipelineError> {
    let bytes = resource.ok_or_else(|| PipelineError::InvalidDocument {
        document: id.to_string(),
        reason: "spine item has no resource in the manifest".to_string(),
    })?;
    Ok(Document {
        id: id.to_string(),
        html: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Write the cover image next to the working files.
pub fn save_cover(book: &Book, dir: &Path) -> Result<Option<std::path::PathBuf>> {
    let Some(data) = &book.cover_image else {
        return Ok(None);
    };
    let path = dir.join(detect_cover_filename(data));
    std::fs::write(&path, data)
        .with_context(|| format!("Failed to write cover to {}", path.display()))?;
    Ok(Some(path))
}

/// Detect cover image format and return appropriate filename.
fn detect_cover_filename(data: &[u8]) -> &'static str {
    // Check magic bytes for common image formats
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "cover.png"
    } else if data.starts_with(b"GIF") {
        "cover.gif"
    } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
        "cover.webp"
    } else {
        // JPEG, and the default as it's most common
        "cover.jpg"
    }
}

fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn language_matches(package_language: &str, iso3: &str) -> bool {
    let primary = package_language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match crate::lang::lookup(iso3) {
        Ok(lang) => primary == lang.iso3 || primary == lang.iso1,
        Err(_) => primary == iso3,
    }
}

/// Pick an ISBN and an ASIN out of the package identifiers.
fn classify_identifiers(identifiers: &[String]) -> (Option<String>, Option<String>) {
    let mut isbn = None;
    let mut asin = None;
    for id in identifiers {
        let lower = id.to_ascii_lowercase();
        if let Some(rest) = lower
            .strip_prefix("urn:isbn:")
            .or_else(|| lower.strip_prefix("isbn:"))
        {
            isbn.get_or_insert_with(|| rest.to_string());
        } else if let Some(rest) = lower
            .strip_prefix("urn:asin:")
            .or_else(|| lower.strip_prefix("mobi-asin:"))
            .or_else(|| lower.strip_prefix("asin:"))
        {
            asin.get_or_insert_with(|| rest.to_uppercase());
        } else if looks_like_isbn(id) {
            isbn.get_or_insert_with(|| id.clone());
        }
    }
    (isbn, asin)
}

fn looks_like_isbn(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    matches!(digits.len(), 10 | 13)
        && digits
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || (i == 9 && digits.len() == 10 && c == 'X'))
}

/// Extract cover image from EPUB document
fn extract_cover_image(
    doc: &mut epub::doc::EpubDoc<std::io::BufReader<std::fs::File>>,
) -> Option<Vec<u8>> {
    // Try the get_cover() method first (standard EPUB cover)
    if let Some((cover_bytes, _mime)) = doc.get_cover() {
        return Some(cover_bytes);
    }

    // Fallback: look for cover in metadata
    if let Some(cover_id) = doc.mdata("cover").map(|m| m.value.clone()) {
        if let Some((cover_bytes, _mime)) = doc.get_resource(&cover_id) {
            return Some(cover_bytes);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_identifiers() {
        let ids = vec![
            "urn:uuid:1234".to_string(),
            "urn:isbn:9780306406157".to_string(),
            "mobi-asin:b00abc1234".to_string(),
        ];
        assert_eq!(
            classify_identifiers(&ids),
            (Some("9780306406157".into()), Some("B00ABC1234".into()))
        );
    }

    #[test]
    fn test_bare_isbn() {
        let ids = vec!["0-306-40615-2".to_string()];
        assert_eq!(classify_identifiers(&ids).0, Some("0-306-40615-2".into()));
        assert!(!looks_like_isbn("12345"));
    }

    #[test]
    fn test_cover_filename() {
        assert_eq!(detect_cover_filename(&[0xFF, 0xD8, 0xFF, 0xE0]), "cover.jpg");
        assert_eq!(detect_cover_filename(&[0x89, 0x50, 0x4E, 0x47, 0x0D]), "cover.png");
        assert_eq!(detect_cover_filename(b"RIFF\0\0\0\0WEBPVP8 "), "cover.webp");
    }

    #[test]
    fn test_fallback_title() {
        assert_eq!(fallback_title(Path::new("/books/war_and_peace.epub")), "war and peace");
    }

    #[test]
    fn test_language_matches() {
        assert!(language_matches("en-GB", "eng"));
        assert!(language_matches("fra", "fra"));
        assert!(!language_matches("de", "eng"));
    }

    #[test]
    fn test_spine_document() {
        let document = spine_document("ch1", Some(b"<p>Hi</p>".to_vec())).unwrap();
        assert_eq!(document.id, "ch1");
        assert_eq!(document.html, "<p>Hi</p>");

        let err = spine_document("ch2", None).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidDocument { ref document, .. } if document == "ch2"
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_epub(Path::new("/nonexistent/book.epub"), "eng").is_err());
    }
}

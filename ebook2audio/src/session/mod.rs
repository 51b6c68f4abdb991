//! Conversion session: configuration of one run and the book's working directories.

mod persistence;
mod types;

pub use persistence::{
    cleanup_session, compute_book_hash, default_data_dir, get_sanitized, load_manifest,
    prepare_dirs, save_manifest,
};
pub use types::{ConversionSession, SessionDirs, SessionManifest, temp_sibling};

#[cfg(test)]
pub(crate) fn test_session(root: &std::path::Path) -> ConversionSession {
    let dirs = SessionDirs::new(root.join("book"));
    std::fs::create_dir_all(&dirs.sentences).unwrap();
    ConversionSession {
        language: crate::lang::lookup("eng").unwrap(),
        engine: crate::tts::TtsEngine::Xtts,
        output_format: crate::audio::OutputFormat::M4b,
        split_hours: 12,
        pause: std::time::Duration::from_millis(1400),
        merge_batch_size: 1024,
        synth_attempts: 1,
        metadata: crate::epub::BookMetadata {
            title: "Test Book".into(),
            language: "eng".into(),
            ..Default::default()
        },
        cover: None,
        dirs,
        output_dir: root.join("out"),
        chapters: Vec::new(),
        cancellation: crate::cancellation::CancellationToken::new(),
    }
}

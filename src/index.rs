//! Candidate index: library records with their comparison forms precomputed.
//!
//! Built once per import run. Matching compares every external title against
//! every candidate, so nothing here may be recomputed per title.

use rayon::prelude::*;
use std::path::Path;

use crate::keywords::extract_keywords;
use crate::models::{KeywordSet, LibraryRecord};
use crate::normalize::normalize;

/// Artist tags that say nothing about the track.
const PLACEHOLDER_ARTISTS: &[&str] = &[
    "unknown",
    "unknown artist",
    "various artists",
];

/// True for empty or generic artist tags such as `<unknown>` or "Unknown Artist".
pub fn is_placeholder_artist(artist_norm: &str) -> bool {
    artist_norm.is_empty() || PLACEHOLDER_ARTISTS.contains(&artist_norm)
}

/// Basename of a path without its extension.
pub fn file_stem(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

#[derive(Clone, Debug)]
pub struct IndexedRecord {
    pub record: LibraryRecord,
    pub title_norm: String,
    /// Empty when the tag is a placeholder.
    pub artist_norm: String,
    pub filename_norm: String,
    /// Keywords of the title plus keywords of the artist.
    pub metadata_keywords: KeywordSet,
    pub file_keywords: KeywordSet,
}

impl IndexedRecord {
    pub fn new(record: LibraryRecord) -> Self {
        let title_norm = normalize(&record.title);
        let mut artist_norm = normalize(&record.artist);
        if is_placeholder_artist(&artist_norm) {
            artist_norm.clear();
        }
        let filename_norm = normalize(file_stem(&record.path));

        let mut metadata_keywords = extract_keywords(&title_norm);
        metadata_keywords.extend(extract_keywords(&artist_norm));
        let file_keywords = extract_keywords(&filename_norm);

        Self {
            record,
            title_norm,
            artist_norm,
            filename_norm,
            metadata_keywords,
            file_keywords,
        }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }
}

/// Immutable, per-run index over a library snapshot. Order follows the snapshot.
#[derive(Clone, Debug, Default)]
pub struct CandidateIndex {
    records: Vec<IndexedRecord>,
}

impl CandidateIndex {
    pub fn build(library: &[LibraryRecord]) -> Self {
        let records: Vec<IndexedRecord> = library
            .par_iter()
            .cloned()
            .map(IndexedRecord::new)
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[IndexedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

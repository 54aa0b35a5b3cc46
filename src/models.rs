//! Core data models for playlist import.
//!
//! This module contains the library record handed in by the caller, the
//! per-title decision records produced while matching, and the final
//! [`ImportResult`].

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::index::IndexedRecord;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unigram and underscore-joined bigram keywords derived from one text.
pub type KeywordSet = FxHashSet<String>;

// ============================================================================
// Library Models
// ============================================================================

/// One track of the local audio library. Read-only to the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: i64,
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

// ============================================================================
// External Models
// ============================================================================

/// A raw title from the playlist source plus its 0-based position in fetch order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalTitle {
    pub position: usize,
    pub title: String,
}

// ============================================================================
// Scoring Models
// ============================================================================

/// Which keyword set of a candidate carried the fuzzy match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    File,
    Metadata,
}

/// Decision tier that produced a match, in the order the tiers are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactFilename,
    SubstringFilename,
    Fuzzy,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchTier::ExactFilename => "exact-filename",
            MatchTier::SubstringFilename => "substring-filename",
            MatchTier::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}

/// Score of one candidate against one external title. Lives only while a
/// single title is being decided.
#[derive(Clone, Debug)]
pub struct MatchCandidateScore<'a> {
    pub record: &'a IndexedRecord,
    /// Combined 0.75 file / 0.25 metadata score, in [0, 1].
    pub score: f64,
    pub source: MatchSource,
    /// Keywords shared with the winning source's set.
    pub shared_keywords: KeywordSet,
}

// ============================================================================
// Result Models
// ============================================================================

/// A title that was matched to a library record.
#[derive(Clone, Debug, Serialize)]
pub struct MatchedTitle {
    pub position: usize,
    pub title: String,
    pub record_id: i64,
    pub tier: MatchTier,
    pub score: f64,
    /// Sorted for stable reports; empty for the filename tiers.
    pub shared_keywords: Vec<String>,
}

/// Why a title ended up without a match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// No tier accepted a candidate. `best_score` is the best fuzzy score seen, if any.
    NoMatch { best_score: Option<f64> },
    /// The selected record was already claimed by the title at `claimed_by`.
    Duplicate { record_id: i64, claimed_by: usize },
}

#[derive(Clone, Debug, Serialize)]
pub struct UnmatchedTitle {
    pub position: usize,
    pub title: String,
    pub reason: UnmatchedReason,
}

impl UnmatchedTitle {
    pub fn is_duplicate(&self) -> bool {
        matches!(self.reason, UnmatchedReason::Duplicate { .. })
    }
}

impl fmt::Display for UnmatchedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_duplicate() {
            write!(f, "{} (duplicate)", self.title)
        } else {
            f.write_str(&self.title)
        }
    }
}

/// Final outcome of one import run.
///
/// Every fetched title produces exactly one entry in either `matched_songs`
/// (with its detail in `matches`) or `unmatched_titles`, so
/// `matched_songs.len() + unmatched_titles.len() == total_videos`.
#[derive(Clone, Debug, Serialize)]
pub struct ImportResult {
    pub playlist_title: String,
    pub total_videos: usize,
    /// In fetch order; no record id appears twice.
    pub matched_songs: Vec<LibraryRecord>,
    pub unmatched_titles: Vec<UnmatchedTitle>,
    /// Parallel to `matched_songs`.
    pub matches: Vec<MatchedTitle>,
}

impl ImportResult {
    pub fn new(playlist_title: String, total_videos: usize) -> Self {
        Self {
            playlist_title,
            total_videos,
            matched_songs: Vec::new(),
            unmatched_titles: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Match rate as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.total_videos == 0 {
            0.0
        } else {
            100.0 * self.matched_songs.len() as f64 / self.total_videos as f64
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.unmatched_titles.iter().filter(|u| u.is_duplicate()).count()
    }

    /// Unmatched titles as display strings, duplicates annotated.
    pub fn unmatched_display(&self) -> Vec<String> {
        self.unmatched_titles.iter().map(|u| u.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_display_annotates_duplicates() {
        let miss = UnmatchedTitle {
            position: 0,
            title: "Song A".to_string(),
            reason: UnmatchedReason::NoMatch { best_score: None },
        };
        let dup = UnmatchedTitle {
            position: 3,
            title: "Song B".to_string(),
            reason: UnmatchedReason::Duplicate {
                record_id: 7,
                claimed_by: 1,
            },
        };
        assert_eq!(miss.to_string(), "Song A");
        assert_eq!(dup.to_string(), "Song B (duplicate)");
    }

    #[test]
    fn test_match_rate_empty_playlist() {
        let result = ImportResult::new("Mix".to_string(), 0);
        assert_eq!(result.match_rate(), 0.0);
    }

    #[test]
    fn test_library_record_json_defaults() {
        let json = r#"{"id": 4, "title": "Song", "path": "/music/Song.mp3"}"#;
        let record: LibraryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.artist, "");
        assert_eq!(record.size, 0);
    }
}

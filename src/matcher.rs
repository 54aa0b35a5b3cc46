//! Tiered match selection: one library record (or none) per external title.
//!
//! Tiers are tried in order and the first hit wins:
//! 1. exact filename (string similarity ≥ 0.95)
//! 2. filename / title substring containment
//! 3. weighted fuzzy keyword score, 0.75 file + 0.25 metadata
//!
//! A record selected for one title is never given to a later title in the
//! same run; the later title is recorded as a duplicate instead of being
//! retried against its next-best candidate.

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::index::{CandidateIndex, IndexedRecord};
use crate::keywords::{extract_keywords, unigram_count};
use crate::models::{
    ExternalTitle, KeywordSet, MatchCandidateScore, MatchSource, MatchTier, UnmatchedReason,
};
use crate::normalize::normalize_external_title;
use crate::scoring::{score, string_similarity};

// ============================================================================
// Thresholds
// ============================================================================

/// Tier 1: minimum similarity between filename and query.
pub const EXACT_FILENAME_SIMILARITY: f64 = 0.95;

/// Tier 1: shorter filenames are too generic to short-circuit on.
pub const EXACT_FILENAME_MIN_LEN: usize = 10;

/// Tier 2: both filename and query must be at least this long.
pub const SUBSTRING_MIN_LEN: usize = 15;

/// Tier 3: weight of the filename keyword score.
pub const FILE_WEIGHT: f64 = 0.75;

/// Tier 3: weight of the title/artist keyword score.
pub const METADATA_WEIGHT: f64 = 0.25;

/// Tier 3: minimum combined score to accept a match.
pub const ACCEPT_THRESHOLD: f64 = 0.28;

/// Tier 3: minimum shared unigrams unless the score is strong.
pub const MIN_SHARED_WORDS: usize = 2;

/// Tier 3: combined score that bypasses the shared-word floor.
pub const STRONG_MATCH_THRESHOLD: f64 = 0.45;

// ============================================================================
// Decisions
// ============================================================================

/// Outcome of matching one external title.
#[derive(Clone, Debug)]
pub enum TitleDecision<'a> {
    Matched {
        candidate: MatchCandidateScore<'a>,
        tier: MatchTier,
    },
    Unmatched(UnmatchedReason),
}

/// Result of the tier policy before de-duplication.
#[derive(Clone, Debug)]
enum Selection<'a> {
    Hit {
        candidate: MatchCandidateScore<'a>,
        tier: MatchTier,
    },
    Miss {
        best_score: Option<f64>,
    },
}

// ============================================================================
// Selector
// ============================================================================

/// Matches titles one at a time against an index, remembering which records
/// have already been claimed in this run.
pub struct MatchSelector<'a> {
    index: &'a CandidateIndex,
    /// record id → position of the title that claimed it
    claimed: FxHashMap<i64, usize>,
}

impl<'a> MatchSelector<'a> {
    pub fn new(index: &'a CandidateIndex) -> Self {
        Self {
            index,
            claimed: FxHashMap::default(),
        }
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Decide the match for one title and record the claim if it matched.
    pub fn select(&mut self, title: &ExternalTitle) -> TitleDecision<'a> {
        let query = normalize_external_title(&title.title);

        match self.find_candidate(&query) {
            Selection::Miss { best_score } => {
                debug!(
                    "#{} no match for '{}' (best fuzzy score {:?})",
                    title.position, title.title, best_score
                );
                TitleDecision::Unmatched(UnmatchedReason::NoMatch { best_score })
            }
            Selection::Hit { candidate, tier } => {
                let record_id = candidate.record.id();
                if let Some(&claimed_by) = self.claimed.get(&record_id) {
                    info!(
                        "#{} '{}' selected record {} already claimed by #{}",
                        title.position, title.title, record_id, claimed_by
                    );
                    return TitleDecision::Unmatched(UnmatchedReason::Duplicate {
                        record_id,
                        claimed_by,
                    });
                }
                self.claimed.insert(record_id, title.position);
                debug!(
                    "#{} '{}' -> {} via {} (score {:.3})",
                    title.position, title.title, candidate.record.record.path, tier, candidate.score
                );
                TitleDecision::Matched { candidate, tier }
            }
        }
    }

    fn find_candidate(&self, query: &str) -> Selection<'a> {
        if let Some(candidate) = self.exact_filename(query) {
            return Selection::Hit {
                candidate,
                tier: MatchTier::ExactFilename,
            };
        }
        if let Some(candidate) = self.substring_filename(query) {
            return Selection::Hit {
                candidate,
                tier: MatchTier::SubstringFilename,
            };
        }

        let query_keywords = extract_keywords(query);
        match self.best_fuzzy(&query_keywords) {
            Some(best) if is_acceptable(&best) => Selection::Hit {
                candidate: best,
                tier: MatchTier::Fuzzy,
            },
            Some(best) => {
                debug!(
                    "near miss: '{}' vs '{}' scored {:.3} with {} shared words",
                    query,
                    best.record.filename_norm,
                    best.score,
                    unigram_count(&best.shared_keywords)
                );
                Selection::Miss {
                    best_score: Some(best.score),
                }
            }
            None => Selection::Miss { best_score: None },
        }
    }

    /// Tier 1: first candidate whose filename is practically the query.
    fn exact_filename(&self, query: &str) -> Option<MatchCandidateScore<'a>> {
        let index: &'a CandidateIndex = self.index;
        index.records().iter().find_map(|rec| {
            if rec.filename_norm.len() < EXACT_FILENAME_MIN_LEN {
                return None;
            }
            let similarity = string_similarity(&rec.filename_norm, query);
            (similarity >= EXACT_FILENAME_SIMILARITY).then(|| filename_hit(rec, similarity))
        })
    }

    /// Tier 2: first candidate whose filename contains the query or vice versa.
    fn substring_filename(&self, query: &str) -> Option<MatchCandidateScore<'a>> {
        if query.len() < SUBSTRING_MIN_LEN {
            return None;
        }
        let index: &'a CandidateIndex = self.index;
        index.records().iter().find_map(|rec| {
            let filename = rec.filename_norm.as_str();
            if filename.len() < SUBSTRING_MIN_LEN {
                return None;
            }
            (filename.contains(query) || query.contains(filename))
                .then(|| filename_hit(rec, string_similarity(filename, query)))
        })
    }

    /// Tier 3: candidate with the highest combined score, if any scored above zero.
    /// Ties keep the earliest candidate.
    fn best_fuzzy(&self, query_keywords: &KeywordSet) -> Option<MatchCandidateScore<'a>> {
        if query_keywords.is_empty() {
            return None;
        }

        let index: &'a CandidateIndex = self.index;
        let mut best: Option<(&'a IndexedRecord, f64, f64, f64)> = None;
        for rec in index.records() {
            let file_score = score(query_keywords, &rec.file_keywords);
            let metadata_score = score(query_keywords, &rec.metadata_keywords);
            let combined = FILE_WEIGHT * file_score + METADATA_WEIGHT * metadata_score;
            if combined > 0.0 && best.map_or(true, |(_, top, _, _)| combined > top) {
                best = Some((rec, combined, file_score, metadata_score));
            }
        }

        best.map(|(rec, combined, file_score, metadata_score)| {
            let (source, keywords) = if file_score >= metadata_score {
                (MatchSource::File, &rec.file_keywords)
            } else {
                (MatchSource::Metadata, &rec.metadata_keywords)
            };
            MatchCandidateScore {
                record: rec,
                score: combined,
                source,
                shared_keywords: query_keywords.intersection(keywords).cloned().collect(),
            }
        })
    }
}

fn filename_hit(rec: &IndexedRecord, similarity: f64) -> MatchCandidateScore<'_> {
    MatchCandidateScore {
        record: rec,
        score: similarity,
        source: MatchSource::File,
        shared_keywords: KeywordSet::default(),
    }
}

/// Tier 3 acceptance: score over threshold, and either two shared words or a strong score.
fn is_acceptable(best: &MatchCandidateScore<'_>) -> bool {
    if best.score < ACCEPT_THRESHOLD {
        return false;
    }
    let shared_words = unigram_count(&best.shared_keywords);
    shared_words >= MIN_SHARED_WORDS || best.score >= STRONG_MATCH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LibraryRecord;

    fn record(id: i64, title: &str, artist: &str, path: &str) -> LibraryRecord {
        LibraryRecord {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            album: String::new(),
            duration_ms: 180_000,
            path: path.to_string(),
            size: 3_000_000,
        }
    }

    fn title(position: usize, text: &str) -> ExternalTitle {
        ExternalTitle {
            position,
            title: text.to_string(),
        }
    }

    fn matched_id(decision: &TitleDecision<'_>) -> Option<(i64, MatchTier)> {
        match decision {
            TitleDecision::Matched { candidate, tier } => Some((candidate.record.id(), *tier)),
            TitleDecision::Unmatched(_) => None,
        }
    }

    #[test]
    fn test_exact_filename_without_tags() {
        let index = CandidateIndex::build(&[record(1, "", "", "/music/Artist - Song.mp3")]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Artist - Song (Official Video)"));
        assert_eq!(matched_id(&decision), Some((1, MatchTier::ExactFilename)));
    }

    #[test]
    fn test_substring_filename() {
        let index = CandidateIndex::build(&[
            record(1, "", "", "/m/short.mp3"),
            record(2, "", "", "/m/01 - Massive Attack - Teardrop (Remastered 2019).flac"),
        ]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Massive Attack - Teardrop"));
        assert_eq!(matched_id(&decision), Some((2, MatchTier::SubstringFilename)));
    }

    #[test]
    fn test_substring_needs_min_query_length() {
        let index = CandidateIndex::build(&[record(
            1,
            "",
            "",
            "/m/Massive Attack - Teardrop (Remastered 2019).flac",
        )]);

        // "massive attack" is 14 characters: contained, but too short for tier 2
        assert_eq!(normalize_external_title("Massive Attack").len(), SUBSTRING_MIN_LEN - 1);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Massive Attack"));
        assert_eq!(matched_id(&decision), Some((1, MatchTier::Fuzzy)));

        // "attack teardrop" is exactly 15
        assert_eq!(normalize_external_title("Attack Teardrop").len(), SUBSTRING_MIN_LEN);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Attack Teardrop"));
        assert_eq!(matched_id(&decision), Some((1, MatchTier::SubstringFilename)));
    }

    #[test]
    fn test_fuzzy_metadata_match() {
        let index = CandidateIndex::build(&[
            record(1, "Under Pressure", "Queen", "/m/05 Under Pressure.mp3"),
            record(2, "Bohemian Rhapsody", "Queen", "/m/01 Bohemian Rhapsody.mp3"),
        ]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Queen – Bohemian Rhapsody (Official Video Remastered)"));
        match decision {
            TitleDecision::Matched { candidate, tier } => {
                assert_eq!(tier, MatchTier::Fuzzy);
                assert_eq!(candidate.record.id(), 2);
                assert_eq!(candidate.source, MatchSource::Metadata);
                assert!(candidate.score >= ACCEPT_THRESHOLD);
                assert!(candidate.shared_keywords.contains("bohemian_rhapsody"));
            }
            TitleDecision::Unmatched(reason) => panic!("expected match, got {reason:?}"),
        }
    }

    #[test]
    fn test_exact_filename_beats_better_fuzzy_candidate() {
        let query = "Golden Brown Morning Light Over The Harbour Tonight Again With Feeling And Grace Forever";
        let index = CandidateIndex::build(&[
            // Same keywords as the query ("qz" is too short to count) but a different string
            record(
                1,
                "",
                "",
                "/m/Golden Brown qz Morning Light Over The Harbour Tonight Again With Feeling And Grace Forever.mp3",
            ),
            // Nearly the same string, one extra keyword
            record(
                2,
                "",
                "",
                "/m/Golden Brown Morning Light Over The Harbour Tonight Again With Feeling And Grace Forever xyz.mp3",
            ),
        ]);

        let fuzzy_first = score(
            &extract_keywords(query),
            &index.records()[0].file_keywords,
        );
        let fuzzy_second = score(
            &extract_keywords(query),
            &index.records()[1].file_keywords,
        );
        assert!(fuzzy_first > fuzzy_second);

        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, query));
        assert_eq!(matched_id(&decision), Some((2, MatchTier::ExactFilename)));
    }

    #[test]
    fn test_decoration_only_title_unmatched() {
        let index = CandidateIndex::build(&[record(1, "Official Video", "", "/m/official video.mp3")]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Official Video"));
        assert!(matches!(
            decision,
            TitleDecision::Unmatched(UnmatchedReason::NoMatch { best_score: None })
        ));
    }

    #[test]
    fn test_duplicate_claim_not_retried() {
        let index = CandidateIndex::build(&[
            record(1, "", "", "/m/Artist Name - Song Title.mp3"),
            record(2, "", "", "/m/Artist Name - Song Title (Live).mp3"),
        ]);
        let mut selector = MatchSelector::new(&index);

        let first = selector.select(&title(0, "Artist Name - Song Title (Official Video)"));
        assert_eq!(matched_id(&first), Some((1, MatchTier::ExactFilename)));

        let second = selector.select(&title(1, "Artist Name - Song Title [Lyrics]"));
        match second {
            TitleDecision::Unmatched(UnmatchedReason::Duplicate {
                record_id,
                claimed_by,
            }) => {
                assert_eq!(record_id, 1);
                assert_eq!(claimed_by, 0);
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(selector.claimed_count(), 1);
    }

    #[test]
    fn test_single_shared_word_needs_strong_score() {
        // One shared word, strong metadata agreement: 0.75*0.467 + 0.25*0.467 ≥ 0.45
        let index = CandidateIndex::build(&[record(1, "Hallelujah", "", "/m/hallelujah.mp3")]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Buckley Hallelujah"));
        assert_eq!(matched_id(&decision), Some((1, MatchTier::Fuzzy)));

        // Same file, no usable tags: 0.75*0.467 = 0.35, over 0.28 but under 0.45
        let index = CandidateIndex::build(&[record(1, "", "", "/m/hallelujah.mp3")]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Buckley Hallelujah"));
        match decision {
            TitleDecision::Unmatched(UnmatchedReason::NoMatch { best_score: Some(s) }) => {
                assert!(s >= ACCEPT_THRESHOLD && s < STRONG_MATCH_THRESHOLD);
            }
            other => panic!("expected near miss, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_title_unmatched() {
        let index = CandidateIndex::build(&[
            record(1, "Yellow", "Coldplay", "/m/Coldplay - Yellow.mp3"),
            record(2, "Clocks", "Coldplay", "/m/Coldplay - Clocks.mp3"),
        ]);
        let mut selector = MatchSelector::new(&index);
        let decision = selector.select(&title(0, "Radiohead - Karma Police"));
        assert!(matches!(decision, TitleDecision::Unmatched(UnmatchedReason::NoMatch { .. })));
    }

    #[test]
    fn test_untagged_file_shares_two_words() {
        let index = CandidateIndex::build(&[record(1, "", "", "/music/Artist - Song.mp3")]);
        let query = extract_keywords(&normalize_external_title("Artist - Song (Official Video)"));
        let shared: KeywordSet = query
            .intersection(&index.records()[0].file_keywords)
            .cloned()
            .collect();
        assert_eq!(unigram_count(&shared), 2);
    }
}

//! Import orchestration: fetch → index → per-title matching.
//!
//! ```text
//! Idle ──► Loading ──► Matching ──► Done
//!   │         │
//!   └─────────┴──────► Failed
//! ```
//!
//! An orchestrator runs once. Both terminal states are final; a second
//! `run` returns [`ImportError::AlreadyRun`].

use crossbeam_channel::Receiver;
use log::info;
use serde::Serialize;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::error::{ImportError, ImportOutcome};
use crate::fetch::{fetch_playlist, parse_playlist_id, FetchedPlaylist, PlaylistSource};
use crate::index::CandidateIndex;
use crate::matcher::{MatchSelector, TitleDecision};
use crate::models::{ImportResult, LibraryRecord, MatchedTitle, UnmatchedTitle};
use crate::progress::{ChannelSink, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    Idle,
    Loading,
    Matching,
    Done,
    Failed,
}

impl ImportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportState::Done | ImportState::Failed)
    }
}

pub struct ImportOrchestrator<S> {
    source: S,
    state: ImportState,
}

impl<S: PlaylistSource> ImportOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ImportState::Idle,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Run the whole import synchronously, reporting progress through `progress`.
    ///
    /// Fails before any fetch when the URL has no playlist id or the library
    /// is empty. A failed page fetch aborts with no partial result.
    pub fn run<P>(
        &mut self,
        playlist_url: &str,
        library: &[LibraryRecord],
        progress: &mut P,
    ) -> ImportOutcome<ImportResult>
    where
        P: ProgressSink + ?Sized,
    {
        if self.state != ImportState::Idle {
            return Err(ImportError::AlreadyRun);
        }

        let outcome = self.run_phases(playlist_url, library, progress);
        if let Err(err) = &outcome {
            info!("import failed: {}", err);
            self.transition(ImportState::Failed);
        }
        outcome
    }

    fn run_phases<P>(
        &mut self,
        playlist_url: &str,
        library: &[LibraryRecord],
        progress: &mut P,
    ) -> ImportOutcome<ImportResult>
    where
        P: ProgressSink + ?Sized,
    {
        let playlist_id = parse_playlist_id(playlist_url)?;
        if library.is_empty() {
            return Err(ImportError::EmptyLibrary);
        }

        self.transition(ImportState::Loading);
        let playlist = fetch_playlist(&self.source, &playlist_id, progress)?;
        info!(
            "fetched '{}': {} titles",
            playlist.title,
            playlist.titles.len()
        );

        self.transition(ImportState::Matching);
        let start = Instant::now();
        let index = CandidateIndex::build(library);
        info!(
            "indexed {} library records in {:.2}s",
            index.len(),
            start.elapsed().as_secs_f64()
        );
        let result = match_titles(&index, playlist, progress);

        self.transition(ImportState::Done);
        Ok(result)
    }

    fn transition(&mut self, next: ImportState) {
        info!("import state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl<S: PlaylistSource + Send + 'static> ImportOrchestrator<S> {
    /// Run the import on a worker thread. Progress events are pulled from the
    /// returned receiver, which disconnects when the run ends.
    pub fn spawn(
        mut self,
        playlist_url: String,
        library: Arc<[LibraryRecord]>,
    ) -> (Receiver<ProgressEvent>, JoinHandle<ImportOutcome<ImportResult>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = std::thread::spawn(move || {
            let mut sink = ChannelSink(tx);
            self.run(&playlist_url, &library, &mut sink)
        });
        (rx, handle)
    }
}

/// Match every fetched title, in fetch order, against a prepared index.
///
/// Emits one MATCHING event per title. Every title lands in exactly one of
/// `matched_songs` or `unmatched_titles`.
pub fn match_titles<P>(index: &CandidateIndex, playlist: FetchedPlaylist, progress: &mut P) -> ImportResult
where
    P: ProgressSink + ?Sized,
{
    let total = playlist.titles.len();
    let mut result = ImportResult::new(playlist.title, total);
    let mut selector = MatchSelector::new(index);

    for (done, title) in playlist.titles.into_iter().enumerate() {
        match selector.select(&title) {
            TitleDecision::Matched { candidate, tier } => {
                let mut shared_keywords: Vec<String> = candidate.shared_keywords.into_iter().collect();
                shared_keywords.sort_unstable();
                result.matches.push(MatchedTitle {
                    position: title.position,
                    title: title.title,
                    record_id: candidate.record.id(),
                    tier,
                    score: candidate.score,
                    shared_keywords,
                });
                result.matched_songs.push(candidate.record.record.clone());
            }
            TitleDecision::Unmatched(reason) => {
                result.unmatched_titles.push(UnmatchedTitle {
                    position: title.position,
                    title: title.title,
                    reason,
                });
            }
        }
        progress.emit(ProgressEvent::matching(done + 1, total, result.matched_songs.len()));
    }

    info!(
        "matched {}/{} titles ({} duplicates)",
        result.matched_songs.len(),
        total,
        result.duplicate_count()
    );
    result
}

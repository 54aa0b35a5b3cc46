//! Paginated retrieval of a playlist's video titles.
//!
//! [`PlaylistSource`] is the seam to the external platform: it returns one
//! decoded page per call. [`fetch_playlist`] walks the continuation tokens,
//! filters out unavailable videos and reports a LOADING event for each page
//! that moved the running count (the first page always reports).

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::error::{ImportError, ImportOutcome};
use crate::models::ExternalTitle;
use crate::progress::{ProgressEvent, ProgressSink};

/// Display title used when the source does not provide one.
pub const DEFAULT_PLAYLIST_TITLE: &str = "Imported Playlist";

/// Placeholder titles the platform uses for videos that are gone or hidden.
const UNAVAILABLE_TITLES: &[&str] = &["Private video", "Deleted video"];

/// First `list=` query value in a playlist URL.
pub static PLAYLIST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"list=([^&]+)").unwrap());

/// Extract the playlist identifier from a playlist or watch URL.
pub fn parse_playlist_id(url: &str) -> ImportOutcome<String> {
    PLAYLIST_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ImportError::InvalidPlaylistUrl(url.to_string()))
}

// ============================================================================
// Page model
// ============================================================================

/// One playlist entry as the source reported it, before filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageItem {
    pub title: Option<String>,
    pub privacy_status: Option<String>,
}

impl PageItem {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            privacy_status: None,
        }
    }

    /// The usable title, or `None` for private, deleted or untitled entries.
    pub fn available_title(&self) -> Option<&str> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() || UNAVAILABLE_TITLES.contains(&title) {
            return None;
        }
        if self.privacy_status.as_deref() == Some("private") {
            return None;
        }
        Some(title)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    /// Display title embedded in the page, if the source provides it.
    pub playlist_title: Option<String>,
    pub items: Vec<PageItem>,
    /// The source's estimate of the playlist size.
    pub total_results: Option<usize>,
    /// Absent on the last page.
    pub next_page_token: Option<String>,
}

/// A paginated playlist resource.
pub trait PlaylistSource {
    /// Fetch one page. `page_token` is `None` for the first page.
    fn fetch_page(&self, playlist_id: &str, page_token: Option<&str>) -> ImportOutcome<PlaylistPage>;
}

impl<T: PlaylistSource + ?Sized> PlaylistSource for &T {
    fn fetch_page(&self, playlist_id: &str, page_token: Option<&str>) -> ImportOutcome<PlaylistPage> {
        (**self).fetch_page(playlist_id, page_token)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedPlaylist {
    pub title: String,
    /// In page order, positions 0..n.
    pub titles: Vec<ExternalTitle>,
}

// ============================================================================
// Pagination loop
// ============================================================================

/// Retrieve every available title of a playlist.
///
/// Any page error aborts the whole fetch; no partial list is returned.
pub fn fetch_playlist<S, P>(source: &S, playlist_id: &str, progress: &mut P) -> ImportOutcome<FetchedPlaylist>
where
    S: PlaylistSource + ?Sized,
    P: ProgressSink + ?Sized,
{
    let mut playlist_title: Option<String> = None;
    let mut titles: Vec<ExternalTitle> = Vec::new();
    let mut estimate: Option<usize> = None;
    let mut page_token: Option<String> = None;
    let mut seen_tokens: FxHashSet<String> = FxHashSet::default();
    let mut page_number = 0usize;
    let mut last_reported: Option<usize> = None;

    loop {
        let page = source.fetch_page(playlist_id, page_token.as_deref())?;
        page_number += 1;

        if page_number == 1 {
            playlist_title = page
                .playlist_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
        }

        let before = titles.len();
        for item in &page.items {
            if let Some(title) = item.available_title() {
                titles.push(ExternalTitle {
                    position: titles.len(),
                    title: title.to_string(),
                });
            }
        }
        debug!(
            "page {} of '{}': {} items, {} available",
            page_number,
            playlist_id,
            page.items.len(),
            titles.len() - before
        );

        estimate = page.total_results.or(estimate);
        // A page of only unavailable items adds nothing; its count was already reported
        if last_reported != Some(titles.len()) {
            let total = estimate.map_or(titles.len(), |t| t.max(titles.len()));
            progress.emit(ProgressEvent::loading(titles.len(), total));
            last_reported = Some(titles.len());
        }

        match page.next_page_token {
            Some(token) if !seen_tokens.contains(&token) => {
                seen_tokens.insert(token.clone());
                page_token = Some(token);
            }
            Some(token) => {
                warn!("page token '{}' repeated, stopping pagination", token);
                break;
            }
            None => break,
        }
    }

    Ok(FetchedPlaylist {
        title: playlist_title.unwrap_or_else(|| DEFAULT_PLAYLIST_TITLE.to_string()),
        titles,
    })
}

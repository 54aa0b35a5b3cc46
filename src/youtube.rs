//! YouTube Data API v3 playlist source backed by `ureq`.

use log::debug;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ImportError, ImportOutcome};
use crate::fetch::{PageItem, PlaylistPage, PlaylistSource};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the API serves.
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug)]
pub struct YouTubeConfig {
    pub api_base: String,
    pub api_key: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            page_size: MAX_PAGE_SIZE,
            timeout: Duration::from_secs(15),
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage {
    #[serde(default)]
    items: Vec<ApiItem>,
    page_info: Option<ApiPageInfo>,
    next_page_token: Option<String>,
    snippet: Option<ApiSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiItem {
    snippet: Option<ApiSnippet>,
    status: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPageInfo {
    total_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStatus {
    privacy_status: Option<String>,
}

impl From<ApiPage> for PlaylistPage {
    fn from(page: ApiPage) -> Self {
        PlaylistPage {
            playlist_title: page.snippet.and_then(|s| s.title),
            items: page
                .items
                .into_iter()
                .map(|item| PageItem {
                    title: item.snippet.and_then(|s| s.title),
                    privacy_status: item.status.and_then(|s| s.privacy_status),
                })
                .collect(),
            total_results: page.page_info.and_then(|p| p.total_results),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Decode one `playlistItems` response body.
pub fn parse_page(body: &str) -> ImportOutcome<PlaylistPage> {
    serde_json::from_str::<ApiPage>(body)
        .map(PlaylistPage::from)
        .map_err(|err| ImportError::MalformedResponse(err.to_string()))
}

// ============================================================================
// Source
// ============================================================================

pub struct YouTubeSource {
    http_client: ureq::Agent,
    config: YouTubeConfig,
}

impl YouTubeSource {
    pub fn new(config: YouTubeConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(config.timeout)
            .build();
        Self {
            http_client,
            config,
        }
    }

    fn endpoint_base(&self) -> &str {
        self.config.api_base.trim().trim_end_matches('/')
    }

    fn page_url(&self, playlist_id: &str, page_token: Option<&str>) -> String {
        let page_size = self.config.page_size.clamp(1, MAX_PAGE_SIZE);
        let mut url = format!(
            "{}/playlistItems?part=snippet,status&maxResults={}&playlistId={}&key={}",
            self.endpoint_base(),
            page_size,
            urlencoding::encode(playlist_id),
            urlencoding::encode(&self.config.api_key),
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

impl PlaylistSource for YouTubeSource {
    fn fetch_page(&self, playlist_id: &str, page_token: Option<&str>) -> ImportOutcome<PlaylistPage> {
        debug!("requesting playlist '{}' page {:?}", playlist_id, page_token);
        let response = match self.http_client.get(&self.page_url(playlist_id, page_token)).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(ImportError::SourceUnavailable {
                    status,
                    playlist_id: playlist_id.to_string(),
                })
            }
            Err(err) => return Err(ImportError::Transport(err.to_string())),
        };
        let body = response
            .into_string()
            .map_err(|err| ImportError::Transport(err.to_string()))?;
        parse_page(&body)
    }
}

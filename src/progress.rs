//! Progress events and their console rendering.
//!
//! The import engine emits [`ProgressEvent`]s through a [`ProgressSink`].
//! [`ProgressDisplay`] turns them into progress bars, or into periodic log
//! lines in log-only mode for tail-friendly output.

use crossbeam_channel::Sender;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use serde::Serialize;
use std::time::Duration;

/// Emit a log line every this many titles in log-only mode.
const LOG_INTERVAL: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Loading,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub phase: ImportPhase,
    pub current: usize,
    /// Estimate while loading; 0 before the first page arrives.
    pub total: usize,
    /// Running matched count, always 0 while loading.
    pub matched: usize,
}

impl ProgressEvent {
    pub fn loading(current: usize, total: usize) -> Self {
        Self {
            phase: ImportPhase::Loading,
            current,
            total,
            matched: 0,
        }
    }

    pub fn matching(current: usize, total: usize, matched: usize) -> Self {
        Self {
            phase: ImportPhase::Matching,
            current,
            total,
            matched,
        }
    }
}

/// Receives progress events synchronously, in emission order.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events into a channel so a caller can pull them lazily.
/// A dropped receiver is not an error; the import carries on.
pub struct ChannelSink(pub Sender<ProgressEvent>);

impl ProgressSink for ChannelSink {
    fn emit(&mut self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}

// ============================================================================
// Console rendering
// ============================================================================

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Create a progress bar with consistent styling.
/// In log-only mode, the progress bar is hidden.
pub fn create_progress_bar(len: u64, msg: &str, log_only: bool) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if log_only {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(msg.to_string());
    pb
}

/// Renders one import's events as two consecutive bars, one per phase.
pub struct ProgressDisplay {
    log_only: bool,
    bar: Option<(ImportPhase, ProgressBar)>,
}

impl ProgressDisplay {
    pub fn new(log_only: bool) -> Self {
        Self {
            log_only,
            bar: None,
        }
    }

    pub fn handle(&mut self, event: ProgressEvent) {
        let pb = self.bar_for(event.phase, event.total);
        pb.set_length(event.total.max(event.current) as u64);
        pb.set_position(event.current as u64);

        if event.phase == ImportPhase::Matching {
            pb.set_message(format!("Matching ({} matched)", event.matched));
        }

        if self.log_only {
            log_progress(&event);
        }
    }

    /// Finish the active bar, leaving it on screen.
    pub fn finish(&mut self) {
        if let Some((phase, pb)) = self.bar.take() {
            pb.finish_with_message(match phase {
                ImportPhase::Loading => format!("Loaded {} titles", pb.position()),
                ImportPhase::Matching => format!("Matched {} titles", pb.position()),
            });
        }
    }

    fn bar_for(&mut self, phase: ImportPhase, total: usize) -> &ProgressBar {
        if !matches!(&self.bar, Some((current, _)) if *current == phase) {
            self.finish();
        }
        let log_only = self.log_only;
        let (_, pb) = self.bar.get_or_insert_with(|| {
            let msg = match phase {
                ImportPhase::Loading => "Loading playlist",
                ImportPhase::Matching => "Matching",
            };
            (phase, create_progress_bar(total as u64, msg, log_only))
        });
        pb
    }
}

impl ProgressSink for ProgressDisplay {
    fn emit(&mut self, event: ProgressEvent) {
        self.handle(event);
    }
}

/// Log progress periodically for tail-friendly output.
fn log_progress(event: &ProgressEvent) {
    match event.phase {
        ImportPhase::Loading => info!("[loading] {} / ~{} titles", event.current, event.total),
        ImportPhase::Matching => {
            if event.current % LOG_INTERVAL == 0 || event.current == event.total {
                let pct = if event.total == 0 {
                    100.0
                } else {
                    100.0 * event.current as f64 / event.total as f64
                };
                info!(
                    "[matching] {}/{} ({:.1}%), {} matched",
                    event.current, event.total, pct, event.matched
                );
            }
        }
    }
}

//! Playlist import library - reconciles an external video playlist against a
//! local audio library.

pub mod error;
pub mod fetch;
pub mod import;
pub mod index;
pub mod keywords;
pub mod library;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod safety;
pub mod scoring;
pub mod youtube;

pub use error::ImportError;
pub use import::{ImportOrchestrator, ImportState};
pub use models::{ImportResult, LibraryRecord};
pub use progress::{ImportPhase, ProgressEvent, ProgressSink};

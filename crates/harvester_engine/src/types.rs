use std::path::PathBuf;
use std::time::Duration;

use harvester_core::{HarvestStats, StopReason};

use crate::fetch::FetchError;
use crate::persist::PersistError;

/// Failure of a single page capability call.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
    #[error("no element matches `{0}`")]
    NotFound(String),
    #[error("element is not interactable: {0}")]
    NotInteractable(String),
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },
    #[error("element handle no longer attached to the page")]
    Stale,
    #[error("no document loaded")]
    NotLoaded,
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("webdriver: {0}")]
    Driver(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Failure that aborts a harvest run.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("invalid settings: {0}")]
    Settings(#[from] crate::settings::SettingsError),
    #[error("could not open listing: {0}")]
    Navigation(#[source] PageError),
    #[error("could not persist table: {0}")]
    Persist(#[from] PersistError),
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSummary {
    pub output_path: PathBuf,
    pub rows_written: usize,
    pub stats: HarvestStats,
}

impl HarvestSummary {
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stats.stop_reason
    }
}

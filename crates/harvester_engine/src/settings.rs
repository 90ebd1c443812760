use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use harvester_core::{Field, NullPolicy, DEFAULT_DATE_FORMAT};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FieldLocator, FieldLocators};

const LISTING_BASE: &str = "https://www.rottentomatoes.com/browse/movies_at_home";
const ITEM_SELECTOR: &str = r#"div[data-qa="discovery-media-list-item"]"#;
const CONTROL_SELECTOR: &str = r#"button[data-qa="dlp-load-more-button"]"#;
const TITLE_SELECTOR: &str = r#"span[data-qa="discovery-media-list-item-title"]"#;
const DATE_SELECTOR: &str = r#"span.smaller[data-qa="discovery-media-list-item-start-date"]"#;
const SCORE_PAIRS: &str = "score-pairs-deprecated";
const DEFAULT_CAP: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(cap) => cap,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid listing url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("empty selector for {0}")]
    EmptySelector(String),
    #[error("output filename must not be empty")]
    EmptyFilename,
    #[error("output filename {0:?} must be a bare file name")]
    FilenameNotBare(String),
    #[error("date format must not be empty")]
    EmptyDateFormat,
    #[error("unknown catalog {0:?} (expected netflix, hulu or prime-video)")]
    UnknownCatalog(String),
}

/// Everything one harvest run needs to know. Missing keys in a settings file fall
/// back to the Hulu catalog preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub url: String,
    pub cap: NonZeroUsize,
    pub item_selector: String,
    pub control_selector: String,
    pub fields: FieldLocators,
    pub settle_delay_ms: u64,
    pub wait_timeout_ms: u64,
    pub output_dir: PathBuf,
    pub output_filename: String,
    pub date_format: String,
    pub null_policy: NullPolicy,
    pub webdriver_url: String,
    pub headless: bool,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Catalog::Hulu.settings()
    }
}

impl HarvestSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        Url::parse(&self.url).map_err(|err| SettingsError::InvalidUrl {
            url: self.url.clone(),
            message: err.to_string(),
        })?;

        let mut selectors = vec![
            ("item container", self.item_selector.as_str()),
            ("disclosure control", self.control_selector.as_str()),
        ];
        for field in Field::ALL {
            for selector in self.fields.get(field).selectors() {
                selectors.push((field.name(), selector));
            }
        }
        if let Some((owner, _)) = selectors.iter().find(|(_, s)| s.trim().is_empty()) {
            return Err(SettingsError::EmptySelector(owner.to_string()));
        }

        if self.output_filename.trim().is_empty() {
            return Err(SettingsError::EmptyFilename);
        }
        let filename = self.output_filename.as_str();
        if Path::new(filename).file_name().is_none_or(|name| name != filename) {
            return Err(SettingsError::FilenameNotBare(filename.to_string()));
        }
        if self.date_format.trim().is_empty() {
            return Err(SettingsError::EmptyDateFormat);
        }
        Ok(())
    }
}

/// Known streaming catalogs and the markup each listing uses for scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Netflix,
    Hulu,
    PrimeVideo,
}

impl Catalog {
    pub const ALL: [Catalog; 3] = [Catalog::Netflix, Catalog::Hulu, Catalog::PrimeVideo];

    pub fn slug(self) -> &'static str {
        match self {
            Catalog::Netflix => "netflix",
            Catalog::Hulu => "hulu",
            Catalog::PrimeVideo => "prime-video",
        }
    }

    pub fn url(self) -> String {
        format!("{LISTING_BASE}/affiliates:{}", self.slug())
    }

    pub fn settings(self) -> HarvestSettings {
        let (critic_score, audience_score, output_filename) = match self {
            Catalog::Netflix => (
                FieldLocator::text(r#"rt-text[slot="criticsScore"]"#),
                FieldLocator::text(r#"rt-text[slot="audienceScore"]"#),
                "netflix_movies.csv",
            ),
            Catalog::Hulu => (
                FieldLocator::shadow(SCORE_PAIRS, r#"[slot="criticsScore"]"#),
                FieldLocator::shadow(SCORE_PAIRS, r#"[slot="audienceScore"]"#),
                "tomatoes_hulu_movies.csv",
            ),
            Catalog::PrimeVideo => (
                FieldLocator::attribute(SCORE_PAIRS, "criticsscore"),
                FieldLocator::attribute(SCORE_PAIRS, "audiencescore"),
                "rottentomatoes_prime_video_movies.csv",
            ),
        };

        HarvestSettings {
            url: self.url(),
            cap: DEFAULT_CAP,
            item_selector: ITEM_SELECTOR.to_string(),
            control_selector: CONTROL_SELECTOR.to_string(),
            fields: FieldLocators {
                title: FieldLocator::text(TITLE_SELECTOR),
                critic_score,
                audience_score,
                availability_date: FieldLocator::text(DATE_SELECTOR),
            },
            settle_delay_ms: 2_000,
            wait_timeout_ms: 10_000,
            output_dir: PathBuf::from("."),
            output_filename: output_filename.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            null_policy: NullPolicy::Keep,
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Catalog {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Catalog::ALL
            .into_iter()
            .find(|catalog| {
                catalog.slug() == wanted || (wanted == "prime" && *catalog == Catalog::PrimeVideo)
            })
            .ok_or_else(|| SettingsError::UnknownCatalog(s.to_string()))
    }
}

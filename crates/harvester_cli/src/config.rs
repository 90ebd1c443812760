//! Resolving the command line target into harvest settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use harvest_logging::harvest_info;
use harvester_engine::{Catalog, HarvestSettings};

/// What to harvest: a built-in catalog preset or a RON settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Catalog(Catalog),
    File(PathBuf),
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let path = Path::new(s);
        let looks_like_file = path.extension().is_some_and(|ext| ext == "ron") || path.is_file();
        if looks_like_file {
            return Ok(Target::File(path.to_path_buf()));
        }
        s.parse::<Catalog>()
            .map(Target::Catalog)
            .with_context(|| format!("{s:?} is neither a catalog nor a settings file"))
    }
}

/// Command line values that take precedence over the resolved settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cap: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub webdriver_url: Option<String>,
    pub show_browser: bool,
}

pub fn resolve(target: &Target, overrides: &Overrides) -> Result<HarvestSettings> {
    let mut settings = match target {
        Target::Catalog(catalog) => catalog.settings(),
        Target::File(path) => load_settings(path)?,
    };

    if let Some(cap) = overrides.cap {
        settings.cap = cap
            .try_into()
            .context("--cap must be at least 1")?;
    }
    if let Some(dir) = &overrides.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(url) = &overrides.webdriver_url {
        settings.webdriver_url = url.clone();
    }
    if overrides.show_browser {
        settings.headless = false;
    }

    settings.validate()?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<HarvestSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings: HarvestSettings = ron::from_str(&content)
        .with_context(|| format!("failed to parse settings in {}", path.display()))?;
    harvest_info!("loaded settings from {}", path.display());
    Ok(settings)
}

pub fn to_ron(settings: &HarvestSettings) -> Result<String> {
    let pretty = ron::ser::PrettyConfig::new();
    ron::ser::to_string_pretty(settings, pretty).context("failed to serialize settings")
}

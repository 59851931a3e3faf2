//! Feed tuning loaded from `.config/scrollfeed.json`

use std::path::Path;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = ".config/scrollfeed.json";

/// Maximum tracked slots; also the number of players the feed holds at most
pub const DEFAULT_PREFETCH_WINDOW: usize = 3;
pub const DEFAULT_LOOKAHEAD_COUNT: usize = 3;
pub const DEFAULT_FOCAL_FRACTION: f32 = 0.25;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub prefetch_window: usize,
    /// Pagination fires when the visible window comes this close to the end
    pub lookahead_count: usize,
    /// Focal line position, as a fraction of viewport height from the top
    pub focal_fraction: f32,
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            prefetch_window: DEFAULT_PREFETCH_WINDOW,
            lookahead_count: DEFAULT_LOOKAHEAD_COUNT,
            focal_fraction: DEFAULT_FOCAL_FRACTION,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedConfig {
    /// Reads the default config file, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!(path = CONFIG_FILE, "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), ?config, "Loaded feed config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefetch_window == 0 {
            bail!("prefetch_window must be at least 1");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.focal_fraction) {
            bail!("focal_fraction must lie in [0, 1], got {}", self.focal_fraction);
        }
        Ok(())
    }
}

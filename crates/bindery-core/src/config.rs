use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory tree holding the loose artifact files (PDFs + thumbnails).
    pub import_root: String,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Acceptance threshold for title similarity. Exclusive: a candidate
    /// must score strictly above this to match.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Additive bonus when the candidate's collection name contains the
    /// parsed collection tag.
    #[serde(default = "default_collection_bonus")]
    pub collection_bonus: f64,
    /// Cap on unmatched filenames carried in the run summary for display.
    #[serde(default = "default_unmatched_display_cap")]
    pub unmatched_display_cap: usize,
}

fn default_match_threshold() -> f64 {
    0.6
}

fn default_collection_bonus() -> f64 {
    0.2
}

fn default_unmatched_display_cap() -> usize {
    25
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

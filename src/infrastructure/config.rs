use crate::domain::time_window::{DEFAULT_IDEAL_SLOT_COUNT, DEFAULT_MIN_SLOT_SIZE_MS};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplingSettings {
    /// Value reported for slots without observations when a request
    /// doesn't supply its own.
    pub fill_value: i64,
    pub min_slot_size_ms: i64,
    pub ideal_slot_count: u64,
    pub max_slot_count: u64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            fill_value: -1,
            min_slot_size_ms: DEFAULT_MIN_SLOT_SIZE_MS,
            ideal_slot_count: DEFAULT_IDEAL_SLOT_COUNT,
            max_slot_count: 10_000,
        }
    }
}

/// Loads `config/chart.*` if present, then `CHART__SECTION__KEY` environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/chart").required(false))
        .add_source(
            config::Environment::with_prefix("CHART")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

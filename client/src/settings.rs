use frontier_shared::{EngineConfig, PaletteTheme};
use gloo_storage::{LocalStorage, Storage};

pub const CONFIG_KEY: &str = "frontier_territory_config";
pub const PALETTE_KEY: &str = "frontier_palette";
pub const SETTINGS_KEY: &str = "frontier_settings";

/// Host-only preferences, persisted alongside the engine config.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub alternate_view: bool,
    pub show_stats: bool,
    pub step_interval_ms: u32,
    pub demo_seed: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            alternate_view: false,
            show_stats: true,
            step_interval_ms: 100,
            demo_seed: 7,
        }
    }
}

/// Keep a stored config only if it parses and validates.
fn accept_config<E: std::fmt::Display>(stored: Result<EngineConfig, E>) -> EngineConfig {
    match stored {
        Ok(config) => match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn(&format!("Stored renderer config rejected: {e}"));
                EngineConfig::default()
            }
        },
        Err(_) => EngineConfig::default(),
    }
}

pub fn load_config() -> EngineConfig {
    accept_config(LocalStorage::get::<EngineConfig>(CONFIG_KEY))
}

pub fn save_config(config: &EngineConfig) {
    let _ = LocalStorage::set(CONFIG_KEY, config);
}

pub fn load_palette() -> PaletteTheme {
    LocalStorage::get(PALETTE_KEY).unwrap_or_default()
}

pub fn load_settings() -> ClientSettings {
    LocalStorage::get(SETTINGS_KEY).unwrap_or_default()
}

pub fn save_settings(settings: &ClientSettings) {
    let _ = LocalStorage::set(SETTINGS_KEY, settings);
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

pub mod chat;
pub mod config_cmd;
pub mod kits;
pub mod prompt;
pub mod serve;

use std::path::Path;

use solstis_config::AppConfig;

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}

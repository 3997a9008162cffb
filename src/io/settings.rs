use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::profile::LaunchConfig;

/// User settings from `config.toml` next to the library file. The file
/// is optional and hand-edited; the app never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Executable started by `dk launch`.
    #[serde(default = "default_agent")]
    pub agent: String,
    /// Launch fields applied to newly created profiles.
    #[serde(default)]
    pub defaults: LaunchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            agent: default_agent(),
            defaults: LaunchConfig::default(),
        }
    }
}

fn default_agent() -> String {
    "claude".to_string()
}

/// Read settings from the library's directory, falling back to defaults
/// when the file is missing or malformed.
pub fn read_settings(library_dir: &Path) -> Settings {
    let path = library_dir.join("config.toml");
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => return Settings::default(),
    };
    match toml::from_str(&text) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("ignoring malformed {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

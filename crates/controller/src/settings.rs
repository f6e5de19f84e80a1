use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File looked up by [`Settings::load_or_default`].
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Errors from loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Controller-wide settings, read from YAML with kebab-case keys. Missing
/// keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// When false, debug dumps are skipped.
    pub logging_enabled: bool,
    /// Minimum time between periodic dumps during game ticks. 0 disables them.
    pub debug_dump_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            debug_dump_interval_ms: 0,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Read `<dir>/settings.yaml`, or fall back to defaults if it is absent.
    pub fn load_or_default(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn dump_interval(&self) -> Option<Duration> {
        (self.debug_dump_interval_ms > 0).then(|| Duration::from_millis(self.debug_dump_interval_ms))
    }
}

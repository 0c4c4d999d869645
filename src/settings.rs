//! User settings stored as settings.json in the app data directory

use crate::constants::{DEFAULT_MAX_BACKUPS, DEFAULT_USERNAME, SETTINGS_FILE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    /// Profile name used for the database mirror
    pub username: String,
    pub last_page: String,

    pub show_toasts: bool,
    pub confirm_delete: bool,
    pub max_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            username: DEFAULT_USERNAME.to_string(),
            last_page: "dashboard".to_string(),
            show_toasts: true,
            confirm_delete: true,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<Settings>(&s) {
                Ok(mut settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings.sanitize();
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join(SETTINGS_FILE);
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    fn sanitize(&mut self) {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            self.username = DEFAULT_USERNAME.to_string();
        }
        self.max_backups = self.max_backups.clamp(1, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            username: "ayla".into(),
            last_page: "jobs".into(),
            window_w: Some(1200.0),
            show_toasts: false,
            ..Settings::default()
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn test_partial_file_is_sanitized() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"username": "  ", "max_backups": 0}"#,
        )
        .unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.username, DEFAULT_USERNAME);
        assert_eq!(settings.max_backups, 1);
        assert!(settings.confirm_delete);
    }
}

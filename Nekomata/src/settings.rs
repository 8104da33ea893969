//! User settings stored as `settings.toml`

use crate::error::{Error, Result};
use nekocore::engines::{ApplyOptions, JsonStyle, VxOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_staging_dir() -> String {
    VxOptions::default().staging_dir
}

/// Settings for the apply pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySettings {
    /// Reinject machine translations where no human translation exists
    #[serde(default = "default_true")]
    pub use_machine_translation: bool,
    /// Formatting of rewritten MV/MZ files
    #[serde(default)]
    pub json_style: JsonStyle,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            use_machine_translation: true,
            json_style: JsonStyle::default(),
        }
    }
}

/// Settings for VX/VX Ace games
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VxSettings {
    /// Directory under the game root holding the unpacked archive
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

impl Default for VxSettings {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
        }
    }
}

/// The full settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub apply: ApplySettings,
    #[serde(default)]
    pub vx: VxSettings,
    /// Engine used when detection fails and none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_engine: Option<String>,
}

impl Settings {
    /// `<config dir>/Nekomata/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("Nekomata").join("settings.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.is_file() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save settings to `path`, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().ok_or(Error::NoConfigDir)?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }

    #[must_use]
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            use_machine_translation: self.apply.use_machine_translation,
            json_style: self.apply.json_style,
        }
    }

    #[must_use]
    pub fn vx_options(&self) -> VxOptions {
        VxOptions {
            staging_dir: self.vx.staging_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("[apply]\njson_style = \"pretty\"\n").unwrap();
        assert!(settings.apply.use_machine_translation);
        assert_eq!(settings.apply.json_style, JsonStyle::Pretty);
        assert_eq!(settings.vx.staging_dir, ".nekomata");
        assert_eq!(settings.default_engine, None);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.toml");

        let settings = Settings {
            apply: ApplySettings {
                use_machine_translation: false,
                json_style: JsonStyle::Compact,
            },
            vx: VxSettings {
                staging_dir: "unpacked".to_string(),
            },
            default_engine: Some("vx ace".to_string()),
        };
        assert_eq!(settings.save(Some(&path)).unwrap(), path);

        let loaded = Settings::load(Some(&path)).unwrap();
        assert_eq!(loaded, settings);
        assert!(!loaded.apply_options().use_machine_translation);
        assert_eq!(loaded.vx_options().staging_dir, "unpacked");
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let loaded = Settings::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(&path, "apply = 3").unwrap();
        assert!(matches!(Settings::load(Some(&path)), Err(Error::SettingsParse(_))));
    }
}

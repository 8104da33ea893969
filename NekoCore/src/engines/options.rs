//! Options passed to engine bindings

use serde::{Deserialize, Serialize};

/// Output formatting for rewritten JSON files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    /// Single line, as RPG Maker itself writes data files.
    #[default]
    Compact,
    Pretty,
}

impl JsonStyle {
    pub fn render(self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            JsonStyle::Compact => serde_json::to_string(value),
            JsonStyle::Pretty => serde_json::to_string_pretty(value),
        }
    }
}

/// Options for the apply pass of every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Reinject machine translations where no human translation exists.
    pub use_machine_translation: bool,
    pub json_style: JsonStyle,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            use_machine_translation: true,
            json_style: JsonStyle::default(),
        }
    }
}

/// Options specific to the VX/VX Ace binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VxOptions {
    /// Directory (relative to the game root) holding the unpacked archive.
    pub staging_dir: String,
}

impl Default for VxOptions {
    fn default() -> Self {
        Self {
            staging_dir: ".nekomata".to_string(),
        }
    }
}

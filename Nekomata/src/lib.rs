//! Nekomata - translation projects for RPG Maker games
use std::path::Path;

// Re-export nekocore
pub use nekocore;

pub mod error;
pub mod project;
pub mod settings;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
pub use project::TranslationProject;
pub use settings::Settings;

use nekocore::engines::{ApplyReport, EngineRegistry};

/// Main toolkit interface
pub struct Toolkit {
    settings: Settings,
    registry: EngineRegistry,
}

impl Toolkit {
    /// Build the engine registry from `settings`
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let registry =
            EngineRegistry::with_options(settings.apply_options(), settings.vx_options());
        Self { settings, registry }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Create a project, falling back to the configured default engine
    pub fn create_project(
        &self,
        game_path: impl AsRef<Path>,
        engine_hint: Option<&str>,
    ) -> Result<TranslationProject> {
        let hint = engine_hint.or(self.settings.default_engine.as_deref());
        TranslationProject::create(&self.registry, game_path.as_ref(), hint)
    }

    pub fn apply_project(
        &self,
        project: &TranslationProject,
        output: impl AsRef<Path>,
    ) -> Result<ApplyReport> {
        project.apply(&self.registry, output.as_ref())
    }
}

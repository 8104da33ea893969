//! Engine lookup by detection or by name

use super::{ApplyOptions, EngineAdapter, RpgMakerMv, RpgMakerVx, VxOptions};
use crate::error::{Error, Result};
use std::path::Path;

/// The set of engine bindings available to a caller.
pub struct EngineRegistry {
    engines: Vec<Box<dyn EngineAdapter>>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_options(ApplyOptions::default(), VxOptions::default())
    }
}

impl EngineRegistry {
    /// A registry with no engines.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// Every built-in engine configured with the given options.
    #[must_use]
    pub fn with_options(options: ApplyOptions, vx: VxOptions) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(RpgMakerMv::new(options)));
        registry.register(Box::new(RpgMakerVx::new(options, vx)));
        registry
    }

    pub fn register(&mut self, engine: Box<dyn EngineAdapter>) {
        self.engines.push(engine);
    }

    pub fn engines(&self) -> impl Iterator<Item = &dyn EngineAdapter> {
        self.engines
            .iter()
            .map(|engine| -> &dyn EngineAdapter { engine.as_ref() })
    }

    /// First engine that recognises `path`.
    #[must_use]
    pub fn detect(&self, path: &Path) -> Option<&dyn EngineAdapter> {
        self.engines().find(|engine| engine.detect(path))
    }

    /// First engine whose name contains `hint`, ignoring case.
    #[must_use]
    pub fn by_name(&self, hint: &str) -> Option<&dyn EngineAdapter> {
        let hint = hint.to_lowercase();
        if hint.is_empty() {
            return None;
        }
        self.engines()
            .find(|engine| engine.name().to_lowercase().contains(&hint))
    }

    /// Pick the engine for `path`: detection first, then the name hint.
    pub fn resolve(&self, path: &Path, hint: Option<&str>) -> Result<&dyn EngineAdapter> {
        if let Some(engine) = self.detect(path) {
            tracing::debug!("Detected {} at {}", engine.name(), path.display());
            return Ok(engine);
        }
        match hint {
            Some(hint) => self
                .by_name(hint)
                .ok_or_else(|| Error::UnknownEngine(hint.to_string())),
            None => Err(Error::NoMatchingEngine {
                path: path.to_path_buf(),
            }),
        }
    }
}

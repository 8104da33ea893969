//! Translation projects saved as JSON

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use nekocore::engines::{ApplyReport, EngineAdapter, EngineRegistry};
use nekocore::model::{GameData, ReplaceResult, TranslationStats};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One game being translated, with every unit extracted from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationProject {
    pub id: Uuid,
    /// Game folder name
    pub name: String,
    pub game_path: PathBuf,
    /// Name of the engine binding that extracted the units
    pub engine: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: GameData,
}

/// Folder name of the game at `path`, which may point at its executable.
fn game_name(path: &Path) -> String {
    let dir = if path.is_file() { path.parent() } else { Some(path) };
    dir.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl TranslationProject {
    /// Resolve an engine for `game_path` and extract its text.
    ///
    /// Detection wins over `engine_hint`; the hint is only used when no
    /// engine recognises the path.
    pub fn create(
        registry: &EngineRegistry,
        game_path: &Path,
        engine_hint: Option<&str>,
    ) -> Result<Self> {
        let engine = registry.resolve(game_path, engine_hint)?;
        tracing::info!("Creating project for {} with {}", game_path.display(), engine.name());

        let mut data = engine.load(game_path)?;
        let id = Uuid::new_v4();
        for unit in &mut data.units {
            unit.project_id = Some(id);
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name: game_name(game_path),
            game_path: game_path.to_path_buf(),
            engine: engine.name().to_string(),
            created_at: now,
            updated_at: now,
            data,
        })
    }

    /// The binding this project was created with.
    pub fn engine<'r>(&self, registry: &'r EngineRegistry) -> Result<&'r dyn EngineAdapter> {
        registry
            .engines()
            .find(|engine| engine.name() == self.engine)
            .ok_or_else(|| nekocore::Error::UnknownEngine(self.engine.clone()).into())
    }

    /// Write translated data files for the game into `output`.
    pub fn apply(&self, registry: &EngineRegistry, output: &Path) -> Result<ApplyReport> {
        let engine = self.engine(registry)?;
        tracing::info!("Applying {} unit(s) to {}", self.data.len(), output.display());
        Ok(engine.apply(&self.data, &self.game_path, output)?)
    }

    /// Set the human translation of one unit. Returns `false` if no unit has `id`.
    pub fn set_human_translation(&mut self, id: Uuid, text: &str) -> bool {
        let Some(unit) = self.data.units.iter_mut().find(|unit| unit.id == id) else {
            return false;
        };
        unit.set_human_translation(text);
        self.updated_at = Utc::now();
        true
    }

    /// Copy unit `id`'s human translation to units with the same original text.
    ///
    /// Returns the number of units changed; see
    /// [`GameData::apply_to_duplicates`].
    pub fn apply_to_duplicates(&mut self, id: Uuid, overwrite: bool) -> usize {
        let changed = self.data.apply_to_duplicates(id, overwrite);
        if changed > 0 {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Case-insensitive find/replace over human translations.
    pub fn replace(&mut self, find: &str, replace: &str) -> ReplaceResult {
        let result = self.data.replace_in_translations(find, replace);
        if result.units_modified > 0 {
            self.updated_at = Utc::now();
        }
        result
    }

    #[must_use]
    pub fn stats(&self) -> TranslationStats {
        self.data.stats()
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|err| Error::InvalidProject {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn mv_game() -> TempDir {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("CommonEvents.json"),
            r#"[null,{"id":1,"list":[{"code":401,"indent":0,"parameters":["Good morning!"]},{"code":0,"indent":0,"parameters":[]}]}]"#,
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_create_stamps_units() {
        let game = mv_game();
        let project =
            TranslationProject::create(&EngineRegistry::default(), game.path(), None).unwrap();

        assert_eq!(project.engine, "RPG Maker MV/MZ");
        assert_eq!(project.name, game_name(game.path()));
        assert_eq!(project.data.len(), 1);
        assert_eq!(project.data.units[0].project_id, Some(project.id));
        assert_eq!(project.created_at, project.updated_at);
    }

    #[test]
    fn test_create_unknown_engine() {
        let empty = TempDir::new().unwrap();
        let err =
            TranslationProject::create(&EngineRegistry::default(), empty.path(), Some("wolf"))
                .unwrap_err();
        assert!(matches!(err, Error::NekoCore(nekocore::Error::UnknownEngine(_))));
    }

    #[test]
    fn test_save_load_round_trip() {
        let game = mv_game();
        let mut project =
            TranslationProject::create(&EngineRegistry::default(), game.path(), None).unwrap();
        let id = project.data.units[0].id;
        assert!(project.set_human_translation(id, "Bonjour !"));
        assert!(!project.set_human_translation(Uuid::new_v4(), "ignored"));

        let path = game.path().join("project.json");
        project.save(&path).unwrap();
        let loaded = TranslationProject::load(&path).unwrap();
        assert_eq!(loaded, project);
        assert!(loaded.data.units[0].translated_at.is_some());
    }

    #[test]
    fn test_load_rejects_other_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.json");
        fs::write(&path, "{\"units\": []}").unwrap();
        assert!(matches!(
            TranslationProject::load(&path),
            Err(Error::InvalidProject { .. })
        ));
    }

    #[test]
    fn test_replace_touches_only_on_change() {
        let game = mv_game();
        let mut project =
            TranslationProject::create(&EngineRegistry::default(), game.path(), None).unwrap();
        let id = project.data.units[0].id;
        project.set_human_translation(id, "Bonjour le monde");
        let before = project.updated_at;

        assert_eq!(project.replace("absent", "x").units_modified, 0);
        assert_eq!(project.updated_at, before);

        let result = project.replace("MONDE", "village");
        assert_eq!(result.units_modified, 1);
        assert_eq!(project.data.units[0].human_translation, "Bonjour le village");
        assert_eq!(project.stats().translated, 1);
    }

    #[test]
    fn test_apply_to_duplicates() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("Map001.json"),
            r#"{"displayName":"","events":[null,{"pages":[{"list":[{"code":102,"indent":0,"parameters":[["Yes","No"],1]},{"code":102,"indent":0,"parameters":[["Yes","Maybe"],1]}]}]}]}"#,
        )
        .unwrap();
        let mut project =
            TranslationProject::create(&EngineRegistry::default(), temp.path(), None).unwrap();
        let first = project.data.units[0].id;
        let second = project.data.units[2].id;
        assert_eq!(project.data.units[2].original_text, "Yes");

        project.set_human_translation(second, "Ouais");
        project.set_human_translation(first, "Oui");
        let before = project.updated_at;

        assert_eq!(project.apply_to_duplicates(first, false), 0);
        assert_eq!(project.updated_at, before);
        assert_eq!(project.data.units[2].human_translation, "Ouais");

        assert_eq!(project.apply_to_duplicates(first, true), 1);
        assert_eq!(project.data.units[2].human_translation, "Oui");
    }
}

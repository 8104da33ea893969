//! RPG Maker MV/MZ binding (JSON data files)

use super::{
    ApplyOptions, ApplyReport, EngineAdapter, apply_file, copy_through, file_name, list_data_files,
};
use crate::error::{Error, Result};
use crate::model::{BlockKind, GameData};
use crate::script::{Replacements, apply_commands, extract_commands};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const ENGINE_NAME: &str = "RPG Maker MV/MZ";

/// Database files whose entries carry a name and a description.
const DATABASE_FILES: &[&str] = &[
    "Actors", "Classes", "Items", "Weapons", "Armors", "Skills", "Enemies", "States",
];

const MAP_FIELDS: &[(&str, BlockKind)] = &[("displayName", BlockKind::MapName)];
const DATABASE_FIELDS: &[(&str, BlockKind)] =
    &[("name", BlockKind::Name), ("description", BlockKind::Description)];

/// How text is laid out inside one kind of data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MvLayout {
    /// `MapNNN.json`: `displayName`, then `events[].pages[].list`.
    Map,
    /// `CommonEvents.json`: `[].list`.
    CommonEvents,
    /// `Troops.json`: `[].pages[].list`.
    Troops,
    /// Database files: `[].name` and `[].description`.
    Database,
    /// Anything else; copied through.
    Other,
}

impl MvLayout {
    #[must_use]
    pub fn for_file(name: &str) -> Self {
        let Some(stem) = name.strip_suffix(".json") else {
            return MvLayout::Other;
        };
        if let Some(number) = stem.strip_prefix("Map")
            && !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit())
        {
            return MvLayout::Map;
        }
        match stem {
            "CommonEvents" => MvLayout::CommonEvents,
            "Troops" => MvLayout::Troops,
            _ if DATABASE_FILES.contains(&stem) => MvLayout::Database,
            _ => MvLayout::Other,
        }
    }

    /// Objects holding plain text fields, with the fields to read.
    fn text_owners(
        self,
        doc: &mut Value,
    ) -> (Vec<&mut Map<String, Value>>, &'static [(&'static str, BlockKind)]) {
        match self {
            MvLayout::Map => (doc.as_object_mut().into_iter().collect(), MAP_FIELDS),
            MvLayout::Database => (
                doc.as_array_mut()
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_object_mut)
                    .collect(),
                DATABASE_FIELDS,
            ),
            _ => (Vec::new(), &[]),
        }
    }

    /// Every event command list in document order.
    fn command_lists(self, doc: &mut Value) -> Vec<&mut Vec<Value>> {
        fn lists_of_pages(owner: &mut Value) -> impl Iterator<Item = &mut Vec<Value>> {
            owner
                .get_mut("pages")
                .and_then(Value::as_array_mut)
                .into_iter()
                .flatten()
                .filter_map(|page| page.get_mut("list").and_then(Value::as_array_mut))
        }

        match self {
            MvLayout::Map => doc
                .get_mut("events")
                .and_then(Value::as_array_mut)
                .into_iter()
                .flatten()
                .flat_map(lists_of_pages)
                .collect(),
            MvLayout::CommonEvents => doc
                .as_array_mut()
                .into_iter()
                .flatten()
                .filter_map(|event| event.get_mut("list").and_then(Value::as_array_mut))
                .collect(),
            MvLayout::Troops => doc
                .as_array_mut()
                .into_iter()
                .flatten()
                .flat_map(lists_of_pages)
                .collect(),
            MvLayout::Database | MvLayout::Other => Vec::new(),
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Append every translatable block of one parsed file to `data`.
pub fn extract_document(doc: &mut Value, layout: MvLayout, file: &str, data: &mut GameData) {
    let (owners, fields) = layout.text_owners(doc);
    for owner in owners {
        for (field, kind) in fields {
            if let Some(text) = owner.get(*field).and_then(Value::as_str)
                && !is_blank(text)
            {
                data.push(file, *kind, text);
            }
        }
    }

    for list in layout.command_lists(doc) {
        extract_commands(&*list, |kind, text| data.push(file, kind, text));
    }
}

/// Rewrite one parsed file in place. Returns the number of blocks changed.
pub fn apply_document(
    doc: &mut Value,
    layout: MvLayout,
    replacements: &mut Replacements,
) -> Result<usize> {
    let mut rewritten = 0;

    let (owners, fields) = layout.text_owners(doc);
    for owner in owners {
        for (field, kind) in fields {
            if let Some(Value::String(text)) = owner.get_mut(*field)
                && !is_blank(text)
                && let Some(replacement) = replacements.take(*kind, text)
            {
                *text = replacement;
                rewritten += 1;
            }
        }
    }

    for list in layout.command_lists(doc) {
        rewritten += apply_commands(list, replacements)?;
    }
    Ok(rewritten)
}

/// Binding for RPG Maker MV and MZ projects.
#[derive(Debug, Clone, Default)]
pub struct RpgMakerMv {
    options: ApplyOptions,
}

impl RpgMakerMv {
    #[must_use]
    pub fn new(options: ApplyOptions) -> Self {
        Self { options }
    }

    /// `www/data` (MV), `data` (MZ), or `path` itself when it is the data folder.
    #[must_use]
    pub fn data_dir(path: &Path) -> Option<PathBuf> {
        let mv = path.join("www").join("data");
        if mv.is_dir() {
            return Some(mv);
        }
        let mz = path.join("data");
        if mz.is_dir() {
            return Some(mz);
        }
        if path.is_dir() && path.file_name().is_some_and(|name| name == "data") {
            return Some(path.to_path_buf());
        }
        None
    }

    fn require_data_dir(path: &Path) -> Result<PathBuf> {
        Self::data_dir(path).ok_or_else(|| Error::MissingDataDirectory {
            path: path.to_path_buf(),
        })
    }
}

impl EngineAdapter for RpgMakerMv {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn detect(&self, path: &Path) -> bool {
        Self::data_dir(path)
            .and_then(|dir| list_data_files(&dir, &["json"]).ok())
            .is_some_and(|files| !files.is_empty())
    }

    fn load(&self, path: &Path) -> Result<GameData> {
        let data_dir = Self::require_data_dir(path)?;
        let mut data = GameData::new();

        for file in list_data_files(&data_dir, &["json"])? {
            let name = file_name(&file)?;
            let layout = MvLayout::for_file(&name);
            if layout == MvLayout::Other {
                continue;
            }

            let parsed = std::fs::read_to_string(&file)
                .map_err(Error::from)
                .and_then(|text| serde_json::from_str::<Value>(&text).map_err(Error::from));
            match parsed {
                Ok(mut doc) => {
                    let before = data.len();
                    extract_document(&mut doc, layout, &name, &mut data);
                    tracing::debug!("Extracted {} block(s) from {}", data.len() - before, name);
                }
                Err(err) => tracing::warn!("Skipping {}: {}", name, err),
            }
        }

        tracing::info!("Loaded {} translation unit(s) from {}", data.len(), data_dir.display());
        Ok(data)
    }

    fn apply(&self, data: &GameData, source: &Path, output: &Path) -> Result<ApplyReport> {
        let data_dir = Self::require_data_dir(source)?;
        std::fs::create_dir_all(output)?;
        let mut report = ApplyReport::default();

        for file in list_data_files(&data_dir, &["json"])? {
            let name = file_name(&file)?;
            let dest = output.join(&name);
            let layout = MvLayout::for_file(&name);
            let mut replacements = Replacements::from_units(
                data.units_for_file(&name),
                self.options.use_machine_translation,
            );

            if layout == MvLayout::Other || replacements.is_empty() {
                copy_through(&file, &dest, &name, &mut report)?;
                continue;
            }

            apply_file(&file, &dest, &name, &mut report, || {
                let text = std::fs::read_to_string(&file)?;
                let mut doc: Value = serde_json::from_str(&text)?;
                let rewritten = apply_document(&mut doc, layout, &mut replacements)?;
                if rewritten > 0 {
                    std::fs::write(&dest, self.options.json_style.render(&doc)?)?;
                }
                Ok(rewritten)
            })?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &Path, name: &str, value: &Value) {
        std::fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn sample_game() -> TempDir {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("www").join("data");
        std::fs::create_dir_all(&data).unwrap();

        write_json(
            &data,
            "Map001.json",
            &json!({
                "displayName": "Village",
                "events": [null, {
                    "pages": [{"list": [
                        {"code": 101, "indent": 0, "parameters": ["", 0, 0, 2]},
                        {"code": 401, "indent": 0, "parameters": ["Hello"]},
                        {"code": 401, "indent": 0, "parameters": ["traveler"]},
                        {"code": 102, "indent": 0, "parameters": [["Yes", "No"], 1]},
                        {"code": 0, "indent": 0, "parameters": []}
                    ]}]
                }]
            }),
        );
        write_json(
            &data,
            "CommonEvents.json",
            &json!([null, {"list": [{"code": 401, "indent": 0, "parameters": ["Common"]}]}]),
        );
        write_json(
            &data,
            "Actors.json",
            &json!([null, {"name": "Harold", "description": "", "nickname": "Hero"}]),
        );
        write_json(&data, "System.json", &json!({"gameTitle": "Test"}));
        temp
    }

    #[test]
    fn test_layout_for_file() {
        assert_eq!(MvLayout::for_file("Map001.json"), MvLayout::Map);
        assert_eq!(MvLayout::for_file("MapInfos.json"), MvLayout::Other);
        assert_eq!(MvLayout::for_file("Troops.json"), MvLayout::Troops);
        assert_eq!(MvLayout::for_file("Skills.json"), MvLayout::Database);
        assert_eq!(MvLayout::for_file("Map001.txt"), MvLayout::Other);
    }

    #[test]
    fn test_detect_and_data_dir() {
        let game = sample_game();
        let engine = RpgMakerMv::default();
        assert!(engine.detect(game.path()));
        assert!(engine.detect(&game.path().join("www").join("data")));

        let empty = TempDir::new().unwrap();
        assert!(!engine.detect(empty.path()));
        assert!(matches!(
            engine.load(empty.path()),
            Err(Error::MissingDataDirectory { .. })
        ));
    }

    #[test]
    fn test_load_extracts_all_layouts() {
        let game = sample_game();
        let data = RpgMakerMv::default().load(game.path()).unwrap();
        let found: Vec<_> = data
            .units
            .iter()
            .map(|u| (u.context.as_str(), u.original_text.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Actors.json (Name)", "Harold"),
                ("CommonEvents.json (Show Text)", "Common"),
                ("Map001.json (Map Name)", "Village"),
                ("Map001.json (Show Text)", "Hello\ntraveler"),
                ("Map001.json (Choice)", "Yes"),
                ("Map001.json (Choice)", "No"),
            ]
        );
    }

    #[test]
    fn test_apply_rewrites_and_copies() {
        let game = sample_game();
        let out = TempDir::new().unwrap();
        let engine = RpgMakerMv::default();
        let mut data = engine.load(game.path()).unwrap();

        for unit in &mut data.units {
            match unit.original_text.as_str() {
                "Hello\ntraveler" => unit.set_human_translation("Bonjour\nvoyageur\nfatigué"),
                "Yes" => unit.set_human_translation("Oui"),
                "Village" => unit.machine_translation = "Hameau".to_string(),
                "Harold" => unit.set_human_translation("Harold"),
                _ => {}
            }
        }

        let report = engine.apply(&data, game.path(), out.path()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.rewritten, vec!["Map001.json".to_string()]);
        assert_eq!(report.file_count(), 4);

        let map = read_json(&out.path().join("Map001.json"));
        assert_eq!(map["displayName"], "Hameau");
        let list = map["events"][1]["pages"][0]["list"].as_array().unwrap();
        let texts: Vec<_> = list
            .iter()
            .filter(|c| c["code"] == 401)
            .map(|c| c["parameters"][0].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["Bonjour", "voyageur", "fatigué"]);
        assert_eq!(list[4]["parameters"][0], json!(["Oui", "No"]));

        let source = game.path().join("www").join("data");
        for untouched in ["Actors.json", "CommonEvents.json", "System.json"] {
            assert_eq!(
                std::fs::read(out.path().join(untouched)).unwrap(),
                std::fs::read(source.join(untouched)).unwrap()
            );
        }
    }

    #[test]
    fn test_apply_without_machine_translations() {
        let game = sample_game();
        let out = TempDir::new().unwrap();
        let engine = RpgMakerMv::new(ApplyOptions {
            use_machine_translation: false,
            ..ApplyOptions::default()
        });
        let mut data = engine.load(game.path()).unwrap();
        for unit in &mut data.units {
            unit.machine_translation = "machine".to_string();
        }

        let report = engine.apply(&data, game.path(), out.path()).unwrap();
        assert!(report.rewritten.is_empty());
        assert_eq!(report.copied.len(), 4);
    }

    #[test]
    fn test_malformed_file_is_copied() {
        let game = sample_game();
        let data_dir = game.path().join("www").join("data");
        std::fs::write(data_dir.join("Map002.json"), "{ not json").unwrap();
        let out = TempDir::new().unwrap();

        let mut data = GameData::new();
        data.push("Map002.json", BlockKind::ShowText, "Hi");
        data.units[0].set_human_translation("Salut");

        let report = RpgMakerMv::default().apply(&data, game.path(), out.path()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            Error::FileApply { file, .. } if file == "Map002.json"
        ));
        assert_eq!(
            std::fs::read_to_string(out.path().join("Map002.json")).unwrap(),
            "{ not json"
        );
    }
}

//! RPG Maker VX/VX Ace binding (Marshal data files)
//!
//! The game's data files live inside an encrypted archive (`Game.rgss2a` or
//! `Game.rgss3a`) that this crate does not unpack. The user extracts it into a
//! staging directory next to the game; the binding reads from
//! `<game>/<staging>/Data` and writes rewritten files to the output directory.

mod classes;

pub use classes::{ClassHandler, apply_document, extract_document, handler_for};

use super::{
    ApplyOptions, ApplyReport, EngineAdapter, VxOptions, apply_file, copy_through, file_name,
    list_data_files,
};
use crate::error::{Error, Result};
use crate::formats::marshal::{read_marshal, serialize_marshal};
use crate::model::GameData;
use crate::script::Replacements;
use std::path::{Path, PathBuf};

pub const ENGINE_NAME: &str = "RPG Maker VX/VX Ace";

const ARCHIVES: [&str; 2] = ["Game.rgss3a", "Game.rgss2a"];
const DATA_EXTENSIONS: [&str; 2] = ["rvdata2", "rvdata"];

/// Binding for RPG Maker VX and VX Ace games.
#[derive(Debug, Clone, Default)]
pub struct RpgMakerVx {
    options: ApplyOptions,
    vx: VxOptions,
}

impl RpgMakerVx {
    #[must_use]
    pub fn new(options: ApplyOptions, vx: VxOptions) -> Self {
        Self { options, vx }
    }

    /// Game directory for `path`, which may also point at the game executable.
    #[must_use]
    pub fn game_root(path: &Path) -> Option<PathBuf> {
        if path.is_dir() {
            return Some(path.to_path_buf());
        }
        let is_exe = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));
        if path.is_file() && is_exe {
            return path.parent().map(Path::to_path_buf);
        }
        None
    }

    /// `<game>/<staging>`, where the archive is expected to be unpacked.
    #[must_use]
    pub fn staging_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.vx.staging_dir)
    }

    fn data_files(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        list_data_files(dir, &DATA_EXTENSIONS)
    }

    fn require_root(path: &Path) -> Result<PathBuf> {
        Self::game_root(path).ok_or_else(|| Error::MissingDataDirectory {
            path: path.to_path_buf(),
        })
    }
}

impl EngineAdapter for RpgMakerVx {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn detect(&self, path: &Path) -> bool {
        let Some(root) = Self::game_root(path) else {
            return false;
        };
        ARCHIVES.iter().any(|archive| root.join(archive).is_file())
            || Self::data_files(&root.join("Data")).is_ok_and(|files| !files.is_empty())
    }

    fn load(&self, path: &Path) -> Result<GameData> {
        let root = Self::require_root(path)?;
        let staging = self.staging_dir(&root);
        let files = Self::data_files(&staging.join("Data"))?;

        if files.is_empty() {
            std::fs::create_dir_all(&staging)?;
            let archive = if root.join("Game.rgss2a").is_file() {
                "Game.rgss2a"
            } else {
                "Game.rgss3a"
            };
            tracing::info!("{} must be extracted into {}", archive, staging.display());
            return Err(Error::ExtractionRequired {
                staging,
                archive: archive.to_string(),
            });
        }

        let mut data = GameData::new();
        for file in files {
            let name = file_name(&file)?;
            let extracted = read_marshal(&file)
                .and_then(|mut doc| extract_document(&mut doc, &name, &mut data));
            if let Err(err) = extracted {
                tracing::warn!("Skipping {}: {}", name, err);
            }
        }

        tracing::info!("Loaded {} translation unit(s) from {}", data.len(), staging.display());
        Ok(data)
    }

    fn apply(&self, data: &GameData, source: &Path, output: &Path) -> Result<ApplyReport> {
        let root = Self::require_root(source)?;
        let data_dir = self.staging_dir(&root).join("Data");
        if !data_dir.is_dir() {
            return Err(Error::MissingDataDirectory { path: data_dir });
        }
        std::fs::create_dir_all(output)?;
        let mut report = ApplyReport::default();

        for file in Self::data_files(&data_dir)? {
            let name = file_name(&file)?;
            let dest = output.join(&name);
            let mut replacements = Replacements::from_units(
                data.units_for_file(&name),
                self.options.use_machine_translation,
            );

            if replacements.is_empty() {
                copy_through(&file, &dest, &name, &mut report)?;
                continue;
            }

            apply_file(&file, &dest, &name, &mut report, || {
                let mut doc = read_marshal(&file)?;
                let rewritten = apply_document(&mut doc, &mut replacements)?;
                if rewritten > 0 {
                    std::fs::write(&dest, serialize_marshal(&doc)?)?;
                }
                Ok(rewritten)
            })?;
        }

        Ok(report)
    }
}

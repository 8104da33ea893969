//! Game engine bindings
//!
//! Each binding knows where an engine keeps its data files and which parts
//! of them carry text. They all expose the same [`EngineAdapter`] contract so
//! callers can pick one by detection or by name through [`EngineRegistry`].

mod options;
mod registry;
pub mod rpgmv;
pub mod rpgvx;

pub use options::{ApplyOptions, JsonStyle, VxOptions};
pub use registry::EngineRegistry;
pub use rpgmv::RpgMakerMv;
pub use rpgvx::RpgMakerVx;

use crate::error::{Error, Result};
use crate::model::GameData;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Contract shared by all engine bindings.
pub trait EngineAdapter {
    /// Stable display name, also used for manual engine selection.
    fn name(&self) -> &'static str;

    /// Whether this binding recognises the game at `path`.
    fn detect(&self, path: &Path) -> bool;

    /// Extract every translatable block of the game at `path`.
    fn load(&self, path: &Path) -> Result<GameData>;

    /// Write translated copies of the game's data files into `output`.
    ///
    /// A file that cannot be rewritten is copied unchanged and reported in
    /// [`ApplyReport::failures`]; only problems with the game or output
    /// directories themselves are returned as errors.
    fn apply(&self, data: &GameData, source: &Path, output: &Path) -> Result<ApplyReport>;
}

/// What an apply pass did to each file.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Files written with translated text.
    pub rewritten: Vec<String>,
    /// Files copied through unchanged.
    pub copied: Vec<String>,
    /// Files that failed and were copied through ([`Error::FileApply`]).
    pub failures: Vec<Error>,
    /// Text blocks rewritten across all files.
    pub blocks: usize,
}

impl ApplyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.rewritten.len() + self.copied.len() + self.failures.len()
    }

    fn record_failure(&mut self, file: &str, err: &Error) {
        if err.is_format_error() {
            tracing::warn!("{} is not valid game data ({}), copying original", file, err);
        } else {
            tracing::warn!("Failed to apply translations to {}: {}, copying original", file, err);
        }
        self.failures.push(Error::FileApply {
            file: file.to_string(),
            message: err.to_string(),
        });
    }
}

/// Data files directly inside `dir` with one of `extensions`, sorted by name.
pub(crate) fn list_data_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if matches {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

pub(crate) fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidPath(path.display().to_string()))
}

/// Copy `source` to `dest`, recording it as untouched.
pub(crate) fn copy_through(
    source: &Path,
    dest: &Path,
    name: &str,
    report: &mut ApplyReport,
) -> Result<()> {
    std::fs::copy(source, dest)?;
    report.copied.push(name.to_string());
    Ok(())
}

/// Run one file's rewrite, falling back to a verbatim copy on failure.
///
/// `rewrite` returns the number of blocks it changed; zero means the file was
/// left alone and should be copied.
pub(crate) fn apply_file<F>(
    source: &Path,
    dest: &Path,
    name: &str,
    report: &mut ApplyReport,
    rewrite: F,
) -> Result<()>
where
    F: FnOnce() -> Result<usize>,
{
    match rewrite() {
        Ok(0) => copy_through(source, dest, name, report),
        Ok(blocks) => {
            tracing::info!("Rewrote {} block(s) in {}", blocks, name);
            report.rewritten.push(name.to_string());
            report.blocks += blocks;
            Ok(())
        }
        Err(err) => {
            report.record_failure(name, &err);
            std::fs::copy(source, dest)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_apply_file_copies_on_corrupt_data() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Actors.rvdata2");
        let dest = temp.path().join("out.rvdata2");
        std::fs::write(&source, b"\x04\x08[").unwrap();

        let mut report = ApplyReport::default();
        apply_file(&source, &dest, "Actors.rvdata2", &mut report, || {
            Err(Error::UnexpectedEof { offset: 3 })
        })
        .unwrap();

        assert!(!report.is_clean());
        assert!(matches!(
            &report.failures[0],
            Error::FileApply { file, message }
                if file == "Actors.rvdata2" && message.contains("offset 3")
        ));
        assert_eq!(std::fs::read(&dest).unwrap(), b"\x04\x08[");
    }

    #[test]
    fn test_format_errors_are_classified() {
        assert!(Error::UnexpectedEof { offset: 0 }.is_format_error());
        assert!(Error::DanglingNode(4).is_format_error());
        assert!(!Error::InvalidPath("x".to_string()).is_format_error());
        assert!(
            !Error::FileApply {
                file: "Map001.json".to_string(),
                message: "bad".to_string(),
            }
            .is_format_error()
        );
    }

    #[test]
    fn test_apply_file_counts_blocks() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Map001.json");
        std::fs::write(&source, "{}").unwrap();

        let mut report = ApplyReport::default();
        apply_file(&source, &temp.path().join("a.json"), "Map001.json", &mut report, || {
            Ok(0)
        })
        .unwrap();
        apply_file(&source, &temp.path().join("b.json"), "Map001.json", &mut report, || {
            Ok(3)
        })
        .unwrap();

        assert_eq!(report.copied, vec!["Map001.json".to_string()]);
        assert_eq!(report.rewritten, vec!["Map001.json".to_string()]);
        assert_eq!(report.blocks, 3);
        assert_eq!(report.file_count(), 2);
    }
}

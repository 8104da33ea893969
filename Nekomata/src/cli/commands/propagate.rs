//! CLI command for copying a translation to identical source lines

use std::path::Path;

use uuid::Uuid;

use crate::TranslationProject;

pub fn execute(path: &Path, unit: Uuid, overwrite: bool) -> anyhow::Result<()> {
    let mut project = TranslationProject::load(path)?;

    let duplicates: Vec<_> = project.data.duplicates_of(unit).collect();
    let translated = duplicates
        .iter()
        .filter(|dup| !dup.human_translation.is_empty())
        .count();
    let total = duplicates.len();
    if total == 0 {
        println!("No other unit shares this unit's original text");
        return Ok(());
    }

    let changed = project.apply_to_duplicates(unit, overwrite);
    if changed > 0 {
        project.save(path)?;
    }

    println!("Applied to {changed} of {total} matching unit(s)");
    if !overwrite && translated > 0 {
        println!("{translated} already translated unit(s) kept; pass --overwrite to replace them");
    }
    Ok(())
}

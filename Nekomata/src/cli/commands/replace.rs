//! CLI command for bulk find/replace

use std::path::Path;

use crate::TranslationProject;

pub fn execute(path: &Path, find: &str, replace: &str) -> anyhow::Result<()> {
    if find.is_empty() {
        anyhow::bail!("--find must not be empty");
    }
    let mut project = TranslationProject::load(path)?;
    let result = project.replace(find, replace);

    if result.units_modified > 0 {
        project.save(path)?;
    }
    println!(
        "Replaced {} occurrence(s) in {} unit(s)",
        result.replacements, result.units_modified
    );
    Ok(())
}

//! CLI command for translation progress

use std::path::Path;

use crate::TranslationProject;

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

pub fn execute(path: &Path) -> anyhow::Result<()> {
    let project = TranslationProject::load(path)?;
    let stats = project.stats();

    println!("{} ({})", project.name, project.engine);
    println!("Game: {}", project.game_path.display());
    println!("Last updated: {}", project.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!(
        "Translated: {}/{} ({:.1}%), {} machine-only, across {} file(s)",
        stats.translated,
        stats.total,
        percent(stats.translated, stats.total),
        stats.machine_only,
        stats.files
    );
    println!();
    println!("By kind:");
    for (kind, counts) in &stats.by_kind {
        println!(
            "  {:<12} {:>6}/{:<6} {:>5.1}%",
            kind.label(),
            counts.translated,
            counts.total,
            percent(counts.translated, counts.total)
        );
    }
    Ok(())
}

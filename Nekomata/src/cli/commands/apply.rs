//! CLI command for writing translated data files

use std::path::Path;
use std::time::Instant;

use nekocore::cli::progress::{GEAR, LOOKING_GLASS, print_done, print_step};

use crate::{Toolkit, TranslationProject};

pub fn execute(toolkit: &Toolkit, project: &Path, output: &Path) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, &format!("Loading {}...", project.display()));
    let project = TranslationProject::load(project)?;

    print_step(2, 2, GEAR, &format!("Writing translated files to {}...", output.display()));
    let report = toolkit.apply_project(&project, output)?;

    println!(
        "{} file(s) rewritten ({} block(s)), {} copied",
        report.rewritten.len(),
        report.blocks,
        report.copied.len()
    );
    for failure in &report.failures {
        println!("  {failure}");
    }

    print_done(started.elapsed());
    if !report.is_clean() {
        anyhow::bail!("{} file(s) copied unchanged after errors", report.failures.len());
    }
    Ok(())
}
